pub mod cli;
pub mod exporter;
pub mod serve;

pub use cli::*;
pub use exporter::*;
pub use serve::*;
