pub mod collector;
pub mod dates;
pub mod grouping;
pub mod observation;
pub mod settings;
