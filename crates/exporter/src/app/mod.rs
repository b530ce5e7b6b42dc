pub mod core;
pub mod services;

pub use self::core::Application;
pub use services::EncodedScrape;
pub use services::ScrapeError;
pub use services::ScrapeService;
