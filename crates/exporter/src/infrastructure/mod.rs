pub mod metrics;
pub mod settings_source;
