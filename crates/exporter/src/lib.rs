//! Publishes the mapped-field limit of date-rotated indices as gauges.
//!
//! Every scrape queries the settings of the indices carrying today's date
//! token, resolves `index.mapping.total_fields.limit` from the explicit
//! settings or the engine defaults, and reports it per index and summed per
//! index group.

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
