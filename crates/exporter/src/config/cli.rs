use clap::{Parser, Subcommand};
use utils::version;

use crate::config::exporter::CollectArgs;
use crate::config::serve::ServeArgs;

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve index field limit metrics over HTTP
    Serve(Box<ServeArgs>),
    /// Run a single collection pass and print the encoded metrics
    Collect(Box<CollectArgs>),
}
