use std::io::Write;

use anyhow::anyhow;
use anyhow::Result;
use clap::Parser;
use settings_exporter::app::Application;
use settings_exporter::app::ScrapeService;
use settings_exporter::config::Cli;
use settings_exporter::config::CollectArgs;
use settings_exporter::config::Commands;
use settings_exporter::config::ServeArgs;
use utils::logging;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(serve_args) => run_serve(*serve_args).await,
        Commands::Collect(collect_args) => run_collect(*collect_args).await,
    }
}

async fn run_serve(serve_args: ServeArgs) -> Result<()> {
    let _guard = logging::init(serve_args.exporter.log_path.as_deref())?;

    tracing::info!("Starting settings exporter {}", &**version::VERSION);

    let app = Application::from_args(&serve_args)?;
    app.run().await
}

async fn run_collect(collect_args: CollectArgs) -> Result<()> {
    let _guard = logging::init(collect_args.exporter.log_path.as_deref())?;

    let service = ScrapeService::from_args(&collect_args.exporter)?;
    let scrape = service.scrape().await.map_err(|e| anyhow!("{e:?}"))?;

    for (index, reason) in scrape.report.skipped() {
        tracing::warn!(index, %reason, "Index skipped");
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(scrape.body.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
