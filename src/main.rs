use clap::Parser;
use milestone_sync::core::report;
use milestone_sync::utils::{logger, validation::Validate};
use milestone_sync::{CliConfig, GithubClient, ReconcileEngine, SyncConfig};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting milestone-sync");
    if cli.verbose {
        tracing::debug!("Config file: {}, API base: {}", cli.config, cli.api_base);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    // validate() already rejected a missing token.
    let token = cli.token.as_deref().unwrap_or_default();

    // Fatal: a config parse error or schema violation stops the run before
    // any remote call.
    let config = match SyncConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let client = match GithubClient::new(token, &cli.api_base) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let mut engine = ReconcileEngine::new(&client, cli.dry_run);
    let outcomes = engine.run(&config).await;
    println!("{}", report::render_summary(&outcomes, cli.dry_run));

    let totals = report::totals(&outcomes);
    if totals.errored > 0 {
        tracing::error!("{} pair(s) failed", totals.errored);
        std::process::exit(1);
    }
}
