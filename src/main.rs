use clap::Parser;
use progeny::utils::{logger, validation::Validate};
use progeny::{CliConfig, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting progeny CLI");
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match Settings::from_cli(cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            return Ok(());
        }
    };

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        return Ok(());
    }

    // Failures are printed by the engine; the exit status stays 0.
    if progeny::run(settings).await.is_some() {
        tracing::info!("✅ PROGENy scoring completed");
    }

    Ok(())
}
