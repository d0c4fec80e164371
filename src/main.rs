use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vigil::{
    config::{AppConfig, ChannelsConfig, SourcesConfig},
    supervisor::Supervisor,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing app.yaml, channels.yaml and sources.yaml.
    #[arg(long)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the monitoring pipeline.
    Run,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run(cli.config_dir.as_deref()).await?,
    }

    Ok(())
}

async fn run(config_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new(config_dir)?;
    let channels = ChannelsConfig::load(&config.channels_config_path)?;
    let sources = if config.sources_config_path.exists() {
        SourcesConfig::load(&config.sources_config_path)?
    } else {
        tracing::warn!("no sources.yaml found, starting with an empty registry");
        SourcesConfig::default()
    };

    tracing::info!(
        accounts = sources.accounts.len(),
        wallets = sources.wallets.len(),
        subscribers = sources.subscribers.len(),
        "starting vigil"
    );

    let supervisor =
        Supervisor::builder().config(config).channels(channels).sources(sources).build().await?;
    supervisor.run().await?;

    Ok(())
}
