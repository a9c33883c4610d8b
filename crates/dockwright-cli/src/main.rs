mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dockwright", about = "Build container image batches in dependency order")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the images found under the images root
    Build {
        /// Image selection; only "all" is supported
        #[arg(default_value = "all")]
        image: String,
        /// Process the image list but don't build anything
        #[arg(long)]
        dry_run: bool,
        /// Print additional debugging information
        #[arg(long)]
        debug: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Build { debug: true, .. } => "debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Build {
            image,
            dry_run,
            debug,
        } => commands::build(&image, dry_run, debug).await?,
    }

    Ok(())
}
