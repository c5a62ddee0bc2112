//! Klang CLI - play and render the virtual-analog synthesizer.

mod commands;
mod patch;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "klang")]
#[command(author, version, about = "Klang virtual-analog synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play live from the computer keyboard
    Play(commands::play::PlayArgs),

    /// Render a held chord offline to a WAV file
    Render(commands::render::RenderArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    // logs go to stderr so stdout stays usable for status output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
