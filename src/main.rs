//! `tubeprobe` CLI - resolve YouTube videos into direct download variants

mod cmd;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tubeprobe::{Config, MediaKind};

#[derive(Parser)]
#[command(name = "tubeprobe")]
#[command(about = "Resolve YouTube videos into direct download variants")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/tubeprobe/config.toml)
    #[arg(long, global = true, env = "TUBEPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON, same shape as the HTTP API
    #[default]
    Json,
    /// Human-readable summary
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address (overrides config and TUBEPROBE_BIND)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Resolve a URL, video ID or search text into every available variant
    Resolve {
        /// YouTube URL, 11-character video ID, or search text
        reference: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Resolve a single variant
    Fetch {
        /// YouTube URL, 11-character video ID, or search text
        reference: String,

        /// Media type: video, audio, mp4 or mp3
        #[arg(short = 't', long = "type", default_value = "video")]
        kind: MediaKind,

        /// Quality level (e.g. 720 for video, 128 for audio)
        #[arg(short, long)]
        quality: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays pipeable
    let default_filter = if cli.verbose {
        "tubeprobe=debug,tower_http=debug"
    } else {
        "tubeprobe=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            cmd::serve::cmd_serve(config, bind).await?;
        }
        Commands::Resolve { reference, format } => {
            cmd::resolve::cmd_resolve(&config, &reference, format).await?;
        }
        Commands::Fetch {
            reference,
            kind,
            quality,
            format,
        } => {
            cmd::fetch::cmd_fetch(&config, &reference, kind, quality, format).await?;
        }
    }

    Ok(())
}
