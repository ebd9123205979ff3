//! qlink learner binary
//!
//! Binds the peer channel, then runs the episode loop until all
//! configured episodes complete or a fatal stage error aborts the run.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use qlink_core::{LearnerConfig, LinearQ};
use qlink_learner::Coordinator;
use qlink_transport::TcpPeerChannel;

#[derive(Parser)]
#[command(name = "qlink-learner")]
#[command(about = "Experience-exchange DQN learner", version)]
struct Cli {
    /// Path to a JSON config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the number of episodes
    #[arg(long)]
    episodes: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => LearnerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LearnerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(episodes) = cli.episodes {
        config.num_episodes = episodes;
    }

    let mut channel = TcpPeerChannel::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding peer channel on {}", config.bind_addr))?;

    let approximator = LinearQ::new(
        config.state_size,
        config.action_size,
        config.gamma,
        config.learning_rate,
    );
    let mut coordinator = Coordinator::new(config, approximator)
        .await
        .context("preparing checkpoint storage")?;

    coordinator
        .run(&mut channel)
        .await
        .context("learner run failed")?;
    Ok(())
}
