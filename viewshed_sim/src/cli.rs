use clap::Parser;
use std::path::PathBuf;

/// Runs viewshed analyses for the observers of a scenario against a
/// procedurally scattered world.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/watchtower.toml")]
    pub scenario: PathBuf,

    /// Stop after this many frames, overriding `simulation.max_frames`.
    #[arg(long)]
    pub max_frames: Option<u64>,
}
