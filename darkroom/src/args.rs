use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Darkroom image generation proxy
#[derive(Debug, Parser)]
#[command(name = "darkroom", about = "Turns text prompts into images through Gemini")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "darkroom.toml", env = "DARKROOM_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "DARKROOM_LISTEN")]
    pub listen: Option<SocketAddr>,
}
