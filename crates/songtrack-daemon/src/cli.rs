use std::path::PathBuf;

use clap::Parser;

/// Keep OBS-readable "now playing" files in sync with Icecast status pages.
#[derive(Debug, Parser)]
#[command(name = "songtrack", version, about)]
pub struct Cli {
    /// Config file to use instead of the per-user default
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run as a service: no Enter-to-stop prompt, stop only on Ctrl-C/SIGTERM
    #[arg(long)]
    pub service: bool,
}
