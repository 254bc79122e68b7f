use std::path::PathBuf;
use clap::{Parser, Subcommand};

use crate::search::DEFAULT_WINDOW;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Solve every case of an input file, or of stdin
    #[command(alias("s"))]
    Solve {
        path: Option<PathBuf>,
        #[arg(short, long, default_value_t = DEFAULT_WINDOW, help = "Ticks tracked above the fastest arrival at each node")]
        window: usize,
        #[arg(long, help = "Print the walk after each answer")]
        walk: bool,
    },
    /// Compare answers for every <name>.in against <name>.ans or <name>.out
    #[command(alias("c"))]
    Check {
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(short, long, help = "Recursively scan every folder")]
        recursive: bool,
        #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
        window: usize,
    },
}
