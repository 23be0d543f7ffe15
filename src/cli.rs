use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arbor", version, about = "Arbor: execute parsed shell command trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every command line of a tree file, stopping at `exit`
    #[command(visible_alias = "r")]
    Run {
        file: PathBuf,

        /// Print each simple command to stderr before it runs
        #[arg(short = 't', long = "trace")]
        trace: bool,

        /// Label used for execution log file names (defaults to the file stem)
        #[arg(short = 'n', long = "name")]
        name: Option<String>,
    },

    /// Print the command lines of a tree file as shell text
    Show { file: PathBuf },

    /// Inspect the environment overlay from arbor.toml and .env
    #[command(visible_alias = "e")]
    Env,
}
