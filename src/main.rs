use anyhow::Result;
use arbor::cli::{Cli, Commands};
use arbor::handlers::{env, run, show};
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, trace, name } => {
            let status = run::handle_run(&file, trace, name.as_deref())?;
            std::process::exit(status)
        }
        Commands::Show { file } => show::handle_show(&file),
        Commands::Env => env::handle_env(),
    }
}
