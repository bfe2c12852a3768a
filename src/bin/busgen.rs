use busgen::cli::{run_cli, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run_cli(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
