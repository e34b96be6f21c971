//! gpu-bootstrap - provision a GPU host and launch one subnet worker per GPU

use clap::Parser;

use gpu_bootstrap::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
