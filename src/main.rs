use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use wallstudio::config::setup_logging;

#[tokio::main(flavor = "multi_thread", worker_threads = 32)]
async fn main() {
    let cli = wallstudio::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let client = cli.provider.build_client();
    info!("Using image model {}", client.model());

    if let Err(err) =
        wallstudio::web::setup_server(&cli.listen_address, cli.port, Arc::new(client)).await
    {
        error!("Application error: {}", err);
    }
}
