use clap::Parser;
use openstack_networking_provider::cli::{self, Cli};
use openstack_networking_provider::logging;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    logging::init()?;
    log::info!("#Start main()");

    cli::run(Cli::parse()).await
}
