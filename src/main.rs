use std::process;

use clap::Parser;
use fxrates::{Cli, ExchangeResponse, retrieve_rates};
use log::error;

fn main() {
    init_logger();
    let args = Cli::parse();

    match retrieve_rates(&args) {
        Ok(response) => print!("{}", response.render()),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
