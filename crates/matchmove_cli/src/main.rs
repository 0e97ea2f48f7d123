// SPDX-License-Identifier: MIT OR Apache-2.0
//! Matchmove affects resolver, command-line entry point.

mod cli;
mod output;
mod run;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    // Logs go to stderr so stdout stays machine readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("matchmove_affects=info,matchmove_graph=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::Cli::parse();
    tracing::debug!("matchmove-affects v{}", env!("CARGO_PKG_VERSION"));

    match run::run(&args) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
