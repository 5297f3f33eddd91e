use clap::Parser;
use komm_fmt::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            // Only configuration and output problems change the exit code
            let code = if error.is_fatal() { 1 } else { 0 };
            eprintln!("Error: {:#}", anyhow::Error::new(error));
            process::exit(code);
        }
    }
}
