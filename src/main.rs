//! Template Expression Scanner Binary

use exprscan::cli::EnhancedCli;
use std::process;

fn main() {
    let mut cli = EnhancedCli::new();

    if let Err(e) = cli.run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
