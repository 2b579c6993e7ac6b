mod cli;

use cli::{parse_connection, usage_and_exit};
use gmdata::WriteOptions;
use std::io::{self, BufRead};

const USAGE: &str = "Usage: cargo run --example append -- [--url URL] [--user-dn DN] <LOGICAL_PATH>

Appends every line read from stdin as a new part of LOGICAL_PATH.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conn = parse_connection(USAGE);
    if conn.positionals.len() != 1 {
        usage_and_exit(USAGE);
    }
    let logical_path = conn.positionals[0].clone();

    let client = conn.connect().await?;
    let options = WriteOptions::default();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let oid = client
            .append_data(format!("{}\n", line), &logical_path, &options)
            .await?;
        println!("Appended {} bytes as oid {}", line.len() + 1, oid);
    }

    client.shutdown().await;
    Ok(())
}
