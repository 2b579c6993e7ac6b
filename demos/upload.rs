mod cli;

use cli::{connection_from_parser, usage_and_exit, ArgParser};
use gmdata::WriteOptions;
use std::process;

const USAGE: &str = "Usage: cargo run --example upload -- [--url URL] [--user-dn DN] [--policy JSON] <LOCAL_FILE> <REMOTE_PATH>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut parser = ArgParser::new(USAGE);
    let conn = connection_from_parser(&mut parser, USAGE);
    let policy = parser.take_value(&["--policy"]);
    let positionals = parser.remaining();
    if positionals.len() != 2 {
        usage_and_exit(USAGE);
    }
    let local_file = &positionals[0];
    let remote_path = &positionals[1];

    let mut options = WriteOptions::new();
    if let Some(policy) = &policy {
        options = options.with_policy_text(policy)?;
    }

    let client = conn.connect().await?;

    println!("Uploading {} to {}...", local_file, remote_path);
    match client.upload_file(local_file, remote_path, &options).await {
        Ok(oid) => println!("Upload complete, oid {}", oid),
        Err(e) => {
            eprintln!("Error: {:?}", e);
            process::exit(1);
        }
    }

    client.shutdown().await;
    Ok(())
}
