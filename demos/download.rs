mod cli;

use cli::{parse_connection, usage_and_exit};
use gmdata::Content;

const USAGE: &str = "Usage: cargo run --example download -- [--url URL] [--user-dn DN] <REMOTE_PATH> [LOCAL_FILE]

Without LOCAL_FILE the object is fetched and described instead of saved.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conn = parse_connection(USAGE);
    let (remote_path, local_file) = match conn.positionals.as_slice() {
        [remote] => (remote.clone(), None),
        [remote, local] => (remote.clone(), Some(local.clone())),
        _ => usage_and_exit(USAGE),
    };

    let client = conn.connect().await?;

    match local_file {
        Some(local) => {
            println!("Downloading {} to {}...", remote_path, local);
            let written = client.download_file(&remote_path, &local).await?;
            println!("Download complete, {} bytes", written);
        }
        None => match client.fetch_content(&remote_path).await? {
            Content::Image {
                format,
                width,
                height,
                ..
            } => println!("{:?} image, {}x{}", format, width, height),
            Content::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Content::Text(text) => print!("{}", text),
            Content::Unsupported {
                content_type,
                bytes,
            } => println!(
                "{} bytes of {}",
                bytes.len(),
                content_type.as_deref().unwrap_or("unknown content")
            ),
        },
    }

    client.shutdown().await;
    Ok(())
}
