use std::path::Path;

use anyhow::{bail, Result};
use async_stream::stream;
use tonic::Request;

use attendance::ingest::read_rows_from_path;
use attendance::rpc::{AttendanceServiceClient, RawRowMsg};

pub async fn run_upload(server_addr: &str, file_path: &Path) -> Result<()> {
    println!("\n--- Uploading rows from {:?} ---", file_path);

    if !file_path.exists() {
        bail!("Input file not found at {:?}", file_path);
    }

    let rows = read_rows_from_path(file_path)?;
    let mut client = AttendanceServiceClient::connect(format!("http://{}", server_addr)).await?;
    println!("Connected to server at {}", server_addr);

    let outbound = stream! {
        for row in rows.iter() {
            yield RawRowMsg::from(row);
        }
        println!("Client: Finished streaming {} rows.", rows.len());
    };

    let reply = client.upload_rows(Request::new(outbound)).await?.into_inner();
    println!("Server stored {} records, skipped {} rows", reply.count, reply.skipped.len());
    for skip in reply.skipped.iter().take(5) {
        println!("  - row {}: {}", skip.row, skip.reason);
    }
    if reply.skipped.len() > 5 {
        println!("  ...");
    }
    Ok(())
}
