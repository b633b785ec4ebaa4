//! # Sequence backup
//!
//! Save the MicroBrute's eight sequences to a `.mbseq` file, or send a file back.
//!
//! **Concepts:** Editor session, persisted device choice, sequence dump files
//!
//! ```bash
//! cargo run --example backup -- download "MicroBrute MIDI 1" sequences.mbseq
//! cargo run --example backup -- upload "MicroBrute MIDI 1" sequences.mbseq
//! RUST_LOG=debug cargo run --example backup -- status
//! ```

use microdude::prelude::*;
use microdude::sequence_file::DEFAULT_FILE_NAME;
use std::path::PathBuf;

fn main() -> microdude::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");

    let mut editor = Editor::builder(MidirBackend::new())
        .config_store(ConfigStore::in_home()?)
        .build();

    let connected = match args.get(1) {
        Some(device) => editor.select_device(device)?,
        None => editor.connect()?,
    };
    if !connected {
        println!("No MicroBrute answered. Available devices:");
        for name in editor.list_devices()? {
            println!("  {}", name);
        }
        return Ok(());
    }

    if let Some(version) = editor.connector().firmware_version() {
        println!("MicroBrute firmware {}", version);
    }

    let file = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME));

    match command {
        "download" => {
            editor.download_sequences(&file)?;
            println!("Saved sequences to {}", file.display());
        }
        "upload" => {
            let count = editor.upload_sequences(&file)?;
            println!("Sent {} sequences from {}", count, file.display());
        }
        _ => {
            for (parameter, value) in editor.load_status()? {
                println!("  {:<20} {}", parameter, value);
            }
        }
    }

    editor.disconnect();
    Ok(())
}
