//! `.mbseq` sequence dump files.
//!
//! One sequence line per row, the same text form the connector reads and
//! writes. Dumps are written with CRLF separators and no trailing newline;
//! any line terminator is accepted when reading.

use crate::error::Result;
use microdude_midi_io::Backend;
use microdude_protocol::{Connector, SequenceText, SequenceTextError};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

pub const EXTENSION: &str = "mbseq";
pub const DEFAULT_FILE_NAME: &str = "sequences.mbseq";

const SEPARATOR: &str = "\r\n";

pub fn write_dump<W, I, S>(mut writer: W, lines: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            writer.write_all(SEPARATOR.as_bytes())?;
        }
        writer.write_all(line.as_ref().as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Non-blank lines of a dump, terminators stripped.
pub fn read_dump<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if !line.trim().is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}

/// Parse every line of a dump without touching a device.
///
/// Lines with an id but no steps (`3:`) are how empty sequences are
/// downloaded; they are skipped, leaving that sequence as it is.
pub fn parse_dump<R: Read>(reader: R) -> Result<Vec<SequenceText>> {
    let mut texts = Vec::new();
    for line in read_dump(reader)? {
        match SequenceText::parse(&line) {
            Ok(text) => texts.push(text),
            Err(SequenceTextError::EmptySteps) => debug!("Skipping empty sequence '{}'", line),
            Err(e) => return Err(microdude_protocol::Error::from(e).into()),
        }
    }
    Ok(texts)
}

/// Read all eight sequences from the device into `path`.
pub fn download_sequences<B: Backend>(connector: &mut Connector<B>, path: &Path) -> Result<()> {
    let lines = connector.get_all_sequences()?;
    debug!("Writing {} sequences to {}", lines.len(), path.display());
    write_dump(BufWriter::new(File::create(path)?), &lines)?;
    info!("Sequences saved to {}", path.display());
    Ok(())
}

/// Send every sequence in `path` to the device.
///
/// The whole file is parsed first; a malformed line aborts before anything
/// is sent. Returns the number of sequences written.
pub fn upload_sequences<B: Backend>(connector: &mut Connector<B>, path: &Path) -> Result<usize> {
    let texts = parse_dump(File::open(path)?)?;
    for text in &texts {
        connector.write_sequence(text)?;
    }
    info!("{} sequences loaded from {}", texts.len(), path.display());
    Ok(texts.len())
}
