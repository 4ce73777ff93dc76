use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::gradebook::Gradebook;

/// Writes a gzip-compressed bincode snapshot of the gradebook.
pub fn save_gradebook(book: &Gradebook, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = BufWriter::new(encoder);

    serialize_into(&mut writer, book)?;
    writer.flush()?;
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?;

    info!(path = %path.display(), students = book.students.len(), "gradebook saved");
    Ok(())
}

/// Reads a snapshot written by [`save_gradebook`].
pub fn load_gradebook(path: impl AsRef<Path>) -> Result<Gradebook> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = BufReader::new(decoder);

    let book: Gradebook = deserialize_from(&mut reader)?;
    info!(path = %path.display(), students = book.students.len(), "gradebook loaded");
    Ok(book)
}
