use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ExportError, Result};

/// Read and parse a JSON document from a file stream.
pub fn read_json(path: &Path) -> Result<Value> {
    let file = fs::File::open(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| ExportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `value` as JSON to `path` without ever leaving a partial file.
///
/// The document goes to a temporary file in the destination directory first and
/// is renamed into place only after it has been fully flushed.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let write_err = |source: std::io::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(write_err)?;

    let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer(&mut writer, value)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        writer.flush().map_err(write_err)?;
    }
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Create an output directory (and its parents) if it does not exist yet
pub fn ensure_output_directory(path: &Path) -> std::io::Result<PathBuf> {
    if !path.exists() {
        log::debug!("Creating directory {:?}", path);
    }
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}
