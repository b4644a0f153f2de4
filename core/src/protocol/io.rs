// ## 📂 File: `src/protocol/io.rs`
// ## Normalized input and whole-buffer output persistence

use std::ffi::OsString;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::constants::PARTIAL_SUFFIX;
use crate::types::RunError;

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    /// Discard; combine with `ApiConfig::with_buf` to get the bytes back.
    Memory,
}

impl OutputSink {
    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputSink::File(p) => Some(p),
            _ => None,
        }
    }
}

/// Read the whole input into one shared buffer.
///
/// The protocol needs the total length before anything is distributed,
/// so there is no streaming here.
pub fn read_input(src: InputSource) -> Result<Bytes, RunError> {
    let data = match src {
        InputSource::Memory(b) => b,
        InputSource::File(p) => fs::read(&p)?,
        InputSource::Reader(mut r) => {
            let mut buf = Vec::new();
            r.read_to_end(&mut buf)?;
            buf
        }
    };
    debug!(len = data.len(), "input loaded");
    Ok(Bytes::from(data))
}

/// `<path>.partial`, next to the final output.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Persist the assembled output.
///
/// Files are written to a `.partial` sibling and renamed into place, so a
/// failed run never leaves a truncated file under the final name.
pub fn persist_output(sink: OutputSink, data: &[u8]) -> Result<(), RunError> {
    match sink {
        OutputSink::Memory => Ok(()),
        OutputSink::Writer(mut w) => {
            w.write_all(data)?;
            w.flush()?;
            Ok(())
        }
        OutputSink::File(path) => {
            let tmp = partial_path(&path);
            let result = write_then_rename(&tmp, &path, data);
            if result.is_err() {
                let _ = fs::remove_file(&tmp);
            }
            result
        }
    }
}

fn write_then_rename(tmp: &Path, path: &Path, data: &[u8]) -> Result<(), RunError> {
    let mut file = fs::File::create(tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp, path)?;
    debug!(path = %path.display(), len = data.len(), "output persisted");
    Ok(())
}
