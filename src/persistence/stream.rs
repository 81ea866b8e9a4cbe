//! Record streams: whitespace-delimited JSON objects, one record per line.
//!
//! Reading is streaming: [`RecordReader`] decodes one object at a time from a
//! buffered source, so accumulated histories never need to fit in memory
//! before the first record is produced. A truncated trailing object is an
//! error, never silently dropped.
//!
//! Writing a record is one `write_all` of the encoded line. Interactive
//! appends go straight to the session file with `O_APPEND` and an fsync; they
//! do not use the atomic writer.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer};

use super::atomic::DEFAULT_FILE_MODE;
use super::fsync::fsync_file;
use crate::error::{HistoryError, Result};
use crate::types::Record;

/// Streaming decoder of records from any byte source.
pub struct RecordReader<R: Read> {
    source_name: String,
    inner: StreamDeserializer<'static, IoRead<R>, Record>,
    failed: bool,
}

impl<R: Read> RecordReader<R> {
    /// Wraps `reader`. `source_name` is used in error messages.
    ///
    /// The reader is consumed byte by byte, so pass something buffered.
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        RecordReader {
            source_name: source_name.into(),
            inner: Deserializer::from_reader(reader).into_iter::<Record>(),
            failed: false,
        }
    }

    fn classify(&self, err: serde_json::Error) -> HistoryError {
        if err.is_io() {
            return HistoryError::io("reading", &self.source_name, io::Error::from(err));
        }
        HistoryError::MalformedRecord {
            source_name: self.source_name.clone(),
            line: err.line(),
            column: err.column(),
            source: err,
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    /// Yields records in stream order; stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.inner.next()? {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                self.failed = true;
                Some(Err(self.classify(e)))
            }
        }
    }
}

/// Reads every record from `reader` in stream order.
pub fn read_all<R: Read>(reader: R, source_name: &str) -> Result<Vec<Record>> {
    RecordReader::new(reader, source_name).collect()
}

/// Reads every record from the file at `path`.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| HistoryError::io("opening", path, e))?;
    let records = read_all(BufReader::new(file), &path.display().to_string())?;
    tracing::debug!(path = %path.display(), count = records.len(), "read records");
    Ok(records)
}

/// Encodes a record as one JSON line, newline included.
pub fn encode_line(record: &Record) -> Result<Vec<u8>> {
    let mut line = serde_json::to_vec(record).map_err(HistoryError::Encode)?;
    line.push(b'\n');
    Ok(line)
}

/// Writes records as JSON lines to any sink.
pub struct RecordWriter<W: Write> {
    inner: W,
    sink: PathBuf,
}

impl<W: Write> RecordWriter<W> {
    /// Wraps `inner`. `sink` names it in error messages.
    pub fn new(inner: W, sink: impl AsRef<Path>) -> Self {
        RecordWriter {
            inner,
            sink: sink.as_ref().to_path_buf(),
        }
    }

    /// Writes one record as a single line.
    ///
    /// Returns only after the underlying write call has returned.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let line = encode_line(record)?;
        self.inner
            .write_all(&line)
            .map_err(|e| HistoryError::io("writing", &self.sink, e))
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Appends one record to the session file at `path`, creating it if needed.
///
/// The line is written with a single `write_all` on an `O_APPEND` descriptor
/// and synced before returning.
pub fn append_record(path: &Path, record: &Record) -> Result<()> {
    let line = encode_line(record)?;

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(DEFAULT_FILE_MODE);
    }

    let mut file = options
        .open(path)
        .map_err(|e| HistoryError::io("opening for append", path, e))?;
    file.write_all(&line)
        .map_err(|e| HistoryError::io("appending to", path, e))?;
    sync_if_regular(&file).map_err(|e| HistoryError::io("syncing", path, e))?;
    Ok(())
}

/// fsync fails with EINVAL on ttys and pipes; only regular files need it.
fn sync_if_regular(file: &File) -> io::Result<()> {
    if file.metadata()?.is_file() {
        fsync_file(file)?;
    }
    Ok(())
}
