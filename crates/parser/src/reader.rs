//! Streaming reader over an RTS log

use crate::frame::classify;
use crate::operation::{Operation, OperationKind};
use rts_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use tracing::{info, trace};

/// An operation together with the physical line it was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub line_number: u64,
    pub operation: Operation,
}

/// Lazily yields the RTS operations of a log, one line at a time.
///
/// Iteration ends at end of input, after the first `END` operation, or after
/// the first error. Reading the same log again takes a fresh reader.
pub struct LogReader<R> {
    reader: R,
    path: Option<PathBuf>,
    buf: String,
    line_number: u64,
    finished: bool,
}

impl LogReader<BufReader<File>> {
    /// Open a log file for sequential reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, "open", e))?;
        info!(path = %path.display(), "opened RTS log");
        let mut reader = Self::new(BufReader::new(file));
        reader.path = Some(path.to_path_buf());
        Ok(reader)
    }
}

impl<R: BufRead> LogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            path: None,
            buf: String::new(),
            line_number: 0,
            finished: false,
        }
    }

    fn read_error(&self, err: std::io::Error) -> Error {
        if err.kind() == ErrorKind::InvalidData {
            return Error::malformed("<invalid UTF-8>", "UTF-8 text", err.to_string())
                .at_line(self.line_number + 1);
        }
        match &self.path {
            Some(path) => Error::io(path, "read", err),
            None => Error::stream_io("read", err),
        }
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    self.finished = true;
                    return Some(Err(self.read_error(err)));
                }
            }
            self.line_number += 1;

            let line = self.buf.trim_end_matches(|c| c == '\n' || c == '\r');
            let parsed = classify(line)
                .and_then(|frame| frame.map(|f| Operation::parse_frame(&f)).transpose());

            match parsed {
                Ok(None) => {
                    trace!(line_number = self.line_number, "skipping non-RTS line");
                }
                Ok(Some(operation)) => {
                    if operation.kind() == OperationKind::End {
                        self.finished = true;
                    }
                    return Some(Ok(Entry {
                        line_number: self.line_number,
                        operation,
                    }));
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err.at_line(self.line_number)));
                }
            }
        }
    }
}

impl<R: BufRead> FusedIterator for LogReader<R> {}
