//! Offset-tracking reader for an external log file.
//!
//! The reader is stateless: the caller supplies the byte offset to resume
//! from and receives the offset to use next time. Rotation handling beyond
//! this simple offset tracking is out of scope.

use crate::error::SourceError;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Result of one incremental read: every line found at or after
/// `starting_offset`, plus the offset at which the next read should begin.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileChunk {
    pub starting_offset: u64,
    pub ending_offset: u64,
    pub lines: Vec<String>,
}

/// A log file polled by byte offset.
///
/// The file is reopened on every read, so no stale handle is held between
/// poll cycles. A `LogFile` without a configured path is valid and always
/// yields empty chunks, which keeps "not configured" out of the error path.
#[derive(Debug, Clone, Default)]
pub struct LogFile {
    path: Option<PathBuf>,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// A reader with no configured path; every read returns an empty chunk.
    pub fn unconfigured() -> Self {
        Self { path: None }
    }

    /// Build from a config setting, where the empty string means
    /// "not configured".
    pub fn from_setting(path: &str) -> Self {
        if path.is_empty() {
            Self::unconfigured()
        } else {
            Self::new(path)
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read every line from `offset` to the current end of the file.
    ///
    /// A final line without a trailing newline is still returned, and its
    /// bytes are counted into `ending_offset`. Reading at or past the end of
    /// the file yields an empty chunk with `ending_offset == offset`.
    pub fn read_from(&self, offset: u64) -> Result<FileChunk, SourceError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(FileChunk::default());
        };

        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(offset))
            .map_err(|source| SourceError::Seek {
                path: path.to_path_buf(),
                offset,
                source,
            })?;

        let mut lines = Vec::new();
        let mut ending_offset = offset;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| SourceError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            ending_offset += n as u64;

            let mut line = String::from_utf8_lossy(&buf).into_owned();
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            lines.push(line);
        }

        Ok(FileChunk { starting_offset: offset, ending_offset, lines })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn temp_log(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("access.log");
        std::fs::write(&path, content).expect("write log fixture");
        (dir, path)
    }

    #[test]
    fn full_read_from_start() {
        let (_dir, path) = temp_log("first\nsecond\n");
        let chunk = LogFile::new(&path).read_from(0).expect("read");
        assert_eq!(chunk.starting_offset, 0);
        assert_eq!(chunk.ending_offset, 13);
        assert_eq!(chunk.lines, vec!["first", "second"]);
    }

    #[test]
    fn incremental_read_returns_only_new_lines() {
        let (_dir, path) = temp_log("first\n");
        let file = LogFile::new(&path);
        let chunk = file.read_from(0).expect("first read");

        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .expect("reopen for append");
        writeln!(f, "second").expect("append");

        let next = file.read_from(chunk.ending_offset).expect("second read");
        assert_eq!(next.starting_offset, chunk.ending_offset);
        assert_eq!(next.lines, vec!["second"]);
    }

    #[test]
    fn read_at_end_is_empty_not_an_error() {
        let (_dir, path) = temp_log("only\n");
        let file = LogFile::new(&path);
        let end = file.read_from(0).expect("read").ending_offset;
        let chunk = file.read_from(end).expect("read at end");
        assert!(chunk.lines.is_empty());
        assert_eq!(chunk.ending_offset, end);
    }

    #[test]
    fn unterminated_final_line_is_included() {
        let (_dir, path) = temp_log("done\npartial");
        let chunk = LogFile::new(&path).read_from(0).expect("read");
        assert_eq!(chunk.lines, vec!["done", "partial"]);
        assert_eq!(chunk.ending_offset, 12);
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        let (_dir, path) = temp_log("one\r\ntwo\r\n");
        let chunk = LogFile::new(&path).read_from(0).expect("read");
        assert_eq!(chunk.lines, vec!["one", "two"]);
        assert_eq!(chunk.ending_offset, 10);
    }

    #[test]
    fn unconfigured_reader_is_a_valid_empty_source() {
        let chunk = LogFile::unconfigured().read_from(0).expect("read");
        assert_eq!(chunk, FileChunk::default());
        assert_eq!(LogFile::from_setting("").path(), None);
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let err = LogFile::new("/nonexistent/path/to.log")
            .read_from(0)
            .expect_err("must fail");
        assert!(matches!(err, SourceError::Open { .. }));
    }
}
