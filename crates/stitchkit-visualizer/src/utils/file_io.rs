//! File I/O
//!
//! Streams G-code files line by line so large programs are decoded
//! without being loaded into memory.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};

use crate::gcode::{count_color_starts, DecoderState, GcodeDecoder, Preview};
use crate::palette::{HueCyclePalette, Palette};

/// Buffer size for reading large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// File read statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReadStats {
    /// Total bytes read
    pub bytes_read: u64,
    /// Total lines read
    pub lines_read: u64,
    /// File size in bytes
    pub file_size: u64,
    /// Time taken to read (milliseconds)
    pub read_time_ms: u64,
}

/// G-code file reader with streaming support
#[derive(Debug, Clone)]
pub struct GcodeFileReader {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFileReader {
    /// Create a new G-code file reader
    ///
    /// # Errors
    /// Returns error if the path does not exist or is not a file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {}", path.display()));
        }

        if !path.is_file() {
            return Err(anyhow!("Path is not a file: {}", path.display()));
        }

        let file_size = fs::metadata(&path)?.len();
        Ok(Self { path, file_size })
    }

    /// Get file size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file with a per-line callback
    ///
    /// # Errors
    /// Returns error if the file cannot be read or the callback fails
    pub fn read_lines<F>(&self, mut callback: F) -> Result<FileReadStats>
    where
        F: FnMut(&str) -> Result<()>,
    {
        let started = Instant::now();
        let file = File::open(&self.path)?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut lines_read = 0u64;
        let mut bytes_read = 0u64;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            bytes_read += n as u64;

            let mut raw = buf.as_slice();
            if let Some(stripped) = raw.strip_suffix(b"\n") {
                raw = stripped;
            }
            if let Some(stripped) = raw.strip_suffix(b"\r") {
                raw = stripped;
            }

            // Invalid UTF-8 is replaced rather than rejected; the decoder skips what it cannot parse.
            let line = String::from_utf8_lossy(raw);
            if matches!(line, Cow::Owned(_)) {
                tracing::trace!("Line {} is not valid UTF-8", lines_read + 1);
            }
            callback(&line)?;
            lines_read += 1;
        }

        Ok(FileReadStats {
            bytes_read,
            lines_read,
            file_size: self.file_size,
            read_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Count colour-start pauses without decoding
    pub fn count_colors(&self) -> Result<u32> {
        let mut count = 0u32;
        self.read_lines(|line| {
            count += count_color_starts(std::iter::once(line));
            Ok(())
        })?;
        Ok(count)
    }

    /// Decode the file with `decoder`
    pub fn decode<P: Palette>(&self, decoder: &GcodeDecoder<P>) -> Result<Preview> {
        let mut state = Some(DecoderState::new());
        let stats = self.read_lines(|line| {
            if let Some(current) = state.take() {
                state = Some(decoder.step(current, line));
            }
            Ok(())
        })?;

        tracing::debug!(
            "Read {} lines ({} bytes) from {} in {} ms",
            stats.lines_read,
            stats.bytes_read,
            self.path.display(),
            stats.read_time_ms
        );
        Ok(decoder.finish(state.unwrap_or_default()))
    }
}

/// Decode a G-code file with a hue-cycle palette
///
/// When `colors` is `None` the palette is sized from a first pass over
/// the file.
pub fn decode_file(path: impl AsRef<Path>, colors: Option<u32>) -> Result<Preview> {
    let reader = GcodeFileReader::new(path)?;
    let total = match colors {
        Some(n) => n,
        None => reader.count_colors()?,
    };
    reader.decode(&GcodeDecoder::new(HueCyclePalette::new(total)))
}
