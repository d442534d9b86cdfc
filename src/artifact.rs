//! G-code artifact lifecycle
//!
//! A program is written into a named temp file through a buffered
//! writer. [`GcodeArtifact::finish`] flushes and closes it; only the
//! resulting [`FinishedArtifact`] can be decoded or exported. Both types
//! delete their file when dropped, unless the finished artifact is kept
//! with [`FinishedArtifact::into_path`].

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use stitchkit_core::LineSink;

const TEMP_PREFIX: &str = "stitchkit-";
const TEMP_SUFFIX: &str = ".gcode";

/// Delete a file, logging failures instead of returning them
fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed G-code artifact {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Failed to remove previous G-code artifact {}: {}",
            path.display(),
            e
        ),
    }
}

/// A G-code file being written
#[derive(Debug)]
pub struct GcodeArtifact {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines: u64,
}

impl GcodeArtifact {
    /// Create an artifact in the system temp directory
    pub fn create() -> io::Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    /// Create an artifact in `dir`
    pub fn create_in(dir: impl AsRef<Path>) -> io::Result<Self> {
        let (file, path) = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?
            .keep()?;

        tracing::debug!("Temp file: {}", path.display());
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            lines: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines written so far
    pub fn line_count(&self) -> u64 {
        self.lines
    }

    /// Flush and close the file
    ///
    /// On failure the partial file is removed.
    pub fn finish(mut self) -> io::Result<FinishedArtifact> {
        let result = match self.writer.take() {
            Some(writer) => writer
                .into_inner()
                .map_err(|e| e.into_error())
                .and_then(|file| file.sync_all()),
            None => Err(io::Error::other("artifact already closed")),
        };

        match result {
            Ok(()) => Ok(FinishedArtifact {
                path: std::mem::take(&mut self.path),
                keep: false,
            }),
            // Drop removes the file
            Err(e) => Err(e),
        }
    }
}

impl LineSink for GcodeArtifact {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("artifact already closed"))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }
}

impl Drop for GcodeArtifact {
    fn drop(&mut self) {
        self.writer.take();
        if !self.path.as_os_str().is_empty() {
            remove_quietly(&self.path);
        }
    }
}

/// A closed G-code file
#[derive(Debug)]
pub struct FinishedArtifact {
    path: PathBuf,
    keep: bool,
}

impl FinishedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the file byte for byte to `dest`, returning the byte count
    pub fn export(&self, dest: impl AsRef<Path>) -> io::Result<u64> {
        let dest = dest.as_ref();
        let bytes = fs::copy(&self.path, dest)?;
        tracing::info!("Exported {} bytes of G-code to {}", bytes, dest.display());
        Ok(bytes)
    }

    /// Keep the file on disk and return its path
    pub fn into_path(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for FinishedArtifact {
    fn drop(&mut self) {
        if !self.keep {
            remove_quietly(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_keeps_written_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = GcodeArtifact::create_in(dir.path()).unwrap();
        artifact.write_line("M17").unwrap();
        artifact.write_line("M18").unwrap();
        assert_eq!(artifact.line_count(), 2);

        let name = artifact.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(TEMP_PREFIX));
        assert!(name.ends_with(TEMP_SUFFIX));

        let finished = artifact.finish().unwrap();
        assert_eq!(fs::read_to_string(finished.path()).unwrap(), "M17\nM18\n");
    }

    #[test]
    fn test_unfinished_artifact_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = GcodeArtifact::create_in(dir.path()).unwrap();
        artifact.write_line("M17").unwrap();
        let path = artifact.path().to_path_buf();
        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn test_finished_artifact_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let finished = GcodeArtifact::create_in(dir.path()).unwrap().finish().unwrap();
        let path = finished.path().to_path_buf();
        assert!(path.exists());
        drop(finished);
        assert!(!path.exists());
    }

    #[test]
    fn test_into_path_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let finished = GcodeArtifact::create_in(dir.path()).unwrap().finish().unwrap();
        let path = finished.into_path();
        assert!(path.exists());
    }

    #[test]
    fn test_export_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = GcodeArtifact::create_in(dir.path()).unwrap();
        artifact.write_line("; rose").unwrap();
        artifact.write_line("G0 X1.00 Y2.00 F3000").unwrap();
        let finished = artifact.finish().unwrap();

        let dest = dir.path().join("out.gcode");
        let bytes = finished.export(&dest).unwrap();
        assert_eq!(bytes, fs::metadata(&dest).unwrap().len());
        assert_eq!(
            fs::read(&dest).unwrap(),
            fs::read(finished.path()).unwrap()
        );
    }
}
