//! Generation session
//!
//! Holds at most one finished G-code artifact. Each generation replaces
//! the previous artifact; a failed generation leaves nothing behind.

use std::io;
use std::path::{Path, PathBuf};

use stitchkit_camtools::{CamToolError, EmbroideryGenerator, EmbroideryParameters, GenerationSummary, ParameterError};
use stitchkit_core::{SourceError, StitchPattern, StitchSource};
use stitchkit_visualizer::{decode_file, Preview};
use thiserror::Error;

use crate::artifact::{FinishedArtifact, GcodeArtifact};

/// Errors raised by a generation session
#[derive(Error, Debug)]
pub enum SessionError {
    /// Generator parameters were rejected before emission
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ParameterError),

    /// The stitch pattern could not be loaded
    #[error("Failed to read pattern: {0}")]
    SourceRead(#[from] SourceError),

    /// The pattern cannot be expressed in machine instructions
    #[error("Pattern rejected: {0}")]
    Generation(CamToolError),

    /// Creating, writing, closing or copying the artifact failed
    #[error("G-code artifact I/O error: {0}")]
    ArtifactIo(#[source] io::Error),

    /// The artifact could not be decoded
    #[error("Failed to decode G-code: {0}")]
    Decode(anyhow::Error),

    /// Preview or export was requested before any generation
    #[error("No G-code has been generated yet")]
    NoArtifact,
}

impl From<CamToolError> for SessionError {
    fn from(err: CamToolError) -> Self {
        match err {
            CamToolError::Parameter(e) => SessionError::Configuration(e),
            CamToolError::IoError(e) => SessionError::ArtifactIo(e),
            other => SessionError::Generation(other),
        }
    }
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Owns the current G-code artifact and the parameters that produce it
#[derive(Debug)]
pub struct GenerationSession {
    params: EmbroideryParameters,
    temp_dir: Option<PathBuf>,
    artifact: Option<FinishedArtifact>,
    summary: Option<GenerationSummary>,
}

impl GenerationSession {
    pub fn new(params: EmbroideryParameters) -> Self {
        Self {
            params,
            temp_dir: None,
            artifact: None,
            summary: None,
        }
    }

    /// Place artifacts in `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn params(&self) -> &EmbroideryParameters {
        &self.params
    }

    /// Replace the parameters used by the next generation
    pub fn set_params(&mut self, params: EmbroideryParameters) {
        self.params = params;
    }

    /// The current artifact, if a generation has succeeded
    pub fn artifact(&self) -> Option<&FinishedArtifact> {
        self.artifact.as_ref()
    }

    /// Statistics of the current artifact
    pub fn summary(&self) -> Option<&GenerationSummary> {
        self.summary.as_ref()
    }

    /// Drop the current artifact and delete its file
    pub fn discard(&mut self) {
        self.summary = None;
        self.artifact = None;
    }

    /// Generate a program for `source`, replacing the current artifact
    pub fn generate<S: StitchSource + ?Sized>(&mut self, source: &S) -> SessionResult<GenerationSummary> {
        self.discard();

        let generator = EmbroideryGenerator::new(self.params.clone())?;

        let mut artifact = match &self.temp_dir {
            Some(dir) => GcodeArtifact::create_in(dir),
            None => GcodeArtifact::create(),
        }
        .map_err(SessionError::ArtifactIo)?;

        let summary = generator.generate_into(source, &mut artifact)?;
        let finished = artifact.finish().map_err(SessionError::ArtifactIo)?;

        tracing::info!(
            "Generated {} lines ({} colours) into {}",
            summary.line_count,
            summary.color_count,
            finished.path().display()
        );

        self.artifact = Some(finished);
        self.summary = Some(summary);
        Ok(summary)
    }

    /// Load a JSON pattern and generate a program for it
    pub fn generate_from_file(&mut self, path: &Path) -> SessionResult<GenerationSummary> {
        self.discard();
        let pattern = StitchPattern::load_from_file(path)?;
        self.generate(&pattern)
    }

    /// Decode the current artifact into colour groups
    pub fn preview(&self) -> SessionResult<Preview> {
        let artifact = self.artifact.as_ref().ok_or(SessionError::NoArtifact)?;
        let colors = self.summary.map(|s| s.color_count);
        decode_file(artifact.path(), colors).map_err(SessionError::Decode)
    }

    /// Copy the current artifact to `dest`
    pub fn export(&self, dest: impl AsRef<Path>) -> SessionResult<u64> {
        let artifact = self.artifact.as_ref().ok_or(SessionError::NoArtifact)?;
        artifact.export(dest).map_err(SessionError::ArtifactIo)
    }
}
