//! Utility modules for reading G-code files

pub mod file_io;

pub use file_io::{decode_file, FileReadStats, GcodeFileReader};
