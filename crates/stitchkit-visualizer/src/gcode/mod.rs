//! G-Code decoding
//!
//! This module provides:
//! - The decoder state carried between lines
//! - The per-line transition function
//! - Colour groups and the assembled preview

pub mod decoder;

pub use decoder::*;
