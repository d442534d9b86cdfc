//! # StitchKit Visualizer
//!
//! Decodes machine G-code back into per-colour point groups for preview.
//! Includes the decoder state machine, the colour palette and a streaming
//! file reader.

pub mod gcode;
pub mod palette;
pub mod utils;

pub use gcode::{ColorGroup, DecoderState, GcodeDecoder, Preview};
pub use palette::{HueCyclePalette, Palette, Rgb};
pub use utils::{decode_file, FileReadStats, GcodeFileReader};
