//! G-code to colour groups
//!
//! Mirrors the pause protocol of the generator from the text alone:
//! - `M0 C1..99` closes the running colour and starts the next one
//! - `M0 C100` marks the thread as inserted
//! - `G1` moves are sampled while a colour is running and threaded
//!
//! Rapid moves and every other instruction only update the position.
//! Malformed lines are skipped.

use serde::{Deserialize, Serialize};
use stitchkit_core::{Bounds, Instruction, PauseCode};

use crate::palette::{Palette, Rgb};

/// Sampled stitches of one thread colour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorGroup {
    /// Colour ordinal, 0 for the first colour of the program
    pub color_index: u32,
    /// Stitch positions in program order
    pub points: Vec<(f64, f64)>,
    /// Display colour
    pub color: Rgb,
}

impl ColorGroup {
    /// Points split into X and Y arrays
    pub fn axes(&self) -> (Vec<f64>, Vec<f64>) {
        self.points.iter().copied().unzip()
    }
}

/// Decoded program ready for display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub groups: Vec<ColorGroup>,
}

impl Preview {
    /// Per-group `(xs, ys)` arrays
    pub fn points(&self) -> Vec<(Vec<f64>, Vec<f64>)> {
        self.groups.iter().map(ColorGroup::axes).collect()
    }

    /// Per-group colours, aligned with [`Preview::points`]
    pub fn colors(&self) -> Vec<Rgb> {
        self.groups.iter().map(|g| g.color).collect()
    }

    /// Extent of every sampled point
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.groups.iter().flat_map(|g| g.points.iter().copied()))
    }

    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|g| g.points.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// State carried from one line to the next
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoderState {
    /// Ordinal of the running colour
    pub color_index: u32,
    /// A colour start has been seen
    pub color_started: bool,
    /// The running colour has been threaded
    pub thread_inserted: bool,
    /// Last known X position
    pub x: f64,
    /// Last known Y position
    pub y: f64,
    points: Vec<(f64, f64)>,
    groups: Vec<ColorGroup>,
}

impl DecoderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points sampled for the running colour
    pub fn pending_points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Groups sealed so far
    pub fn sealed_groups(&self) -> &[ColorGroup] {
        &self.groups
    }

    fn seal<P: Palette + ?Sized>(&mut self, palette: &P) {
        let points = std::mem::take(&mut self.points);
        self.groups.push(ColorGroup {
            color_index: self.color_index,
            points,
            color: palette.color(self.color_index),
        });
    }
}

/// Line-by-line G-code decoder
#[derive(Debug, Clone)]
pub struct GcodeDecoder<P> {
    palette: P,
}

impl<P: Palette> GcodeDecoder<P> {
    pub fn new(palette: P) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &P {
        &self.palette
    }

    /// Consume one text line
    pub fn step(&self, state: DecoderState, line: &str) -> DecoderState {
        match Instruction::parse(line) {
            Ok(instruction) => self.apply(state, &instruction),
            Err(e) => {
                if !line.trim().is_empty() {
                    tracing::trace!("Skipping line {:?}: {}", line, e);
                }
                state
            }
        }
    }

    /// Consume one parsed instruction
    pub fn apply(&self, mut state: DecoderState, instruction: &Instruction) -> DecoderState {
        match instruction {
            Instruction::LinearMove(m) => {
                state.x = m.x.unwrap_or(state.x);
                state.y = m.y.unwrap_or(state.y);
                if state.color_started && state.thread_inserted {
                    state.points.push((state.x, state.y));
                }
            }
            Instruction::RapidMove(m) => {
                state.x = m.x.unwrap_or(state.x);
                state.y = m.y.unwrap_or(state.y);
            }
            Instruction::Pause(PauseCode::ColorStart(_)) => {
                if !state.color_started {
                    state.color_started = true;
                } else {
                    if state.thread_inserted {
                        state.seal(&self.palette);
                    } else {
                        state.points.clear();
                    }
                    state.color_index += 1;
                }
                state.thread_inserted = false;
            }
            Instruction::Pause(PauseCode::ThreadInserted) => {
                state.thread_inserted = true;
            }
            _ => {}
        }
        state
    }

    /// Close the last colour and assemble the preview
    pub fn finish(&self, mut state: DecoderState) -> Preview {
        if state.color_started && state.thread_inserted {
            state.seal(&self.palette);
        }

        let preview = Preview {
            groups: state.groups,
        };
        tracing::debug!(
            "Decoded {} colour groups with {} points",
            preview.len(),
            preview.point_count()
        );
        preview
    }

    /// Decode a sequence of lines
    pub fn decode_lines<I, S>(&self, lines: I) -> Preview
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = lines
            .into_iter()
            .fold(DecoderState::new(), |state, line| self.step(state, line.as_ref()));
        self.finish(state)
    }

    /// Decode a whole program held in memory
    pub fn decode_str(&self, text: &str) -> Preview {
        self.decode_lines(text.lines())
    }
}

/// Number of colour-start pauses in a program
///
/// Used to size the palette when the colour count is not known up front.
pub fn count_color_starts<I, S>(lines: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter(|line| {
            matches!(
                Instruction::parse(line.as_ref()),
                Ok(Instruction::Pause(PauseCode::ColorStart(_)))
            )
        })
        .count() as u32
}
