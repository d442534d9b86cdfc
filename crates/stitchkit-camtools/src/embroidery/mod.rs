//! Embroidery G-code generator
//!
//! Walks an ordered stitch pattern twice. The survey pass collects the
//! bounding box and the colour count; the emission pass threads a
//! [`MachineContext`] through [`EmbroideryGenerator::step`] once per event.
//!
//! Pause sub-codes written for the operator:
//! - `1..=99` start of colour `n`
//! - `100` insert the thread and pull it out
//! - `101` trim the thread

mod context;
mod parameters;
mod survey;

pub use context::{MachineContext, ORIGIN};
pub use parameters::{AccelerationSettings, EmbroideryParameters};
pub use survey::Survey;

use serde::{Deserialize, Serialize};
use stitchkit_core::units::{distance, map_range, scale_coordinate};
use stitchkit_core::{
    Bounds, Instruction, LineSink, Move, PauseCode, StitchEvent, StitchKind, StitchSource,
    MAX_COLOR_CODE,
};

use crate::error::{CamToolError, CamToolResult};

/// Settle delay after tension changes and corner moves, in milliseconds
pub const SETTLE_DELAY_MS: u32 = 500;
/// Delay after the last bounding-box corner
pub const CORNER_FINAL_DELAY_MS: u32 = 1000;
/// Low-speed stitches sewn before the thread tail is trimmed
pub const ANCHOR_STITCHES: u32 = 5;

/// Statistics of a finished generation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Number of colours in the pattern
    pub color_count: u32,
    /// Number of lines written to the sink
    pub line_count: u64,
    /// Number of STITCH events in the pattern
    pub stitch_count: u64,
    /// Pattern extent in machine units
    pub bounds: Option<Bounds>,
}

/// Generator for embroidery machine G-code
#[derive(Debug, Clone)]
pub struct EmbroideryGenerator {
    params: EmbroideryParameters,
}

impl EmbroideryGenerator {
    /// Create a generator, rejecting invalid parameters
    pub fn new(params: EmbroideryParameters) -> CamToolResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EmbroideryParameters {
        &self.params
    }

    /// Generate the whole program into `sink`
    ///
    /// The colour limit is checked before the first line is written.
    pub fn generate_into<S, K>(&self, source: &S, sink: &mut K) -> CamToolResult<GenerationSummary>
    where
        S: StitchSource + ?Sized,
        K: LineSink + ?Sized,
    {
        let survey = Survey::scan(source, self.params.scaling_factor);
        if survey.color_count > u32::from(MAX_COLOR_CODE) {
            return Err(CamToolError::TooManyColors {
                count: survey.color_count,
                max: u32::from(MAX_COLOR_CODE),
            });
        }

        tracing::info!(
            "Generating G-code for {} ({} events, {} colours)",
            source.name().unwrap_or("unnamed pattern"),
            source.stitches().len(),
            survey.color_count
        );

        let mut line_count = 0u64;
        let mut write = |instructions: &[Instruction]| -> CamToolResult<()> {
            for instruction in instructions {
                sink.write_line(&instruction.to_string())?;
                line_count += 1;
            }
            Ok(())
        };

        write(&self.header(&survey, source.name()))?;

        let total = source.total_count();
        let mut ctx = MachineContext::new();
        for event in source.stitches() {
            let (next, instructions) = self.step(ctx, event, total);
            write(&instructions)?;
            ctx = next;
        }

        write(&self.footer())?;

        let summary = GenerationSummary {
            color_count: survey.color_count,
            line_count,
            stitch_count: survey.stitch_count,
            bounds: survey.bounds,
        };

        tracing::debug!(
            "Wrote {} lines for {} stitches, bounds {:?}",
            summary.line_count,
            summary.stitch_count,
            summary.bounds
        );
        tracing::info!("G-code generation finished");
        Ok(summary)
    }

    /// Generate the whole program as lines
    pub fn generate<S: StitchSource + ?Sized>(&self, source: &S) -> CamToolResult<Vec<String>> {
        let mut lines = Vec::new();
        self.generate_into(source, &mut lines)?;
        Ok(lines)
    }

    /// Program preamble up to the first colour request
    pub fn header(&self, survey: &Survey, name: Option<&str>) -> Vec<Instruction> {
        let p = &self.params;
        let mut out = Vec::new();

        if let Some(name) = name {
            out.push(Instruction::Comment(name.to_lowercase()));
        }

        out.push(Instruction::EnableMotors);
        out.push(Instruction::Progress(0));
        if let Some(acc) = self.acceleration(p.z_low_acceleration()) {
            out.push(acc);
        }
        out.push(Instruction::Dwell {
            millis: SETTLE_DELAY_MS,
        });

        if p.visit_corners {
            if let Some(bounds) = survey.bounds {
                let corners = bounds.corners();
                let last = corners.len() - 1;
                for (i, (x, y)) in corners.into_iter().enumerate() {
                    out.push(Instruction::RapidMove(Move::to(x, y, p.jump_speed)));
                    out.push(Instruction::Dwell {
                        millis: if i == last {
                            CORNER_FINAL_DELAY_MS
                        } else {
                            SETTLE_DELAY_MS
                        },
                    });
                }
            }
        }

        out.push(Instruction::RapidMove(Move::to(ORIGIN.0, ORIGIN.1, p.jump_speed)));
        out.push(Instruction::Dwell {
            millis: SETTLE_DELAY_MS,
        });
        out.push(Instruction::Pause(PauseCode::ColorStart(1)));
        out
    }

    /// Program epilogue
    pub fn footer(&self) -> Vec<Instruction> {
        vec![Instruction::SpindleStop, Instruction::DisableMotors]
    }

    /// Advance the machine by one stitch event
    ///
    /// `total` is the pattern's stitch count used for progress reporting.
    pub fn step(
        &self,
        mut ctx: MachineContext,
        event: &StitchEvent,
        total: u64,
    ) -> (MachineContext, Vec<Instruction>) {
        let p = &self.params;
        let mut out = Vec::new();

        let x = scale_coordinate(event.x, p.scaling_factor);
        let y = scale_coordinate(event.y, p.scaling_factor);
        let rapid = Instruction::RapidMove(Move::to(x, y, p.jump_speed));

        let progress = map_range(event.index as f64, 0.0, total as f64, 0.0, 100.0);
        if (progress - ctx.last_progress).unsigned_abs() >= u64::from(p.progress_step) {
            ctx.last_progress = progress;
            out.push(Instruction::Progress(progress.clamp(0, 100) as u8));
        }

        if event.kind != StitchKind::Stitch {
            ctx.stitch_run_counter = 0;
            if ctx.motor_enabled {
                out.push(Instruction::SpindleStop);
                ctx.motor_enabled = false;
            }
            set_tension(&mut ctx, &mut out, false);
            ctx.prev = ORIGIN;
        }

        match event.kind {
            StitchKind::Jump | StitchKind::End => out.push(rapid),
            StitchKind::Stitch => {
                if !ctx.thread_inserted {
                    out.push(rapid.clone());
                    set_tension(&mut ctx, &mut out, false);
                    out.push(Instruction::Pause(PauseCode::ThreadInserted));
                    ctx.thread_inserted = true;
                    // Insertion slackens the thread; the next stitch must raise tension again.
                    ctx.tension_enabled = false;
                }

                if ctx.at_origin() || distance(ctx.prev, (x, y)) >= p.effective_clearance() {
                    self.sew(&mut ctx, &mut out, x, y);
                } else {
                    tracing::trace!("Skipping stitch {} at ({}, {}) inside clearance", event.index, x, y);
                    out.push(rapid);
                }
            }
            StitchKind::Trim => {
                out.push(rapid);
                out.push(Instruction::Pause(PauseCode::Trim));
                ctx.thread_inserted = false;
            }
            StitchKind::ColorChange => {
                ctx.color_index += 1;
                let code = ctx.color_index.min(u32::from(MAX_COLOR_CODE)) as u8;
                out.push(Instruction::Pause(PauseCode::ColorStart(code)));
                out.push(rapid);
                ctx.thread_inserted = false;
            }
        }

        (ctx, out)
    }

    fn sew(&self, ctx: &mut MachineContext, out: &mut Vec<Instruction>, x: f64, y: f64) {
        let p = &self.params;
        ctx.prev = (x, y);

        set_tension(ctx, out, true);
        out.push(Instruction::LinearMove(Move::to(x, y, p.stitch_speed)));

        if ctx.stitch_run_counter == 0 {
            if let Some(acc) = self.acceleration(p.z_low_acceleration()) {
                out.push(acc);
            }
        }

        if ctx.stitch_run_counter <= ANCHOR_STITCHES {
            out.push(Instruction::SpindlePulse {
                speed: Some(p.z_low_speed),
            });
            ctx.stitch_run_counter += 1;
        } else {
            if ctx.stitch_run_counter == ANCHOR_STITCHES + 1 {
                if let Some(acc) = self.acceleration(p.z_high_acceleration()) {
                    out.push(acc);
                }
                ctx.stitch_run_counter += 1;
            }
            out.push(Instruction::SpindlePulse {
                speed: Some(p.z_high_speed),
            });
        }
        ctx.motor_enabled = true;

        if ctx.stitch_run_counter == ANCHOR_STITCHES {
            out.push(Instruction::Pause(PauseCode::Trim));
            ctx.stitch_run_counter += 1;
        }
    }

    fn acceleration(&self, z: Option<u32>) -> Option<Instruction> {
        let acc = self.params.acceleration?;
        Some(Instruction::Acceleration {
            x: Some(acc.x),
            y: Some(acc.y),
            z,
        })
    }
}

/// Raise or lower thread tension, settling after each change
fn set_tension(ctx: &mut MachineContext, out: &mut Vec<Instruction>, on: bool) {
    if ctx.tension_enabled == on {
        return;
    }
    out.push(if on {
        Instruction::TensionOn
    } else {
        Instruction::TensionOff
    });
    out.push(Instruction::Dwell {
        millis: SETTLE_DELAY_MS,
    });
    ctx.tension_enabled = on;
}
