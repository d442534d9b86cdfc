use serde::{Deserialize, Serialize};

/// Previous-position sentinel; a stitch following it is always sewn
pub const ORIGIN: (f64, f64) = (0.0, 0.0);

/// Machine state threaded through the generator, one value per run
///
/// Every step consumes a context and returns the next one, so single
/// transitions can be exercised without a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineContext {
    /// Needle motor has been pulsed since the last stop
    pub motor_enabled: bool,
    /// Thread tension is raised
    pub tension_enabled: bool,
    /// Operator has inserted the thread for the current run
    pub thread_inserted: bool,
    /// Stitches sewn since the last reset
    pub stitch_run_counter: u32,
    /// Position of the last sewn stitch, [`ORIGIN`] after a reset
    pub prev: (f64, f64),
    /// Ordinal of the active colour, starting at 1
    pub color_index: u32,
    /// Last progress value written
    pub last_progress: i64,
}

impl MachineContext {
    /// Fresh context for a new run
    pub fn new() -> Self {
        Self {
            motor_enabled: false,
            tension_enabled: false,
            thread_inserted: false,
            stitch_run_counter: 0,
            prev: ORIGIN,
            color_index: 1,
            last_progress: 0,
        }
    }

    /// Whether the previous position is the reset sentinel
    pub fn at_origin(&self) -> bool {
        self.prev == ORIGIN
    }
}

impl Default for MachineContext {
    fn default() -> Self {
        Self::new()
    }
}
