//! Instruction model for the embroidery machine
//!
//! The machine understands a small G/M-code subset. Each variant of
//! [`Instruction`] formats to exactly one line and parses back from it:
//!
//! | Instruction | Text |
//! |---|---|
//! | Rapid move | `G0 X.. Y.. F..` |
//! | Controlled move (needle synchronised) | `G1 X.. Y.. F..` |
//! | Dwell | `G4 P<ms>` |
//! | Pause | `M0 C<code>` |
//! | Spindle pulse | `M3 S<speed> I1` |
//! | Spindle stop | `M5` |
//! | Enable / disable steppers | `M17` / `M18` |
//! | Tension off / on | `M41` / `M42` |
//! | Progress | `M73 P<percent>` |
//! | Acceleration | `M201 X.. Y.. Z..` |

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GcodeError;
use crate::units::format_coordinate;

/// Highest pause sub-code reserved for colour starts
pub const MAX_COLOR_CODE: u8 = 99;
/// Pause sub-code asking the operator to insert and pull out the thread
pub const THREAD_INSERTED_CODE: u32 = 100;
/// Pause sub-code asking the operator to trim the thread
pub const TRIM_CODE: u32 = 101;

/// Operator action selected by a pause instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseCode {
    /// Start of colour `n` (1..=99)
    ColorStart(u8),
    /// Thread inserted and pulled out
    ThreadInserted,
    /// Trim request
    Trim,
    /// Any other sub-code, inert for the preview
    Other(i64),
}

impl PauseCode {
    /// Classify a raw sub-code value
    pub fn from_value(value: f64) -> Self {
        if value > 0.0 && value < f64::from(MAX_COLOR_CODE) + 1.0 {
            PauseCode::ColorStart((value as u8).max(1))
        } else if value == THREAD_INSERTED_CODE as f64 {
            PauseCode::ThreadInserted
        } else if value == TRIM_CODE as f64 {
            PauseCode::Trim
        } else {
            PauseCode::Other(value as i64)
        }
    }

    /// Numeric sub-code written after `C`
    pub fn code(&self) -> i64 {
        match self {
            PauseCode::ColorStart(n) => i64::from(*n),
            PauseCode::ThreadInserted => i64::from(THREAD_INSERTED_CODE),
            PauseCode::Trim => i64::from(TRIM_CODE),
            PauseCode::Other(code) => *code,
        }
    }
}

/// Target of a rapid or controlled move; any parameter may be omitted
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Move {
    /// X position in machine units
    pub x: Option<f64>,
    /// Y position in machine units
    pub y: Option<f64>,
    /// Feed rate
    pub feed: Option<u32>,
}

impl Move {
    /// Move to `(x, y)` at `feed`
    pub fn to(x: f64, y: f64, feed: u32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            feed: Some(feed),
        }
    }
}

/// One machine instruction line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// `; text`
    Comment(String),
    /// `G0` uncontrolled relocation
    RapidMove(Move),
    /// `G1` move followed by a needle cycle when the spindle is enabled
    LinearMove(Move),
    /// `G4 P<ms>`
    Dwell { millis: u32 },
    /// `M0 C<code>`
    Pause(PauseCode),
    /// `M3 S<speed> I1`, a single needle cycle
    SpindlePulse { speed: Option<u32> },
    /// `M5`
    SpindleStop,
    /// `M17`
    EnableMotors,
    /// `M18`
    DisableMotors,
    /// `M41`
    TensionOff,
    /// `M42`
    TensionOn,
    /// `M73 P<percent>`
    Progress(u8),
    /// `M201 X.. Y.. Z..`
    Acceleration {
        x: Option<u32>,
        y: Option<u32>,
        z: Option<u32>,
    },
    /// A G or M code outside the machine subset, kept verbatim
    Other(String),
}

/// A letter/value pair from an instruction line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    /// Upper-case address letter
    pub letter: char,
    /// Numeric value, `None` when missing or not a number
    pub value: Option<f64>,
}

/// Remove `;` and `(` comments from a line
fn strip_comment(line: &str) -> &str {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(].*").expect("invalid regex pattern"));
    match regex.find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    }
}

/// Split a line into address words
///
/// Tokens that do not start with a letter are dropped.
pub fn words(line: &str) -> Vec<Word> {
    strip_comment(line)
        .split_whitespace()
        .filter_map(|token| {
            let mut chars = token.chars();
            let letter = chars.next()?;
            if !letter.is_ascii_alphabetic() {
                return None;
            }
            Some(Word {
                letter: letter.to_ascii_uppercase(),
                value: chars.as_str().parse::<f64>().ok().filter(|v| v.is_finite()),
            })
        })
        .collect()
}

/// Value of the first word with `letter`, if present and numeric
pub fn param(words: &[Word], letter: char) -> Option<f64> {
    words
        .iter()
        .find(|w| w.letter == letter)
        .and_then(|w| w.value)
}

fn as_u32(value: f64) -> Option<u32> {
    if value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

fn param_u32(words: &[Word], letter: char) -> Option<u32> {
    param(words, letter).and_then(as_u32)
}

impl Instruction {
    /// Parse one line
    ///
    /// Missing or non-numeric parameters are treated as absent. Lines
    /// without a leading G or M word are syntax errors.
    pub fn parse(line: &str) -> Result<Self, GcodeError> {
        let trimmed = line.trim();
        if let Some(text) = trimmed.strip_prefix(';') {
            return Ok(Instruction::Comment(text.trim().to_string()));
        }

        let words = words(trimmed);
        let Some(command) = words.first() else {
            return Err(GcodeError::Empty);
        };
        let params = &words[1..];

        let number = match command.value.and_then(as_u32) {
            Some(n) => n,
            None => {
                return Err(GcodeError::InvalidSyntax {
                    reason: format!("'{}' has no command number", command.letter),
                })
            }
        };

        let movement = || Move {
            x: param(params, 'X'),
            y: param(params, 'Y'),
            feed: param_u32(params, 'F'),
        };

        let instruction = match (command.letter, number) {
            ('G', 0) => Instruction::RapidMove(movement()),
            ('G', 1) => Instruction::LinearMove(movement()),
            ('G', 4) => Instruction::Dwell {
                millis: param_u32(params, 'P').unwrap_or(0),
            },
            ('M', 0) => Instruction::Pause(PauseCode::from_value(param(params, 'C').unwrap_or(0.0))),
            ('M', 3) => Instruction::SpindlePulse {
                speed: param_u32(params, 'S'),
            },
            ('M', 5) => Instruction::SpindleStop,
            ('M', 17) => Instruction::EnableMotors,
            ('M', 18) => Instruction::DisableMotors,
            ('M', 41) => Instruction::TensionOff,
            ('M', 42) => Instruction::TensionOn,
            ('M', 73) => {
                let percent = param(params, 'P').ok_or(GcodeError::MissingParameter { param: 'P' })?;
                Instruction::Progress(percent.clamp(0.0, 100.0) as u8)
            }
            ('M', 201) => Instruction::Acceleration {
                x: param_u32(params, 'X'),
                y: param_u32(params, 'Y'),
                z: param_u32(params, 'Z'),
            },
            ('G', _) | ('M', _) => Instruction::Other(strip_comment(trimmed).trim().to_string()),
            (letter, _) => {
                return Err(GcodeError::InvalidSyntax {
                    reason: format!("unexpected command word '{}'", letter),
                })
            }
        };

        Ok(instruction)
    }
}

impl FromStr for Instruction {
    type Err = GcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instruction::parse(s)
    }
}

fn write_move(f: &mut fmt::Formatter<'_>, code: &str, m: &Move) -> fmt::Result {
    write!(f, "{}", code)?;
    if let Some(x) = m.x {
        write!(f, " X{}", format_coordinate(x))?;
    }
    if let Some(y) = m.y {
        write!(f, " Y{}", format_coordinate(y))?;
    }
    if let Some(feed) = m.feed {
        write!(f, " F{}", feed)?;
    }
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Comment(text) => write!(f, "; {}", text),
            Instruction::RapidMove(m) => write_move(f, "G0", m),
            Instruction::LinearMove(m) => write_move(f, "G1", m),
            Instruction::Dwell { millis } => write!(f, "G4 P{}", millis),
            Instruction::Pause(code) => write!(f, "M0 C{}", code.code()),
            Instruction::SpindlePulse { speed: Some(speed) } => write!(f, "M3 S{} I1", speed),
            Instruction::SpindlePulse { speed: None } => write!(f, "M3 I1"),
            Instruction::SpindleStop => write!(f, "M5"),
            Instruction::EnableMotors => write!(f, "M17"),
            Instruction::DisableMotors => write!(f, "M18"),
            Instruction::TensionOff => write!(f, "M41"),
            Instruction::TensionOn => write!(f, "M42"),
            Instruction::Progress(percent) => write!(f, "M73 P{}", percent),
            Instruction::Acceleration { x, y, z } => {
                write!(f, "M201")?;
                for (letter, value) in [('X', x), ('Y', y), ('Z', z)] {
                    if let Some(value) = value {
                        write!(f, " {}{}", letter, value)?;
                    }
                }
                Ok(())
            }
            Instruction::Other(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_moves() {
        let rapid = Instruction::RapidMove(Move::to(10.0, -2.5, 3000));
        assert_eq!(rapid.to_string(), "G0 X10.00 Y-2.50 F3000");

        let linear = Instruction::LinearMove(Move {
            x: Some(1.0),
            y: None,
            feed: None,
        });
        assert_eq!(linear.to_string(), "G1 X1.00");
    }

    #[test]
    fn test_format_machine_codes() {
        assert_eq!(Instruction::Pause(PauseCode::ColorStart(3)).to_string(), "M0 C3");
        assert_eq!(Instruction::Pause(PauseCode::ThreadInserted).to_string(), "M0 C100");
        assert_eq!(Instruction::Pause(PauseCode::Trim).to_string(), "M0 C101");
        assert_eq!(
            Instruction::SpindlePulse { speed: Some(400) }.to_string(),
            "M3 S400 I1"
        );
        assert_eq!(Instruction::Progress(42).to_string(), "M73 P42");
        assert_eq!(
            Instruction::Acceleration {
                x: Some(300),
                y: Some(500),
                z: Some(40)
            }
            .to_string(),
            "M201 X300 Y500 Z40"
        );
        assert_eq!(Instruction::Dwell { millis: 500 }.to_string(), "G4 P500");
    }

    #[test]
    fn test_parse_moves() {
        let parsed: Instruction = "G1 X20.00 Y10.00 F800".parse().unwrap();
        assert_eq!(parsed, Instruction::LinearMove(Move::to(20.0, 10.0, 800)));

        let parsed: Instruction = "G00 Y5".parse().unwrap();
        assert_eq!(
            parsed,
            Instruction::RapidMove(Move {
                x: None,
                y: Some(5.0),
                feed: None
            })
        );
    }

    #[test]
    fn test_parse_non_numeric_parameter_is_absent() {
        let parsed = Instruction::parse("G1 Xabc Y2").unwrap();
        assert_eq!(
            parsed,
            Instruction::LinearMove(Move {
                x: None,
                y: Some(2.0),
                feed: None
            })
        );
    }

    #[test]
    fn test_parse_pause_codes() {
        assert_eq!(
            Instruction::parse("M0 C7").unwrap(),
            Instruction::Pause(PauseCode::ColorStart(7))
        );
        assert_eq!(
            Instruction::parse("M0 C100").unwrap(),
            Instruction::Pause(PauseCode::ThreadInserted)
        );
        assert_eq!(
            Instruction::parse("M0 C101").unwrap(),
            Instruction::Pause(PauseCode::Trim)
        );
        assert_eq!(
            Instruction::parse("M0").unwrap(),
            Instruction::Pause(PauseCode::Other(0))
        );
        assert_eq!(
            Instruction::parse("M0 C250").unwrap(),
            Instruction::Pause(PauseCode::Other(250))
        );
    }

    #[test]
    fn test_parse_comments() {
        assert_eq!(
            Instruction::parse("; flower").unwrap(),
            Instruction::Comment("flower".to_string())
        );
        assert_eq!(
            Instruction::parse("G0 X1 ; trailing").unwrap(),
            Instruction::RapidMove(Move {
                x: Some(1.0),
                y: None,
                feed: None
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Instruction::parse("   "), Err(GcodeError::Empty));
        assert!(matches!(
            Instruction::parse("X10 Y20"),
            Err(GcodeError::InvalidSyntax { .. })
        ));
        assert!(matches!(
            Instruction::parse("Gx"),
            Err(GcodeError::InvalidSyntax { .. })
        ));
        assert_eq!(
            Instruction::parse("M73"),
            Err(GcodeError::MissingParameter { param: 'P' })
        );
    }

    #[test]
    fn test_unknown_codes_are_kept() {
        assert_eq!(
            Instruction::parse("G28 X0").unwrap(),
            Instruction::Other("G28 X0".to_string())
        );
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(Instruction::parse("M73 P140").unwrap(), Instruction::Progress(100));
    }

    #[test]
    fn test_words() {
        let parsed = words("g1 x1.5 Y-2 ; comment X9");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].letter, 'G');
        assert_eq!(param(&parsed, 'X'), Some(1.5));
        assert_eq!(param(&parsed, 'Y'), Some(-2.0));
        assert_eq!(param(&parsed, 'F'), None);
    }

    #[test]
    fn test_every_instruction_reparses() {
        let instructions = vec![
            Instruction::Comment("name".to_string()),
            Instruction::RapidMove(Move::to(0.0, 0.0, 3000)),
            Instruction::LinearMove(Move::to(-1.25, 4.5, 800)),
            Instruction::Dwell { millis: 1000 },
            Instruction::Pause(PauseCode::ColorStart(1)),
            Instruction::Pause(PauseCode::ThreadInserted),
            Instruction::Pause(PauseCode::Trim),
            Instruction::SpindlePulse { speed: Some(250) },
            Instruction::SpindleStop,
            Instruction::EnableMotors,
            Instruction::DisableMotors,
            Instruction::TensionOff,
            Instruction::TensionOn,
            Instruction::Progress(0),
            Instruction::Acceleration {
                x: Some(300),
                y: Some(500),
                z: Some(20),
            },
        ];

        for instruction in instructions {
            let text = instruction.to_string();
            assert_eq!(Instruction::parse(&text).unwrap(), instruction, "{}", text);
        }
    }
}
