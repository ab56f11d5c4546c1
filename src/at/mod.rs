//! AT protocol primitives
//!
//! This module contains the pieces the [`Dxlr02`](crate::Dxlr02) handle is
//! built from:
//! - Delimited line reader with per-byte and total timeouts
//! - Mode tracking and toggle reply parsing
//! - The AT command table

/// AT command table
pub mod commands;

/// Mode tracking and toggle replies
pub mod mode;

/// Delimited line reader
pub mod reader;

pub use commands::{AtCommand, Setting};
pub use mode::Mode;
pub use reader::{read_lines, read_lines_since, Response, MAX_RESPONSE_LEN};
