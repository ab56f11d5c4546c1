//! Module and driver configuration
//!
//! This module contains:
//! - The mirrored module configuration record and its factory defaults
//! - The baudrate table understood by `AT+BAUD`
//! - Driver timing parameters

/// Module configuration record
pub mod module;

/// Driver timing parameters
pub mod timing;

pub use module::{Baudrate, ConfigField, ModuleConfig};
pub use timing::TimingConfig;
