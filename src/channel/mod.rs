//! Byte channel abstraction
//!
//! The driver talks to the module through [`ByteChannel`] and measures time
//! with [`Clock`]. [`SerialChannel`] adapts any `embedded-hal` serial
//! peripheral.

/// Channel and clock traits
pub mod traits;

/// `embedded-hal` serial adapter
pub mod serial;

pub use serial::{SerialChannel, SerialError};
pub use traits::{ByteChannel, Clock};
