//! Driver for DX-LR02 UART LoRa modules
//!
//! The module multiplexes two interfaces over one serial link: a textual
//! AT-command interface for configuration and a transparent data interface
//! for payloads. Sending `+++\r\n` flips between the two. This crate tracks
//! which side the module is on, frames AT commands, validates their replies
//! and moves NUL-terminated frames while in data mode.
//!
//! # Features
//! - Tri-state mode tracking with bounded re-synchronization
//! - One data-driven table for every AT setter
//! - Mirror of the last confirmed module configuration
//! - Works over any `embedded-hal` serial peripheral via [`channel::SerialChannel`]
//! - No heap allocation, no unsafe code
//!
//! # Example
//! ```no_run
//! use dxlr02::{channel::{ByteChannel, Clock}, Dxlr02};
//!
//! fn bring_up<CH: ByteChannel, C: Clock>(uart: CH, clock: C) {
//!     let mut module = Dxlr02::new(uart, clock);
//!     if module.init(9600).is_ok() {
//!         module.set_channel(0x12).ok();
//!         module.send(b"hola").ok();
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

/// AT protocol primitives: line reader, mode parsing, command table
pub mod at;

/// Byte channel and clock abstractions
pub mod channel;

/// Module and driver configuration
pub mod config;

/// High-level module handle
pub mod device;

/// Driver error type
pub mod error;

pub use at::mode::Mode;
pub use config::{Baudrate, ModuleConfig, TimingConfig};
pub use device::Dxlr02;
pub use error::Error;
