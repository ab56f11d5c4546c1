use embedded_hal::serial::{Read, Write};

use crate::channel::traits::{ByteChannel, Clock};

/// Errors from the serial adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Receive side reported an error (overrun, framing, noise...)
    Read,
    /// Transmit side reported an error
    Write,
}

/// [`ByteChannel`] over an `embedded-hal` serial peripheral
///
/// Reads poll the peripheral until a byte shows up or the timeout, measured
/// with `clock`, runs out.
pub struct SerialChannel<S, C>
where
    S: Read<u8> + Write<u8>,
    C: Clock,
{
    serial: S,
    clock: C,
}

impl<S, C> SerialChannel<S, C>
where
    S: Read<u8> + Write<u8>,
    C: Clock,
{
    /// Wrap a serial peripheral
    pub fn new(serial: S, clock: C) -> Self {
        Self { serial, clock }
    }

    /// Give the peripheral and clock back
    pub fn free(self) -> (S, C) {
        (self.serial, self.clock)
    }
}

impl<S, C> ByteChannel for SerialChannel<S, C>
where
    S: Read<u8> + Write<u8>,
    C: Clock,
{
    type Error = SerialError;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        for &byte in bytes {
            nb::block!(self.serial.write(byte)).map_err(|_| SerialError::Write)?;
        }
        nb::block!(self.serial.flush()).map_err(|_| SerialError::Write)?;
        Ok(bytes.len())
    }

    fn read(&mut self, buffer: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        let start = self.clock.now_us();
        let budget = u64::from(timeout_ms) * 1_000;
        let mut count = 0;

        while count < buffer.len() {
            match self.serial.read() {
                Ok(byte) => {
                    buffer[count] = byte;
                    count += 1;
                }
                Err(nb::Error::WouldBlock) => {
                    if self.clock.now_us().saturating_sub(start) >= budget {
                        break;
                    }
                    core::hint::spin_loop();
                }
                Err(nb::Error::Other(_)) => return Err(SerialError::Read),
            }
        }

        Ok(count)
    }

    fn flush_input(&mut self) -> Result<(), Self::Error> {
        loop {
            match self.serial.read() {
                Ok(_) => continue,
                Err(nb::Error::WouldBlock) => return Ok(()),
                Err(nb::Error::Other(_)) => return Err(SerialError::Read),
            }
        }
    }
}
