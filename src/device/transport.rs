//! Data-mode frames
//!
//! In data mode the module forwards raw bytes. Frames are delimited by a
//! single NUL byte with no length prefix. Nothing here switches modes: the
//! caller is expected to have left the module in data mode.

use heapless::Vec;

use super::Dxlr02;
use crate::{
    at::reader::wait_within,
    channel::traits::{ByteChannel, Clock},
    error::Error,
};

/// Frame terminator
const NUL: u8 = 0;

/// Largest frame `send` will terminate itself, NUL included
pub const MAX_FRAME_LEN: usize = 255;

impl<CH: ByteChannel, C: Clock> Dxlr02<CH, C> {
    /// Transmit one frame in a single write
    ///
    /// If `data` already ends in NUL it goes out as is. Otherwise it is
    /// copied with a NUL appended, which needs `data` to be shorter than
    /// [`MAX_FRAME_LEN`];
    /// longer data fails with [`Error::OutOfSpace`] before any I/O.
    pub fn send(&mut self, data: &[u8]) -> Result<(), Error<CH::Error>> {
        self.require_initialized()?;
        match data.last() {
            None => Err(Error::InvalidParameter),
            Some(&NUL) => self.write_all(data),
            Some(_) => {
                let mut frame: Vec<u8, MAX_FRAME_LEN> = Vec::new();
                if frame.extend_from_slice(data).is_err() || frame.push(NUL).is_err() {
                    return Err(Error::OutOfSpace);
                }
                self.write_all(&frame)
            }
        }
    }

    /// Receive one frame into `buffer`
    ///
    /// Returns the frame length without its terminator; `buffer` holds the
    /// frame followed by NUL. One byte of `buffer` is always kept for the
    /// terminator. If the frame does not fit, what fits is NUL-terminated in
    /// place and [`Error::OutOfSpace`] is returned.
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Error<CH::Error>> {
        self.require_initialized()?;
        if buffer.is_empty() {
            return Err(Error::InvalidParameter);
        }

        let capacity = buffer.len() - 1;
        let start = self.clock.now_us();
        let budget = u64::from(self.timing.receive_timeout_ms) * 1_000;
        let mut len = 0;

        loop {
            let elapsed = self.clock.now_us().saturating_sub(start);
            if elapsed >= budget {
                trace!("receive: timed out after {} bytes", len);
                return Err(Error::Timeout);
            }

            let wait_ms = wait_within(budget - elapsed, self.timing.byte_timeout_ms);

            let mut byte = [0u8; 1];
            if self.channel.read(&mut byte, wait_ms).map_err(Error::Channel)? == 0 {
                continue;
            }

            if byte[0] == NUL {
                buffer[len] = NUL;
                return Ok(len);
            }
            if len == capacity {
                buffer[len] = NUL;
                warn!("receive: frame longer than {} bytes", capacity);
                return Err(Error::OutOfSpace);
            }
            buffer[len] = byte[0];
            len += 1;
        }
    }
}
