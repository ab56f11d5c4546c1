use heapless::Vec;

use crate::channel::traits::{ByteChannel, Clock};
use crate::error::Error;

/// Longest reply the reader will accumulate
pub const MAX_RESPONSE_LEN: usize = 50;

/// Bytes accumulated by [`read_lines`], delimiters included
pub type Response = Vec<u8, MAX_RESPONSE_LEN>;

/// Read until `line_count` delimiters have been seen
///
/// Bytes are pulled one at a time, each read waiting at most
/// `byte_timeout_ms` and never past the total budget. An empty read is not
/// an error; the loop goes on until `total_timeout_ms` (measured from the
/// call) is spent.
///
/// # Errors
/// - [`Error::Timeout`] if the total budget runs out first
/// - [`Error::MalformedResponse`] if the buffer fills first
/// - [`Error::Channel`] on any channel failure
pub fn read_lines<CH, C>(
    channel: &mut CH,
    clock: &C,
    delimiter: u8,
    line_count: usize,
    byte_timeout_ms: u32,
    total_timeout_ms: u32,
) -> Result<Response, Error<CH::Error>>
where
    CH: ByteChannel,
    C: Clock,
{
    let start_us = clock.now_us();
    read_lines_since(
        channel,
        clock,
        start_us,
        delimiter,
        line_count,
        byte_timeout_ms,
        total_timeout_ms,
    )
}

/// Same as [`read_lines`], with the total budget counted from `start_us`
///
/// Lets several reads share one budget.
pub fn read_lines_since<CH, C>(
    channel: &mut CH,
    clock: &C,
    start_us: u64,
    delimiter: u8,
    line_count: usize,
    byte_timeout_ms: u32,
    total_timeout_ms: u32,
) -> Result<Response, Error<CH::Error>>
where
    CH: ByteChannel,
    C: Clock,
{
    let mut response = Response::new();
    let mut remaining = line_count;
    if remaining == 0 {
        return Ok(response);
    }

    let budget = u64::from(total_timeout_ms) * 1_000;

    loop {
        let elapsed = clock.now_us().saturating_sub(start_us);
        if elapsed >= budget {
            trace!("reader: timed out with {} lines missing", remaining);
            return Err(Error::Timeout);
        }

        let wait_ms = wait_within(budget - elapsed, byte_timeout_ms);
        let mut byte = [0u8; 1];
        let count = channel
            .read(&mut byte, wait_ms)
            .map_err(Error::Channel)?;
        if count == 0 {
            continue;
        }

        if response.push(byte[0]).is_err() {
            warn!("reader: reply exceeds {} bytes", MAX_RESPONSE_LEN);
            return Err(Error::MalformedResponse);
        }

        if byte[0] == delimiter {
            remaining -= 1;
            if remaining == 0 {
                return Ok(response);
            }
        }
    }
}

/// Per-read wait: `byte_timeout_ms`, cut down to what is left of the budget
pub(crate) fn wait_within(remaining_us: u64, byte_timeout_ms: u32) -> u32 {
    let remaining_ms = u32::try_from((remaining_us + 999) / 1_000).unwrap_or(u32::MAX);
    remaining_ms.min(byte_timeout_ms).max(1)
}
