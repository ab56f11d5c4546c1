#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use dxlr02::{
    channel::{ByteChannel, Clock},
    Dxlr02,
};

/// Shared mock clock, advanced by the simulated module on every read
#[derive(Debug, Clone, Default)]
pub struct MockClock(Rc<Cell<u64>>);

impl MockClock {
    /// Create new mock clock at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance_us(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> u64 {
        self.0.get()
    }
}

/// Mock channel error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Read failed
    Read,
    /// Write failed
    Write,
}

/// Time taken by one byte on the wire, roughly 9600 baud
const BYTE_TIME_US: u64 = 50;

const PLAIN_KEYWORDS: [&str; 7] = ["BAUD", "SLEEP", "STOP", "PARI", "LEVEL", "CRC", "IQ"];
const ECHO_KEYWORDS: [&str; 5] = ["CHANNEL", "MODE", "POWE", "CR", "SF"];

/// Simulated DX-LR02 on the other end of the byte channel
///
/// Flips between AT and data mode on every `+++\r\n`, answers AT commands
/// the way the module does and records everything written in data mode.
pub struct SimModule {
    clock: MockClock,
    /// Real mode of the simulated hardware
    pub in_at: bool,
    rx: VecDeque<u8>,
    /// Every write, in order
    pub writes: Vec<Vec<u8>>,
    /// AT commands received while in AT mode
    pub commands: Vec<String>,
    /// Bytes received while in data mode
    pub data_tx: Vec<u8>,
    /// Number of toggles received
    pub toggles: usize,
    /// Number of input flushes
    pub flushes: usize,
    /// `Power On` line as this firmware spells it
    pub power_on: &'static str,
    /// Never answer anything
    pub silent: bool,
    /// Fail every read
    pub fail_reads: bool,
    /// Fail every write
    pub fail_writes: bool,
    /// Accept one byte less than asked
    pub short_write: bool,
    /// Reads that come back empty before data is delivered again
    pub stalls: usize,
    /// After this many more bytes are read, stall for this many reads
    pub stall_after: Option<(usize, usize)>,
    reply_overrides: Vec<(Vec<u8>, Vec<u8>)>,
    toggle_overrides: VecDeque<Vec<u8>>,
}

impl SimModule {
    /// Create a module sitting in data mode, as after power-up
    pub fn new(clock: MockClock) -> Self {
        Self {
            clock,
            in_at: false,
            rx: VecDeque::new(),
            writes: Vec::new(),
            commands: Vec::new(),
            data_tx: Vec::new(),
            toggles: 0,
            flushes: 0,
            power_on: "Power On\r\n",
            silent: false,
            fail_reads: false,
            fail_writes: false,
            short_write: false,
            stalls: 0,
            stall_after: None,
            reply_overrides: Vec::new(),
            toggle_overrides: VecDeque::new(),
        }
    }

    /// Make bytes available to the next reads
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Bytes still waiting to be read
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Answer `command` with `reply` once, instead of the normal reply
    pub fn override_reply(&mut self, command: &[u8], reply: &[u8]) {
        self.reply_overrides.push((command.to_vec(), reply.to_vec()));
    }

    /// Answer the next toggle with `reply`; the mode still flips
    pub fn queue_toggle_reply(&mut self, reply: &[u8]) {
        self.toggle_overrides.push_back(reply.to_vec());
    }

    /// Forget recorded traffic
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.commands.clear();
        self.data_tx.clear();
        self.toggles = 0;
        self.flushes = 0;
    }

    fn reply_for(&self, command: &[u8]) -> Vec<u8> {
        let text = std::str::from_utf8(command).unwrap_or("");
        let body = match text.strip_prefix("AT+").and_then(|t| t.strip_suffix("\r\n")) {
            Some(body) => body,
            None => return b"ERROR\r\n".to_vec(),
        };

        if body == "RESET" || body == "DEFAULT" {
            return format!("OK\r\n{}", self.power_on).into_bytes();
        }
        if PLAIN_KEYWORDS.iter().any(|k| body.starts_with(k)) {
            return b"OK\r\n".to_vec();
        }
        if let Some(arg) = body.strip_prefix("MAC") {
            return format!("+MAC={}\r\nOK\r\n", arg.replace(',', "")).into_bytes();
        }
        for keyword in ECHO_KEYWORDS {
            if let Some(arg) = body.strip_prefix(keyword) {
                return format!("+{}={}\r\nOK\r\n", keyword, arg).into_bytes();
            }
        }
        b"ERROR\r\n".to_vec()
    }

    fn toggle(&mut self) {
        self.toggles += 1;
        self.in_at = !self.in_at;
        let reply = match self.toggle_overrides.pop_front() {
            Some(reply) => reply,
            None if self.in_at => b"Entry AT\r\n".to_vec(),
            None => format!("Exit AT\r\n{}", self.power_on).into_bytes(),
        };
        if !self.silent {
            self.push_rx(&reply);
        }
    }

    fn command(&mut self, command: &[u8]) {
        self.commands
            .push(String::from_utf8_lossy(command).into_owned());
        let reply = match self
            .reply_overrides
            .iter()
            .position(|(cmd, _)| cmd.as_slice() == command)
        {
            Some(index) => self.reply_overrides.remove(index).1,
            None => self.reply_for(command),
        };
        if !self.silent {
            self.push_rx(&reply);
        }
    }
}

impl ByteChannel for SimModule {
    type Error = MockError;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        self.writes.push(bytes.to_vec());
        if self.fail_writes {
            return Err(MockError::Write);
        }
        if self.short_write {
            return Ok(bytes.len().saturating_sub(1));
        }
        self.clock.advance_us(BYTE_TIME_US * bytes.len() as u64);

        if bytes == b"+++\r\n" {
            self.toggle();
        } else if self.in_at {
            self.command(bytes);
        } else {
            self.data_tx.extend_from_slice(bytes);
        }
        Ok(bytes.len())
    }

    fn read(&mut self, buffer: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(MockError::Read);
        }
        if let Some((0, stalls)) = self.stall_after {
            self.stalls += stalls;
            self.stall_after = None;
        }
        if self.rx.is_empty() || self.stalls > 0 {
            self.stalls = self.stalls.saturating_sub(1);
            self.clock.advance_us(u64::from(timeout_ms) * 1_000);
            return Ok(0);
        }

        let mut count = 0;
        while count < buffer.len() {
            match self.rx.pop_front() {
                Some(byte) => {
                    buffer[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        if let Some((after, _)) = &mut self.stall_after {
            *after = after.saturating_sub(count);
        }
        self.clock.advance_us(BYTE_TIME_US * count as u64);
        Ok(count)
    }

    fn flush_input(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        self.rx.clear();
        Ok(())
    }
}

/// Driver bound to a simulated module
pub type TestModule = Dxlr02<SimModule, MockClock>;

/// Uninitialized driver over a fresh simulated module
pub fn new_module() -> TestModule {
    let clock = MockClock::new();
    Dxlr02::new(SimModule::new(clock.clone()), clock)
}

/// Initialized driver at 9600 bps with the traffic log cleared
pub fn ready_module() -> TestModule {
    let mut module = new_module();
    module.init(9600).unwrap();
    module.channel_mut().clear_log();
    module
}
