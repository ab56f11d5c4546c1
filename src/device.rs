//! High-level DX-LR02 module interface
//!
//! [`Dxlr02`] owns the byte channel and keeps three pieces of state: whether
//! bring-up succeeded, which mode the module is believed to be in, and a
//! mirror of the configuration the module has confirmed.
//!
//! Every setter runs the same exchange: enter AT mode, send one command,
//! match the reply exactly, update the mirror, go back to data mode.

mod transport;

pub use transport::MAX_FRAME_LEN;

use crate::{
    at::{
        commands::{EncodeError, Setting},
        mode::{is_power_on, parse_toggle_line, Mode, ToggleReply, TOGGLE_SEQUENCE},
        reader::{read_lines_since, Response},
    },
    channel::traits::{ByteChannel, Clock},
    config::{module::Baudrate, ModuleConfig, TimingConfig},
    error::Error,
};

/// Line delimiter used by every AT reply
const LINE_DELIMITER: u8 = b'\n';

fn encode_error<E>(error: EncodeError) -> Error<E> {
    match error {
        EncodeError::InvalidParameter => Error::InvalidParameter,
        EncodeError::Overflow => Error::OutOfSpace,
    }
}

/// DX-LR02 module handle
pub struct Dxlr02<CH: ByteChannel, C: Clock> {
    channel: CH,
    clock: C,
    timing: TimingConfig,
    initialized: bool,
    mode: Mode,
    config: ModuleConfig,
}

impl<CH: ByteChannel, C: Clock> Dxlr02<CH, C> {
    /// Bind a channel with default timing. Call [`Dxlr02::init`] before anything else.
    pub fn new(channel: CH, clock: C) -> Self {
        Self::with_timing(channel, clock, TimingConfig::default())
    }

    /// Bind a channel with custom timing
    pub fn with_timing(channel: CH, clock: C, timing: TimingConfig) -> Self {
        Self {
            channel,
            clock,
            timing,
            initialized: false,
            mode: Mode::Unknown,
            config: ModuleConfig::default(),
        }
    }

    /// Bring the module up
    ///
    /// Restores factory defaults, then applies `baudrate`. The handle only
    /// counts as initialized if both steps succeed.
    pub fn init(&mut self, baudrate: u32) -> Result<(), Error<CH::Error>> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }
        if Baudrate::from_bps(baudrate).is_none() {
            return Err(Error::InvalidParameter);
        }

        self.initialized = true;
        if let Err(e) = self.bring_up(baudrate) {
            self.initialized = false;
            warn!("bring-up failed, module left uninitialized");
            return Err(e);
        }

        info!("module up at {} bps", baudrate);
        Ok(())
    }

    fn bring_up(&mut self, baudrate: u32) -> Result<(), Error<CH::Error>> {
        self.factory_default()?;
        self.set_baudrate(baudrate)
    }

    /// True once [`Dxlr02::init`] succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Mode the module is believed to be in
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Last configuration confirmed by the module
    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Current timing parameters
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Replace the timing parameters
    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.timing = timing;
    }

    /// Borrow the underlying channel
    pub fn channel(&self) -> &CH {
        &self.channel
    }

    /// Mutably borrow the underlying channel
    pub fn channel_mut(&mut self) -> &mut CH {
        &mut self.channel
    }

    /// Give the channel and clock back
    pub fn release(self) -> (CH, C) {
        (self.channel, self.clock)
    }

    fn require_initialized(&self) -> Result<(), Error<CH::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error<CH::Error>> {
        let written = self.channel.write(bytes).map_err(Error::Channel)?;
        if written != bytes.len() {
            return Err(Error::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }
        Ok(())
    }

    /// Collect `lines` reply lines within `total_ms` of `start_us`
    fn read_reply(
        &mut self,
        start_us: u64,
        lines: usize,
        total_ms: u32,
    ) -> Result<Response, Error<CH::Error>> {
        read_lines_since(
            &mut self.channel,
            &self.clock,
            start_us,
            LINE_DELIMITER,
            lines,
            self.timing.byte_timeout_ms,
            total_ms,
        )
    }

    /// Send `+++` once and work out where the module landed
    ///
    /// Any failure leaves the mode [`Mode::Unknown`]: the module may have
    /// toggled even if its reply was lost or garbled.
    pub fn toggle_mode(&mut self) -> Result<Mode, Error<CH::Error>> {
        self.require_initialized()?;
        match self.exchange_toggle() {
            Ok(mode) => {
                debug!("toggle: module in {:?}", mode);
                self.mode = mode;
                Ok(mode)
            }
            Err(e) => {
                warn!("toggle failed, mode unknown");
                self.mode = Mode::Unknown;
                Err(e)
            }
        }
    }

    fn exchange_toggle(&mut self) -> Result<Mode, Error<CH::Error>> {
        self.channel.flush_input().map_err(Error::Channel)?;
        self.write_all(TOGGLE_SEQUENCE)?;

        // Both reply lines share one budget.
        let start = self.clock.now_us();
        let first = self.read_reply(start, 1, self.timing.toggle_timeout_ms)?;
        match parse_toggle_line(&first) {
            Some(ToggleReply::EnteredAt) => Ok(Mode::At),
            Some(ToggleReply::ExitedAt) => {
                let second = self.read_reply(start, 1, self.timing.toggle_timeout_ms)?;
                if is_power_on(&second) {
                    Ok(Mode::Data)
                } else {
                    Err(Error::MalformedResponse)
                }
            }
            None => Err(Error::MalformedResponse),
        }
    }

    /// Make sure the module is in AT mode
    ///
    /// Always toggles at least once since the believed mode may be stale,
    /// and a second time if the first toggle landed in data mode.
    pub fn ensure_at(&mut self) -> Result<(), Error<CH::Error>> {
        self.ensure_mode(Mode::At)
    }

    /// Make sure the module is in data mode
    pub fn ensure_data_mode(&mut self) -> Result<(), Error<CH::Error>> {
        self.ensure_mode(Mode::Data)
    }

    fn ensure_mode(&mut self, target: Mode) -> Result<(), Error<CH::Error>> {
        self.require_initialized()?;

        // From an unknown mode, garbled replies are tolerated until one toggle parses.
        let budget = if self.mode == Mode::Unknown {
            self.timing.resync_toggles.max(2)
        } else {
            2
        };

        let mut last_error = None;
        for _ in 0..budget {
            let resyncing = self.mode == Mode::Unknown;
            match self.toggle_mode() {
                Ok(mode) if mode == target => return Ok(()),
                Ok(_) => {}
                Err(e @ (Error::Timeout | Error::MalformedResponse)) if resyncing => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        warn!("could not reach {:?} in {} toggles", target, budget);
        Err(last_error.unwrap_or(Error::ModuleNotResponding))
    }

    /// Flush, write `command`, collect `lines` reply lines
    fn transact(&mut self, command: &[u8], lines: usize) -> Result<Response, Error<CH::Error>> {
        self.channel.flush_input().map_err(Error::Channel)?;
        self.write_all(command)?;
        let start = self.clock.now_us();
        self.read_reply(start, lines, self.timing.command_timeout_ms)
    }

    /// Send a raw command and require the reply to equal `expected` byte for byte
    ///
    /// The module must already be in AT mode.
    pub fn send_and_validate(
        &mut self,
        command: &[u8],
        expected: &[u8],
        line_count: usize,
    ) -> Result<(), Error<CH::Error>> {
        self.require_initialized()?;
        let response = self.transact(command, line_count)?;
        if response.as_slice() != expected {
            warn!("unexpected reply {:?}", response.as_slice());
            return Err(Error::MalformedResponse);
        }
        Ok(())
    }

    /// Apply one setting: enter AT mode, exchange, update the mirror, back to data mode
    ///
    /// Out-of-range values fail with [`Error::InvalidParameter`] before any I/O.
    /// The mirror is only touched once the module confirmed the value; a
    /// failure after that point may leave the module in AT mode.
    pub fn apply_setting(&mut self, setting: Setting) -> Result<(), Error<CH::Error>> {
        self.require_initialized()?;
        let command = setting.encode().map_err(encode_error)?;

        self.ensure_at()?;
        trace!("-> {}", command.as_str());
        let response = self.transact(command.as_bytes(), setting.response_lines())?;
        if !setting.accepts(&response).map_err(encode_error)? {
            warn!("AT+{} rejected: {:?}", setting.keyword(), response.as_slice());
            return Err(Error::MalformedResponse);
        }

        setting.apply_to(&mut self.config);
        self.ensure_data_mode()
    }

    /// Set the UART baudrate, in bits per second
    pub fn set_baudrate(&mut self, baudrate: u32) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::Baudrate(baudrate))
    }

    /// Set the working mode (0 transparent, 1 fixed-point, 2 broadcast)
    pub fn set_working_mode(&mut self, mode: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::WorkingMode(mode))
    }

    /// Set the energy mode (0 sleep, 1 wake-up, 2 high efficiency)
    pub fn set_energy_mode(&mut self, mode: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::EnergyMode(mode))
    }

    /// Set the stop bits setting (0-2)
    pub fn set_stop_bit(&mut self, stop_bit: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::StopBit(stop_bit))
    }

    /// Set the parity (0 none, 1 odd, 2 even)
    pub fn set_parity(&mut self, parity: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::Parity(parity))
    }

    /// Set the air rate level (0-7)
    pub fn set_rate_level(&mut self, level: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::RateLevel(level))
    }

    /// Set the frequency channel (0x00-0x1E)
    pub fn set_channel(&mut self, channel: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::Channel(channel))
    }

    /// Set the node address
    pub fn set_address(&mut self, address: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::Address(address))
    }

    /// Set the transmit power in dBm (0-22)
    pub fn set_transmit_power(&mut self, power: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::TransmitPower(power))
    }

    /// Set the coding rate as the denominator of 4/x (5-8)
    pub fn set_coding_rate(&mut self, four_of_x: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::CodingRate(four_of_x))
    }

    /// Set the spreading factor (5-12)
    pub fn set_spread_factor(&mut self, spread_factor: u8) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::SpreadFactor(spread_factor))
    }

    /// Enable or disable the payload CRC
    pub fn set_crc(&mut self, enabled: bool) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::Crc(enabled))
    }

    /// Enable or disable IQ inversion
    pub fn set_iq_flip(&mut self, enabled: bool) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::IqFlip(enabled))
    }

    /// Restart the module; the mirror is kept
    pub fn reset(&mut self) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::Reset)
    }

    /// Restore factory settings and reset the mirror to [`ModuleConfig::default`]
    pub fn factory_default(&mut self) -> Result<(), Error<CH::Error>> {
        self.apply_setting(Setting::FactoryDefault)
    }

    /// Apply every field of `config`, baudrate first
    ///
    /// Best effort, not transactional: it stops at the first failure and
    /// fields applied before it stay applied, both on the module and in the
    /// mirror.
    pub fn set_config(&mut self, config: &ModuleConfig) -> Result<(), Error<CH::Error>> {
        for setting in Setting::sequence(config) {
            self.apply_setting(setting)?;
        }
        Ok(())
    }
}
