//! AT command table
//!
//! Every configuration command follows the same pattern: `AT+<keyword><arg>\r\n`
//! answered by `OK`, by an echo of the argument followed by `OK`, or by `OK`
//! and a `Power On` line for commands that restart the module. The table
//! below is the only place that knows which is which.

use core::fmt::Write;

use heapless::String;

use crate::config::module::{
    Baudrate, ConfigField, ModuleConfig, CODING_RATE_RANGE, MAX_CHANNEL, MAX_ENERGY_MODE,
    MAX_PARITY, MAX_RATE_LEVEL, MAX_STOP_BIT, MAX_TRANSMIT_POWER, MAX_WORKING_MODE,
    SPREAD_FACTOR_RANGE,
};

/// Longest command or expected reply the table produces
pub const MAX_COMMAND_LEN: usize = 32;

/// Rendered command or expected reply text
pub type AtCommand = String<MAX_COMMAND_LEN>;

const OK: &str = "OK\r\n";
const OK_POWER_ON: &str = "OK\r\nPower On\r\n";
const OK_POWER_ON_LOWER: &str = "OK\r\nPower on\r\n";

/// Why a [`Setting`] could not be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Value outside the legal range of the setting
    InvalidParameter,
    /// Rendered text does not fit in [`AtCommand`]
    Overflow,
}

impl From<core::fmt::Error> for EncodeError {
    fn from(_: core::fmt::Error) -> Self {
        EncodeError::Overflow
    }
}

/// How the value is rendered after the keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Argument {
    None,
    Decimal(u8),
    Hex(u8),
    /// High and low nibble as two hex pairs
    Nibbles(u8),
}

impl Argument {
    fn write_command(self, out: &mut AtCommand) -> core::fmt::Result {
        match self {
            Argument::None => Ok(()),
            Argument::Decimal(v) => write!(out, "{}", v),
            Argument::Hex(v) => write!(out, "{:02X}", v),
            Argument::Nibbles(v) => write!(out, "{:02X},{:02X}", v >> 4, v & 0x0F),
        }
    }

    fn write_echo(self, out: &mut AtCommand) -> core::fmt::Result {
        match self {
            Argument::Nibbles(v) => write!(out, "{:02X}{:02X}", v >> 4, v & 0x0F),
            other => other.write_command(out),
        }
    }
}

/// Shape of the reply to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    /// `OK`
    Ok,
    /// `+KEYWORD=<arg>` then `OK`
    Echo,
    /// `OK` then `Power On`
    PowerOn,
}

/// One AT configuration command with its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    /// UART baudrate in bits per second
    Baudrate(u32),
    /// Working mode (0-2)
    WorkingMode(u8),
    /// Energy mode (0-2)
    EnergyMode(u8),
    /// Stop bits (0-2)
    StopBit(u8),
    /// Parity (0-2)
    Parity(u8),
    /// Rate level (0-7)
    RateLevel(u8),
    /// Channel (0x00-0x1E)
    Channel(u8),
    /// Node address
    Address(u8),
    /// Transmit power in dBm (0-22)
    TransmitPower(u8),
    /// Coding rate denominator (5-8)
    CodingRate(u8),
    /// Spreading factor (5-12)
    SpreadFactor(u8),
    /// Payload CRC
    Crc(bool),
    /// IQ inversion
    IqFlip(bool),
    /// Restart the module
    Reset,
    /// Restore factory configuration
    FactoryDefault,
}

impl Setting {
    /// The 13 settings of `config` in the order they are applied
    pub fn sequence(config: &ModuleConfig) -> [Setting; 13] {
        [
            Setting::Baudrate(config.baudrate.bps()),
            Setting::WorkingMode(config.working_mode),
            Setting::EnergyMode(config.energy_mode),
            Setting::StopBit(config.stop_bit),
            Setting::Parity(config.parity),
            Setting::RateLevel(config.rate_level),
            Setting::Channel(config.channel),
            Setting::Address(config.address),
            Setting::TransmitPower(config.transmit_power),
            Setting::CodingRate(config.rf_coding_rate),
            Setting::SpreadFactor(config.spread_factor),
            Setting::Crc(config.crc),
            Setting::IqFlip(config.iq_signal_flip),
        ]
    }

    /// Text between `AT+` and the argument
    pub fn keyword(&self) -> &'static str {
        match self {
            Setting::Baudrate(_) => "BAUD",
            Setting::WorkingMode(_) => "MODE",
            Setting::EnergyMode(_) => "SLEEP",
            Setting::StopBit(_) => "STOP",
            Setting::Parity(_) => "PARI",
            Setting::RateLevel(_) => "LEVEL",
            Setting::Channel(_) => "CHANNEL",
            Setting::Address(_) => "MAC",
            Setting::TransmitPower(_) => "POWE",
            Setting::CodingRate(_) => "CR",
            Setting::SpreadFactor(_) => "SF",
            Setting::Crc(_) => "CRC",
            Setting::IqFlip(_) => "IQ",
            Setting::Reset => "RESET",
            Setting::FactoryDefault => "DEFAULT",
        }
    }

    /// Mirror field this setting writes, if any
    pub fn field(&self) -> Option<ConfigField> {
        match self {
            Setting::Baudrate(_) => Some(ConfigField::Baudrate),
            Setting::WorkingMode(_) => Some(ConfigField::WorkingMode),
            Setting::EnergyMode(_) => Some(ConfigField::EnergyMode),
            Setting::StopBit(_) => Some(ConfigField::StopBit),
            Setting::Parity(_) => Some(ConfigField::Parity),
            Setting::RateLevel(_) => Some(ConfigField::RateLevel),
            Setting::Channel(_) => Some(ConfigField::Channel),
            Setting::Address(_) => Some(ConfigField::Address),
            Setting::TransmitPower(_) => Some(ConfigField::TransmitPower),
            Setting::CodingRate(_) => Some(ConfigField::CodingRate),
            Setting::SpreadFactor(_) => Some(ConfigField::SpreadFactor),
            Setting::Crc(_) => Some(ConfigField::Crc),
            Setting::IqFlip(_) => Some(ConfigField::IqSignalFlip),
            Setting::Reset | Setting::FactoryDefault => None,
        }
    }

    fn reply(&self) -> Reply {
        match self {
            Setting::WorkingMode(_)
            | Setting::Channel(_)
            | Setting::Address(_)
            | Setting::TransmitPower(_)
            | Setting::CodingRate(_)
            | Setting::SpreadFactor(_) => Reply::Echo,
            Setting::Reset | Setting::FactoryDefault => Reply::PowerOn,
            _ => Reply::Ok,
        }
    }

    /// Wire argument, `None` when the value is out of range
    fn argument(&self) -> Option<Argument> {
        match *self {
            Setting::Baudrate(bps) => Baudrate::from_bps(bps).map(|b| Argument::Decimal(b.code())),
            Setting::WorkingMode(m) => (m <= MAX_WORKING_MODE).then_some(Argument::Decimal(m)),
            Setting::EnergyMode(m) => (m <= MAX_ENERGY_MODE).then_some(Argument::Decimal(m)),
            Setting::StopBit(s) => (s <= MAX_STOP_BIT).then_some(Argument::Decimal(s)),
            Setting::Parity(p) => (p <= MAX_PARITY).then_some(Argument::Decimal(p)),
            Setting::RateLevel(l) => (l <= MAX_RATE_LEVEL).then_some(Argument::Decimal(l)),
            Setting::Channel(ch) => (ch <= MAX_CHANNEL).then_some(Argument::Hex(ch)),
            Setting::Address(addr) => Some(Argument::Nibbles(addr)),
            Setting::TransmitPower(p) => {
                (p <= MAX_TRANSMIT_POWER).then_some(Argument::Decimal(p))
            }
            Setting::CodingRate(x) => CODING_RATE_RANGE
                .contains(&x)
                .then(|| Argument::Decimal(x - 4)),
            Setting::SpreadFactor(sf) => {
                SPREAD_FACTOR_RANGE.contains(&sf).then_some(Argument::Decimal(sf))
            }
            Setting::Crc(on) | Setting::IqFlip(on) => Some(Argument::Decimal(u8::from(on))),
            Setting::Reset | Setting::FactoryDefault => Some(Argument::None),
        }
    }

    /// True if the value is inside its legal range
    pub fn is_valid(&self) -> bool {
        self.argument().is_some()
    }

    /// Number of `\n`-terminated lines in the reply
    pub fn response_lines(&self) -> usize {
        match self.reply() {
            Reply::Ok => 1,
            Reply::Echo | Reply::PowerOn => 2,
        }
    }

    /// Render the command, e.g. `AT+CHANNEL1E\r\n`
    pub fn encode(&self) -> Result<AtCommand, EncodeError> {
        let argument = self.argument().ok_or(EncodeError::InvalidParameter)?;
        let mut command = AtCommand::new();
        write!(command, "AT+{}", self.keyword())?;
        argument.write_command(&mut command)?;
        command.push_str("\r\n").map_err(|_| EncodeError::Overflow)?;
        Ok(command)
    }

    /// Render the reply the module gives on success
    ///
    /// For restarting commands this is the `Power On` spelling; see [`Setting::accepts`].
    pub fn expected_reply(&self) -> Result<AtCommand, EncodeError> {
        let argument = self.argument().ok_or(EncodeError::InvalidParameter)?;
        let mut reply = AtCommand::new();
        match self.reply() {
            Reply::Ok => {}
            Reply::Echo => {
                write!(reply, "+{}=", self.keyword())?;
                argument.write_echo(&mut reply)?;
                reply.push_str("\r\n").map_err(|_| EncodeError::Overflow)?;
            }
            Reply::PowerOn => {
                reply.push_str(OK_POWER_ON).map_err(|_| EncodeError::Overflow)?;
                return Ok(reply);
            }
        }
        reply.push_str(OK).map_err(|_| EncodeError::Overflow)?;
        Ok(reply)
    }

    /// Exact match of `response` against the success reply
    pub fn accepts(&self, response: &[u8]) -> Result<bool, EncodeError> {
        match self.reply() {
            Reply::PowerOn => Ok(response == OK_POWER_ON.as_bytes()
                || response == OK_POWER_ON_LOWER.as_bytes()),
            _ => Ok(response == self.expected_reply()?.as_bytes()),
        }
    }

    /// Write the confirmed value into `config`
    pub fn apply_to(&self, config: &mut ModuleConfig) {
        match *self {
            Setting::Baudrate(bps) => {
                if let Some(rate) = Baudrate::from_bps(bps) {
                    config.baudrate = rate;
                }
            }
            Setting::WorkingMode(m) => config.working_mode = m,
            Setting::EnergyMode(m) => config.energy_mode = m,
            Setting::StopBit(s) => config.stop_bit = s,
            Setting::Parity(p) => config.parity = p,
            Setting::RateLevel(l) => config.rate_level = l,
            Setting::Channel(ch) => config.channel = ch,
            Setting::Address(addr) => config.address = addr,
            Setting::TransmitPower(p) => config.transmit_power = p,
            Setting::CodingRate(x) => config.rf_coding_rate = x,
            Setting::SpreadFactor(sf) => config.spread_factor = sf,
            Setting::Crc(on) => config.crc = on,
            Setting::IqFlip(on) => config.iq_signal_flip = on,
            Setting::Reset => {}
            Setting::FactoryDefault => *config = ModuleConfig::default(),
        }
    }
}
