/// Serial baudrates supported by `AT+BAUD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Baudrate {
    /// 1200 bps
    B1200,
    /// 2400 bps
    B2400,
    /// 4800 bps
    B4800,
    /// 9600 bps (factory default)
    B9600,
    /// 19200 bps
    B19200,
    /// 38400 bps
    B38400,
    /// 57600 bps
    B57600,
    /// 115200 bps
    B115200,
    /// 128000 bps
    B128000,
}

impl Baudrate {
    /// All supported rates in `AT+BAUD` code order
    pub const ALL: [Baudrate; 9] = [
        Baudrate::B1200,
        Baudrate::B2400,
        Baudrate::B4800,
        Baudrate::B9600,
        Baudrate::B19200,
        Baudrate::B38400,
        Baudrate::B57600,
        Baudrate::B115200,
        Baudrate::B128000,
    ];

    /// Look up a rate given in bits per second
    pub fn from_bps(bps: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|rate| rate.bps() == bps)
    }

    /// Rate in bits per second
    pub fn bps(self) -> u32 {
        match self {
            Baudrate::B1200 => 1_200,
            Baudrate::B2400 => 2_400,
            Baudrate::B4800 => 4_800,
            Baudrate::B9600 => 9_600,
            Baudrate::B19200 => 19_200,
            Baudrate::B38400 => 38_400,
            Baudrate::B57600 => 57_600,
            Baudrate::B115200 => 115_200,
            Baudrate::B128000 => 128_000,
        }
    }

    /// Digit sent after `AT+BAUD` (1..=9)
    pub fn code(self) -> u8 {
        match self {
            Baudrate::B1200 => 1,
            Baudrate::B2400 => 2,
            Baudrate::B4800 => 3,
            Baudrate::B9600 => 4,
            Baudrate::B19200 => 5,
            Baudrate::B38400 => 6,
            Baudrate::B57600 => 7,
            Baudrate::B115200 => 8,
            Baudrate::B128000 => 9,
        }
    }
}

/// Fields of [`ModuleConfig`], in the order `set_config` applies them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigField {
    /// UART baudrate
    Baudrate,
    /// 0 transparent, 1 fixed-point, 2 broadcast
    WorkingMode,
    /// 0 sleep, 1 over-the-air wake-up, 2 high efficiency
    EnergyMode,
    /// UART stop bits setting
    StopBit,
    /// 0 none, 1 odd, 2 even
    Parity,
    /// Air rate level
    RateLevel,
    /// Frequency channel
    Channel,
    /// Node address
    Address,
    /// Transmit power in dBm
    TransmitPower,
    /// Coding rate denominator (4/x)
    CodingRate,
    /// LoRa spreading factor
    SpreadFactor,
    /// Payload CRC
    Crc,
    /// IQ signal inversion
    IqSignalFlip,
}

/// Highest working mode
pub const MAX_WORKING_MODE: u8 = 2;
/// Highest energy mode
pub const MAX_ENERGY_MODE: u8 = 2;
/// Highest rate level
pub const MAX_RATE_LEVEL: u8 = 7;
/// Highest stop bit setting
pub const MAX_STOP_BIT: u8 = 2;
/// Highest parity setting
pub const MAX_PARITY: u8 = 2;
/// Highest channel number
pub const MAX_CHANNEL: u8 = 0x1E;
/// Highest transmit power in dBm
pub const MAX_TRANSMIT_POWER: u8 = 22;
/// Legal coding rate denominators
pub const CODING_RATE_RANGE: core::ops::RangeInclusive<u8> = 5..=8;
/// Legal spreading factors
pub const SPREAD_FACTOR_RANGE: core::ops::RangeInclusive<u8> = 5..=12;

/// Module configuration
///
/// Inside a [`Dxlr02`](crate::Dxlr02) this mirrors what the module has
/// confirmed. Standalone it describes a configuration to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleConfig {
    /// 0 transparent, 1 fixed-point, 2 broadcast
    pub working_mode: u8,
    /// 0 sleep, 1 over-the-air wake-up, 2 high efficiency
    pub energy_mode: u8,
    /// UART baudrate
    pub baudrate: Baudrate,
    /// Air rate level (0-7)
    pub rate_level: u8,
    /// Stop bits setting (0-2)
    pub stop_bit: u8,
    /// 0 none, 1 odd, 2 even
    pub parity: u8,
    /// Frequency channel (0x00-0x1E)
    pub channel: u8,
    /// Node address
    pub address: u8,
    /// Transmit power in dBm (0-22)
    pub transmit_power: u8,
    /// Coding rate denominator, 4/x with x in 5-8
    pub rf_coding_rate: u8,
    /// Spreading factor (5-12)
    pub spread_factor: u8,
    /// Payload CRC enabled
    pub crc: bool,
    /// IQ signal inversion enabled
    pub iq_signal_flip: bool,
}

impl Default for ModuleConfig {
    /// State reported by the module after `AT+DEFAULT`
    fn default() -> Self {
        Self {
            working_mode: 0,
            energy_mode: 2,
            baudrate: Baudrate::B9600,
            rate_level: 0,
            stop_bit: 0,
            parity: 0,
            channel: 0,
            address: 0xFF,
            transmit_power: 22,
            rf_coding_rate: 6,
            spread_factor: 12,
            crc: false,
            iq_signal_flip: false,
        }
    }
}

impl ModuleConfig {
    /// Check every field against its legal range
    ///
    /// Returns the first offending field in `set_config` order.
    pub fn validate(&self) -> Result<(), ConfigField> {
        if self.working_mode > MAX_WORKING_MODE {
            return Err(ConfigField::WorkingMode);
        }
        if self.energy_mode > MAX_ENERGY_MODE {
            return Err(ConfigField::EnergyMode);
        }
        if self.stop_bit > MAX_STOP_BIT {
            return Err(ConfigField::StopBit);
        }
        if self.parity > MAX_PARITY {
            return Err(ConfigField::Parity);
        }
        if self.rate_level > MAX_RATE_LEVEL {
            return Err(ConfigField::RateLevel);
        }
        if self.channel > MAX_CHANNEL {
            return Err(ConfigField::Channel);
        }
        if self.transmit_power > MAX_TRANSMIT_POWER {
            return Err(ConfigField::TransmitPower);
        }
        if !CODING_RATE_RANGE.contains(&self.rf_coding_rate) {
            return Err(ConfigField::CodingRate);
        }
        if !SPREAD_FACTOR_RANGE.contains(&self.spread_factor) {
            return Err(ConfigField::SpreadFactor);
        }
        Ok(())
    }
}
