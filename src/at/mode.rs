/// Sequence that flips the module between AT and data mode
pub const TOGGLE_SEQUENCE: &[u8] = b"+++\r\n";

/// Reply to a toggle that landed in AT mode
pub const ENTRY_AT: &[u8] = b"Entry AT\r\n";

/// First reply line of a toggle that landed in data mode
pub const EXIT_AT: &[u8] = b"Exit AT\r\n";

/// Line printed by the module after it restarts its data side
pub const POWER_ON: &[u8] = b"Power On\r\n";

/// Where the driver believes the module currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Accepting AT commands
    At,
    /// Passing bytes through to the radio
    Data,
    /// A toggle went out but its reply could not be interpreted
    Unknown,
}

/// How the first line of a toggle reply reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleReply {
    /// `Entry AT`, the exchange is complete
    EnteredAt,
    /// `Exit AT`, a `Power On` line must follow
    ExitedAt,
}

/// Classify the first line of a toggle reply
pub fn parse_toggle_line(line: &[u8]) -> Option<ToggleReply> {
    if line == ENTRY_AT {
        Some(ToggleReply::EnteredAt)
    } else if line == EXIT_AT {
        Some(ToggleReply::ExitedAt)
    } else {
        None
    }
}

/// True for the `Power On` line in any letter case
pub fn is_power_on(line: &[u8]) -> bool {
    line.eq_ignore_ascii_case(POWER_ON)
}
