/// Driver timeouts and re-synchronization budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Total budget for a toggle reply, in milliseconds
    pub toggle_timeout_ms: u32,
    /// Total budget for an AT command reply, in milliseconds
    pub command_timeout_ms: u32,
    /// Longest stall allowed between two reply bytes, in milliseconds
    pub byte_timeout_ms: u32,
    /// Total budget for one data-mode frame, in milliseconds
    pub receive_timeout_ms: u32,
    /// Toggles allowed while re-synchronizing from an unknown mode
    pub resync_toggles: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            toggle_timeout_ms: 500,
            command_timeout_ms: 500,
            byte_timeout_ms: 500,
            receive_timeout_ms: 10,
            resync_toggles: 4,
        }
    }
}
