use core::fmt;

/// Errors reported by the driver
///
/// `E` is the error type of the underlying [`ByteChannel`](crate::channel::ByteChannel).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Operation requires a successful `init` first
    NotInitialized,
    /// `init` called on a module that is already up
    AlreadyInitialized,
    /// No complete reply within the time budget
    Timeout,
    /// Reply did not match the expected text, or framing was broken
    MalformedResponse,
    /// Byte channel failure
    Channel(E),
    /// Byte channel accepted fewer bytes than requested
    ShortWrite {
        /// Bytes accepted by the channel
        written: usize,
        /// Bytes handed to the channel
        expected: usize,
    },
    /// Parameter outside its legal range; nothing was sent
    InvalidParameter,
    /// Destination buffer too small
    OutOfSpace,
    /// Toggles were answered but the requested mode was never reached
    ModuleNotResponding,
}

impl<E> Error<E> {
    /// True for errors that can leave the believed mode stale.
    ///
    /// This is a property of the error kind only: a `Timeout` on a command
    /// reply leaves the mode known. Whether the mode was actually lost is
    /// reported by [`Dxlr02::mode`](crate::Dxlr02::mode) returning
    /// [`Mode::Unknown`](crate::Mode::Unknown); the next
    /// `ensure_at`/`ensure_data_mode` then re-synchronizes.
    pub fn is_mode_desync(&self) -> bool {
        matches!(
            self,
            Error::Timeout | Error::MalformedResponse | Error::ModuleNotResponding
        )
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized => write!(f, "module not initialized"),
            Error::AlreadyInitialized => write!(f, "module already initialized"),
            Error::Timeout => write!(f, "timed out waiting for the module"),
            Error::MalformedResponse => write!(f, "unexpected response from the module"),
            Error::Channel(e) => write!(f, "byte channel error: {:?}", e),
            Error::ShortWrite { written, expected } => {
                write!(f, "short write: {} of {} bytes", written, expected)
            }
            Error::InvalidParameter => write!(f, "parameter out of range"),
            Error::OutOfSpace => write!(f, "buffer too small"),
            Error::ModuleNotResponding => write!(f, "module did not reach the requested mode"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
