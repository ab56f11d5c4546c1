/// Blocking byte link to the module
///
/// Implemented by the platform's UART driver. The engine never assumes
/// anything about buffering beyond what these three calls promise.
pub trait ByteChannel {
    /// Error type for channel operations
    type Error;

    /// Write `bytes` and return how many were accepted
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;

    /// Read into `buffer`, waiting at most `timeout_ms`
    /// Returns the number of bytes read, 0 if nothing arrived in time
    fn read(&mut self, buffer: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;

    /// Discard anything already received but not yet read
    fn flush_input(&mut self) -> Result<(), Self::Error>;
}

/// Monotonic microsecond clock
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

impl<T: ByteChannel + ?Sized> ByteChannel for &mut T {
    type Error = T::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(bytes)
    }

    fn read(&mut self, buffer: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        (**self).read(buffer, timeout_ms)
    }

    fn flush_input(&mut self) -> Result<(), Self::Error> {
        (**self).flush_input()
    }
}
