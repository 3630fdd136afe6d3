//! Raw radio bus trait for abstraction and testability
//!
//! This trait defines the lowest-level access to the transceiver,
//! allowing the actual SPI transport to be swapped with a mock for testing.

use core::future::Future;

/// Errors that can occur on the command/response bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Readiness-poll retry budget exhausted
    Timeout,
    /// Underlying SPI transfer failed
    Io,
    /// Frame exceeds the staging buffer
    TooLong,
}

/// Abstract SPI-level access to the transceiver
///
/// One `write` is a full chip-select cycle carrying a complete command
/// frame. One `read` selects the chip, clocks out the single command
/// byte, then clocks in `buf.len()` reply bytes in the same cycle.
pub trait RadioBus {
    /// Write a complete command frame
    fn write(&mut self, frame: &[u8]) -> impl Future<Output = Result<(), BusError>>;

    /// Issue a read command and clock the reply into `buf`
    fn read(&mut self, cmd: u8, buf: &mut [u8]) -> impl Future<Output = Result<(), BusError>>;
}
