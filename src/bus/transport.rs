//! Command/response transport over the raw radio bus
//!
//! Every command must be preceded by a readiness poll: the chip's
//! command buffer is read until it answers with the 0xFF ready sentinel.
//! Replies are fetched the same way, sentinel first and payload in the
//! same chip-select cycle. A poll that exhausts its retry budget marks
//! the bus desynchronized; only a full reconfiguration clears that.

use embassy_time::Timer;

use crate::bus::traits::{BusError, RadioBus};
use crate::config;
use crate::radio::commands;

/// Synchronous request/poll/reply transport
pub struct CommandBus<B> {
    bus: B,
    cts_error: bool,
    cts_error_count: u32,
}

impl<B: RadioBus> CommandBus<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            cts_error: false,
            cts_error_count: 0,
        }
    }

    /// Fetch a reply of `reply.len()` bytes, polling for the ready sentinel.
    async fn fetch(&mut self, reply: &mut [u8]) -> Result<(), BusError> {
        let mut raw = [0u8; config::bus::CMD_MAX_LEN];
        let frame = &mut raw[..1 + reply.len()];

        for _ in 0..config::bus::CTS_RETRY_BUDGET {
            self.bus.read(commands::READ_CMD_BUFF, frame).await?;
            if frame[0] == commands::CTS_READY {
                reply.copy_from_slice(&frame[1..]);
                return Ok(());
            }
            Timer::after(config::bus::CTS_POLL_DELAY).await;
        }

        log::error!("readiness poll exhausted after {} attempts", config::bus::CTS_RETRY_BUDGET);
        Err(BusError::Timeout)
    }

    /// Poll until the chip is ready to accept the next command.
    ///
    /// Exhausting the retry budget flags the bus for the health watchdog.
    pub async fn poll_ready(&mut self) -> Result<(), BusError> {
        let ret = self.fetch(&mut []).await;
        if ret == Err(BusError::Timeout) {
            self.cts_error = true;
            self.cts_error_count += 1;
        }
        ret
    }

    /// Fetch a fixed-length reply for the previously sent command.
    pub async fn get_response(&mut self, reply: &mut [u8]) -> Result<(), BusError> {
        self.fetch(reply).await
    }

    /// Poll ready, then write a complete command frame.
    pub async fn send_command(&mut self, frame: &[u8]) -> Result<(), BusError> {
        self.poll_ready().await?;
        self.bus.write(frame).await
    }

    /// Send a command and fetch its fixed-length reply.
    pub async fn send_command_get_response(
        &mut self,
        frame: &[u8],
        reply: &mut [u8],
    ) -> Result<(), BusError> {
        self.send_command(frame).await?;
        self.get_response(reply).await
    }

    /// Direct FIFO-style read: command byte, then `buf.len()` data bytes.
    ///
    /// `poll` is skipped when the caller has already established readiness.
    pub async fn read_data(&mut self, cmd: u8, poll: bool, buf: &mut [u8]) -> Result<(), BusError> {
        if poll {
            self.poll_ready().await?;
        }
        self.bus.read(cmd, buf).await
    }

    /// Direct FIFO-style write: command byte followed by `payload`.
    pub async fn write_data(&mut self, cmd: u8, poll: bool, payload: &[u8]) -> Result<(), BusError> {
        if payload.len() > config::bus::BULK_WRITE_MAX {
            return Err(BusError::TooLong);
        }
        if poll {
            self.poll_ready().await?;
        }

        let mut frame = [0u8; 1 + config::bus::BULK_WRITE_MAX];
        frame[0] = cmd;
        frame[1..1 + payload.len()].copy_from_slice(payload);
        self.bus.write(&frame[..1 + payload.len()]).await
    }

    /// Whether a readiness poll has failed since the last recovery
    pub fn cts_error(&self) -> bool {
        self.cts_error
    }

    /// Clear the desynchronization flag after a successful recovery
    pub fn clear_cts_error(&mut self) {
        self.cts_error = false;
    }

    /// Total readiness-poll failures over the life of the bus
    pub fn cts_error_count(&self) -> u32 {
        self.cts_error_count
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &B {
        &self.bus
    }
}
