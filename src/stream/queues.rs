//! Outbound/inbound queues and the clear-to-send flag
//!
//! The link core touches these only through the accessors below;
//! everything else about the serial side (framing, wakeups, line
//! discipline) lives with the byte-stream collaborator.

use crate::config;
use crate::stream::ring::ByteRing;

/// Byte-stream boundary state
pub struct StreamQueues {
    outbound: ByteRing<{ config::stream::OUTBOUND_SIZE }>,
    inbound: ByteRing<{ config::stream::INBOUND_SIZE }>,
    clear_to_send: bool,
}

impl StreamQueues {
    pub const fn new() -> Self {
        Self {
            outbound: ByteRing::new(),
            inbound: ByteRing::new(),
            clear_to_send: true,
        }
    }

    /// Bytes queued for transmission
    pub fn tx_pending(&self) -> usize {
        self.outbound.len()
    }

    /// Copy queued bytes from the tail without consuming them.
    ///
    /// Consumption happens in `tx_advance` once the completion interrupt
    /// confirms how much actually left the radio.
    pub fn tx_copy(&self, out: &mut [u8]) -> usize {
        self.outbound.copy_tail(out)
    }

    /// Consume `count` transmitted bytes from the outbound queue.
    pub fn tx_advance(&mut self, count: usize) {
        self.outbound.advance(count);
    }

    /// Host side: queue bytes for transmission; returns the accepted count.
    pub fn accept(&mut self, data: &[u8]) -> usize {
        self.outbound.extend(data)
    }

    /// Free space left in the outbound queue
    pub fn tx_free(&self) -> usize {
        self.outbound.free()
    }

    /// Push one received byte toward the consumer; false on overflow.
    pub fn rx_push(&mut self, byte: u8) -> bool {
        self.inbound.push(byte)
    }

    /// Bytes waiting for the consumer
    pub fn rx_pending(&self) -> usize {
        self.inbound.len()
    }

    /// Host side: drain received bytes.
    pub fn rx_read(&mut self, out: &mut [u8]) -> usize {
        self.inbound.read(out)
    }

    pub fn clear_to_send(&self) -> bool {
        self.clear_to_send
    }

    pub fn set_clear_to_send(&mut self, cts: bool) {
        self.clear_to_send = cts;
    }
}

impl Default for StreamQueues {
    fn default() -> Self {
        Self::new()
    }
}
