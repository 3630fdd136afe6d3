//! Shared link-layer record
//!
//! One instance per radio, guarded together with the bus by a single
//! mutex held across every bus operation. The command/response protocol
//! cannot tolerate interleaving, so nothing here is lock-free.

use embassy_time::{Duration, Instant};

use crate::config;

/// Mutable link-layer state
pub struct LinkState {
    /// Channel used for the next transmission
    pub tx_channel: u8,
    /// Channel the receiver is armed on
    pub rx_channel: u8,
    /// 0 = variable-length mode (1-byte length prefix), else fixed size
    pub package_size: u8,
    /// Exact byte count consumed from the outbound queue for the
    /// in-flight transmission; only meaningful while `tx_pending`
    pub tx_pending_size: usize,
    /// Latest RSSI sample from the modem
    pub current_rssi: u8,
    /// Transmissions cancelled by the watchdog
    pub tx_error_count: u32,
    /// Payload bytes delivered in either direction
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    /// Received bytes dropped because the inbound queue was full
    pub rx_overruns: u32,
    /// Transmit watchdog timeout
    pub tx_wd_timeout: Duration,
    /// Deadline of the armed transmit watchdog
    pub tx_deadline: Option<Instant>,
    /// Power rail reference count
    pub power_count: i32,
    pub connected: bool,
    pub suspended: bool,
    pub configured: bool,
    /// A transmission is in flight; never true together with `rx_pending`
    pub tx_pending: bool,
    /// The receiver is armed and listening
    pub rx_pending: bool,
    pub tx_stopped: bool,
    pub rx_stopped: bool,
}

impl LinkState {
    pub fn new(tx_channel: u8, rx_channel: u8, package_size: u8, tx_wd_timeout: Duration) -> Self {
        Self {
            tx_channel,
            rx_channel,
            package_size,
            tx_pending_size: 0,
            current_rssi: 0,
            tx_error_count: 0,
            tx_bytes: 0,
            rx_bytes: 0,
            rx_overruns: 0,
            tx_wd_timeout,
            tx_deadline: None,
            power_count: 0,
            connected: false,
            suspended: false,
            configured: false,
            tx_pending: false,
            rx_pending: false,
            tx_stopped: false,
            rx_stopped: false,
        }
    }

    /// Whether the session machinery may touch the radio at all
    pub fn active(&self) -> bool {
        !self.suspended && self.connected && self.configured && self.power_count > 0
    }

    /// Payload capacity of one transmission in the current mode
    pub fn tx_capacity(&self) -> usize {
        if self.package_size == 0 {
            config::chip::FIFO_SIZE - config::link::VARIABLE_MODE_RESERVED
        } else {
            self.package_size as usize
        }
    }
}

/// Read-only counters for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStats {
    pub cts_error_count: u32,
    pub tx_error_count: u32,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub rx_overruns: u32,
}
