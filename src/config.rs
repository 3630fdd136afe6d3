//! Chip geometry, bus timing and link defaults for the Si4455 transceiver

/// Chip identity and FIFO geometry
pub mod chip {
    /// TX/RX FIFO depth in bytes; also the hard cap on a single packet
    pub const FIFO_SIZE: usize = 64;

    /// Part number reported by PART_INFO for the Si4455
    pub const PART_NUMBER: u16 = 0x5544;

    /// ROM id of revision B1A silicon
    pub const ROM_ID_REV_B1A: u8 = 3;

    /// ROM id of revision C2A silicon (START_TX takes a trailing byte)
    pub const ROM_ID_REV_C2A: u8 = 6;
}

/// Command/response bus timing and staging limits
pub mod bus {
    use embassy_time::Duration;

    /// Readiness-poll attempts before the bus is declared desynchronized
    pub const CTS_RETRY_BUDGET: u32 = 100;

    /// Pause between readiness polls
    pub const CTS_POLL_DELAY: Duration = Duration::from_micros(100);

    /// Longest staged command frame (opcode plus arguments)
    pub const CMD_MAX_LEN: usize = 16;

    /// Longest bulk FIFO-write payload accepted by the streaming path
    pub const BULK_WRITE_MAX: usize = 128;
}

/// Link-layer defaults
pub mod link {
    use embassy_time::Duration;

    /// Header bytes reserved out of the FIFO in variable-length mode
    pub const VARIABLE_MODE_RESERVED: usize = 3;

    /// Default transmit watchdog timeout
    pub const TX_WD_TIMEOUT: Duration = Duration::from_millis(100);

    /// Bus-health watchdog period
    pub const HEALTH_WD_PERIOD: Duration = Duration::from_millis(100);

    /// Default transmit/receive channel number
    pub const CHANNEL: u8 = 0;

    /// Default package size (0 = variable-length mode)
    pub const PACKAGE_SIZE: u8 = 0x10;
}

/// Power rail sequencing
pub mod power {
    use embassy_time::Duration;

    /// Settle time around toggling the shutdown line
    pub const SETTLE_DELAY: Duration = Duration::from_millis(14);
}

/// Byte-stream queue sizes
pub mod stream {
    /// Outbound (awaiting transmission) ring capacity
    pub const OUTBOUND_SIZE: usize = 512;

    /// Inbound (received, awaiting the consumer) ring capacity
    pub const INBOUND_SIZE: usize = 512;
}

/// Deferred-work plumbing
pub mod tasks {
    /// Worker event queue depth
    pub const WORK_QUEUE_DEPTH: usize = 8;
}
