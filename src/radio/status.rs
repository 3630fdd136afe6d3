//! Fixed-format status queries
//!
//! Pure request/reply wrappers over the command transport. Each query
//! owns its opcode, argument layout and reply layout; multi-byte fields
//! are assembled little-endian from the reply buffer.

use crate::bus::traits::{BusError, RadioBus};
use crate::bus::transport::CommandBus;
use crate::config;
use crate::radio::commands;

/// PART_INFO reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartInfo {
    pub chip_rev: u8,
    pub part: u16,
    pub pbuild: u8,
    pub id: u16,
    pub customer: u8,
    pub rom_id: u8,
    pub bond: u8,
}

impl PartInfo {
    pub fn parse(data: &[u8; 9]) -> Self {
        Self {
            chip_rev: data[0],
            part: u16::from_le_bytes([data[1], data[2]]),
            pbuild: data[3],
            id: u16::from_le_bytes([data[4], data[5]]),
            customer: data[6],
            rom_id: data[7],
            bond: data[8],
        }
    }

    /// Marketing name of the silicon revision, derived from the ROM id
    pub fn revision_name(&self) -> &'static str {
        match self.rom_id {
            config::chip::ROM_ID_REV_B1A => "SI4455-B1A",
            config::chip::ROM_ID_REV_C2A => "SI4455-C2A",
            _ => "SI4455(UNKNOWN-REV)",
        }
    }
}

/// GET_INT_STATUS reply: pending/status pairs per interrupt group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptStatus {
    pub int_pend: u8,
    pub int_status: u8,
    pub ph_pend: u8,
    pub ph_status: u8,
    pub modem_pend: u8,
    pub modem_status: u8,
    pub chip_pend: u8,
    pub chip_status: u8,
}

impl InterruptStatus {
    pub fn parse(data: &[u8; 8]) -> Self {
        Self {
            int_pend: data[0],
            int_status: data[1],
            ph_pend: data[2],
            ph_status: data[3],
            modem_pend: data[4],
            modem_status: data[5],
            chip_pend: data[6],
            chip_status: data[7],
        }
    }
}

/// GET_MODEM_STATUS reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModemStatus {
    pub modem_pend: u8,
    pub modem_status: u8,
    pub curr_rssi: u8,
    pub latch_rssi: u8,
    pub ant1_rssi: u8,
    pub ant2_rssi: u8,
    pub afc_freq_offset: u16,
}

impl ModemStatus {
    pub fn parse(data: &[u8; 8]) -> Self {
        Self {
            modem_pend: data[0],
            modem_status: data[1],
            curr_rssi: data[2],
            latch_rssi: data[3],
            ant1_rssi: data[4],
            ant2_rssi: data[5],
            afc_freq_offset: u16::from_le_bytes([data[6], data[7]]),
        }
    }
}

/// FIFO_INFO reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FifoInfo {
    /// Bytes waiting in the receive FIFO
    pub rx_fifo_count: u8,
    /// Free space left in the transmit FIFO
    pub tx_fifo_space: u8,
}

impl FifoInfo {
    pub fn parse(data: &[u8; 2]) -> Self {
        Self {
            rx_fifo_count: data[0],
            tx_fifo_space: data[1],
        }
    }
}

impl<B: RadioBus> CommandBus<B> {
    /// Query chip identity.
    pub async fn part_info(&mut self) -> Result<PartInfo, BusError> {
        let mut reply = [0u8; 9];
        self.send_command_get_response(&[commands::PART_INFO], &mut reply)
            .await?;
        Ok(PartInfo::parse(&reply))
    }

    /// Query interrupt status.
    ///
    /// The clear masks select, per group, which pending bits to leave
    /// set; zero acknowledges nothing.
    pub async fn interrupt_status(
        &mut self,
        ph_clear: u8,
        modem_clear: u8,
        chip_clear: u8,
    ) -> Result<InterruptStatus, BusError> {
        let frame = [commands::GET_INT_STATUS, ph_clear, modem_clear, chip_clear];
        let mut reply = [0u8; 8];
        self.send_command_get_response(&frame, &mut reply).await?;
        Ok(InterruptStatus::parse(&reply))
    }

    /// Query modem status, including the current RSSI sample.
    pub async fn modem_status(&mut self, modem_clear: u8) -> Result<ModemStatus, BusError> {
        let frame = [commands::GET_MODEM_STATUS, modem_clear];
        let mut reply = [0u8; 8];
        self.send_command_get_response(&frame, &mut reply).await?;
        Ok(ModemStatus::parse(&reply))
    }

    /// Query FIFO occupancy, optionally resetting either FIFO.
    pub async fn fifo_info(&mut self, reset: u8) -> Result<FifoInfo, BusError> {
        let frame = [commands::FIFO_INFO, reset];
        let mut reply = [0u8; 2];
        self.send_command_get_response(&frame, &mut reply).await?;
        Ok(FifoInfo::parse(&reply))
    }
}
