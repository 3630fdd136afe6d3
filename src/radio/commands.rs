//! Si4455 command set
//!
//! Opcodes, argument constants, and the action commands that drive the
//! packet engine. Argument layouts follow the EZRadio API: channel,
//! condition, then a big-endian 16-bit length, with next-state bytes on
//! START_RX.

use crate::bus::traits::{BusError, RadioBus};
use crate::bus::transport::CommandBus;

pub const PART_INFO: u8 = 0x01;
pub const FIFO_INFO: u8 = 0x15;
pub const EZCONFIG_CHECK: u8 = 0x19;
pub const GET_INT_STATUS: u8 = 0x20;
pub const GET_MODEM_STATUS: u8 = 0x22;
pub const START_TX: u8 = 0x31;
pub const START_RX: u8 = 0x32;
pub const CHANGE_STATE: u8 = 0x34;
pub const READ_CMD_BUFF: u8 = 0x44;
pub const WRITE_TX_FIFO: u8 = 0x66;
pub const READ_RX_FIFO: u8 = 0x77;

/// Ready sentinel answered on READ_CMD_BUFF
pub const CTS_READY: u8 = 0xFF;

/// START_TX completion condition: packet sent, return to ready
pub const TX_CONDITION: u8 = 0x10;

/// Trailing byte required by revision C2A silicon on START_TX
pub const TX_TRAILER_REV_C2A: u8 = 0x44;

/// Device states for CHANGE_STATE and the START_RX next-state table
pub mod state {
    pub const SLEEP: u8 = 1;
    pub const READY: u8 = 3;
    pub const RX: u8 = 8;
}

/// FIFO_INFO reset mask bits
pub mod fifo {
    /// Leave both FIFOs untouched, just read the counts
    pub const KEEP: u8 = 0x00;
    /// Reset the transmit FIFO
    pub const RESET_TX: u8 = 0x01;
    /// Reset the receive FIFO
    pub const RESET_RX: u8 = 0x02;
}

/// Interrupt pending bits
pub mod irq {
    /// ph_pend: CRC error on a received packet
    pub const CRC_ERROR: u8 = 0x08;
    /// ph_pend: packet received
    pub const PACKET_RX: u8 = 0x10;
    /// ph_pend: packet sent
    pub const PACKET_SENT: u8 = 0x20;
    /// chip_pend: command error
    pub const CHIP_ERROR: u8 = 0x08;
}

impl<B: RadioBus> CommandBus<B> {
    /// Start a transmission on `channel`.
    ///
    /// `extended` appends the fixed trailing byte that revision C2A
    /// silicon expects; the flag is resolved once at bring-up.
    pub async fn start_tx(
        &mut self,
        channel: u8,
        condition: u8,
        length: u16,
        extended: bool,
    ) -> Result<(), BusError> {
        let mut frame = [0u8; 6];
        frame[0] = START_TX;
        frame[1] = channel;
        frame[2] = condition;
        frame[3] = (length >> 8) as u8;
        frame[4] = length as u8;

        let mut len = 5;
        if extended {
            frame[5] = TX_TRAILER_REV_C2A;
            len += 1;
        }

        self.send_command(&frame[..len]).await
    }

    /// Start a reception on `channel` with the given next-state table.
    pub async fn start_rx(
        &mut self,
        channel: u8,
        condition: u8,
        length: u16,
        timeout_state: u8,
        valid_state: u8,
        invalid_state: u8,
    ) -> Result<(), BusError> {
        let frame = [
            START_RX,
            channel,
            condition,
            (length >> 8) as u8,
            length as u8,
            timeout_state,
            valid_state,
            invalid_state,
        ];
        self.send_command(&frame).await
    }

    /// Force the device state machine into `next_state`.
    pub async fn change_state(&mut self, next_state: u8) -> Result<(), BusError> {
        self.send_command(&[CHANGE_STATE, next_state]).await
    }

    /// Drain `buf.len()` bytes from the receive FIFO.
    pub async fn read_rx_fifo(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        self.read_data(READ_RX_FIFO, false, buf).await
    }

    /// Load `data` into the transmit FIFO.
    pub async fn write_tx_fifo(&mut self, data: &[u8]) -> Result<(), BusError> {
        self.write_data(WRITE_TX_FIFO, false, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::traits::mock::MockRadioBus;

    #[test]
    fn test_start_tx_frame_layout() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            bus.start_tx(2, TX_CONDITION, 0x0141, false).await.unwrap();

            let writes = bus.inner().writes();
            assert_eq!(writes[0].as_slice(), &[START_TX, 2, 0x10, 0x01, 0x41]);
        });
    }

    #[test]
    fn test_start_tx_extended_trailer() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            bus.start_tx(0, TX_CONDITION, 16, true).await.unwrap();

            let writes = bus.inner().writes();
            assert_eq!(
                writes[0].as_slice(),
                &[START_TX, 0, 0x10, 0x00, 16, TX_TRAILER_REV_C2A]
            );
        });
    }

    #[test]
    fn test_start_rx_next_state_table() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            bus.start_rx(5, 0, 16, state::RX, state::RX, state::RX)
                .await
                .unwrap();

            let writes = bus.inner().writes();
            assert_eq!(
                writes[0].as_slice(),
                &[START_RX, 5, 0, 0, 16, state::RX, state::RX, state::RX]
            );
        });
    }

    #[test]
    fn test_fifo_access_skips_readiness_poll() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            bus.write_tx_fifo(&[1, 2, 3]).await.unwrap();

            let mut buf = [0u8; 2];
            bus.inner().queue_fifo_data(&[9, 8]);
            bus.read_rx_fifo(&mut buf).await.unwrap();

            assert_eq!(bus.inner().poll_count(), 0);
            assert_eq!(buf, [9, 8]);
            assert_eq!(bus.inner().writes()[0].as_slice(), &[WRITE_TX_FIFO, 1, 2, 3]);
            assert_eq!(bus.inner().read_cmds().as_slice(), &[READ_RX_FIFO]);
        });
    }
}
