//! Configuration replay
//!
//! Brings the chip into an operating state by replaying a generated
//! command table: `[length][opcode][args…]…` terminated by a zero-length
//! record. Records longer than the 16-byte command staging limit are only
//! legal as FIFO-write payload streams (the EZConfig array upload), which
//! bypass staging and go straight out through the ready-polled bulk path.
//!
//! The replay aborts on the first failure and leaves the chip
//! unconfigured; re-running it from the start is always safe.

use crate::bus::traits::{BusError, RadioBus};
use crate::bus::transport::CommandBus;
use crate::config;
use crate::radio::commands;

/// Errors raised while replaying a configuration table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Bus transport failure
    Bus(BusError),
    /// Record exceeds the command staging limit and is not a FIFO stream
    CommandTooLong(u8),
    /// EZConfig verification reported a checksum mismatch
    ChecksumMismatch,
    /// Chip flagged a command error mid-replay (pending bits attached)
    ChipError(u8),
    /// Table ended without a zero-length terminator
    Truncated,
    /// Configuration table could not be fetched
    Unavailable,
}

impl From<BusError> for ConfigError {
    fn from(err: BusError) -> Self {
        ConfigError::Bus(err)
    }
}

/// Supplier of the configuration table, re-fetched on every recovery
pub trait ConfigSource {
    fn table(&mut self) -> Result<&[u8], ConfigError>;
}

/// Configuration table compiled into the firmware image
pub struct StaticConfig(pub &'static [u8]);

impl ConfigSource for StaticConfig {
    fn table(&mut self) -> Result<&[u8], ConfigError> {
        Ok(self.0)
    }
}

/// Replay `table` through the command bus.
pub async fn replay<B: RadioBus>(
    bus: &mut CommandBus<B>,
    table: &[u8],
) -> Result<(), ConfigError> {
    let mut cursor = table;

    loop {
        let (&count, rest) = cursor.split_first().ok_or(ConfigError::Truncated)?;
        if count == 0 {
            return Ok(());
        }

        let count = count as usize;
        if rest.len() < count {
            return Err(ConfigError::Truncated);
        }
        let opcode = rest[0];
        log::trace!("config record: opcode 0x{:02x}, {} bytes", opcode, count);

        if count > config::bus::CMD_MAX_LEN {
            if count <= 127 && opcode == commands::WRITE_TX_FIFO {
                // EZConfig payload stream: too large for command staging,
                // pushed through the bulk FIFO path instead.
                bus.write_data(commands::WRITE_TX_FIFO, true, &rest[1..count])
                    .await?;
                cursor = &rest[count..];
                continue;
            }
            return Err(ConfigError::CommandTooLong(count as u8));
        }

        let mut response = [0u8; 1];
        bus.send_command_get_response(&rest[..count], &mut response)
            .await?;

        if opcode == commands::EZCONFIG_CHECK && response[0] != 0 {
            log::error!("EZConfig check failed (0x{:02x})", response[0]);
            return Err(ConfigError::ChecksumMismatch);
        }

        let status = bus.interrupt_status(0, 0, 0).await?;
        if status.chip_pend & commands::irq::CHIP_ERROR != 0 {
            log::error!("chip error during configuration (0x{:02x})", status.chip_pend);
            return Err(ConfigError::ChipError(status.chip_pend));
        }

        cursor = &rest[count..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::traits::mock::MockRadioBus;

    const POWER_UP: [u8; 8] = [0x07, 0x02, 0x01, 0x00, 0x01, 0xC9, 0xC3, 0x80];

    /// Script one staged record: command reply byte + clean interrupt status.
    fn queue_record_replies(bus: &CommandBus<MockRadioBus>, response: u8, chip_pend: u8) {
        bus.inner().queue_reply(&[response]);
        bus.inner()
            .queue_reply(&[0, 0, 0, 0, 0, 0, chip_pend, 0]);
    }

    #[test]
    fn test_power_up_then_terminator_succeeds() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            queue_record_replies(&bus, 0x00, 0x00);

            let mut table = heapless::Vec::<u8, 16>::new();
            table.extend_from_slice(&POWER_UP).unwrap();
            table.push(0x00).unwrap();

            replay(&mut bus, &table).await.unwrap();

            let writes = bus.inner().writes();
            assert_eq!(writes.len(), 2);
            assert_eq!(writes[0].as_slice(), &POWER_UP[1..]);
            assert_eq!(writes[1][0], commands::GET_INT_STATUS);
        });
    }

    #[test]
    fn test_records_consumed_in_order() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            queue_record_replies(&bus, 0x00, 0x00);
            queue_record_replies(&bus, 0x00, 0x00);

            let table = [0x02, 0x34, 0x03, 0x02, 0x34, 0x01, 0x00];
            replay(&mut bus, &table).await.unwrap();

            let writes = bus.inner().writes();
            assert_eq!(writes.len(), 4);
            assert_eq!(writes[0].as_slice(), &[0x34, 0x03]);
            assert_eq!(writes[2].as_slice(), &[0x34, 0x01]);
        });
    }

    #[test]
    fn test_bulk_fifo_record_streams_payload() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            // 32-byte record: WRITE_TX_FIFO plus 31 payload bytes
            let mut table = heapless::Vec::<u8, 64>::new();
            table.push(32).unwrap();
            table.push(commands::WRITE_TX_FIFO).unwrap();
            for i in 0..31 {
                table.push(i as u8).unwrap();
            }
            table.push(0x00).unwrap();

            replay(&mut bus, &table).await.unwrap();

            let writes = bus.inner().writes();
            assert_eq!(writes.len(), 1);
            assert_eq!(writes[0][0], commands::WRITE_TX_FIFO);
            assert_eq!(writes[0].len(), 32);
            assert_eq!(writes[0][1..4], [0, 1, 2]);
            // Bulk path is ready-polled but skips the interrupt check
            assert_eq!(bus.inner().poll_count(), 1);
        });
    }

    #[test]
    fn test_oversized_non_fifo_record_rejected() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            let mut table = heapless::Vec::<u8, 64>::new();
            table.push(20).unwrap();
            table.push(0x11).unwrap();
            for _ in 0..19 {
                table.push(0xEE).unwrap();
            }
            table.push(0x00).unwrap();

            let ret = replay(&mut bus, &table).await;
            assert_eq!(ret, Err(ConfigError::CommandTooLong(20)));
            assert!(bus.inner().writes().is_empty());
        });
    }

    #[test]
    fn test_ezconfig_check_mismatch_aborts() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            queue_record_replies(&bus, 0x02, 0x00);

            let table = [0x03, commands::EZCONFIG_CHECK, 0x98, 0x11, 0x00];
            let ret = replay(&mut bus, &table).await;
            assert_eq!(ret, Err(ConfigError::ChecksumMismatch));
        });
    }

    #[test]
    fn test_chip_error_pending_aborts() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            queue_record_replies(&bus, 0x00, commands::irq::CHIP_ERROR);

            let mut table = heapless::Vec::<u8, 16>::new();
            table.extend_from_slice(&POWER_UP).unwrap();
            table.push(0x00).unwrap();

            let ret = replay(&mut bus, &table).await;
            assert_eq!(ret, Err(ConfigError::ChipError(commands::irq::CHIP_ERROR)));
        });
    }

    #[test]
    fn test_missing_terminator_detected() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            queue_record_replies(&bus, 0x00, 0x00);

            let table = [0x02, 0x34, 0x03];
            let ret = replay(&mut bus, &table).await;
            assert_eq!(ret, Err(ConfigError::Truncated));
        });
    }

    #[test]
    fn test_full_generated_table_replays() {
        let mut bus = CommandBus::new(MockRadioBus::new());

        futures::executor::block_on(async {
            // Seven staged records in the generated table; the two FIFO
            // streams consume no replies.
            for _ in 0..7 {
                queue_record_replies(&bus, 0x00, 0x00);
            }

            replay(&mut bus, crate::radio::tables::OOK_BIDIRECTIONAL_VARIABLE)
                .await
                .unwrap();
        });
    }
}
