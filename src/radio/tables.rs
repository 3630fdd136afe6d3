//! Generated radio configuration tables
//!
//! Byte tables produced by the Wireless Development Suite for the
//! Si4455, replayed verbatim at bring-up. Record format:
//! `[length][opcode][args…]…` terminated by a zero-length record; the
//! oversized WRITE_TX_FIFO records carry the EZConfig array upload.
//!
//! Do not edit the byte data; regenerate it instead.

/// Si4455 Rev B1, OOK, bidirectional packet, variable length.
///
/// Crystal 30 MHz, RF 433.25 MHz, Rsymb 38400 sps, RX BW 200 kHz.
pub const OOK_BIDIRECTIONAL_VARIABLE: &[u8] = &[
    // RF_POWER_UP
    0x07, 0x02, 0x01, 0x00, 0x01, 0xC9, 0xC3, 0x80,
    // RF_INT_CTL_ENABLE_2
    0x06, 0x11, 0x01, 0x02, 0x00, 0x01, 0x38,
    // RF_FRR_CTL_A_MODE_4
    0x08, 0x11, 0x02, 0x04, 0x00, 0x08, 0x06, 0x04, 0x0A,
    // RF_EZCONFIG_XO_TUNE_1
    0x05, 0x11, 0x24, 0x01, 0x03, 0x45,
    // RF_WRITE_TX_FIFO
    0x72, 0x66, 0xE8, 0x68, 0xF9, 0xB1, 0x39, 0x05, 0x81, 0x11, 0x9E, 0x2A, 0x92, 0x63, 0x00,
    0xB3, 0x4F, 0xAA, 0xA6, 0x24, 0x2B, 0x40, 0x9A, 0x1B, 0xEE, 0x5E, 0x6E, 0x2E, 0xAE, 0xA3,
    0xD9, 0x1D, 0xB6, 0x53, 0xA1, 0x21, 0xD4, 0x91, 0xFE, 0x49, 0xF9, 0xCC, 0x43, 0x4B, 0x14,
    0x15, 0xC2, 0x75, 0xE6, 0xCB, 0x9D, 0xF3, 0xCA, 0x2B, 0xB8, 0xA0, 0x78, 0xED, 0x25, 0xF4,
    0x07, 0xE1, 0xAC, 0xEF, 0xBA, 0x48, 0xAD, 0x2E, 0x58, 0x6D, 0xB6, 0xD0, 0x55, 0xB7, 0xE6,
    0xC3, 0xF7, 0x17, 0x47, 0x1E, 0xE1, 0x20, 0x82, 0xC7, 0xB6, 0xA2, 0xCF, 0x66, 0x58, 0x25,
    0xF0, 0xDE, 0x35, 0xE1, 0x3B, 0x39, 0x71, 0xAB, 0xA4, 0x4A, 0xDA, 0x1A, 0x79, 0x39, 0xDA,
    0xC2, 0xB7, 0xC9, 0x5D, 0xD0, 0x23, 0xEF, 0xB7, 0x91, 0x7F,
    // RF_NOP
    0x01, 0x00,
    // RF_WRITE_TX_FIFO
    0x70, 0x66, 0xDB, 0x76, 0x24, 0x87, 0x1D, 0x70, 0xB6, 0x18, 0xC8, 0xDD, 0x22, 0x81, 0xC5,
    0xAD, 0x9F, 0xCD, 0x13, 0xEF, 0x79, 0x8A, 0xC4, 0x84, 0xC9, 0x75, 0xB3, 0xDE, 0xEF, 0x7B,
    0x64, 0x78, 0xA6, 0x03, 0x94, 0x1E, 0x76, 0xB6, 0xC9, 0x2A, 0xF5, 0xCA, 0x43, 0x1C, 0xEA,
    0xC3, 0xDB, 0x73, 0xA9, 0x2F, 0x18, 0x9C, 0xA8, 0x4C, 0x92, 0xEA, 0x7F, 0x8F, 0x28, 0xF5,
    0x68, 0xB5, 0xCC, 0x31, 0xA4, 0x86, 0xCD, 0x98, 0x5E, 0x6C, 0xAB, 0xB3, 0xF8, 0x4E, 0x34,
    0x34, 0xA9, 0xBA, 0x40, 0x3D, 0x91, 0x19, 0x38, 0xE7, 0x6D, 0xC4, 0xFD, 0xBE, 0x2C, 0x97,
    0x98, 0x03, 0xED, 0xFB, 0x29, 0x8B, 0x62, 0xEB, 0x3D, 0x95, 0x5F, 0x42, 0x40, 0x2E, 0xC8,
    0xAF, 0x56, 0x38, 0xC7, 0xF9, 0x8A, 0x02, 0x9A,
    // RF_EZCONFIG_CHECK
    0x03, 0x19, 0x98, 0x11,
    // RF_GPIO_PIN_CFG
    0x08, 0x13, 0x04, 0x10, 0x00, 0x01, 0x00, 0x00, 0x00,
    // terminator
    0x00,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::radio::commands;

    /// Walk the record framing without touching a bus.
    #[test]
    fn test_table_framing_is_well_formed() {
        let table = OOK_BIDIRECTIONAL_VARIABLE;
        let mut offset = 0;
        let mut records = 0;

        loop {
            let count = table[offset] as usize;
            if count == 0 {
                break;
            }
            let opcode = table[offset + 1];
            if count > config::bus::CMD_MAX_LEN {
                assert!(count <= 127);
                assert_eq!(opcode, commands::WRITE_TX_FIFO);
            }
            offset += 1 + count;
            records += 1;
            assert!(offset < table.len());
        }

        assert_eq!(offset, table.len() - 1);
        assert_eq!(records, 9);
    }
}
