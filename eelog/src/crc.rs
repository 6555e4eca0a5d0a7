//! CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF, no reflection, no final xor).
//!
//! Computed without a table by folding each byte through the polynomial nibble-wise,
//! which keeps the flash footprint at a few instructions per byte.

pub const CRC16_INIT: u16 = 0xFFFF;

/// Checksum of `bytes`.
pub fn crc16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(CRC16_INIT, |crc, &byte| update(crc, byte))
}

#[inline]
fn update(crc: u16, byte: u8) -> u16 {
    let mut x = (crc >> 8) as u8 ^ byte;
    x ^= x >> 4;
    let x = u16::from(x);
    (crc << 8) ^ (x << 12) ^ (x << 5) ^ x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn empty_input_is_init() {
        assert_eq!(crc16(&[]), CRC16_INIT);
    }

    #[test]
    fn known_records() {
        assert_eq!(crc16(b"Boot\0"), 0xBA1C);
        assert_eq!(crc16(b"A"), 0xB915);
    }

    #[test]
    fn appending_crc_big_endian_leaves_zero_residue() {
        let mut buf = *b"D1: on\0\0\0";
        let crc = crc16(&buf[..7]);
        buf[7..].copy_from_slice(&crc.to_be_bytes());
        assert_eq!(crc16(&buf), 0);
    }
}
