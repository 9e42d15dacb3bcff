// Fixed-width hexadecimal fields used by the droid wire format
//
// Every field is uppercase, zero-padded and exactly `width` digits long.
// Values that do not fit are rejected, never truncated.

use crate::error::{DecodeError, EncodingOverflowError};

/// Width of byte-range fields (speed, ramp, offset)
pub const BYTE_WIDTH: usize = 2;

/// Width of the start delay field
pub const DELAY_WIDTH: usize = 4;

/// Largest value representable in `width` hex digits
pub fn field_max(width: usize) -> u32 {
    match 16u64.checked_pow(width as u32) {
        Some(limit) if limit <= u64::from(u32::MAX) => (limit - 1) as u32,
        _ => u32::MAX,
    }
}

/// Encode `value` as exactly `width` zero-padded hex digits
pub fn encode_hex(value: u32, width: usize) -> Result<String, EncodingOverflowError> {
    if value > field_max(width) {
        return Err(EncodingOverflowError { value, width });
    }
    Ok(format!("{:0width$X}", value, width = width))
}

/// Decode a hex field (either case)
pub fn decode_hex(field: &str) -> Result<u32, DecodeError> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::MalformedHex(field.to_string()));
    }
    u32::from_str_radix(field, 16).map_err(|_| DecodeError::MalformedHex(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_padding() {
        assert_eq!(encode_hex(0, 2).unwrap(), "00");
        assert_eq!(encode_hex(0x30, 2).unwrap(), "30");
        assert_eq!(encode_hex(5, 4).unwrap(), "0005");
        assert_eq!(encode_hex(160, 2).unwrap(), "A0");
    }

    #[test]
    fn test_field_limits() {
        assert_eq!(field_max(1), 0xF);
        assert_eq!(field_max(BYTE_WIDTH), 0xFF);
        assert_eq!(field_max(DELAY_WIDTH), 0xFFFF);
        assert_eq!(field_max(8), u32::MAX);
        assert_eq!(field_max(12), u32::MAX);

        assert_eq!(encode_hex(0xFF, 2).unwrap(), "FF");
        assert_eq!(encode_hex(0xFFFF, 4).unwrap(), "FFFF");
    }

    #[test]
    fn test_overflow_rejected() {
        // A ramp of 300 needs three digits
        assert_eq!(
            encode_hex(300, 2),
            Err(EncodingOverflowError {
                value: 300,
                width: 2
            })
        );
        assert!(encode_hex(0x10000, 4).is_err());
        assert!(encode_hex(1, 0).is_err());
    }

    #[test]
    fn test_round_trip_every_field_width() {
        for width in [1, BYTE_WIDTH, DELAY_WIDTH] {
            for value in 0..=field_max(width) {
                let encoded = encode_hex(value, width).unwrap();
                assert_eq!(encoded.len(), width);
                assert_eq!(decode_hex(&encoded).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_first_value_past_each_width_rejected() {
        for width in [1, BYTE_WIDTH, DELAY_WIDTH] {
            let value = field_max(width) + 1;
            assert_eq!(
                encode_hex(value, width),
                Err(EncodingOverflowError { value, width })
            );
        }
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        assert_eq!(decode_hex("a0").unwrap(), 160);
        assert_eq!(decode_hex("A0").unwrap(), 160);
        assert_eq!(decode_hex("fFfF").unwrap(), 0xFFFF);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_hex("").is_err());
        assert!(decode_hex("+1").is_err());
        assert!(decode_hex("0G").is_err());
    }
}
