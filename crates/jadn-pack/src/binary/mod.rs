//! Compact binary primitives.
//!
//! Encoding rules:
//! - unsigned varint: 7 bits per byte, little-endian groups, high bit = more
//! - signed integer: zigzag, then unsigned varint
//! - real: 8 bytes IEEE 754 little-endian
//! - bytes/string: varint(length) + raw bytes
//! - self-describing value: one marker byte followed by the payload

mod error;
mod reader;
mod writer;

pub use error::ReadError;
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Markers of the self-describing encoding written by [`BinaryWriter::any`].
pub(crate) mod marker {
    pub const NULL: u8 = 0x00;
    pub const FALSE: u8 = 0x01;
    pub const TRUE: u8 = 0x02;
    pub const INT: u8 = 0x03;
    pub const REAL: u8 = 0x04;
    pub const TEXT: u8 = 0x05;
    pub const BYTES: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x07;
    pub const MAPPING: u8 = 0x08;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mapping, Value};

    #[test]
    fn varint_boundaries() {
        for n in [0u64, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut w = BinaryWriter::new();
            w.varint(n);
            let bytes = w.into_bytes();
            let mut r = BinaryReader::new(&bytes);
            assert_eq!(r.varint().unwrap(), n);
            assert!(r.finish().is_ok());
        }
    }

    #[test]
    fn zigzag_small_values_are_one_byte() {
        let mut w = BinaryWriter::new();
        w.zigzag(-1);
        w.zigzag(1);
        w.zigzag(-64);
        assert_eq!(w.as_slice(), &[0x01, 0x02, 0x7f]);
    }

    #[test]
    fn zigzag_extremes() {
        for n in [i64::MIN, i64::MAX, 0, -1] {
            let mut w = BinaryWriter::new();
            w.zigzag(n);
            let bytes = w.into_bytes();
            assert_eq!(BinaryReader::new(&bytes).zigzag().unwrap(), n);
        }
    }

    #[test]
    fn truncated_string_is_end_of_input() {
        let mut w = BinaryWriter::new();
        w.str("hello");
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes[..3]);
        assert!(matches!(r.str(), Err(ReadError::EndOfInput { .. })));
    }

    #[test]
    fn overlong_varint_is_rejected() {
        let bytes = [0xff; 11];
        let mut r = BinaryReader::new(&bytes);
        assert!(matches!(r.varint(), Err(ReadError::VarintOverflow { .. })));
    }

    #[test]
    fn any_round_trip() {
        let mut m = Mapping::new();
        m.insert(Value::from("k"), Value::Sequence(vec![Value::Null, Value::Bool(true)]));
        m.insert(Value::Int(7), Value::Bytes(vec![1, 2, 3]));
        let v = Value::Sequence(vec![
            Value::Real(1.5),
            Value::Int(-42),
            Value::from("text"),
            Value::Mapping(m),
        ]);
        let mut w = BinaryWriter::new();
        w.any(&v);
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(r.any(16).unwrap(), v);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn any_respects_depth_limit() {
        let mut v = Value::Null;
        for _ in 0..10 {
            v = Value::Sequence(vec![v]);
        }
        let mut w = BinaryWriter::new();
        w.any(&v);
        let bytes = w.into_bytes();
        assert!(matches!(
            BinaryReader::new(&bytes).any(4),
            Err(ReadError::TooDeep(4))
        ));
    }

    #[test]
    fn trailing_bytes_are_reported() {
        let bytes = [0x02, 0x00];
        let mut r = BinaryReader::new(&bytes);
        r.zigzag().unwrap();
        assert_eq!(r.finish(), Err(ReadError::TrailingBytes { remaining: 1 }));
    }
}
