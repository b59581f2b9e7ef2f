//! Compact-binary backend.
//!
//! The walker supplies all structure, so only leaves and counts reach the
//! wire:
//!
//! - Boolean: one byte, Integer: zigzag varint, Number: f64 little-endian
//! - String and Binary: varint length + bytes
//! - arrays and maps: varint element count
//! - optional positional slot: presence byte `0` or `1`
//! - map keys: varint `2*tag` for a tag, varint `2*len+1` + UTF-8 for text
//! - undeclared entries of open types: the self-describing encoding

use jadn_pack::{BinaryReader, BinaryWriter, Value};

use super::decode::Decoder;
use super::encode::Encoder;
use super::{Fault, WireKey};
use crate::format::BinaryText;

#[derive(Default)]
pub(crate) struct BinaryEncoder {
    w: BinaryWriter,
}

impl BinaryEncoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.w.into_bytes()
    }
}

impl Encoder for BinaryEncoder {
    fn slot(&mut self, present: bool) {
        self.w.bool(present);
    }

    fn boolean(&mut self, b: bool) {
        self.w.bool(b);
    }

    fn integer(&mut self, n: i64) {
        self.w.zigzag(n);
    }

    fn number(&mut self, x: f64) -> Result<(), Fault> {
        self.w.f64(x);
        Ok(())
    }

    fn string(&mut self, s: &str) {
        self.w.str(s);
    }

    fn binary(&mut self, b: &[u8], _text: BinaryText) -> Result<(), Fault> {
        self.w.bytes(b);
        Ok(())
    }

    fn begin_array(&mut self, len: usize) {
        self.w.varint(len as u64);
    }

    fn end_array(&mut self) {}

    fn begin_map(&mut self, len: usize) {
        self.w.varint(len as u64);
    }

    fn key(&mut self, key: WireKey) -> Result<(), Fault> {
        match key {
            WireKey::Tag(t) => {
                let wire = t
                    .checked_mul(2)
                    .ok_or_else(|| Fault::invalid(format!("tag {t} is too large")))?;
                self.w.varint(wire);
            }
            WireKey::Text(s) => {
                self.w.varint(s.len() as u64 * 2 + 1);
                self.w.raw(s.as_bytes());
            }
        }
        Ok(())
    }

    fn end_map(&mut self) {}

    fn any(&mut self, value: &Value, max_depth: usize) -> Result<(), Fault> {
        if value.nests_deeper_than(max_depth) {
            return Err(Fault::TooDeep);
        }
        self.w.any(value);
        Ok(())
    }
}

pub(crate) struct BinaryDecoder<'a> {
    r: BinaryReader<'a>,
}

impl<'a> BinaryDecoder<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self {
            r: BinaryReader::new(input),
        }
    }
}

impl Decoder for BinaryDecoder<'_> {
    fn slot(&mut self) -> Result<bool, Fault> {
        Ok(self.r.bool()?)
    }

    fn boolean(&mut self) -> Result<bool, Fault> {
        Ok(self.r.bool()?)
    }

    fn integer(&mut self) -> Result<i64, Fault> {
        Ok(self.r.zigzag()?)
    }

    fn number(&mut self) -> Result<f64, Fault> {
        Ok(self.r.f64()?)
    }

    fn string(&mut self) -> Result<String, Fault> {
        Ok(self.r.str()?.to_owned())
    }

    fn binary(&mut self, _text: BinaryText) -> Result<Vec<u8>, Fault> {
        Ok(self.r.bytes()?.to_vec())
    }

    // Counts are bounded by the remaining input: every element takes a byte.
    fn begin_array(&mut self) -> Result<usize, Fault> {
        Ok(self.r.length()?)
    }

    fn end_array(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn begin_map(&mut self) -> Result<usize, Fault> {
        Ok(self.r.length()?)
    }

    fn key(&mut self) -> Result<WireKey, Fault> {
        let offset = self.r.position();
        let head = self.r.varint()?;
        if head & 1 == 0 {
            return Ok(WireKey::Tag(head >> 1));
        }
        let len = usize::try_from(head >> 1)
            .map_err(|_| Fault::invalid(format!("key length at offset {offset} is too large")))?;
        let raw = self.r.raw(len)?;
        let s = std::str::from_utf8(raw)
            .map_err(|_| Fault::invalid(format!("invalid UTF-8 in key at offset {offset}")))?;
        Ok(WireKey::Text(s.to_owned()))
    }

    fn end_map(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn any(&mut self, max_depth: usize) -> Result<Value, Fault> {
        Ok(self.r.any(max_depth)?)
    }

    fn finish(&mut self) -> Result<(), Fault> {
        Ok(self.r.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_spelling() {
        let mut e = BinaryEncoder::new();
        e.key(WireKey::Tag(3)).unwrap();
        e.key(WireKey::Text("ab".into())).unwrap();
        let bytes = e.into_bytes();
        assert_eq!(bytes, vec![6, 5, b'a', b'b']);

        let mut d = BinaryDecoder::new(&bytes);
        assert_eq!(d.key().unwrap(), WireKey::Tag(3));
        assert_eq!(d.key().unwrap(), WireKey::Text("ab".into()));
        d.finish().unwrap();
    }

    #[test]
    fn oversized_tag_is_rejected() {
        let mut e = BinaryEncoder::new();
        assert!(matches!(e.key(WireKey::Tag(u64::MAX)), Err(Fault::Invalid(_))));
    }

    #[test]
    fn count_beyond_input_is_end_of_input() {
        // Claims a million elements with nothing behind them.
        let bytes = [0xc0, 0x84, 0x3d];
        let mut d = BinaryDecoder::new(&bytes);
        assert!(matches!(d.begin_array(), Err(Fault::Invalid(_))));
    }

    #[test]
    fn presence_byte_must_be_boolean() {
        let mut d = BinaryDecoder::new(&[2]);
        assert!(matches!(d.slot(), Err(Fault::Invalid(_))));
    }
}
