use super::marker;
use crate::Value;

/// Append-only binary writer.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn u8(&mut self, b: u8) {
        self.buf.push(b);
    }

    pub fn bool(&mut self, b: bool) {
        self.buf.push(u8::from(b));
    }

    /// Unsigned LEB128-style varint.
    pub fn varint(&mut self, mut n: u64) {
        loop {
            let low7 = (n & 0x7f) as u8;
            n >>= 7;
            if n == 0 {
                self.buf.push(low7);
                return;
            }
            self.buf.push(low7 | 0x80);
        }
    }

    /// Zigzag-encoded signed varint.
    pub fn zigzag(&mut self, n: i64) {
        self.varint(((n << 1) ^ (n >> 63)) as u64);
    }

    pub fn f64(&mut self, f: f64) {
        self.buf.extend_from_slice(&f.to_le_bytes());
    }

    /// Length-prefixed byte string.
    pub fn bytes(&mut self, data: &[u8]) {
        self.varint(data.len() as u64);
        self.buf.extend_from_slice(data);
    }

    /// Length-prefixed UTF-8 string.
    pub fn str(&mut self, s: &str) {
        self.bytes(s.as_bytes());
    }

    /// Raw bytes with no prefix.
    pub fn raw(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Writes any value in the self-describing encoding.
    pub fn any(&mut self, value: &Value) {
        match value {
            Value::Null => self.u8(marker::NULL),
            Value::Bool(false) => self.u8(marker::FALSE),
            Value::Bool(true) => self.u8(marker::TRUE),
            Value::Int(n) => {
                self.u8(marker::INT);
                self.zigzag(*n);
            }
            Value::Real(f) => {
                self.u8(marker::REAL);
                self.f64(*f);
            }
            Value::Text(s) => {
                self.u8(marker::TEXT);
                self.str(s);
            }
            Value::Bytes(b) => {
                self.u8(marker::BYTES);
                self.bytes(b);
            }
            Value::Sequence(items) => {
                self.u8(marker::SEQUENCE);
                self.varint(items.len() as u64);
                for item in items {
                    self.any(item);
                }
            }
            Value::Mapping(m) => {
                self.u8(marker::MAPPING);
                self.varint(m.len() as u64);
                for (k, v) in m {
                    self.any(k);
                    self.any(v);
                }
            }
        }
    }
}
