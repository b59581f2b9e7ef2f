use super::{marker, ReadError};
use crate::{Mapping, Value};

/// Cursor over a borrowed byte slice.
///
/// Every read checks the remaining length first, so a truncated input fails
/// with [`ReadError::EndOfInput`] instead of allocating or panicking.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Succeeds only when the whole input has been consumed.
    pub fn finish(&self) -> Result<(), ReadError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(ReadError::TrailingBytes { remaining }),
        }
    }

    pub fn u8(&mut self) -> Result<u8, ReadError> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or(ReadError::EndOfInput { offset: self.pos })?;
        self.pos += 1;
        Ok(b)
    }

    pub fn bool(&mut self) -> Result<bool, ReadError> {
        let offset = self.pos;
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(ReadError::InvalidBool { byte, offset }),
        }
    }

    pub fn varint(&mut self) -> Result<u64, ReadError> {
        let offset = self.pos;
        let mut result = 0u64;
        for i in 0..10 {
            let b = self.u8()?;
            if i == 9 && b > 0x01 {
                return Err(ReadError::VarintOverflow { offset });
            }
            result |= u64::from(b & 0x7f) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(ReadError::VarintOverflow { offset })
    }

    pub fn zigzag(&mut self) -> Result<i64, ReadError> {
        let n = self.varint()?;
        Ok(((n >> 1) as i64) ^ -((n & 1) as i64))
    }

    pub fn f64(&mut self) -> Result<f64, ReadError> {
        let raw = self.raw(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        Ok(f64::from_le_bytes(buf))
    }

    /// Reads a varint length and checks it against the remaining input.
    pub fn length(&mut self) -> Result<usize, ReadError> {
        let offset = self.pos;
        let len = self.varint()?;
        match usize::try_from(len) {
            Ok(len) if len <= self.remaining() => Ok(len),
            _ => Err(ReadError::EndOfInput { offset }),
        }
    }

    pub fn bytes(&mut self) -> Result<&'a [u8], ReadError> {
        let len = self.length()?;
        self.raw(len)
    }

    pub fn str(&mut self) -> Result<&'a str, ReadError> {
        let offset = self.pos;
        let raw = self.bytes()?;
        std::str::from_utf8(raw).map_err(|_| ReadError::InvalidUtf8 { offset })
    }

    pub fn raw(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        if len > self.remaining() {
            return Err(ReadError::EndOfInput {
                offset: self.data.len(),
            });
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads a value written by [`super::BinaryWriter::any`], nesting at most
    /// `max_depth` containers.
    pub fn any(&mut self, max_depth: usize) -> Result<Value, ReadError> {
        self.any_at(max_depth, 0)
    }

    fn any_at(&mut self, max_depth: usize, depth: usize) -> Result<Value, ReadError> {
        let offset = self.pos;
        let m = self.u8()?;
        Ok(match m {
            marker::NULL => Value::Null,
            marker::FALSE => Value::Bool(false),
            marker::TRUE => Value::Bool(true),
            marker::INT => Value::Int(self.zigzag()?),
            marker::REAL => Value::Real(self.f64()?),
            marker::TEXT => Value::Text(self.str()?.to_owned()),
            marker::BYTES => Value::Bytes(self.bytes()?.to_vec()),
            marker::SEQUENCE | marker::MAPPING => {
                if depth >= max_depth {
                    return Err(ReadError::TooDeep(max_depth));
                }
                // Every element takes at least one byte.
                let len = self.length()?;
                if m == marker::SEQUENCE {
                    let mut items = Vec::with_capacity(len);
                    for _ in 0..len {
                        items.push(self.any_at(max_depth, depth + 1)?);
                    }
                    Value::Sequence(items)
                } else {
                    let mut map = Mapping::with_capacity(len);
                    for _ in 0..len {
                        let k = self.any_at(max_depth, depth + 1)?;
                        let v = self.any_at(max_depth, depth + 1)?;
                        map.insert(k, v);
                    }
                    Value::Mapping(map)
                }
            }
            marker => return Err(ReadError::UnknownMarker { marker, offset }),
        })
    }
}
