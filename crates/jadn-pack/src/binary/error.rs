use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("unexpected end of input at offset {offset}")]
    EndOfInput { offset: usize },
    #[error("varint at offset {offset} is longer than 64 bits")]
    VarintOverflow { offset: usize },
    #[error("invalid boolean byte 0x{byte:02x} at offset {offset}")]
    InvalidBool { byte: u8, offset: usize },
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("unknown value marker 0x{marker:02x} at offset {offset}")]
    UnknownMarker { marker: u8, offset: usize },
    #[error("{remaining} trailing bytes after value")]
    TrailingBytes { remaining: usize },
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}
