//! HPACK prefix integers (RFC 7541 Section 5.1).

use crate::error::{ErrorCode, H2Error};

/// Continuation bytes beyond this shift cannot contribute to a `u32` value.
const MAX_SHIFT: u32 = 56;

/// A read position over a field block.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    pub fn next_byte(&mut self) -> Result<u8, H2Error> {
        let b = self.peek().ok_or_else(truncated)?;
        self.pos += 1;
        Ok(b)
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], H2Error> {
        if self.remaining() < len {
            return Err(truncated());
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

fn truncated() -> H2Error {
    H2Error::connection(ErrorCode::CompressionError, "Truncated field block")
}

/// Read an integer whose first `n` bits live in the low bits of `prefix`.
pub fn read_int(n: u8, prefix: u8, cursor: &mut Cursor<'_>) -> Result<u32, H2Error> {
    debug_assert!((1..=8).contains(&n));
    let mask = ((1u16 << n) - 1) as u8;
    let mut value = u64::from(prefix & mask);
    if value < u64::from(mask) {
        return Ok(value as u32);
    }

    let mut shift = 0u32;
    loop {
        let b = cursor.next_byte()?;
        value += u64::from(b & 0x7f) << shift;
        if value > u64::from(u32::MAX) {
            return Err(H2Error::connection(
                ErrorCode::CompressionError,
                "Integer overflow",
            ));
        }
        if b & 0x80 == 0 {
            return Ok(value as u32);
        }
        shift += 7;
        if shift > MAX_SHIFT {
            return Err(H2Error::connection(
                ErrorCode::CompressionError,
                "Integer encoding too long",
            ));
        }
    }
}

/// Write `value` with an `n`-bit prefix; `pattern` supplies the high bits of the first byte.
pub fn write_int(n: u8, pattern: u8, value: u32, out: &mut Vec<u8>) {
    debug_assert!((1..=8).contains(&n));
    let max = (1u32 << n) - 1;
    if value < max {
        out.push(pattern | value as u8);
        return;
    }
    out.push(pattern | max as u8);
    let mut remaining = value - max;
    while remaining >= 0x80 {
        out.push(0x80 | (remaining & 0x7f) as u8);
        remaining >>= 7;
    }
    out.push(remaining as u8);
}
