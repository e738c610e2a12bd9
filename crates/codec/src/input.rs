//! Reader for data produced by [`VariableByteOutput`](crate::VariableByteOutput).

use crate::error::CodecError;
use crate::{MAX_INT_BYTES, MAX_LONG_BYTES, MAX_SHORT_BYTES};

/// Cursor over an encoded byte slice.
#[derive(Debug, Clone)]
pub struct VariableByteInput<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> VariableByteInput<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    pub fn available(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn read_byte(&mut self) -> Result<u8, CodecError> {
        let b = *self
            .data
            .get(self.position)
            .ok_or(CodecError::UnexpectedEof {
                position: self.position,
                needed: 1,
            })?;
        self.position += 1;
        Ok(b)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.available() < len {
            return Err(CodecError::UnexpectedEof {
                position: self.position,
                needed: len - self.available(),
            });
        }
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    pub fn skip_bytes(&mut self, len: usize) -> Result<(), CodecError> {
        self.read_bytes(len).map(|_| ())
    }

    /// Skips one varint of any width without decoding it.
    pub fn skip_varint(&mut self) -> Result<(), CodecError> {
        self.read_varint(MAX_LONG_BYTES, 64).map(|_| ())
    }

    pub fn read_short(&mut self) -> Result<u16, CodecError> {
        self.read_varint(MAX_SHORT_BYTES, 16).map(|v| v as u16)
    }

    pub fn read_int(&mut self) -> Result<u32, CodecError> {
        self.read_varint(MAX_INT_BYTES, 32).map(|v| v as u32)
    }

    pub fn read_long(&mut self) -> Result<u64, CodecError> {
        self.read_varint(MAX_LONG_BYTES, 64)
    }

    /// Reads 4 bytes, least-significant byte first.
    pub fn read_fixed_int(&mut self) -> Result<u32, CodecError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads 8 bytes, most-significant byte first.
    pub fn read_fixed_long(&mut self) -> Result<u64, CodecError> {
        let bytes = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    /// Reads a length-prefixed UTF-8 string without copying.
    pub fn read_utf(&mut self) -> Result<&'a str, CodecError> {
        let len = self.read_int()? as usize;
        let start = self.position;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { position: start })
    }

    fn read_varint(&mut self, max_bytes: usize, bits: u32) -> Result<u64, CodecError> {
        let start = self.position;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;

        for _ in 0..max_bytes {
            let byte = self.read_byte()?;
            let payload = (byte & 0x7F) as u64;
            if bits - shift < 7 && payload >> (bits - shift) != 0 {
                return Err(CodecError::VarIntOverflow {
                    position: start,
                    bits,
                });
            }
            result |= payload << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }

        Err(CodecError::VarIntTooLong {
            position: start,
            max_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VariableByteOutput;

    #[test]
    fn test_int_roundtrip_samples() {
        let samples = [0u32, 1, 127, 128, 16_383, 16_384, 2_097_151, 1 << 28, u32::MAX];
        let mut out = VariableByteOutput::new();
        for v in samples {
            out.write_int(v);
        }
        let mut input = VariableByteInput::new(out.data());
        for v in samples {
            assert_eq!(input.read_int().unwrap(), v);
        }
        assert!(input.is_exhausted());
    }

    #[test]
    fn test_long_and_short_roundtrip() {
        let mut out = VariableByteOutput::new();
        out.write_long(u64::MAX);
        out.write_long(1 << 35);
        out.write_short(300);
        let mut input = VariableByteInput::new(out.data());
        assert_eq!(input.read_long().unwrap(), u64::MAX);
        assert_eq!(input.read_long().unwrap(), 1 << 35);
        assert_eq!(input.read_short().unwrap(), 300);
    }

    #[test]
    fn test_fixed_width_roundtrip() {
        let mut out = VariableByteOutput::new();
        out.write_fixed_int(0xDEADBEEF);
        out.write_fixed_long(0x0102030405060708);
        let mut input = VariableByteInput::new(out.data());
        assert_eq!(input.read_fixed_int().unwrap(), 0xDEADBEEF);
        assert_eq!(input.read_fixed_long().unwrap(), 0x0102030405060708);
    }

    #[test]
    fn test_truncated_varint_is_eof() {
        let mut input = VariableByteInput::new(&[0x80, 0x80]);
        assert_eq!(
            input.read_int(),
            Err(CodecError::UnexpectedEof {
                position: 2,
                needed: 1
            })
        );
    }

    #[test]
    fn test_varint_past_budget_is_rejected() {
        let bytes = [0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        let mut input = VariableByteInput::new(&bytes);
        assert_eq!(
            input.read_int(),
            Err(CodecError::VarIntTooLong {
                position: 0,
                max_bytes: 5
            })
        );

        // The same bytes are a valid long.
        let mut input = VariableByteInput::new(&bytes);
        assert_eq!(input.read_long().unwrap(), 0);
    }

    #[test]
    fn test_int_overflow_in_last_group() {
        let mut input = VariableByteInput::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert!(matches!(
            input.read_int(),
            Err(CodecError::VarIntOverflow { bits: 32, .. })
        ));
    }

    #[test]
    fn test_read_utf() {
        let mut out = VariableByteOutput::new();
        out.write_utf("naïve");
        out.write_utf("");
        let mut input = VariableByteInput::new(out.data());
        assert_eq!(input.read_utf().unwrap(), "naïve");
        assert_eq!(input.read_utf().unwrap(), "");
        assert_eq!(input.available(), 0);
    }

    #[test]
    fn test_read_utf_rejects_invalid_bytes() {
        let mut input = VariableByteInput::new(&[0x02, 0xC3, 0x28]);
        assert_eq!(
            input.read_utf(),
            Err(CodecError::InvalidUtf8 { position: 1 })
        );
    }

    #[test]
    fn test_skip_varint() {
        let mut out = VariableByteOutput::new();
        out.write_long(1 << 40);
        out.write_int(9);
        let mut input = VariableByteInput::new(out.data());
        input.skip_varint().unwrap();
        assert_eq!(input.read_int().unwrap(), 9);
    }
}
