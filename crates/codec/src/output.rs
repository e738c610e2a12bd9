//! Growable output buffer with variable-byte writers and backpatching.

use crate::error::CodecError;
use crate::{MAX_INT_BYTES, MAX_LONG_BYTES};

const DEFAULT_CAPACITY: usize = 9;
const CONTINUATION: u8 = 0x80;
const PAYLOAD: u64 = 0x7F;

/// A run of bytes reserved for a variable-byte 32-bit value.
///
/// Returned by [`VariableByteOutput::write_int_slot`] and
/// [`VariableByteOutput::reserve_int`]; the only way to backpatch a varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarIntSlot {
    position: usize,
    width: usize,
}

impl VarIntSlot {
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes reserved for the value.
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Four reserved bytes holding a little-endian fixed-width 32-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedIntSlot {
    position: usize,
}

impl FixedIntSlot {
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Byte buffer written with variable-byte encoded integers.
///
/// The buffer has a single writer: slots handed out by the `*_slot` methods
/// may be patched at any time before the buffer is cleared, but never
/// concurrently with appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableByteOutput {
    buf: Vec<u8>,
}

impl Default for VariableByteOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableByteOutput {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Resets the buffer to empty, keeping its allocation.
    ///
    /// Slots handed out before the call no longer refer to written bytes.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Number of bytes written so far.
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    /// Offset the next write will start at.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_short(&mut self, value: u16) {
        push_varint(&mut self.buf, value as u64);
    }

    pub fn write_int(&mut self, value: u32) {
        push_varint(&mut self.buf, value as u64);
    }

    pub fn write_long(&mut self, value: u64) {
        push_varint(&mut self.buf, value);
    }

    /// Writes exactly 4 bytes, least-significant byte first.
    pub fn write_fixed_int(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes exactly 8 bytes, most-significant byte first.
    ///
    /// The byte order is the opposite of [`write_fixed_int`](Self::write_fixed_int).
    /// Stored data relies on this, so it must stay big-endian.
    pub fn write_fixed_long(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes the UTF-8 byte length as a varint followed by the bytes.
    pub fn write_utf(&mut self, s: &str) {
        self.write_int(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Writes `placeholder` and returns a slot sized to its encoding.
    pub fn write_int_slot(&mut self, placeholder: u32) -> VarIntSlot {
        let position = self.buf.len();
        self.write_int(placeholder);
        VarIntSlot {
            position,
            width: self.buf.len() - position,
        }
    }

    /// Reserves a full-width slot able to hold any 32-bit value.
    pub fn reserve_int(&mut self) -> VarIntSlot {
        let position = self.buf.len();
        self.buf
            .extend_from_slice(&[CONTINUATION, CONTINUATION, CONTINUATION, CONTINUATION, 0]);
        VarIntSlot {
            position,
            width: MAX_INT_BYTES,
        }
    }

    /// Overwrites a reserved varint slot with `value`.
    ///
    /// The canonical encoding is written group by group starting at the slot
    /// position. If it is shorter than the slot the remaining bytes are filled
    /// with zero-payload continuation groups, so a reader consumes exactly the
    /// slot width. The buffer size never changes.
    pub fn patch_int(&mut self, slot: VarIntSlot, value: u32) -> Result<(), CodecError> {
        self.check_bounds(slot.position, slot.width)?;

        let mut encoded = [0u8; MAX_LONG_BYTES];
        let len = encode_into(&mut encoded, value as u64);
        if len > slot.width {
            return Err(CodecError::SlotTooSmall {
                position: slot.position,
                reserved: slot.width,
                required: len,
            });
        }

        let target = &mut self.buf[slot.position..slot.position + slot.width];
        target[..len].copy_from_slice(&encoded[..len]);
        if len < slot.width {
            target[len - 1] |= CONTINUATION;
            for b in &mut target[len..slot.width - 1] {
                *b = CONTINUATION;
            }
            target[slot.width - 1] = 0;
        }
        Ok(())
    }

    pub fn write_fixed_int_slot(&mut self, placeholder: u32) -> FixedIntSlot {
        let position = self.buf.len();
        self.write_fixed_int(placeholder);
        FixedIntSlot { position }
    }

    /// Overwrites the 4 bytes of a fixed-width slot, little-endian.
    pub fn patch_fixed_int(&mut self, slot: FixedIntSlot, value: u32) -> Result<(), CodecError> {
        self.check_bounds(slot.position, 4)?;
        self.buf[slot.position..slot.position + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn check_bounds(&self, position: usize, width: usize) -> Result<(), CodecError> {
        if position + width > self.buf.len() {
            return Err(CodecError::SlotOutOfBounds {
                position,
                width,
                size: self.buf.len(),
            });
        }
        Ok(())
    }
}

fn push_varint(buf: &mut Vec<u8>, value: u64) {
    let mut encoded = [0u8; MAX_LONG_BYTES];
    let len = encode_into(&mut encoded, value);
    buf.extend_from_slice(&encoded[..len]);
}

/// Encodes `value` into `out` and returns the number of bytes used.
fn encode_into(out: &mut [u8; MAX_LONG_BYTES], mut value: u64) -> usize {
    let mut count = 0;
    while value & !PAYLOAD != 0 {
        out[count] = ((value & PAYLOAD) as u8) | CONTINUATION;
        value >>= 7;
        count += 1;
    }
    out[count] = value as u8;
    count + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoded_len;
    use crate::input::VariableByteInput;

    #[test]
    fn test_varint_literal_bytes() {
        let mut out = VariableByteOutput::new();
        out.write_int(0);
        out.write_int(1);
        out.write_int(127);
        out.write_int(128);
        out.write_int(300);
        assert_eq!(out.data(), &[0x00, 0x01, 0x7F, 0x80, 0x01, 0xAC, 0x02]);
    }

    #[test]
    fn test_max_values_use_full_width() {
        let mut out = VariableByteOutput::new();
        out.write_int(u32::MAX);
        assert_eq!(out.data(), &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);

        out.clear();
        out.write_long(u64::MAX);
        assert_eq!(out.size(), 10);
        assert_eq!(out.data()[9], 0x01);

        out.clear();
        out.write_short(u16::MAX);
        assert_eq!(out.data(), &[0xFF, 0xFF, 0x03]);
    }

    #[test]
    fn test_encoded_length_matches_bit_length() {
        let mut out = VariableByteOutput::new();
        for shift in 0..64 {
            for value in [1u64 << shift, (1u64 << shift) - 1, (1u64 << shift) + 1] {
                out.clear();
                out.write_long(value);
                assert_eq!(out.size(), encoded_len(value), "value {value}");
            }
        }
    }

    #[test]
    fn test_fixed_int_is_little_endian() {
        let mut out = VariableByteOutput::new();
        out.write_fixed_int(1);
        assert_eq!(out.data(), &[0x01, 0x00, 0x00, 0x00]);

        out.clear();
        out.write_fixed_int(0x0A0B0C0D);
        assert_eq!(out.data(), &[0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn test_fixed_long_is_big_endian() {
        let mut out = VariableByteOutput::new();
        out.write_fixed_long(1);
        assert_eq!(out.data(), &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);

        out.clear();
        out.write_fixed_long(0x0102030405060708);
        assert_eq!(out.data(), &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
    }

    #[test]
    fn test_write_utf_prefixes_byte_length() {
        let mut out = VariableByteOutput::new();
        out.write_utf("héllo");
        assert_eq!(out.data()[0], 6);
        assert_eq!(&out.data()[1..], "héllo".as_bytes());
    }

    #[test]
    fn test_patch_same_width_matches_direct_write() {
        let mut patched = VariableByteOutput::new();
        let slot = patched.write_int_slot(200);
        patched.write_byte(0xEE);
        patched.patch_int(slot, 129).unwrap();

        let mut direct = VariableByteOutput::new();
        direct.write_int(129);
        direct.write_byte(0xEE);

        assert_eq!(patched.data(), direct.data());
    }

    #[test]
    fn test_patch_keeps_size_and_decodes() {
        let mut out = VariableByteOutput::new();
        out.write_utf("header");
        let slot = out.reserve_int();
        out.write_long(42);
        let before = out.size();

        out.patch_int(slot, 7).unwrap();
        assert_eq!(out.size(), before);

        let mut input = VariableByteInput::new(out.data());
        input.skip_bytes(slot.position()).unwrap();
        assert_eq!(input.read_int().unwrap(), 7);
        assert_eq!(input.position(), slot.position() + slot.width());
        assert_eq!(input.read_long().unwrap(), 42);
    }

    #[test]
    fn test_patch_full_width_slot_with_large_value() {
        let mut out = VariableByteOutput::new();
        let slot = out.reserve_int();
        out.patch_int(slot, u32::MAX).unwrap();
        assert_eq!(out.data(), &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_patch_rejects_value_wider_than_slot() {
        let mut out = VariableByteOutput::new();
        let slot = out.write_int_slot(1);
        let err = out.patch_int(slot, 1000).unwrap_err();
        assert_eq!(
            err,
            CodecError::SlotTooSmall {
                position: 0,
                reserved: 1,
                required: 2
            }
        );
        assert_eq!(out.data(), &[0x01]);
    }

    #[test]
    fn test_patch_after_clear_is_out_of_bounds() {
        let mut out = VariableByteOutput::new();
        let slot = out.reserve_int();
        let fixed = out.write_fixed_int_slot(0);
        out.clear();
        assert!(matches!(
            out.patch_int(slot, 1),
            Err(CodecError::SlotOutOfBounds { .. })
        ));
        assert!(matches!(
            out.patch_fixed_int(fixed, 1),
            Err(CodecError::SlotOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_patch_fixed_int() {
        let mut out = VariableByteOutput::new();
        out.write_byte(0xAA);
        let slot = out.write_fixed_int_slot(0);
        out.write_byte(0xBB);
        out.patch_fixed_int(slot, 0x01020304).unwrap();
        assert_eq!(out.data(), &[0xAA, 0x04, 0x03, 0x02, 0x01, 0xBB]);
        assert_eq!(out.size(), 6);
    }

    #[test]
    fn test_clear_retains_capacity() {
        let mut out = VariableByteOutput::with_capacity(64);
        out.write_bytes(&[1, 2, 3]);
        out.clear();
        assert!(out.is_empty());
        assert_eq!(out.position(), 0);
        assert!(out.into_bytes().capacity() >= 64);
    }
}
