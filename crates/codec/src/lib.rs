//! Variable-byte encoding primitives used to persist node identifiers,
//! offsets and strings.
//!
//! Integers are written in 7-bit groups, least-significant group first; every
//! byte except the last carries the continuation bit `0x80`. Two fixed-width
//! forms exist alongside the varints and their byte orders differ:
//!
//! - [`VariableByteOutput::write_fixed_int`] writes 4 bytes **little-endian**.
//! - [`VariableByteOutput::write_fixed_long`] writes 8 bytes **big-endian**.
//!
//! Persisted data depends on both layouts, so neither may change.
//!
//! # Example
//!
//! ```
//! use xstore_codec::{VariableByteInput, VariableByteOutput};
//!
//! let mut out = VariableByteOutput::new();
//! let count = out.reserve_int();
//! out.write_long(300);
//! out.write_utf("chapter");
//! out.patch_int(count, 2)?;
//!
//! let mut input = VariableByteInput::new(out.data());
//! assert_eq!(input.read_int()?, 2);
//! assert_eq!(input.read_long()?, 300);
//! assert_eq!(input.read_utf()?, "chapter");
//! # Ok::<(), xstore_codec::CodecError>(())
//! ```

pub mod error;
pub mod input;
pub mod output;

pub use error::CodecError;
pub use input::VariableByteInput;
pub use output::{FixedIntSlot, VarIntSlot, VariableByteOutput};

/// Maximum encoded length of a 16-bit value.
pub const MAX_SHORT_BYTES: usize = 3;
/// Maximum encoded length of a 32-bit value.
pub const MAX_INT_BYTES: usize = 5;
/// Maximum encoded length of a 64-bit value.
pub const MAX_LONG_BYTES: usize = 10;

/// Number of bytes the variable-byte encoding of `value` occupies.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}
