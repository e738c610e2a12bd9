use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unexpected end of input at byte {position}: needed {needed} more byte(s)")]
    UnexpectedEof { position: usize, needed: usize },

    #[error("Variable-byte value at byte {position} exceeds {max_bytes} bytes")]
    VarIntTooLong { position: usize, max_bytes: usize },

    #[error("Variable-byte value at byte {position} does not fit in {bits} bits")]
    VarIntOverflow { position: usize, bits: u32 },

    #[error("Slot at byte {position} (width {width}) lies outside the buffer (size {size})")]
    SlotOutOfBounds {
        position: usize,
        width: usize,
        size: usize,
    },

    #[error("Slot at byte {position} reserves {reserved} byte(s) but the value needs {required}")]
    SlotTooSmall {
        position: usize,
        reserved: usize,
        required: usize,
    },

    #[error("Invalid UTF-8 in string at byte {position}")]
    InvalidUtf8 { position: usize },
}
