// Extraction Error Handling

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    /// A logical address resolved outside the ROM buffer
    #[error("address {address:#06x} is outside the ROM (offset {offset:#06x}, {len} bytes)")]
    OutOfRange { address: u32, offset: u16, len: usize },

    /// Unrecognized opcode, only surfaced when decoding is strict
    #[error("invalid opcode {opcode:#04x} at {address:#06x}")]
    InvalidOpcode { address: u16, opcode: u8 },

    /// The step cap was exceeded while unrolling a part
    #[error("part at {entry:#06x} did not terminate within {steps} steps")]
    MalformedPart { entry: u16, steps: usize },

    #[error("ROM size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("ROM checksum mismatch: expected {expected:#010x}, found {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("layout configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
