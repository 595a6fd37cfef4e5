//! ROM layout configuration.
//!
//! Every constant the extractor relies on lives here rather than in the
//! decoding logic. The defaults describe the one supported image, so an
//! empty TOML document is a valid layout:
//!
//! ```toml
//! address_offset = 0xe000
//! table_base = 0xe5e5
//! max_steps = 100000
//!
//! [opcodes]
//! event_ranges = [[0x00, 0xcf], [0xf0, 0xf2]]
//! terminator = 0xf3
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ROM_SIZE: usize = 8192;
pub const DEFAULT_CRC32: u32 = 0xae9d06d9;
pub const DEFAULT_ADDRESS_OFFSET: u16 = 0xe000;
pub const DEFAULT_TABLE_BASE: u16 = 0xe5e5;
pub const DEFAULT_SOUND_COUNT: usize = 0x20;
pub const DEFAULT_LIST_TERMINATOR: u8 = 0xe0;
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Opcode assignments of the sound instruction set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpcodeMap {
    /// Inclusive ranges of two-byte note/parameter events, checked in order
    pub event_ranges: Vec<(u8, u8)>,
    pub terminator: u8,
    pub loop_if_less: u8,
    pub loop_until_count: u8,
    pub jump: u8,
    /// Bytes skipped after an unrecognized opcode
    pub invalid_width: u16,
}

impl Default for OpcodeMap {
    fn default() -> Self {
        OpcodeMap {
            event_ranges: vec![(0x00, 0xcf), (0xf0, 0xf2)],
            terminator: 0xf3,
            loop_if_less: 0xf4,
            loop_until_count: 0xf5,
            jump: 0xf6,
            invalid_width: 2,
        }
    }
}

impl OpcodeMap {
    pub fn is_event(&self, opcode: u8) -> bool {
        self.event_ranges
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&opcode))
    }
}

/// Where things are in the ROM and how strictly to walk it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RomLayout {
    pub rom_size: usize,
    pub crc32: u32,
    pub address_offset: u16,
    pub table_base: u16,
    pub sound_count: usize,
    pub list_terminator: u8,
    /// Safety cap on decoded instructions per part; `None` walks unbounded
    pub max_steps: Option<usize>,
    /// Treat invalid opcodes as errors instead of warnings
    pub strict: bool,
    pub opcodes: OpcodeMap,
}

impl Default for RomLayout {
    fn default() -> Self {
        RomLayout {
            rom_size: DEFAULT_ROM_SIZE,
            crc32: DEFAULT_CRC32,
            address_offset: DEFAULT_ADDRESS_OFFSET,
            table_base: DEFAULT_TABLE_BASE,
            sound_count: DEFAULT_SOUND_COUNT,
            list_terminator: DEFAULT_LIST_TERMINATOR,
            max_steps: Some(DEFAULT_MAX_STEPS),
            strict: false,
            opcodes: OpcodeMap::default(),
        }
    }
}

impl RomLayout {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;

    #[test]
    fn test_empty_document_is_default_layout() {
        let layout = RomLayout::from_toml_str("").unwrap();
        assert_eq!(layout, RomLayout::default());
        assert_eq!(layout.address_offset, 0xe000);
        assert_eq!(layout.table_base, 0xe5e5);
        assert_eq!(layout.sound_count, 32);
        assert_eq!(layout.opcodes.terminator, 0xf3);
    }

    #[test]
    fn test_partial_override() {
        let layout = RomLayout::from_toml_str(
            "table_base = 0xe100\nstrict = true\n\n[opcodes]\njump = 0xf7\n",
        )
        .unwrap();
        assert_eq!(layout.table_base, 0xe100);
        assert!(layout.strict);
        assert_eq!(layout.opcodes.jump, 0xf7);
        // untouched fields keep their defaults
        assert_eq!(layout.opcodes.loop_if_less, 0xf4);
        assert_eq!(layout.max_steps, Some(DEFAULT_MAX_STEPS));
    }

    #[test]
    fn test_bad_document_is_config_error() {
        let err = RomLayout::from_toml_str("table_base = \"nope\"").unwrap_err();
        assert!(matches!(err, ScoreError::Config(_)));
    }

    #[test]
    fn test_shipped_layout_matches_defaults() {
        let layout =
            RomLayout::from_toml_str(include_str!("../layouts/td1_4.1k.toml")).unwrap();
        assert_eq!(layout, RomLayout::default());
    }

    #[test]
    fn test_event_ranges() {
        let map = OpcodeMap::default();
        assert!(map.is_event(0x00));
        assert!(map.is_event(0xcf));
        assert!(!map.is_event(0xd0));
        assert!(!map.is_event(0xef));
        assert!(map.is_event(0xf0));
        assert!(map.is_event(0xf2));
        assert!(!map.is_event(0xf3));
    }
}
