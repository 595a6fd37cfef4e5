//! Sound score extraction for the td1_4.1k sound ROM.
//!
//! The ROM drives its sound chip with a small bytecode: two-byte note and
//! parameter events, two kinds of counted loops, an unconditional jump and
//! an end marker. This crate walks that bytecode the way the sound driver
//! does and produces the flat, playback-order byte stream of every part,
//! together with the (part, scale) list of every sound in the directory.

pub mod disassembler;
pub mod emit;
pub mod error;
pub mod extract;
pub mod instruction;
pub mod layout;
pub mod memory;
pub mod rom_file;
pub mod sound_table;
pub mod unroller;

#[cfg(test)]
mod test_utils;

pub use error::{Result, ScoreError};
pub use extract::{extract, FailedItem, ItemFailure, ScoreSet};
pub use instruction::Instruction;
pub use layout::{OpcodeMap, RomLayout};
pub use memory::RomImage;
pub use rom_file::RomFile;
pub use sound_table::{PartReference, Sound, SoundTable};
pub use unroller::{DecodeWarning, LoopCounters, PartUnroller, UnrolledPart};
