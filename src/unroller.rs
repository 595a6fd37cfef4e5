use crate::error::{Result, ScoreError};
use crate::instruction::Instruction;
use crate::layout::{OpcodeMap, RomLayout};
use crate::memory::RomImage;
use log::{debug, warn};
use std::collections::HashMap;

/// Recoverable decode problem seen while unrolling a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeWarning {
    /// Entry address of the part being unrolled
    pub part: u16,
    pub address: u16,
    pub opcode: u8,
}

/// The flattened, playback-order byte stream of one part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrolledPart {
    pub entry_address: u16,
    pub bytes: Vec<u8>,
    /// Highest cursor position reached, including the byte after the terminator
    pub bottom_address: u32,
    /// Number of instructions decoded
    pub steps: usize,
}

/// Per-address visit counters for the two conditional loops.
///
/// Scoped to one unroll; an address has an entry only once its loop
/// instruction has been visited.
#[derive(Debug, Default)]
pub struct LoopCounters {
    counts: HashMap<u16, u32>,
}

impl LoopCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, addr: u16) -> u32 {
        self.counts.get(&addr).copied().unwrap_or(0)
    }

    pub fn contains(&self, addr: u16) -> bool {
        self.counts.contains_key(&addr)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Visit a `LoopIfLess` at `addr`. Returns true when the branch is taken.
    ///
    /// The branch is taken while the count is below `limit`; the visit that
    /// falls through resets the count so an enclosing loop can re-enter.
    pub fn loop_if_less(&mut self, addr: u16, limit: u8) -> bool {
        let n = self.get(addr);
        if n < limit as u32 {
            self.counts.insert(addr, n + 1);
            true
        } else {
            self.counts.insert(addr, 0);
            false
        }
    }

    /// Visit a `LoopUntilCount` at `addr`. Returns true when the branch is taken,
    /// which happens on exactly the `limit`-th visit since the last reset.
    pub fn loop_until_count(&mut self, addr: u16, limit: u8) -> bool {
        let n = self.get(addr) + 1;
        if n == limit as u32 {
            self.counts.insert(addr, 0);
            true
        } else {
            self.counts.insert(addr, n);
            false
        }
    }
}

/// Walks a part's instruction stream, expanding loops and jumps into the
/// literal byte sequence the sound driver would play.
pub struct PartUnroller<'a> {
    rom: RomImage<'a>,
    opcodes: &'a OpcodeMap,
    max_steps: Option<usize>,
    strict: bool,
}

impl<'a> PartUnroller<'a> {
    pub fn new(rom: RomImage<'a>, layout: &'a RomLayout) -> Self {
        PartUnroller {
            rom,
            opcodes: &layout.opcodes,
            max_steps: layout.max_steps,
            strict: layout.strict,
        }
    }

    /// Unroll the part starting at `entry`.
    ///
    /// Invalid opcodes are pushed to `warnings` and skipped, unless the
    /// unroller is strict. Fails with `OutOfRange` if the walk leaves the
    /// ROM, and with `MalformedPart` once the step cap is exceeded.
    pub fn unroll(&self, entry: u16, warnings: &mut Vec<DecodeWarning>) -> Result<UnrolledPart> {
        let mut cursor = entry;
        let mut bottom = entry as u32;
        let mut output = Vec::new();
        let mut counters = LoopCounters::new();
        let mut steps = 0usize;

        loop {
            if let Some(max) = self.max_steps {
                if steps >= max {
                    return Err(ScoreError::MalformedPart { entry, steps });
                }
            }
            steps += 1;
            bottom = bottom.max(cursor as u32);

            let inst = Instruction::decode(&self.rom, self.opcodes, cursor)?;
            match inst {
                Instruction::Event { opcode, param } => {
                    output.push(opcode);
                    output.push(param);
                    cursor = self.rom.advance(cursor, 2)?;
                }
                Instruction::Terminator => {
                    output.push(self.opcodes.terminator);
                    bottom = bottom.max(cursor as u32 + 1);
                    break;
                }
                Instruction::LoopIfLess { limit, target } => {
                    cursor = if counters.loop_if_less(cursor, limit) {
                        target
                    } else {
                        self.rom.advance(cursor, 4)?
                    };
                }
                Instruction::LoopUntilCount { limit, target } => {
                    cursor = if counters.loop_until_count(cursor, limit) {
                        target
                    } else {
                        self.rom.advance(cursor, 4)?
                    };
                }
                Instruction::Jump { target } => {
                    cursor = target;
                }
                Instruction::Invalid { opcode } => {
                    if self.strict {
                        return Err(ScoreError::InvalidOpcode { address: cursor, opcode });
                    }
                    warn!("invalid op. {:#04x} in {:#06x} (part {:#06x})", opcode, cursor, entry);
                    warnings.push(DecodeWarning {
                        part: entry,
                        address: cursor,
                        opcode,
                    });
                    cursor = self.rom.advance(cursor, self.opcodes.invalid_width)?;
                }
            }
        }

        debug!(
            "Unrolled part {:#06x}: {} bytes in {} steps, bottom {:#06x}",
            entry,
            output.len(),
            steps,
            bottom
        );

        Ok(UnrolledPart {
            entry_address: entry,
            bytes: output,
            bottom_address: bottom,
            steps,
        })
    }
}
