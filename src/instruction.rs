use crate::error::Result;
use crate::layout::OpcodeMap;
use crate::memory::RomImage;
use std::fmt::{Display, Error, Formatter};

/// A decoded sound instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Note or parameter pair, copied to the output as-is
    Event { opcode: u8, param: u8 },
    /// Branch to `target` while the visit counter is below `limit`
    LoopIfLess { limit: u8, target: u16 },
    /// Branch to `target` on exactly the `limit`-th visit
    LoopUntilCount { limit: u8, target: u16 },
    Jump { target: u16 },
    /// End of part
    Terminator,
    /// Unrecognized opcode; decoding skips over it
    Invalid { opcode: u8 },
}

impl Instruction {
    /// Decode the instruction at `addr`
    ///
    /// Opcodes are matched in priority order: events, terminator, the two
    /// loops, jump. Anything else is `Invalid` and reads nothing past the
    /// opcode byte.
    pub fn decode(rom: &RomImage, opcodes: &OpcodeMap, addr: u16) -> Result<Self> {
        let opcode = rom.read_u8(addr)?;

        if opcodes.is_event(opcode) {
            let param = rom.read_u8(rom.advance(addr, 1)?)?;
            return Ok(Instruction::Event { opcode, param });
        }

        let inst = if opcode == opcodes.terminator {
            Instruction::Terminator
        } else if opcode == opcodes.loop_if_less {
            let (limit, target) = Self::read_loop_operands(rom, addr)?;
            Instruction::LoopIfLess { limit, target }
        } else if opcode == opcodes.loop_until_count {
            let (limit, target) = Self::read_loop_operands(rom, addr)?;
            Instruction::LoopUntilCount { limit, target }
        } else if opcode == opcodes.jump {
            let target = rom.read_u16_be(rom.advance(addr, 1)?)?;
            Instruction::Jump { target }
        } else {
            Instruction::Invalid { opcode }
        };
        Ok(inst)
    }

    /// Count byte at +1, big-endian target at +2
    fn read_loop_operands(rom: &RomImage, addr: u16) -> Result<(u8, u16)> {
        let limit = rom.read_u8(rom.advance(addr, 1)?)?;
        let target = rom.read_u16_be(rom.advance(addr, 2)?)?;
        Ok((limit, target))
    }

    /// Encoded length in bytes. For `Invalid` this is the recovery width.
    pub fn length(&self, opcodes: &OpcodeMap) -> u16 {
        match self {
            Instruction::Event { .. } => 2,
            Instruction::LoopIfLess { .. } | Instruction::LoopUntilCount { .. } => 4,
            Instruction::Jump { .. } => 3,
            Instruction::Terminator => 1,
            Instruction::Invalid { .. } => opcodes.invalid_width,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Event { .. } => "event",
            Instruction::LoopIfLess { .. } => "loop_lt",
            Instruction::LoopUntilCount { .. } => "loop_eq",
            Instruction::Jump { .. } => "jump",
            Instruction::Terminator => "end",
            Instruction::Invalid { .. } => "invalid",
        }
    }

    /// Branch target, if this is a control-flow instruction
    pub fn target(&self) -> Option<u16> {
        match *self {
            Instruction::LoopIfLess { target, .. }
            | Instruction::LoopUntilCount { target, .. }
            | Instruction::Jump { target } => Some(target),
            _ => None,
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        write!(f, "{}", self.name())?;
        match *self {
            Instruction::Event { opcode, param } => write!(f, " #{:02x}, #{:02x}", opcode, param),
            Instruction::LoopIfLess { limit, target }
            | Instruction::LoopUntilCount { limit, target } => {
                write!(f, " {}, {:#06x}", limit, target)
            }
            Instruction::Jump { target } => write!(f, " {:#06x}", target),
            Instruction::Terminator => Ok(()),
            Instruction::Invalid { opcode } => write!(f, " #{:02x}", opcode),
        }
    }
}
