use crate::error::Result;
use crate::instruction::Instruction;
use crate::layout::OpcodeMap;
use crate::memory::RomImage;
use std::fmt::Write;

pub const DEFAULT_MAX_LINES: usize = 4096;

/// Linear listing of a part's instruction stream, without following branches
pub struct Disassembler<'a> {
    rom: RomImage<'a>,
    opcodes: &'a OpcodeMap,
    max_lines: usize,
}

impl<'a> Disassembler<'a> {
    pub fn new(rom: RomImage<'a>, opcodes: &'a OpcodeMap) -> Self {
        Disassembler {
            rom,
            opcodes,
            max_lines: DEFAULT_MAX_LINES,
        }
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Decode from `entry` up to and including the first terminator.
    ///
    /// Returns the decoded instructions with their addresses. A decode error
    /// before the terminator is returned as the error.
    pub fn decode_linear(&self, entry: u16) -> Result<Vec<(u16, Instruction)>> {
        let mut pc = entry;
        let mut decoded = Vec::new();

        while decoded.len() < self.max_lines {
            let inst = Instruction::decode(&self.rom, self.opcodes, pc)?;
            decoded.push((pc, inst));
            if inst == Instruction::Terminator {
                break;
            }
            pc = self.rom.advance(pc, inst.length(self.opcodes))?;
        }

        Ok(decoded)
    }

    /// Format the listing, one instruction per line
    pub fn listing(&self, entry: u16) -> String {
        let mut output = String::new();
        writeln!(&mut output, "Part at {:#06x}:", entry).unwrap();
        writeln!(&mut output).unwrap();

        let mut pc = entry;
        let mut count = 0;
        loop {
            if count >= self.max_lines {
                writeln!(&mut output, "{:#06x}: <listing limit reached>", pc).unwrap();
                break;
            }
            match Instruction::decode(&self.rom, self.opcodes, pc) {
                Ok(inst) => {
                    writeln!(&mut output, "{}", self.format_instruction(pc, &inst)).unwrap();
                    count += 1;
                    if inst == Instruction::Terminator {
                        break;
                    }
                    match self.rom.advance(pc, inst.length(self.opcodes)) {
                        Ok(next) => pc = next,
                        Err(e) => {
                            writeln!(&mut output, "{:#06x}: <decode error: {}>", pc, e).unwrap();
                            break;
                        }
                    }
                }
                Err(e) => {
                    writeln!(&mut output, "{:#06x}: <decode error: {}>", pc, e).unwrap();
                    break;
                }
            }
        }

        writeln!(&mut output, "\nListed {} instructions", count).unwrap();
        output
    }

    fn format_instruction(&self, pc: u16, inst: &Instruction) -> String {
        let mut output = String::new();
        write!(&mut output, "{:#06x}: ", pc).unwrap();

        // raw bytes, clipped to what the image holds; invalid opcodes show only themselves
        let width = match inst {
            Instruction::Invalid { .. } => 1,
            _ => inst.length(self.opcodes),
        };
        let raw: Vec<String> = (0..width)
            .filter_map(|i| pc.checked_add(i))
            .filter_map(|addr| self.rom.read_u8(addr).ok())
            .map(|b| format!("{:02x}", b))
            .collect();
        write!(&mut output, "{:<12} ", raw.join(" ")).unwrap();

        write!(&mut output, "{}", inst).unwrap();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockRom;

    #[test]
    fn test_decode_linear_stops_at_terminator() {
        let mut rom = MockRom::new();
        rom.place(
            0xE100,
            &[0x10, 0x20, 0xF4, 0x02, 0xE1, 0x00, 0xD5, 0x00, 0xF3, 0x99],
        );
        let opcodes = OpcodeMap::default();
        let disasm = Disassembler::new(rom.image(), &opcodes);

        let decoded = disasm.decode_linear(0xE100).unwrap();
        assert_eq!(
            decoded,
            vec![
                (0xE100, Instruction::Event { opcode: 0x10, param: 0x20 }),
                (0xE102, Instruction::LoopIfLess { limit: 2, target: 0xE100 }),
                (0xE106, Instruction::Invalid { opcode: 0xD5 }),
                (0xE108, Instruction::Terminator),
            ]
        );
    }

    #[test]
    fn test_listing_format() {
        let mut rom = MockRom::new();
        rom.place(0xE100, &[0xF6, 0xE2, 0x00, 0xF3]);
        let opcodes = OpcodeMap::default();
        let disasm = Disassembler::new(rom.image(), &opcodes);

        let text = disasm.listing(0xE100);
        assert!(text.starts_with("Part at 0xe100:\n\n"));
        assert!(text.contains("0xe100: f6 e2 00     jump 0xe200\n"));
        assert!(text.contains("0xe103: f3           end\n"));
        assert!(text.ends_with("Listed 2 instructions\n"));
    }

    #[test]
    fn test_listing_limit() {
        let rom = MockRom::new();
        let opcodes = OpcodeMap::default();
        // erased ROM is all invalid opcodes, there is no terminator
        let disasm = Disassembler::new(rom.image(), &opcodes).with_max_lines(3);

        assert_eq!(disasm.decode_linear(0xE100).unwrap().len(), 3);
        assert!(disasm.listing(0xE100).contains("0xe106: <listing limit reached>"));
    }
}
