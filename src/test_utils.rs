// Test utilities for building synthetic sound ROMs
use crate::layout::RomLayout;
use crate::memory::RomImage;

pub const TEST_OFFSET: u16 = 0xE000;
pub const TEST_TABLE: u16 = 0xE5E5;

pub struct MockRom {
    pub memory: Vec<u8>,
    pub offset: u16,
}

impl MockRom {
    /// Full 8K image at 0xe000, filled like an erased EPROM
    pub fn new() -> Self {
        Self::with_size(0x2000)
    }

    pub fn with_size(size: usize) -> Self {
        Self {
            memory: vec![0xFF; size],
            offset: TEST_OFFSET,
        }
    }

    pub fn place(&mut self, addr: u16, bytes: &[u8]) -> &mut Self {
        let start = (addr - self.offset) as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn set_word(&mut self, addr: u16, value: u16) -> &mut Self {
        self.place(addr, &value.to_be_bytes())
    }

    /// Write a triple list of (part address, scale) ending in the 0xe0 sentinel
    pub fn sound_list(&mut self, addr: u16, refs: &[(u16, u8)]) -> &mut Self {
        let mut bytes = Vec::new();
        for (part, scale) in refs {
            bytes.extend_from_slice(&part.to_be_bytes());
            bytes.push(*scale);
        }
        bytes.push(0xE0);
        self.place(addr, &bytes)
    }

    /// Point every directory slot at `list_addr`, then fill in the given slots
    pub fn directory(&mut self, table: u16, count: usize, list_addr: u16) -> &mut Self {
        for i in 0..count {
            self.set_word(table + (i as u16) * 2, list_addr);
        }
        self
    }

    pub fn image(&self) -> RomImage<'_> {
        RomImage::new(&self.memory, self.offset)
    }

    pub fn layout(&self) -> RomLayout {
        RomLayout {
            rom_size: self.memory.len(),
            address_offset: self.offset,
            table_base: TEST_TABLE,
            ..RomLayout::default()
        }
    }
}
