use crate::error::Result;
use crate::layout::RomLayout;
use crate::memory::RomImage;
use indexmap::IndexSet;
use log::debug;

/// One (part, scale) entry of a sound's triple list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartReference {
    pub part_address: u16,
    pub scale: u8,
}

/// A sound from the directory and the parts that compose it, in list order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub index: usize,
    pub list_address: u16,
    pub part_refs: Vec<PartReference>,
}

impl Sound {
    pub fn name(&self) -> String {
        format!("SOUND_{:02X}", self.index)
    }

    /// Distinct part addresses of this sound, in first-encounter order
    pub fn distinct_parts(&self) -> IndexSet<u16> {
        self.part_refs.iter().map(|r| r.part_address).collect()
    }
}

/// Reader for the fixed-size sound directory
pub struct SoundTable<'a> {
    rom: RomImage<'a>,
    table_base: u16,
    count: usize,
    terminator: u8,
}

impl<'a> SoundTable<'a> {
    pub fn new(rom: RomImage<'a>, layout: &RomLayout) -> Self {
        SoundTable {
            rom,
            table_base: layout.table_base,
            count: layout.sound_count,
            terminator: layout.list_terminator,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Address of the triple list for directory slot `index`
    pub fn list_address(&self, index: usize) -> Result<u16> {
        let delta = u16::try_from(index * 2)
            .map_err(|_| self.rom.out_of_range(self.table_base as u32 + index as u32 * 2))?;
        let entry = self.rom.advance(self.table_base, delta)?;
        self.rom.read_u16_be(entry)
    }

    /// Read the sound in directory slot `index`.
    ///
    /// Triples are read until the list terminator; the terminator itself is
    /// consumed but not returned.
    pub fn sound(&self, index: usize) -> Result<Sound> {
        let list_address = self.list_address(index)?;
        let mut addr = list_address;
        let mut part_refs = Vec::new();

        while self.rom.read_u8(addr)? != self.terminator {
            let part_address = self.rom.read_u16_be(addr)?;
            let scale = self.rom.read_u8(self.rom.advance(addr, 2)?)?;
            part_refs.push(PartReference { part_address, scale });
            addr = self.rom.advance(addr, 3)?;
        }

        debug!(
            "SOUND_{:02X}: list at {:#06x}, {} part references",
            index,
            list_address,
            part_refs.len()
        );

        Ok(Sound {
            index,
            list_address,
            part_refs,
        })
    }

    /// Every directory slot in order; each slot fails or succeeds on its own
    pub fn list_sounds(&self) -> Vec<(usize, Result<Sound>)> {
        (0..self.count).map(|i| (i, self.sound(i))).collect()
    }
}

/// The distinct part addresses referenced by `sounds`, in first-encounter order
pub fn work_list<'s, I>(sounds: I) -> IndexSet<u16>
where
    I: IntoIterator<Item = &'s Sound>,
{
    sounds
        .into_iter()
        .flat_map(|s| s.part_refs.iter().map(|r| r.part_address))
        .collect()
}
