//! Whole-ROM extraction with partial success.
//!
//! A bad sound or a bad part is recorded and skipped; everything else is
//! still extracted. Each distinct part address is unrolled exactly once and
//! shared by every sound that references it.

use crate::error::ScoreError;
use crate::layout::RomLayout;
use crate::memory::RomImage;
use crate::sound_table::{work_list, PartReference, Sound, SoundTable};
use crate::unroller::{DecodeWarning, PartUnroller, UnrolledPart};
use indexmap::IndexMap;
use log::{debug, warn};
use std::fmt::{Display, Error, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedItem {
    /// Directory slot whose triple list could not be read
    Sound(usize),
    /// Part entry address that could not be unrolled
    Part(u16),
}

impl Display for FailedItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            FailedItem::Sound(index) => write!(f, "SOUND_{:02X}", index),
            FailedItem::Part(addr) => write!(f, "part {:#06x}", addr),
        }
    }
}

#[derive(Debug)]
pub struct ItemFailure {
    pub item: FailedItem,
    pub error: ScoreError,
}

impl Display for ItemFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}: {}", self.item, self.error)
    }
}

/// Everything extracted from one ROM
#[derive(Debug, Default)]
pub struct ScoreSet {
    /// Successfully read sounds, in directory order
    pub sounds: Vec<Sound>,
    /// Unrolled parts keyed by entry address, in first-encounter order
    pub parts: IndexMap<u16, Arc<UnrolledPart>>,
    pub failures: Vec<ItemFailure>,
    pub warnings: Vec<DecodeWarning>,
}

impl ScoreSet {
    pub fn part(&self, r: &PartReference) -> Option<&Arc<UnrolledPart>> {
        self.parts.get(&r.part_address)
    }

    /// The failure recorded for a part address, if it failed
    pub fn part_failure(&self, addr: u16) -> Option<&ItemFailure> {
        self.failures
            .iter()
            .find(|f| f.item == FailedItem::Part(addr))
    }

    pub fn sound_failure(&self, index: usize) -> Option<&ItemFailure> {
        self.failures
            .iter()
            .find(|f| f.item == FailedItem::Sound(index))
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Read the directory, then unroll every distinct part it references
pub fn extract(rom: &RomImage, layout: &RomLayout) -> ScoreSet {
    let mut set = ScoreSet::default();

    let table = SoundTable::new(*rom, layout);
    for (index, result) in table.list_sounds() {
        match result {
            Ok(sound) => set.sounds.push(sound),
            Err(error) => {
                warn!("SOUND_{:02X} skipped: {}", index, error);
                set.failures.push(ItemFailure {
                    item: FailedItem::Sound(index),
                    error,
                });
            }
        }
    }

    let parts = work_list(&set.sounds);
    debug!(
        "{} sounds reference {} distinct parts",
        set.sounds.len(),
        parts.len()
    );

    let unroller = PartUnroller::new(*rom, layout);
    for addr in parts {
        match unroller.unroll(addr, &mut set.warnings) {
            Ok(part) => {
                set.parts.insert(addr, Arc::new(part));
            }
            Err(error) => {
                warn!("part {:#06x} skipped: {}", addr, error);
                set.failures.push(ItemFailure {
                    item: FailedItem::Part(addr),
                    error,
                });
            }
        }
    }

    set
}
