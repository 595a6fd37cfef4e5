//! Rust source emitter for extracted scores.
//!
//! Each sound becomes one `&[u8]` constant per distinct part plus a table of
//! `(part, &ScaleSet)` pairs, e.g.
//!
//! ```text
//! const SOUND_00_E6A0: &[u8] = &[
//! 	0xf2, 0x06, 0x21, 0x04, 0xf3,
//! ];
//! const SOUND_00: &[(&[u8], &ScaleSet)] = &[
//! 	(SOUND_00_E6A0, &SCALE_3),
//! ];
//! ```

use crate::extract::{FailedItem, ScoreSet};
use crate::sound_table::Sound;
use std::io::{self, Write};

const BYTES_PER_LINE: usize = 16;

enum Entry<'s> {
    Sound(&'s Sound),
    Failed(usize, String),
}

impl<'s> Entry<'s> {
    fn index(&self) -> usize {
        match self {
            Entry::Sound(s) => s.index,
            Entry::Failed(i, _) => *i,
        }
    }
}

fn part_name(sound: &Sound, addr: u16) -> String {
    format!("{}_{:X}", sound.name(), addr)
}

fn write_bytes<W: Write>(out: &mut W, name: &str, bytes: &[u8]) -> io::Result<()> {
    writeln!(out, "const {}: &[u8] = &[", name)?;
    for line in bytes.chunks(BYTES_PER_LINE) {
        let cells: Vec<String> = line.iter().map(|b| format!("0x{:02x},", b)).collect();
        writeln!(out, "\t{}", cells.join(" "))?;
    }
    writeln!(out, "];")
}

fn write_sound<W: Write>(out: &mut W, set: &ScoreSet, sound: &Sound) -> io::Result<()> {
    // a sound is only emitted when all of its parts are available
    for addr in sound.distinct_parts() {
        if let Some(failure) = set.part_failure(addr) {
            writeln!(out, "// {} skipped: {}", sound.name(), failure)?;
            return writeln!(out);
        }
    }

    for addr in sound.distinct_parts() {
        if let Some(part) = set.parts.get(&addr) {
            write_bytes(out, &part_name(sound, addr), &part.bytes)?;
        }
    }

    writeln!(out, "const {}: &[(&[u8], &ScaleSet)] = &[", sound.name())?;
    for r in &sound.part_refs {
        writeln!(
            out,
            "\t({}, &SCALE_{}),",
            part_name(sound, r.part_address),
            r.scale
        )?;
    }
    writeln!(out, "];")?;
    writeln!(out)
}

/// Write every sound slot in directory order
pub fn emit_score<W: Write>(set: &ScoreSet, out: &mut W) -> io::Result<()> {
    let mut entries: Vec<Entry> = set.sounds.iter().map(Entry::Sound).collect();
    for failure in &set.failures {
        if let FailedItem::Sound(index) = failure.item {
            entries.push(Entry::Failed(index, failure.error.to_string()));
        }
    }
    entries.sort_by_key(|e| e.index());

    for entry in entries {
        match entry {
            Entry::Sound(sound) => write_sound(out, set, sound)?,
            Entry::Failed(index, error) => {
                writeln!(out, "// SOUND_{:02X} skipped: {}", index, error)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

pub fn render_score(set: &ScoreSet) -> String {
    let mut out = Vec::new();
    // writing into a Vec cannot fail
    let _ = emit_score(set, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}
