use crate::error::{Result, ScoreError};
use std::fmt::{Display, Error, Formatter};

/// RomImage is a bounds-checked view of the ROM at its logical addresses.
///
/// Logical address `a` lives at buffer index `a - offset`. Anything below the
/// offset or past the end of the buffer is an error, never a wrap.
#[derive(Debug, Clone, Copy)]
pub struct RomImage<'a> {
    bytes: &'a [u8],
    offset: u16,
}

impl<'a> RomImage<'a> {
    pub fn new(bytes: &'a [u8], offset: u16) -> Self {
        RomImage { bytes, offset }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// Highest logical address held by the image, if any
    pub fn last_address(&self) -> Option<u32> {
        if self.bytes.is_empty() {
            None
        } else {
            Some(self.offset as u32 + self.bytes.len() as u32 - 1)
        }
    }

    fn index(&self, addr: u32) -> Result<usize> {
        let base = self.offset as u32;
        if addr < base || (addr - base) as usize >= self.bytes.len() {
            return Err(self.out_of_range(addr));
        }
        Ok((addr - base) as usize)
    }

    pub(crate) fn out_of_range(&self, addr: u32) -> ScoreError {
        ScoreError::OutOfRange {
            address: addr,
            offset: self.offset,
            len: self.bytes.len(),
        }
    }

    pub fn read_u8(&self, addr: u16) -> Result<u8> {
        self.index(addr as u32).map(|i| self.bytes[i])
    }

    /// Read a big-endian word; both bytes must be inside the image
    pub fn read_u16_be(&self, addr: u16) -> Result<u16> {
        let hi = self.index(addr as u32)?;
        let lo = self.index(addr as u32 + 1)?;
        Ok(((self.bytes[hi] as u16) << 8) | self.bytes[lo] as u16)
    }

    /// `addr + delta` as a logical address, or `OutOfRange` past 0xffff
    pub fn advance(&self, addr: u16, delta: u16) -> Result<u16> {
        addr.checked_add(delta)
            .ok_or_else(|| self.out_of_range(addr as u32 + delta as u32))
    }
}

impl<'a> Display for RomImage<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        match self.last_address() {
            Some(last) => write!(
                f,
                "ROM {:#06x}-{:#06x} ({} bytes)",
                self.offset,
                last,
                self.bytes.len()
            ),
            None => write!(f, "ROM at {:#06x} (empty)", self.offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u8_at_offset() {
        let bytes = vec![0x11, 0x22, 0x33];
        let rom = RomImage::new(&bytes, 0xE000);
        assert_eq!(rom.read_u8(0xE000).unwrap(), 0x11);
        assert_eq!(rom.read_u8(0xE002).unwrap(), 0x33);
    }

    #[test]
    fn test_read_u16_is_big_endian() {
        let bytes = vec![0xE6, 0xA0, 0x00];
        let rom = RomImage::new(&bytes, 0xE000);
        assert_eq!(rom.read_u16_be(0xE000).unwrap(), 0xE6A0);
        assert_eq!(rom.read_u16_be(0xE001).unwrap(), 0xA000);
    }

    #[test]
    fn test_below_offset_is_out_of_range() {
        let bytes = vec![0u8; 4];
        let rom = RomImage::new(&bytes, 0xE000);
        match rom.read_u8(0xDFFF) {
            Err(ScoreError::OutOfRange { address, offset, len }) => {
                assert_eq!(address, 0xDFFF);
                assert_eq!(offset, 0xE000);
                assert_eq!(len, 4);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_word_straddling_end_is_out_of_range() {
        let bytes = vec![0u8; 4];
        let rom = RomImage::new(&bytes, 0xE000);
        assert!(rom.read_u16_be(0xE002).is_ok());
        assert!(matches!(
            rom.read_u16_be(0xE003),
            Err(ScoreError::OutOfRange { address: 0xE004, .. })
        ));
    }

    #[test]
    fn test_word_at_top_of_address_space() {
        // Full 8K image ending at 0xffff; the low byte would be at 0x10000
        let bytes = vec![0u8; 0x2000];
        let rom = RomImage::new(&bytes, 0xE000);
        assert!(rom.read_u8(0xFFFF).is_ok());
        assert!(matches!(
            rom.read_u16_be(0xFFFF),
            Err(ScoreError::OutOfRange { address: 0x10000, .. })
        ));
        assert!(rom.advance(0xFFFE, 4).is_err());
        assert_eq!(rom.advance(0xE000, 4).unwrap(), 0xE004);
    }

    #[test]
    fn test_display() {
        let bytes = vec![0u8; 0x2000];
        let rom = RomImage::new(&bytes, 0xE000);
        assert_eq!(format!("{}", rom), "ROM 0xe000-0xffff (8192 bytes)");
    }
}
