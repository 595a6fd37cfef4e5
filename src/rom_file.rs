use crate::error::{Result, ScoreError};
use crate::layout::RomLayout;
use crate::memory::RomImage;
use log::{debug, info};
use std::path::Path;

/// An owned ROM buffer that has passed the size and CRC-32 checks
#[derive(Debug)]
pub struct RomFile {
    bytes: Vec<u8>,
    offset: u16,
    crc: u32,
}

impl RomFile {
    pub fn open<P: AsRef<Path>>(path: P, layout: &RomLayout) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading sound ROM: {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes, layout)
    }

    /// Validate an in-memory image against the layout's size and checksum
    pub fn from_bytes(bytes: Vec<u8>, layout: &RomLayout) -> Result<Self> {
        let crc = crc32fast::hash(&bytes);
        info!("file size={} crc={:#x}", bytes.len(), crc);

        if bytes.len() != layout.rom_size {
            return Err(ScoreError::SizeMismatch {
                expected: layout.rom_size,
                actual: bytes.len(),
            });
        }
        if crc != layout.crc32 {
            return Err(ScoreError::ChecksumMismatch {
                expected: layout.crc32,
                actual: crc,
            });
        }
        info!("valid");

        Ok(RomFile {
            bytes,
            offset: layout.address_offset,
            crc,
        })
    }

    /// Accept a buffer without checking it
    pub fn unchecked(bytes: Vec<u8>, layout: &RomLayout) -> Self {
        let crc = crc32fast::hash(&bytes);
        RomFile {
            bytes,
            offset: layout.address_offset,
            crc,
        }
    }

    pub fn open_unchecked<P: AsRef<Path>>(path: P, layout: &RomLayout) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::unchecked(bytes, layout))
    }

    pub fn image(&self) -> RomImage<'_> {
        RomImage::new(&self.bytes, self.offset)
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_for(bytes: &[u8]) -> RomLayout {
        RomLayout {
            rom_size: bytes.len(),
            crc32: crc32fast::hash(bytes),
            ..RomLayout::default()
        }
    }

    #[test]
    fn test_valid_image() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(0x2000).collect();
        let layout = layout_for(&bytes);
        let rom = RomFile::from_bytes(bytes.clone(), &layout).unwrap();
        assert_eq!(rom.len(), 0x2000);
        assert_eq!(rom.crc(), crc32fast::hash(&bytes));
        assert_eq!(rom.image().read_u8(0xE001).unwrap(), 0x01);
    }

    #[test]
    fn test_known_crc() {
        // IEEE CRC-32 check value
        assert_eq!(crc32fast::hash(b"123456789"), 0xcbf43926);
    }

    #[test]
    fn test_size_mismatch() {
        let bytes = vec![0u8; 0x1000];
        let err = RomFile::from_bytes(bytes, &RomLayout::default()).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::SizeMismatch { expected: 8192, actual: 0x1000 }
        ));
    }

    #[test]
    fn test_checksum_mismatch() {
        let bytes = vec![0u8; 0x2000];
        let layout = layout_for(&bytes);
        let mut tampered = bytes.clone();
        tampered[0x100] = 1;
        let err = RomFile::from_bytes(tampered, &layout).unwrap_err();
        assert!(matches!(err, ScoreError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_unchecked_skips_validation() {
        let rom = RomFile::unchecked(vec![0xF3; 4], &RomLayout::default());
        assert_eq!(rom.image().read_u8(0xE003).unwrap(), 0xF3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RomFile::open("/nonexistent/td1_4.1k", &RomLayout::default()).unwrap_err();
        assert!(matches!(err, ScoreError::Io(_)));
    }
}
