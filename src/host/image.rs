use super::Command;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

//===========================================================================//

/// The largest number of bytes the flash command can write to each memory.
pub const MAX_FLASH_LEN: usize = u16::MAX as usize;

//===========================================================================//

/// An error encountered while preparing a binary for flashing.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ImageError {
    /// The binary is not a whole number of 16-bit words.
    #[error("binary length {len} is not a whole number of 16-bit words")]
    OddLength {
        /// The length of the binary, in bytes.
        len: usize,
    },
    /// The binary has more words than the flash command can carry.
    #[error("binary has {words} words, but at most {} fit", MAX_FLASH_LEN)]
    TooLarge {
        /// The number of 16-bit words in the binary.
        words: usize,
    },
}

//===========================================================================//

/// A binary split across the two memories.  Each 16-bit word of the binary
/// contributes one byte to each memory at the same address: the low memory
/// holds bits 0-3 and 8-11 of the word, and the high memory holds bits 4-7
/// and 12-15.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SplitImage {
    /// The contents of the low memory.
    pub lo: Vec<u8>,
    /// The contents of the high memory.
    pub hi: Vec<u8>,
}

impl SplitImage {
    /// Splits a binary made of big-endian 16-bit words.
    pub fn from_binary(binary: &[u8]) -> Result<SplitImage, ImageError> {
        if binary.len() % 2 != 0 {
            return Err(ImageError::OddLength { len: binary.len() });
        }
        let words = binary.len() / 2;
        if words > MAX_FLASH_LEN {
            return Err(ImageError::TooLarge { words });
        }
        let mut lo = Vec::with_capacity(words);
        let mut hi = Vec::with_capacity(words);
        for chunk in binary.chunks_exact(2) {
            let word = BigEndian::read_u16(chunk);
            lo.push(((word & 0x000f) | ((word & 0x0f00) >> 4)) as u8);
            hi.push((((word & 0x00f0) >> 4) | ((word & 0xf000) >> 8)) as u8);
        }
        Ok(SplitImage { lo, hi })
    }

    /// Returns the number of bytes destined for each memory.
    pub fn len(&self) -> usize {
        self.lo.len()
    }

    /// Returns true if the image is empty.
    pub fn is_empty(&self) -> bool {
        self.lo.is_empty()
    }

    /// Reassembles the original binary.
    pub fn to_binary(&self) -> Vec<u8> {
        let mut binary = Vec::with_capacity(self.len() * 2);
        for (&lo, &hi) in self.lo.iter().zip(self.hi.iter()) {
            let (lo, hi) = (u16::from(lo), u16::from(hi));
            let word = (lo & 0x0f)
                | ((hi & 0x0f) << 4)
                | ((lo & 0xf0) << 4)
                | ((hi & 0xf0) << 8);
            binary.extend_from_slice(&word.to_be_bytes());
        }
        binary
    }

    /// Returns the complete host-link byte stream for a flash command that
    /// writes this image.  Images built by hand with more than
    /// [MAX_FLASH_LEN] bytes per memory will have a truncated count.
    pub fn flash_command(&self) -> Vec<u8> {
        let mut stream = Vec::with_capacity(3 + 2 * self.len());
        stream.push(Command::Flash.to_byte());
        let mut count = [0u8; 2];
        LittleEndian::write_u16(&mut count, self.len() as u16);
        stream.extend_from_slice(&count);
        stream.extend_from_slice(&self.lo);
        stream.extend_from_slice(&self.hi);
        stream
    }
}

//===========================================================================//


//===========================================================================//
