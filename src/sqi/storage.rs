use super::{MEMORY_SIZE, SqiError};

//===========================================================================//

/// The backing array of one emulated memory.  Addresses are 16 bits wide, so
/// every address is in range and sequential access wraps around.
pub struct Storage {
    data: Box<[u8; MEMORY_SIZE]>,
}

impl Storage {
    /// Returns a new, zero-filled storage array.
    pub fn new() -> Storage {
        Storage { data: Box::new([0u8; MEMORY_SIZE]) }
    }

    /// Returns the byte at the given address.
    pub fn read(&self, addr: u16) -> u8 {
        self.data[usize::from(addr)]
    }

    /// Stores a byte at the given address.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.data[usize::from(addr)] = value;
    }

    /// Copies `bytes` into the start of storage.  If `bytes` doesn't fit,
    /// nothing is written.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), SqiError> {
        if bytes.len() > MEMORY_SIZE {
            return Err(SqiError::CapacityExceeded { len: bytes.len() });
        }
        self.data[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Returns the entire contents of storage.
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice()
    }
}

impl Default for Storage {
    fn default() -> Storage {
        Storage::new()
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::Storage;
    use crate::sqi::{MEMORY_SIZE, SqiError};

    #[test]
    fn starts_zeroed() {
        let storage = Storage::new();
        assert_eq!(storage.as_slice().len(), MEMORY_SIZE);
        assert!(storage.as_slice().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn read_write() {
        let mut storage = Storage::new();
        storage.write(0x1234, 0xab);
        storage.write(0xffff, 0xcd);
        assert_eq!(storage.read(0x1234), 0xab);
        assert_eq!(storage.read(0xffff), 0xcd);
        assert_eq!(storage.read(0x1235), 0x00);
    }

    #[test]
    fn load_full_capacity() {
        let mut storage = Storage::new();
        let bytes: Vec<u8> = (0..MEMORY_SIZE).map(|i| i as u8).collect();
        assert_eq!(storage.load(&bytes), Ok(()));
        assert_eq!(storage.read(0x0000), 0x00);
        assert_eq!(storage.read(0x01ff), 0xff);
        assert_eq!(storage.read(0xfffe), 0xfe);
    }

    #[test]
    fn load_over_capacity_writes_nothing() {
        let mut storage = Storage::new();
        storage.write(0x0000, 0x5a);
        let bytes = vec![0xee; MEMORY_SIZE + 1];
        assert_eq!(
            storage.load(&bytes),
            Err(SqiError::CapacityExceeded { len: MEMORY_SIZE + 1 })
        );
        assert_eq!(storage.read(0x0000), 0x5a);
        assert_eq!(storage.read(0x0001), 0x00);
    }
}

//===========================================================================//
