use super::MEMORY_SIZE;

//===========================================================================//

/// An error detected by an emulated SQI memory.
///
/// These never stop the device; they are reported as diagnostics and the
/// memory carries on (or stays wedged until the next deselect).
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SqiError {
    /// The first byte of a transaction was not a supported instruction.
    #[error("unknown SQI instruction: 0x{0:02x}")]
    UnknownInstruction(u8),
    /// A bulk load was larger than the memory.
    #[error("cannot load {len} bytes into a {}-byte memory", MEMORY_SIZE)]
    CapacityExceeded {
        /// The length of the rejected payload.
        len: usize,
    },
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::SqiError;

    #[test]
    fn messages() {
        assert_eq!(
            SqiError::UnknownInstruction(0x0b).to_string(),
            "unknown SQI instruction: 0x0b"
        );
        assert_eq!(
            SqiError::CapacityExceeded { len: 65537 }.to_string(),
            "cannot load 65537 bytes into a 65536-byte memory"
        );
    }
}

//===========================================================================//
