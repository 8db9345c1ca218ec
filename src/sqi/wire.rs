//! Encodings of the units exchanged with the transport.
//!
//! Each outbound unit carries a 4-bit payload in its high nibble and the
//! direction of the four SIO lines in its low nibble, so that the transport
//! knows whether to drive or sample the lines for that cycle.

//===========================================================================//

/// SIO direction marker: the client drives the lines.
pub const PINDIRS_IN: u8 = 0x0;

/// SIO direction marker: the memory drives the lines.
pub const PINDIRS_OUT: u8 = 0xf;

/// Instruction byte for a sequential write.
pub const INSTRUCTION_WRITE: u8 = 0x02;

/// Instruction byte for a sequential read.
pub const INSTRUCTION_READ: u8 = 0x03;

/// Number of outbound units queued on every inbound phase transition.
pub const TURNAROUND_UNITS: usize = 2;

/// Outbound unit that keeps the lines as inputs while more inbound data is
/// awaited.
pub const FILLER: u8 = pack(0, PINDIRS_IN);

/// Outbound unit that flips the lines to outputs ahead of read data.
pub const TURNAROUND: u8 = pack(0, PINDIRS_OUT);

//===========================================================================//

/// Packs a 4-bit payload with a direction marker into one outbound unit.
pub const fn pack(payload: u8, pindirs: u8) -> u8 {
    ((payload & 0xf) << 4) | (pindirs & 0xf)
}

/// Returns the outbound unit carrying one nibble of read data.
pub const fn read_nibble(nibble: u8) -> u8 {
    pack(nibble, PINDIRS_OUT)
}

/// Splits an outbound unit back into its payload and direction marker.
pub const fn unpack(unit: u8) -> (u8, u8) {
    (unit >> 4, unit & 0xf)
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{FILLER, TURNAROUND, pack, read_nibble, unpack};

    #[test]
    fn fixed_units() {
        assert_eq!(FILLER, 0x00);
        assert_eq!(TURNAROUND, 0x0f);
    }

    #[test]
    fn nibble_units_carry_output_marker() {
        assert_eq!(read_nibble(0xa), 0xaf);
        assert_eq!(read_nibble(0x5), 0x5f);
        assert_eq!(unpack(read_nibble(0x3)), (0x3, 0xf));
    }

    #[test]
    fn pack_masks_oversized_fields() {
        assert_eq!(pack(0x1a, 0x20), 0xa0);
    }
}

//===========================================================================//
