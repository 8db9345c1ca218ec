//! Facilities for servicing commands from the host computer.

mod dispatch;
mod image;
mod reset;
mod run;

pub use dispatch::{FlashError, Podi};
pub use image::{ImageError, MAX_FLASH_LEN, SplitImage};
pub use reset::{ResetLine, VirtualResetLine};
pub use run::{CancelToken, RunControl, TickLimit};

//===========================================================================//

/// Marker printed to the host after every valid command completes.
pub const DONE_MARKER: &str = "=== DONE ===";

//===========================================================================//

/// A command sent by the host as a single byte.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Command {
    /// Check the host link by printing a fixed reply.
    Ping,
    /// Write new contents into both memories.
    Flash,
    /// Release the client from reset and service its memory accesses.
    Run,
}

impl Command {
    /// Decodes a command byte, returning `None` for unknown commands.
    pub fn from_byte(byte: u8) -> Option<Command> {
        match byte {
            0x00 => Some(Command::Ping),
            0x01 => Some(Command::Flash),
            0x02 => Some(Command::Run),
            _ => None,
        }
    }

    /// Returns the byte that encodes this command.
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Ping => 0x00,
            Command::Flash => 0x01,
            Command::Run => 0x02,
        }
    }

    /// Returns the name printed when this command starts.
    pub fn name(self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::Flash => "FLASH",
            Command::Run => "RUN",
        }
    }
}

//===========================================================================//

/// Identifies one of the two emulated memories.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Bank {
    /// The memory holding the low nibbles of each word.
    Lo,
    /// The memory holding the high nibbles of each word.
    Hi,
}

impl Bank {
    /// Both banks, in the order their data appears in a flash payload.
    pub const ALL: [Bank; 2] = [Bank::Lo, Bank::Hi];

    /// Returns the index used for this bank in diagnostics.
    pub fn index(self) -> usize {
        match self {
            Bank::Lo => 0,
            Bank::Hi => 1,
        }
    }
}

//===========================================================================//


//===========================================================================//
