use super::wire::{
    FILLER, INSTRUCTION_READ, INSTRUCTION_WRITE, TURNAROUND, TURNAROUND_UNITS,
    read_nibble,
};
use super::{SqiError, Storage};
use crate::link::SqiTransport;
use std::fmt;

//===========================================================================//

/// The access mode latched from the first byte of a transaction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Sequential read.
    Read,
    /// Sequential write.
    Write,
    /// The instruction byte was not recognized; the transaction is wedged
    /// until the memory is deselected.
    Undefined,
}

impl Mode {
    /// Decodes an instruction byte.
    pub fn from_instruction(byte: u8) -> Mode {
        match byte {
            INSTRUCTION_READ => Mode::Read,
            INSTRUCTION_WRITE => Mode::Write,
            _ => Mode::Undefined,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Read => f.write_str("READ"),
            Mode::Write => f.write_str("WRITE"),
            Mode::Undefined => f.write_str("UNDEFINED"),
        }
    }
}

//===========================================================================//

/// What the next unit of a transaction means.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Phase {
    /// The next inbound byte is the instruction.
    AwaitInstruction,
    /// The next inbound byte is the high byte of the address.
    AwaitAddressHigh,
    /// The next inbound byte is the low byte of the address.
    AwaitAddressLow,
    /// Inbound bytes are data to store (write mode).
    Receiving,
    /// The next outbound unit is the high nibble of the current byte.
    SendingHighNibble,
    /// The next outbound unit is the low nibble of the current byte.
    SendingLowNibble,
}

//===========================================================================//

/// One emulated 64k SQI memory (modeled on the Microchip 23LC512 in
/// sequential mode), bound to the transport for its wire group.
///
/// The memory is advanced by calling [SqiMemory::tick] as often as possible.
/// Each tick does at most one unit of work and never waits.
pub struct SqiMemory<T> {
    transport: T,
    storage: Storage,
    selected: bool,
    phase: Phase,
    mode: Option<Mode>,
    addr: u16,
    fault: Option<SqiError>,
}

impl<T: SqiTransport> SqiMemory<T> {
    /// Returns a new memory with zeroed storage, attached to the given
    /// transport.
    pub fn new(transport: T) -> SqiMemory<T> {
        SqiMemory {
            transport,
            storage: Storage::new(),
            selected: false,
            phase: Phase::AwaitInstruction,
            mode: None,
            addr: 0,
            fault: None,
        }
    }

    /// Returns the current protocol phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the mode of the current transaction, if its instruction byte
    /// has been received.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Returns the address the current transaction will access next, once
    /// both address bytes have been received.
    pub fn address(&self) -> Option<u16> {
        match self.phase {
            Phase::AwaitInstruction
            | Phase::AwaitAddressHigh
            | Phase::AwaitAddressLow => None,
            Phase::Receiving
            | Phase::SendingHighNibble
            | Phase::SendingLowNibble => Some(self.addr),
        }
    }

    /// Returns the protocol error that wedged the current transaction, if
    /// any.  Cleared when the memory is deselected.
    pub fn fault(&self) -> Option<&SqiError> {
        self.fault.as_ref()
    }

    /// Returns true if chip select was asserted on the most recent tick.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns the byte at the given address without any protocol activity.
    pub fn peek(&self, addr: u16) -> u8 {
        self.storage.read(addr)
    }

    /// Stores a byte directly into the memory without any protocol activity.
    /// Only valid while the client is held in reset.
    pub fn backdoor_write(&mut self, addr: u16, value: u8) {
        self.storage.write(addr, value);
    }

    /// Copies `bytes` into the memory starting at address zero.  Fails
    /// without modifying the memory if `bytes` is larger than the memory.
    /// Only valid while the client is held in reset.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), SqiError> {
        let result = self.storage.load(bytes);
        match &result {
            Ok(()) => tracing::debug!(len = bytes.len(), "Loaded memory"),
            Err(error) => tracing::warn!("Load rejected: {error}"),
        }
        result
    }

    /// Returns the memory's backing storage.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Returns the transport this memory is attached to.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport this memory is attached to.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Advances the protocol by at most one unit.
    pub fn tick(&mut self) {
        // Deselecting is the only way to reset a transaction.
        self.selected = !self.transport.select_level();
        if !self.selected {
            self.reset();
            return;
        }
        match self.phase {
            Phase::SendingHighNibble | Phase::SendingLowNibble => {
                self.send_nibble();
            }
            Phase::AwaitInstruction
            | Phase::AwaitAddressHigh
            | Phase::AwaitAddressLow
            | Phase::Receiving => {
                if self.transport.byte_available() {
                    let byte = self.transport.take_byte();
                    self.receive(byte);
                }
            }
        }
    }

    fn reset(&mut self) {
        self.transport.flush_inbound();
        if self.mode.is_some() {
            tracing::debug!("Resetting SQI memory");
        }
        self.phase = Phase::AwaitInstruction;
        self.mode = None;
        self.addr = 0;
        self.fault = None;
    }

    fn receive(&mut self, byte: u8) {
        match self.phase {
            Phase::AwaitInstruction => {
                if self.fault.is_some() {
                    return;
                }
                let mode = Mode::from_instruction(byte);
                self.mode = Some(mode);
                if mode == Mode::Undefined {
                    let error = SqiError::UnknownInstruction(byte);
                    tracing::warn!("{error}");
                    self.fault = Some(error);
                    return;
                }
                tracing::debug!("Mode set to {mode}");
                self.phase = Phase::AwaitAddressHigh;
                self.send_turnaround(FILLER);
            }
            Phase::AwaitAddressHigh => {
                self.addr = u16::from(byte) << 8;
                self.phase = Phase::AwaitAddressLow;
                self.send_turnaround(FILLER);
            }
            Phase::AwaitAddressLow => {
                self.addr |= u16::from(byte);
                tracing::debug!("Address set to 0x{:04x}", self.addr);
                if self.mode == Some(Mode::Read) {
                    self.phase = Phase::SendingHighNibble;
                    self.send_turnaround(TURNAROUND);
                } else {
                    self.phase = Phase::Receiving;
                    self.send_turnaround(FILLER);
                }
            }
            Phase::Receiving => {
                tracing::trace!("Write 0x{:04x}: 0x{byte:02x}", self.addr);
                self.storage.write(self.addr, byte);
                self.addr = self.addr.wrapping_add(1);
                self.send_turnaround(FILLER);
            }
            Phase::SendingHighNibble | Phase::SendingLowNibble => {}
        }
    }

    fn send_turnaround(&mut self, unit: u8) {
        for _ in 0..TURNAROUND_UNITS {
            self.transport.send_byte(unit);
        }
    }

    fn send_nibble(&mut self) {
        // Read data is paced by the client's clock, not by inbound data.
        if !self.transport.outbound_empty() {
            return;
        }
        let value = self.storage.read(self.addr);
        if self.phase == Phase::SendingHighNibble {
            self.transport.send_byte(read_nibble(value >> 4));
            self.phase = Phase::SendingLowNibble;
        } else {
            self.transport.send_byte(read_nibble(value & 0xf));
            self.phase = Phase::SendingHighNibble;
            self.addr = self.addr.wrapping_add(1);
        }
    }
}

//===========================================================================//


//===========================================================================//
