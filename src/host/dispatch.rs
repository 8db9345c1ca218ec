use super::{Bank, Command, DONE_MARKER, ResetLine, RunControl};
use crate::link::SqiTransport;
use crate::sqi::SqiMemory;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Write};

//===========================================================================//

/// An error that aborted a flash command.  Bytes written before the error
/// stay in memory.
#[derive(Debug, thiserror::Error)]
pub enum FlashError {
    /// The host stopped sending before the payload size arrived.
    #[error("Timeout waiting for flash payload size.")]
    SizeTimeout,
    /// The host stopped sending partway through a memory's payload.
    #[error("Memory {memory}: byte {offset}/{count} timed out.")]
    ByteTimeout {
        /// Index of the memory being written.
        memory: usize,
        /// Offset of the byte that never arrived.
        offset: u16,
        /// Number of bytes expected for each memory.
        count: u16,
    },
    /// The host link failed outright.
    #[error("Host link error: {0}")]
    Io(io::Error),
}

//===========================================================================//

/// The device: two emulated memories plus the client's reset line, driven by
/// commands from the host.
pub struct Podi<T, R> {
    mem_lo: SqiMemory<T>,
    mem_hi: SqiMemory<T>,
    reset: R,
}

impl<T: SqiTransport, R: ResetLine> Podi<T, R> {
    /// Returns a new device with zeroed memories, holding the client in
    /// reset.
    pub fn new(lo: T, hi: T, mut reset: R) -> Podi<T, R> {
        reset.hold();
        Podi {
            mem_lo: SqiMemory::new(lo),
            mem_hi: SqiMemory::new(hi),
            reset,
        }
    }

    /// Returns one of the two memories.
    pub fn memory(&self, bank: Bank) -> &SqiMemory<T> {
        match bank {
            Bank::Lo => &self.mem_lo,
            Bank::Hi => &self.mem_hi,
        }
    }

    /// Returns one of the two memories.
    pub fn memory_mut(&mut self, bank: Bank) -> &mut SqiMemory<T> {
        match bank {
            Bank::Lo => &mut self.mem_lo,
            Bank::Hi => &mut self.mem_hi,
        }
    }

    /// Returns the client's reset line.
    pub fn reset_line(&self) -> &R {
        &self.reset
    }

    /// Services commands from `input` until it reaches end-of-file, writing
    /// replies to `output`.  Only a failure to write to the host ends the
    /// loop early.
    pub fn serve<I, O, C>(
        &mut self,
        mut input: I,
        mut output: O,
        mut control: C,
    ) -> io::Result<()>
    where
        I: Read,
        O: Write,
        C: RunControl,
    {
        loop {
            let byte = match input.read_u8() {
                Ok(byte) => byte,
                Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                    tracing::info!("Host link closed");
                    return Ok(());
                }
                Err(error) if is_timeout(&error) => continue,
                Err(error) => return Err(error),
            };
            self.dispatch(byte, &mut input, &mut output, &mut control)?;
        }
    }

    /// Executes the command encoded by `byte`, reading any payload from
    /// `input` and writing replies to `output`.
    pub fn dispatch<I, O, C>(
        &mut self,
        byte: u8,
        input: I,
        mut output: O,
        control: C,
    ) -> io::Result<()>
    where
        I: Read,
        O: Write,
        C: RunControl,
    {
        let Some(command) = Command::from_byte(byte) else {
            // Unknown commands get no completion marker.
            tracing::warn!("Invalid command: 0x{byte:02x}");
            writeln!(output, "ERROR: Invalid command: 0x{byte:02x}")?;
            return output.flush();
        };
        let name = command.name();
        tracing::info!("Run command: {name} (0x{byte:02x})");
        writeln!(output, "Run command: {name} (0x{byte:02x})")?;
        match command {
            Command::Ping => self.ping(&mut output)?,
            Command::Flash => self.flash(input, &mut output)?,
            Command::Run => self.run(control),
        }
        writeln!(output, "{DONE_MARKER}")?;
        output.flush()
    }

    /// Replies with a fixed message.
    pub fn ping<O: Write>(&mut self, mut output: O) -> io::Result<()> {
        writeln!(output, "Ping!")
    }

    /// Reads a flash payload from `input` into both memories.  A payload that
    /// stops short is reported to the host, not returned as an error.
    pub fn flash<I: Read, O: Write>(
        &mut self,
        mut input: I,
        mut output: O,
    ) -> io::Result<()> {
        let count = match input.read_u16::<LittleEndian>() {
            Ok(count) => count,
            Err(error) => {
                let error = classify(error, FlashError::SizeTimeout);
                return report_flash_error(&mut output, error);
            }
        };
        writeln!(output, "Flashing {count} bytes to each memory.")?;
        match self.flash_payload(&mut input, count) {
            Ok(()) => writeln!(output, "Flashing complete."),
            Err(error) => report_flash_error(&mut output, error),
        }
    }

    fn flash_payload<I: Read>(
        &mut self,
        input: &mut I,
        count: u16,
    ) -> Result<(), FlashError> {
        for bank in Bank::ALL {
            let memory = self.memory_mut(bank);
            for offset in 0..count {
                let byte = input.read_u8().map_err(|error| {
                    let timeout = FlashError::ByteTimeout {
                        memory: bank.index(),
                        offset,
                        count,
                    };
                    classify(error, timeout)
                })?;
                memory.backdoor_write(offset, byte);
            }
        }
        tracing::info!(count, "Flashed both memories");
        Ok(())
    }

    /// Releases the client from reset and ticks both memories until
    /// `control` says to stop, then holds the client in reset again.
    pub fn run<C: RunControl>(&mut self, mut control: C) {
        self.reset.release();
        tracing::info!("Client released from reset");
        let mut rounds: u64 = 0;
        while control.keep_running() {
            self.mem_hi.tick();
            self.mem_lo.tick();
            rounds += 1;
        }
        self.reset.hold();
        tracing::info!(rounds, "Client held in reset");
    }
}

//===========================================================================//

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::UnexpectedEof
    )
}

fn classify(error: io::Error, timeout: FlashError) -> FlashError {
    if is_timeout(&error) { timeout } else { FlashError::Io(error) }
}

fn report_flash_error<O: Write>(
    output: &mut O,
    error: FlashError,
) -> io::Result<()> {
    tracing::warn!("Flash aborted: {error}");
    writeln!(output, "ERROR: {error}")
}

//===========================================================================//


//===========================================================================//
