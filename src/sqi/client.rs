use super::wire::{
    FILLER, INSTRUCTION_READ, INSTRUCTION_WRITE, PINDIRS_OUT, TURNAROUND,
    TURNAROUND_UNITS, unpack,
};
use super::{SqiError, SqiMemory};
use crate::link::QueueTransport;

//===========================================================================//

const DEFAULT_TICK_BUDGET: usize = 64;

//===========================================================================//

/// An error reported by [SqiClient] when a memory misbehaves.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The memory made no progress within the tick budget.
    #[error("memory stalled for {ticks} ticks")]
    Stalled {
        /// How many ticks were spent waiting.
        ticks: usize,
    },
    /// The memory clocked out a unit other than the one the protocol calls
    /// for.
    #[error("expected unit {expected}, got {found:?}")]
    UnexpectedUnit {
        /// A description of the expected unit.
        expected: &'static str,
        /// The unit actually received, if any.
        found: Option<u8>,
    },
    /// The memory rejected the transaction.
    #[error("memory fault: {0}")]
    Fault(#[from] SqiError),
}

//===========================================================================//

/// A simulated client chip, which performs complete transactions against a
/// memory attached to a [QueueTransport], ticking the memory as it goes.
pub struct SqiClient {
    tick_budget: usize,
}

impl SqiClient {
    /// Returns a client that waits up to a small fixed number of ticks for
    /// each unit before reporting a stall.
    pub fn new() -> SqiClient {
        SqiClient { tick_budget: DEFAULT_TICK_BUDGET }
    }

    /// Returns a client that waits up to `tick_budget` ticks for each unit.
    pub fn with_tick_budget(tick_budget: usize) -> SqiClient {
        SqiClient { tick_budget }
    }

    /// Writes `data` to the memory starting at `addr`, in one transaction.
    pub fn write(
        &self,
        memory: &mut SqiMemory<QueueTransport>,
        addr: u16,
        data: &[u8],
    ) -> Result<(), ClientError> {
        let result = self.try_write(memory, addr, data);
        self.end_transaction(memory);
        result
    }

    /// Reads `len` bytes from the memory starting at `addr`, in one
    /// transaction.
    pub fn read(
        &self,
        memory: &mut SqiMemory<QueueTransport>,
        addr: u16,
        len: usize,
    ) -> Result<Vec<u8>, ClientError> {
        let result = self.try_read(memory, addr, len);
        self.end_transaction(memory);
        result
    }

    fn try_write(
        &self,
        memory: &mut SqiMemory<QueueTransport>,
        addr: u16,
        data: &[u8],
    ) -> Result<(), ClientError> {
        memory.transport_mut().select();
        self.send(memory, INSTRUCTION_WRITE, FILLER)?;
        let [addr_hi, addr_lo] = addr.to_be_bytes();
        self.send(memory, addr_hi, FILLER)?;
        self.send(memory, addr_lo, FILLER)?;
        for &byte in data {
            self.send(memory, byte, FILLER)?;
        }
        Ok(())
    }

    fn try_read(
        &self,
        memory: &mut SqiMemory<QueueTransport>,
        addr: u16,
        len: usize,
    ) -> Result<Vec<u8>, ClientError> {
        memory.transport_mut().select();
        self.send(memory, INSTRUCTION_READ, FILLER)?;
        let [addr_hi, addr_lo] = addr.to_be_bytes();
        self.send(memory, addr_hi, FILLER)?;
        self.send(memory, addr_lo, TURNAROUND)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            let high = self.receive_nibble(memory)?;
            let low = self.receive_nibble(memory)?;
            data.push((high << 4) | low);
        }
        Ok(data)
    }

    fn end_transaction(&self, memory: &mut SqiMemory<QueueTransport>) {
        memory.transport_mut().deselect();
        memory.tick();
    }

    /// Clocks one byte in, then checks the memory answered with the given
    /// pair of turnaround units.
    fn send(
        &self,
        memory: &mut SqiMemory<QueueTransport>,
        byte: u8,
        reply: u8,
    ) -> Result<(), ClientError> {
        memory.transport_mut().push_inbound(byte);
        let mut ticks = 0;
        while memory.transport().inbound_len() > 0 {
            if ticks == self.tick_budget {
                return Err(ClientError::Stalled { ticks });
            }
            memory.tick();
            ticks += 1;
        }
        if let Some(fault) = memory.fault() {
            return Err(ClientError::Fault(fault.clone()));
        }
        for _ in 0..TURNAROUND_UNITS {
            let found = memory.transport_mut().pop_outbound();
            if found != Some(reply) {
                let expected =
                    if reply == FILLER { "filler" } else { "turnaround" };
                return Err(ClientError::UnexpectedUnit { expected, found });
            }
        }
        Ok(())
    }

    fn receive_nibble(
        &self,
        memory: &mut SqiMemory<QueueTransport>,
    ) -> Result<u8, ClientError> {
        for _ in 0..self.tick_budget {
            memory.tick();
            if let Some(unit) = memory.transport_mut().pop_outbound() {
                let (nibble, pindirs) = unpack(unit);
                if pindirs != PINDIRS_OUT {
                    return Err(ClientError::UnexpectedUnit {
                        expected: "read nibble",
                        found: Some(unit),
                    });
                }
                return Ok(nibble);
            }
        }
        Err(ClientError::Stalled { ticks: self.tick_budget })
    }
}

impl Default for SqiClient {
    fn default() -> SqiClient {
        SqiClient::new()
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{ClientError, SqiClient};
    use crate::link::QueueTransport;
    use crate::sqi::{Phase, SqiError, SqiMemory};

    #[test]
    fn write_then_read() {
        let mut memory = SqiMemory::new(QueueTransport::new());
        let client = SqiClient::new();
        assert_eq!(client.write(&mut memory, 0x4000, &[0xde, 0xad]), Ok(()));
        assert_eq!(memory.peek(0x4000), 0xde);
        assert_eq!(memory.peek(0x4001), 0xad);
        assert_eq!(client.read(&mut memory, 0x4000, 2), Ok(vec![0xde, 0xad]));
    }

    #[test]
    fn transactions_leave_memory_deselected() {
        let mut memory = SqiMemory::new(QueueTransport::new());
        let client = SqiClient::new();
        assert_eq!(client.read(&mut memory, 0x0000, 3), Ok(vec![0, 0, 0]));
        assert!(!memory.is_selected());
        assert!(!memory.transport().is_selected());
        assert_eq!(memory.phase(), Phase::AwaitInstruction);
    }

    #[test]
    fn empty_write_stores_nothing() {
        let mut memory = SqiMemory::new(QueueTransport::new());
        let client = SqiClient::new();
        assert_eq!(client.write(&mut memory, 0x0000, &[]), Ok(()));
        assert!(memory.storage().as_slice().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn zero_budget_stalls() {
        let mut memory = SqiMemory::new(QueueTransport::new());
        let client = SqiClient::with_tick_budget(0);
        assert_eq!(
            client.write(&mut memory, 0x0000, &[0x01]),
            Err(ClientError::Stalled { ticks: 0 })
        );
        assert_eq!(memory.peek(0x0000), 0x00);
    }

    #[test]
    fn fault_is_reported() {
        let error = ClientError::from(SqiError::UnknownInstruction(0x00));
        assert_eq!(
            error.to_string(),
            "memory fault: unknown SQI instruction: 0x00"
        );
    }
}

//===========================================================================//
