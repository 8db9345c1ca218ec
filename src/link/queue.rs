use super::SqiTransport;
use std::collections::VecDeque;

//===========================================================================//

/// An in-memory transport made of two FIFOs, standing in for the serializer
/// hardware.  The memory sees it through [SqiTransport]; the client side
/// (a test, or the simulated client chip) uses the inherent methods.
pub struct QueueTransport {
    inbound: VecDeque<u8>,
    outbound: VecDeque<u8>,
    select_high: bool,
}

impl QueueTransport {
    /// Returns a new transport with empty queues and chip select released
    /// (pulled up, so the memory is deselected).
    pub fn new() -> QueueTransport {
        QueueTransport {
            inbound: VecDeque::new(),
            outbound: VecDeque::new(),
            select_high: true,
        }
    }

    /// Pulls chip select low, selecting the memory.
    pub fn select(&mut self) {
        self.select_high = false;
    }

    /// Releases chip select.  The client stops clocking, so any outbound
    /// units that were never clocked out are dropped.
    pub fn deselect(&mut self) {
        self.select_high = true;
        self.outbound.clear();
    }

    /// Returns true if chip select is currently asserted.
    pub fn is_selected(&self) -> bool {
        !self.select_high
    }

    /// Clocks one unit in from the client.
    pub fn push_inbound(&mut self, unit: u8) {
        self.inbound.push_back(unit);
    }

    /// Returns the number of inbound units the memory has not yet taken.
    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }

    /// Clocks one unit out to the client, if the memory has queued any.
    pub fn pop_outbound(&mut self) -> Option<u8> {
        self.outbound.pop_front()
    }

    /// Returns the outbound units queued so far, without clocking them out.
    pub fn pending_outbound(&self) -> impl Iterator<Item = u8> + '_ {
        self.outbound.iter().copied()
    }
}

impl Default for QueueTransport {
    fn default() -> QueueTransport {
        QueueTransport::new()
    }
}

impl SqiTransport for QueueTransport {
    fn byte_available(&self) -> bool {
        !self.inbound.is_empty()
    }

    fn take_byte(&mut self) -> u8 {
        self.inbound.pop_front().unwrap_or(0)
    }

    fn send_byte(&mut self, unit: u8) {
        self.outbound.push_back(unit);
    }

    fn outbound_empty(&self) -> bool {
        self.outbound.is_empty()
    }

    fn flush_inbound(&mut self) {
        self.inbound.clear();
    }

    fn select_level(&self) -> bool {
        self.select_high
    }
}

//===========================================================================//


//===========================================================================//
