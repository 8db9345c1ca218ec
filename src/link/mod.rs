//! Facilities for moving transport units between a memory and its client.

mod queue;

pub use queue::QueueTransport;

//===========================================================================//

/// The byte-level view of one SQI wire group.
///
/// Implementations sit on top of whatever serializes units onto the physical
/// lines.  Every method must return immediately; the memories are polled from
/// a single loop and a blocking call would starve the other memory.
pub trait SqiTransport {
    /// Returns true if an inbound unit is waiting to be taken.
    fn byte_available(&self) -> bool;

    /// Removes and returns the oldest inbound unit.  Only meaningful if
    /// [SqiTransport::byte_available] returned true; otherwise returns zero.
    fn take_byte(&mut self) -> u8;

    /// Queues an outbound unit.  Never blocks.
    fn send_byte(&mut self, unit: u8);

    /// Returns true once every queued outbound unit has been clocked out.
    fn outbound_empty(&self) -> bool;

    /// Discards all inbound units that have not yet been taken.
    fn flush_inbound(&mut self);

    /// Returns the level of the chip select line.  The line is active low,
    /// so `true` means the memory is deselected.
    fn select_level(&self) -> bool;
}

//===========================================================================//
