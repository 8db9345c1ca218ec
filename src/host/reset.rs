//===========================================================================//

/// The client's active-low reset line.
pub trait ResetLine {
    /// Pulls reset low, stopping the client.
    fn hold(&mut self);

    /// Releases reset, letting the client run.
    fn release(&mut self);

    /// Returns true if the client is currently held in reset.
    fn is_held(&self) -> bool;
}

//===========================================================================//

/// A reset line that isn't wired to anything, which just records its state.
/// Used when the client is simulated, or absent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VirtualResetLine {
    held: bool,
    releases: u64,
}

impl VirtualResetLine {
    /// Returns a new reset line, initially holding the client in reset.
    pub fn new() -> VirtualResetLine {
        VirtualResetLine { held: true, releases: 0 }
    }

    /// Returns how many times the client has been released from reset.
    pub fn release_count(&self) -> u64 {
        self.releases
    }
}

impl Default for VirtualResetLine {
    fn default() -> VirtualResetLine {
        VirtualResetLine::new()
    }
}

impl ResetLine for VirtualResetLine {
    fn hold(&mut self) {
        self.held = true;
    }

    fn release(&mut self) {
        if self.held {
            self.releases += 1;
        }
        self.held = false;
    }

    fn is_held(&self) -> bool {
        self.held
    }
}

//===========================================================================//


//===========================================================================//
