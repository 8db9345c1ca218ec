//! Emulated SQI memories for a client chip, with a host command loop for
//! flashing them and releasing the client to run.

#![warn(missing_docs)]

pub mod host;
pub mod link;
pub mod sqi;
