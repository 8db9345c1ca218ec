//! Facilities for emulating SQI serial memories.

mod client;
mod engine;
mod error;
mod storage;
pub mod wire;

pub use client::{ClientError, SqiClient};
pub use engine::{Mode, Phase, SqiMemory};
pub use error::SqiError;
pub use storage::Storage;

//===========================================================================//

/// The size of each emulated memory, in bytes.
pub const MEMORY_SIZE: usize = 1 << 16;

//===========================================================================//
