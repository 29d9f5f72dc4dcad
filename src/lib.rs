//! A tiny educational CPU: sixteen-ish instructions, six nibble-banked
//! registers, 256 bytes of memory and a two-pass assembler.
//!
//! ```text
//! loop:
//!     ADD AX, #1
//!     INT #0        ; show AX on the LEDs
//!     JMP loop
//! ```

#[macro_use]
mod macros;

pub mod memory;
pub mod port;
pub mod processor;

pub use memory::{Byte, Memory, StdMem, Word};
pub use port::{LogPort, NullPort, OutputPort, Snapshot};
pub use processor::{Processor, StdProcessor};
