use std::error;
use std::fmt;

use crate::memory::{Byte, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// A memory operand addressed a byte outside of memory
    OutOfBoundsMemory { address: usize },
    /// A register operand used a code outside `0x01..=0x12`
    UnknownRegister { code: Byte },
    UnknownOpcode { opcode: Byte },
    UnknownAddressingMode { opcode: Byte, mode: Byte },
    UnknownInterrupt { number: Byte },
    /// An instruction tried to write to an immediate operand
    ImmediateDestination { opcode: Byte },
    /// A jump resolved to an address outside of memory
    InvalidJumpTarget { address: usize },
    /// PC points past the last byte of memory
    EndOfMemory,
    /// The operand bytes of an instruction run past the end of memory
    TruncatedInstruction { opcode: Byte },
}

impl RuntimeErrorKind {
    /// Fatal errors halt the processor. Everything else only drops the
    /// offending instruction.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidJumpTarget { .. } | Self::EndOfMemory | Self::TruncatedInstruction { .. }
        )
    }
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBoundsMemory { address } => {
                write!(f, "memory access out of bounds: 0x{:x}", address)
            }
            Self::UnknownRegister { code } => write!(f, "unknown register code 0x{:02x}", code),
            Self::UnknownOpcode { opcode } => write!(f, "unknown opcode 0x{:02x}", opcode),
            Self::UnknownAddressingMode { opcode, mode } => write!(
                f,
                "unknown addressing mode 0x{:02x} for opcode 0x{:02x}",
                mode, opcode
            ),
            Self::UnknownInterrupt { number } => write!(f, "unknown interrupt number {}", number),
            Self::ImmediateDestination { opcode } => write!(
                f,
                "opcode 0x{:02x} cannot write to an immediate operand",
                opcode
            ),
            Self::InvalidJumpTarget { address } => {
                write!(f, "jump to invalid address 0x{:x}", address)
            }
            Self::EndOfMemory => f.write_str("program reached end of memory"),
            Self::TruncatedInstruction { opcode } => write!(
                f,
                "operands of opcode 0x{:02x} run past the end of memory",
                opcode
            ),
        }
    }
}

/// An error raised while executing the instruction that starts at `pc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub pc: Word,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, pc: Word) -> Self {
        Self { kind, pc }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error [pc: 0x{:02x}]: {}", self.pc, self.kind)
    }
}

impl error::Error for RuntimeError {}

pub type Result<T, E = RuntimeErrorKind> = std::result::Result<T, E>;
