//! Instruction decoding.
//!
//! Every instruction is an opcode byte followed by an addressing-mode byte and
//! zero to two operand bytes. The mode byte alone determines how many operand
//! bytes follow, so the processor can always skip an instruction it fails to
//! decode.

use std::convert::TryFrom;
use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::error::{Result, RuntimeErrorKind};
use super::registers::Register;
use super::Opcode;
use crate::memory::{Byte, Word};

/// The "type" byte following every opcode.
///
/// Single operand instructions reuse `RegReg`, `RegMem` and `RegImm` for a
/// register, memory or immediate operand.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum AddressingMode {
    /// `reg, reg`
    RegReg = 0x00,
    /// `reg, [mem]`
    RegMem = 0x01,
    /// `[mem], reg`
    MemReg = 0x02,
    /// `reg, #imm`
    RegImm = 0x03,
    /// `MOP, #imm` (MOV only)
    Mop = 0x04,
    /// `[mem], [mem]`
    MemMem = 0x05,
    /// `[mem], #imm`
    MemImm = 0x06,
}

impl AddressingMode {
    /// Mode of a two operand instruction, if the combination is encodable
    pub fn of_pair(dest: Operand, src: Operand) -> Option<Self> {
        use Operand::*;

        match (dest, src) {
            (Register(_), Register(_)) => Some(Self::RegReg),
            (Register(_), Memory(_)) => Some(Self::RegMem),
            (Memory(_), Register(_)) => Some(Self::MemReg),
            (Register(_), Immediate(_)) => Some(Self::RegImm),
            (Memory(_), Memory(_)) => Some(Self::MemMem),
            (Memory(_), Immediate(_)) => Some(Self::MemImm),
            (Immediate(_), _) => None,
        }
    }

    /// Mode of a single operand instruction
    pub fn of_single(operand: Operand) -> Self {
        match operand {
            Operand::Register(_) => Self::RegReg,
            Operand::Memory(_) => Self::RegMem,
            Operand::Immediate(_) => Self::RegImm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Register(Register),
    /// Direct memory address
    Memory(Byte),
    Immediate(Byte),
}

impl Operand {
    /// The byte this operand occupies in the instruction stream
    pub fn byte(self) -> Byte {
        match self {
            Operand::Register(register) => register.into(),
            Operand::Memory(address) => address,
            Operand::Immediate(value) => value,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(register) => write!(f, "{}", register),
            Operand::Memory(address) => write!(f, "[{:02X}]", address),
            Operand::Immediate(value) => write!(f, "#{:02X}", value),
        }
    }
}

/// Two operand ALU instructions. All of them update the flags; all but
/// `Cmp` write the result back to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Cmp,
}

impl BinaryOp {
    pub fn opcode(self) -> Opcode {
        match self {
            BinaryOp::Add => Opcode::ADD,
            BinaryOp::Sub => Opcode::SUB,
            BinaryOp::And => Opcode::AND,
            BinaryOp::Or => Opcode::OR,
            BinaryOp::Xor => Opcode::XOR,
            BinaryOp::Shl => Opcode::SHL,
            BinaryOp::Shr => Opcode::SHR,
            BinaryOp::Cmp => Opcode::CMP,
        }
    }

    /// Computes the unmasked result. Shift counts use the low three bits of `b`.
    pub fn apply(self, a: i32, b: i32) -> i32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub | BinaryOp::Cmp => a - b,
            BinaryOp::And => a & b,
            BinaryOp::Or => a | b,
            BinaryOp::Xor => a ^ b,
            BinaryOp::Shl => a << (b & 0x7),
            BinaryOp::Shr => a >> (b & 0x7),
        }
    }

    pub fn writes_back(self) -> bool {
        self != BinaryOp::Cmp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Always,
    /// ZF set
    Zero,
    /// CF set
    Carry,
}

impl Condition {
    /// The branch condition of a jump opcode, `None` for everything else
    pub fn of(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::JMP => Some(Condition::Always),
            Opcode::JZ => Some(Condition::Zero),
            Opcode::JC => Some(Condition::Carry),
            _ => None,
        }
    }
}

/// A fully decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Nop,
    Halt,
    Interrupt(Operand),
    /// `MOV MOP, #imm`
    SetMop(Byte),
    Move { dest: Operand, src: Operand },
    Binary { op: BinaryOp, dest: Operand, src: Operand },
    Not(Operand),
    Jump { condition: Condition, target: Operand },
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Nop => Opcode::NOP,
            Instruction::Halt => Opcode::HLT,
            Instruction::Interrupt(_) => Opcode::INT,
            Instruction::SetMop(_) | Instruction::Move { .. } => Opcode::MOV,
            Instruction::Binary { op, .. } => op.opcode(),
            Instruction::Not(_) => Opcode::NOT,
            Instruction::Jump { condition, .. } => match condition {
                Condition::Always => Opcode::JMP,
                Condition::Zero => Opcode::JZ,
                Condition::Carry => Opcode::JC,
            },
        }
    }

    /// The addressing mode byte, or `None` for operand combinations that
    /// have no encoding (an immediate destination).
    pub fn mode(&self) -> Option<AddressingMode> {
        match *self {
            Instruction::Nop | Instruction::Halt => Some(AddressingMode::RegReg),
            Instruction::SetMop(_) => Some(AddressingMode::Mop),
            Instruction::Move { dest, src } | Instruction::Binary { dest, src, .. } => {
                AddressingMode::of_pair(dest, src)
            }
            Instruction::Interrupt(operand)
            | Instruction::Not(operand)
            | Instruction::Jump {
                target: operand, ..
            } => Some(AddressingMode::of_single(operand)),
        }
    }

    fn operand_bytes(&self) -> Vec<Byte> {
        match *self {
            Instruction::Nop | Instruction::Halt => vec![],
            Instruction::SetMop(value) => vec![value],
            Instruction::Move { dest, src } | Instruction::Binary { dest, src, .. } => {
                vec![dest.byte(), src.byte()]
            }
            Instruction::Interrupt(operand)
            | Instruction::Not(operand)
            | Instruction::Jump {
                target: operand, ..
            } => vec![operand.byte()],
        }
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        2 + self.operand_bytes().len()
    }

    pub fn encode(&self) -> Option<Vec<Byte>> {
        let mode = self.mode()?;
        let mut bytes: Vec<Byte> = vec![self.opcode().into(), mode.into()];
        bytes.extend(self.operand_bytes());
        Some(bytes)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opcode = self.opcode();
        match self {
            Instruction::Nop | Instruction::Halt => write!(f, "{}", opcode),
            Instruction::SetMop(value) => write!(f, "{} MOP, #{:02X}", opcode, value),
            Instruction::Move { dest, src } | Instruction::Binary { dest, src, .. } => {
                write!(f, "{} {}, {}", opcode, dest, src)
            }
            Instruction::Interrupt(operand)
            | Instruction::Not(operand)
            | Instruction::Jump {
                target: operand, ..
            } => write!(f, "{} {}", opcode, operand),
        }
    }
}

fn addressing_mode(opcode: Byte, mode: Byte) -> Result<AddressingMode> {
    AddressingMode::try_from(mode)
        .map_err(|_| RuntimeErrorKind::UnknownAddressingMode { opcode, mode })
}

fn parse_opcode(opcode: Byte) -> Result<Opcode> {
    Opcode::try_from(opcode).map_err(|_| RuntimeErrorKind::UnknownOpcode { opcode })
}

/// Number of operand bytes following the opcode and mode bytes
pub fn operand_len(opcode: Byte, mode: Byte) -> Result<usize> {
    let op = parse_opcode(opcode)?;
    let unknown = RuntimeErrorKind::UnknownAddressingMode { opcode, mode };

    match op {
        Opcode::NOP | Opcode::HLT => Ok(0),
        Opcode::INT | Opcode::JMP | Opcode::JZ | Opcode::JC => {
            match addressing_mode(opcode, mode)? {
                AddressingMode::RegReg | AddressingMode::RegMem | AddressingMode::RegImm => Ok(1),
                _ => Err(unknown),
            }
        }
        Opcode::NOT => match addressing_mode(opcode, mode)? {
            AddressingMode::RegReg | AddressingMode::RegMem => Ok(1),
            _ => Err(unknown),
        },
        _ => match addressing_mode(opcode, mode)? {
            AddressingMode::Mop if op == Opcode::MOV => Ok(1),
            AddressingMode::Mop => Err(unknown),
            _ => Ok(2),
        },
    }
}

fn register(code: Byte) -> Result<Register> {
    Register::try_from(code).map_err(|_| RuntimeErrorKind::UnknownRegister { code })
}

fn single(mode: AddressingMode, byte: Byte) -> Result<Operand> {
    Ok(match mode {
        AddressingMode::RegReg => Operand::Register(register(byte)?),
        AddressingMode::RegMem => Operand::Memory(byte),
        _ => Operand::Immediate(byte),
    })
}

fn pair(mode: AddressingMode, a: Byte, b: Byte) -> Result<(Operand, Operand)> {
    use Operand::*;

    Ok(match mode {
        AddressingMode::RegReg => (Register(register(a)?), Register(register(b)?)),
        AddressingMode::RegMem => (Register(register(a)?), Memory(b)),
        AddressingMode::MemReg => (Memory(a), Register(register(b)?)),
        AddressingMode::RegImm => (Register(register(a)?), Immediate(b)),
        AddressingMode::MemMem => (Memory(a), Memory(b)),
        AddressingMode::MemImm => (Memory(a), Immediate(b)),
        AddressingMode::Mop => return Err(RuntimeErrorKind::UnknownAddressingMode {
            opcode: Opcode::MOV.into(),
            mode: mode.into(),
        }),
    })
}

/// Decodes one instruction from its opcode, mode and operand bytes.
///
/// `operands` must hold at least [`operand_len`] bytes; extra bytes are
/// ignored.
pub fn decode(opcode: Byte, mode: Byte, operands: &[Byte]) -> Result<Instruction> {
    let len = operand_len(opcode, mode)?;
    if operands.len() < len {
        return Err(RuntimeErrorKind::TruncatedInstruction { opcode });
    }

    let op = parse_opcode(opcode)?;
    if len == 0 {
        return Ok(match op {
            Opcode::HLT => Instruction::Halt,
            _ => Instruction::Nop,
        });
    }

    let mode = addressing_mode(opcode, mode)?;
    let first = operands[0];

    let instruction = match op {
        Opcode::INT => Instruction::Interrupt(single(mode, first)?),
        Opcode::NOT => Instruction::Not(single(mode, first)?),
        Opcode::JMP | Opcode::JZ | Opcode::JC => Instruction::Jump {
            condition: Condition::of(op).unwrap_or(Condition::Always),
            target: single(mode, first)?,
        },
        Opcode::MOV if mode == AddressingMode::Mop => Instruction::SetMop(first),
        Opcode::MOV => {
            let (dest, src) = pair(mode, first, operands[1])?;
            Instruction::Move { dest, src }
        }
        _ => {
            let op = match op {
                Opcode::ADD => BinaryOp::Add,
                Opcode::SUB => BinaryOp::Sub,
                Opcode::AND => BinaryOp::And,
                Opcode::OR => BinaryOp::Or,
                Opcode::XOR => BinaryOp::Xor,
                Opcode::SHL => BinaryOp::Shl,
                Opcode::SHR => BinaryOp::Shr,
                _ => BinaryOp::Cmp,
            };
            let (dest, src) = pair(mode, first, operands[1])?;
            Instruction::Binary { op, dest, src }
        }
    };

    Ok(instruction)
}

/// One entry of a disassembly listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disassembled {
    pub address: Word,
    /// Bytes consumed, the same amount the processor would skip
    pub len: usize,
    pub instruction: Result<Instruction>,
}

/// Disassembles `bytes` starting at address 0. A trailing partial
/// instruction is reported as truncated.
pub fn disassemble(bytes: &[Byte]) -> Vec<Disassembled> {
    let mut listing = Vec::new();
    let mut pc = 0;

    while pc < bytes.len() {
        let opcode = bytes[pc];
        let address = pc as Word;

        let mode = match bytes.get(pc + 1) {
            Some(mode) => *mode,
            None => {
                listing.push(Disassembled {
                    address,
                    len: 1,
                    instruction: Err(RuntimeErrorKind::TruncatedInstruction { opcode }),
                });
                break;
            }
        };

        let len = 2 + operand_len(opcode, mode).unwrap_or(0);
        let operands = &bytes[(pc + 2).min(bytes.len())..(pc + len).min(bytes.len())];

        listing.push(Disassembled {
            address,
            len,
            instruction: decode(opcode, mode, operands),
        });
        pc += len;
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_lengths() {
        assert_eq!(operand_len(0x00, 0x00), Ok(0));
        assert_eq!(operand_len(0x01, 0x42), Ok(0));
        assert_eq!(operand_len(0x02, 0x03), Ok(1));
        assert_eq!(operand_len(0x10, 0x04), Ok(1));
        assert_eq!(operand_len(0x11, 0x05), Ok(2));
        assert_eq!(operand_len(0x16, 0x01), Ok(1));
        assert_eq!(
            operand_len(0x16, 0x03),
            Err(RuntimeErrorKind::UnknownAddressingMode {
                opcode: 0x16,
                mode: 0x03
            })
        );
        assert_eq!(
            operand_len(0x11, 0x04),
            Err(RuntimeErrorKind::UnknownAddressingMode {
                opcode: 0x11,
                mode: 0x04
            })
        );
        assert_eq!(
            operand_len(0x17, 0x02),
            Err(RuntimeErrorKind::UnknownAddressingMode {
                opcode: 0x17,
                mode: 0x02
            })
        );
        assert_eq!(
            operand_len(0x03, 0x00),
            Err(RuntimeErrorKind::UnknownOpcode { opcode: 0x03 })
        );
    }

    #[test]
    fn decode_each_alu_mode() {
        let ax = Operand::Register(Register::AX);
        let bl = Operand::Register(Register::BL);
        let cases = [
            (0x00, ax, bl),
            (0x01, ax, Operand::Memory(0x0A)),
            (0x02, Operand::Memory(0x01), bl),
            (0x03, ax, Operand::Immediate(0x0A)),
            (0x05, Operand::Memory(0x01), Operand::Memory(0x0A)),
            (0x06, Operand::Memory(0x01), Operand::Immediate(0x0A)),
        ];

        for &(mode, dest, src) in cases.iter() {
            let instruction = decode(0x12, mode, &[0x01, 0x0A]).unwrap();
            assert_eq!(
                instruction,
                Instruction::Binary {
                    op: BinaryOp::Sub,
                    dest,
                    src
                }
            );
            assert_eq!(instruction.encode(), Some(vec![0x12, mode, 0x01, 0x0A]));
            assert_eq!(instruction.size(), 4);
        }
    }

    #[test]
    fn decode_special_forms() {
        assert_eq!(decode(0x01, 0x00, &[]), Ok(Instruction::Halt));
        assert_eq!(Instruction::Halt.size(), 2);
        assert_eq!(Instruction::SetMop(1).size(), 3);
        assert_eq!(decode(0x10, 0x04, &[0x00]), Ok(Instruction::SetMop(0)));
        assert_eq!(
            decode(0x18, 0x03, &[0x10]),
            Ok(Instruction::Jump {
                condition: Condition::Zero,
                target: Operand::Immediate(0x10)
            })
        );
        assert_eq!(
            decode(0x16, 0x00, &[0x13]),
            Err(RuntimeErrorKind::UnknownRegister { code: 0x13 })
        );
        assert_eq!(
            decode(0x11, 0x00, &[0x01]),
            Err(RuntimeErrorKind::TruncatedInstruction { opcode: 0x11 })
        );
    }

    #[test]
    fn immediate_destination_has_no_encoding() {
        let instruction = Instruction::Move {
            dest: Operand::Immediate(1),
            src: Operand::Register(Register::AX),
        };
        assert_eq!(instruction.mode(), None);
        assert_eq!(instruction.encode(), None);
    }

    #[test]
    fn shifts_mask_the_count() {
        assert_eq!(BinaryOp::Shl.apply(1, 9), 2);
        assert_eq!(BinaryOp::Shr.apply(0x80, 0x0F), 1);
        assert_eq!(BinaryOp::Cmp.apply(3, 5), -2);
        assert!(!BinaryOp::Cmp.writes_back());
    }

    #[test]
    fn display_round_trips_through_text() {
        let instruction = Instruction::Binary {
            op: BinaryOp::Xor,
            dest: Operand::Memory(0x1F),
            src: Operand::Immediate(0xA0),
        };
        assert_eq!(instruction.to_string(), "XOR [1F], #A0");
        assert_eq!(Instruction::SetMop(0).to_string(), "MOV MOP, #00");
        assert_eq!(Instruction::Nop.to_string(), "NOP");
    }

    #[test]
    fn disassemble_listing() {
        let bytes = [0x10, 0x03, 0x01, 0x05, 0x00, 0x00, 0x17, 0x03, 0x04, 0x01, 0x00, 0x42];
        let listing = disassemble(&bytes);

        let addresses: Vec<_> = listing.iter().map(|entry| entry.address).collect();
        assert_eq!(addresses, vec![0, 4, 6, 9, 11]);
        assert_eq!(
            listing[2].instruction.map(|i| i.to_string()),
            Ok("JMP #04".to_string())
        );
        assert_eq!(
            listing[4].instruction,
            Err(RuntimeErrorKind::TruncatedInstruction { opcode: 0x42 })
        );
    }
}
