//! Two-pass assembler.
//!
//! ```text
//! ; comments run to the end of the line
//! start:  MOV AX, #0F     ; immediates are hex
//!         MOV [80], AX    ; direct memory address, also hex
//! loop:
//!         SUB AX, #1
//!         JZ done         ; labels work for JMP, JZ and JC
//!         JMP loop
//! done:   HLT
//! ```
//!
//! The first pass sizes every instruction and records label addresses, the
//! second pass emits bytes. A label operand always encodes as an immediate
//! jump, so instruction sizes are the same in both passes.

use std::borrow::Cow;
use std::convert::TryFrom;
use std::error;
use std::fmt;

use crate::processor::decode::{BinaryOp, Condition, Instruction, Operand};
use crate::processor::registers::Register;
use crate::processor::Opcode;

use super::labels::LabelTable;
use super::{Byte, Memory, Word};

const COMMENT_CHAR: char = ';';
const LABEL_SUFFIX: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyErrorKind {
    UnknownInstruction,
    UnknownRegister,
    UnknownLabel,
    InvalidLabel,
    InvalidOperandFormat,
    /// Wrong number of operands for the mnemonic
    InvalidInstructionFormat,
    /// The program does not fit into memory
    OutOfMemory { address: usize },
}

impl fmt::Display for AssemblyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyErrorKind::UnknownInstruction => f.write_str("unknown instruction"),
            AssemblyErrorKind::UnknownRegister => f.write_str("unknown register"),
            AssemblyErrorKind::UnknownLabel => f.write_str("unknown label"),
            AssemblyErrorKind::InvalidLabel => f.write_str("invalid label"),
            AssemblyErrorKind::InvalidOperandFormat => f.write_str("invalid operand format"),
            AssemblyErrorKind::InvalidInstructionFormat => {
                f.write_str("invalid instruction format")
            }
            AssemblyErrorKind::OutOfMemory { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyError {
    kind: AssemblyErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl AssemblyError {
    fn new<C, S>(kind: AssemblyErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> AssemblyErrorKind {
        self.kind
    }

    /// 1-based source line, 0 for instructions encoded outside of a program
    pub fn line_nr(&self) -> usize {
        self.line_nr
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for AssemblyError {}

/// Every error of one assembly attempt, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyErrors(pub Vec<AssemblyError>);

impl AssemblyErrors {
    pub fn errors(&self) -> &[AssemblyError] {
        &self.0
    }
}

impl fmt::Display for AssemblyErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl error::Error for AssemblyErrors {}

pub type Result<T, E = AssemblyError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Labels may be unresolved; label jumps encode a placeholder
    Sizing,
    Emit,
}

/// A non-empty source line with its comment removed
#[derive(Debug, Clone, Copy)]
struct SourceLine<'a> {
    line_nr: usize,
    label: Option<&'a str>,
    instruction: Option<&'a str>,
}

/// An operand token before register/label resolution
enum Token<'a> {
    Operand(Operand),
    Name(&'a str),
}

/// Parses `#XX` / `[XX]` contents. Always hexadecimal, `0x` is optional.
fn parse_hex(digits: &str, token: &str, line_nr: usize) -> Result<Byte> {
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    Byte::from_str_radix(digits, 16).map_err(|_| {
        AssemblyError::new(
            AssemblyErrorKind::InvalidOperandFormat,
            format!("`{}` is not a hexadecimal byte", token),
            line_nr,
        )
    })
}

fn parse_token(token: &str, line_nr: usize) -> Result<Token<'_>> {
    if let Some(value) = token.strip_prefix('#') {
        Ok(Token::Operand(Operand::Immediate(parse_hex(
            value, token, line_nr,
        )?)))
    } else if let Some(inner) = token.strip_prefix('[') {
        let address = inner.strip_suffix(']').ok_or_else(|| {
            AssemblyError::new(
                AssemblyErrorKind::InvalidOperandFormat,
                format!("unterminated memory operand `{}`", token),
                line_nr,
            )
        })?;
        Ok(Token::Operand(Operand::Memory(parse_hex(
            address, token, line_nr,
        )?)))
    } else if let Some(register) = Register::from_name(token) {
        Ok(Token::Operand(Operand::Register(register)))
    } else {
        Ok(Token::Name(token))
    }
}

/// Parses an operand that must not be a label
fn parse_operand(token: &str, line_nr: usize) -> Result<Operand> {
    match parse_token(token, line_nr)? {
        Token::Operand(operand) => Ok(operand),
        Token::Name(name) => Err(AssemblyError::new(
            AssemblyErrorKind::UnknownRegister,
            format!("`{}`", name),
            line_nr,
        )),
    }
}

fn expect_operands(opcode: Opcode, operands: &[&str], count: usize, line_nr: usize) -> Result<()> {
    if operands.len() == count {
        Ok(())
    } else {
        Err(AssemblyError::new(
            AssemblyErrorKind::InvalidInstructionFormat,
            format!(
                "`{}` expects {} operand(s), found {}",
                opcode,
                count,
                operands.len()
            ),
            line_nr,
        ))
    }
}

/// Translates assembly text into machine code
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    source: &'a str,
    labels: LabelTable,
}

impl<'a> Assembler<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            labels: LabelTable::new(),
        }
    }

    /// Labels found by the last call to [`Assembler::assemble_into`]
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn into_labels(self) -> LabelTable {
        self.labels
    }

    /// Splits the source into labels and instructions, dropping comments and
    /// blank lines. A malformed label is reported and dropped, the rest of its
    /// line is kept.
    fn lines(&self) -> (Vec<SourceLine<'a>>, Vec<AssemblyError>) {
        let mut lines = Vec::new();
        let mut errors = Vec::new();

        for (i, raw) in self.source.lines().enumerate() {
            let line_nr = i + 1;
            let code = match raw.find(COMMENT_CHAR) {
                Some(index) => &raw[..index],
                None => raw,
            }
            .trim();

            if code.is_empty() {
                continue;
            }

            let (mut label, rest) = match code.find(LABEL_SUFFIX) {
                Some(index) => (Some(code[..index].trim()), code[index + 1..].trim()),
                None => (None, code),
            };

            if let Some(name) = label {
                if name.is_empty() || name.contains(char::is_whitespace) {
                    errors.push(AssemblyError::new(
                        AssemblyErrorKind::InvalidLabel,
                        format!("`{}`", name),
                        line_nr,
                    ));
                    label = None;
                }
            }

            lines.push(SourceLine {
                line_nr,
                label,
                instruction: if rest.is_empty() { None } else { Some(rest) },
            });
        }

        (lines, errors)
    }

    /// Assembles the whole source into `memory`, starting at address 0.
    /// Returns the number of bytes emitted.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    /// Lines that assembled fine are written regardless.
    pub fn assemble_into<const S: usize>(
        &mut self,
        memory: &mut Memory<S>,
    ) -> Result<usize, AssemblyErrors> {
        let (lines, mut errors) = self.lines();

        // First pass: addresses
        self.labels.clear();
        let mut sizes = Vec::with_capacity(lines.len());
        let mut address = 0;

        for line in &lines {
            if let Some(name) = line.label {
                log::debug!("[{}] Label `{}` at 0x{:02x}", line.line_nr, name, address);
                if let Some(previous) = self.labels.define(name, address as Word) {
                    log::warn!(
                        "[{}] Label `{}` redefined (was 0x{:02x})",
                        line.line_nr,
                        name,
                        previous
                    );
                }
            }

            let size = match line.instruction {
                Some(text) => match self.parse_instruction(text, line.line_nr, Pass::Sizing) {
                    Ok(instruction) => instruction.size(),
                    Err(err) => {
                        log::debug!("First pass: {}", err);
                        0
                    }
                },
                None => 0,
            };
            sizes.push(size);
            address += size;
        }

        // Second pass: bytes
        let mut address = 0;

        for (line, size) in lines.iter().zip(sizes) {
            let text = match line.instruction {
                Some(text) => text,
                None => continue,
            };

            match self.encode_line(text, line.line_nr) {
                Ok(bytes) if address + bytes.len() > S => {
                    errors.push(AssemblyError::new(
                        AssemblyErrorKind::OutOfMemory {
                            address: address + bytes.len() - 1,
                        },
                        format!("`{}` does not fit into {} bytes", text, S),
                        line.line_nr,
                    ));
                }
                Ok(bytes) => {
                    log::debug!("[{}] 0x{:02x}: {} => {:02x?}", line.line_nr, address, text, bytes);
                    memory.write_array(address as Word, &bytes);
                }
                Err(err) => errors.push(err),
            }

            address += size;
        }

        if errors.is_empty() {
            Ok(address)
        } else {
            errors.sort_by_key(|err| err.line_nr());
            for err in &errors {
                log::error!("{}", err);
            }
            Err(AssemblyErrors(errors))
        }
    }

    /// Encodes a single instruction, resolving labels against the table of
    /// the last assembly.
    pub fn encode(&self, text: &str) -> Result<Vec<Byte>> {
        self.encode_line(text, 0)
    }

    fn encode_line(&self, text: &str, line_nr: usize) -> Result<Vec<Byte>> {
        let instruction = self.parse_instruction(text, line_nr, Pass::Emit)?;

        instruction.encode().ok_or_else(|| {
            AssemblyError::new(
                AssemblyErrorKind::InvalidOperandFormat,
                format!("`{}` cannot write to an immediate", text),
                line_nr,
            )
        })
    }

    fn parse_instruction(&self, text: &str, line_nr: usize, pass: Pass) -> Result<Instruction> {
        let mut parts = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty());

        let mnemonic = parts.next().unwrap_or_default();
        let operands: Vec<&str> = parts.collect();

        let opcode = Opcode::from_name(mnemonic).ok_or_else(|| {
            AssemblyError::new(
                AssemblyErrorKind::UnknownInstruction,
                format!("`{}`", mnemonic),
                line_nr,
            )
        })?;

        match opcode {
            Opcode::NOP | Opcode::HLT => {
                expect_operands(opcode, &operands, 0, line_nr)?;
                Ok(if opcode == Opcode::NOP {
                    Instruction::Nop
                } else {
                    Instruction::Halt
                })
            }
            Opcode::MOV if operands.len() == 2 && operands[0] == "MOP" => {
                match parse_token(operands[1], line_nr)? {
                    Token::Operand(Operand::Immediate(value)) => Ok(Instruction::SetMop(value)),
                    _ => Err(AssemblyError::new(
                        AssemblyErrorKind::InvalidOperandFormat,
                        format!("`MOV MOP` expects an immediate, found `{}`", operands[1]),
                        line_nr,
                    )),
                }
            }
            Opcode::INT | Opcode::NOT => {
                expect_operands(opcode, &operands, 1, line_nr)?;
                let operand = parse_operand(operands[0], line_nr)?;
                Ok(if opcode == Opcode::INT {
                    Instruction::Interrupt(operand)
                } else {
                    Instruction::Not(operand)
                })
            }
            Opcode::JMP | Opcode::JZ | Opcode::JC => {
                expect_operands(opcode, &operands, 1, line_nr)?;
                let condition = Condition::of(opcode).unwrap_or(Condition::Always);
                let target = match parse_token(operands[0], line_nr)? {
                    Token::Operand(operand) => operand,
                    Token::Name(name) => self.label_target(name, line_nr, pass)?,
                };
                Ok(Instruction::Jump { condition, target })
            }
            _ => {
                expect_operands(opcode, &operands, 2, line_nr)?;
                let dest = parse_operand(operands[0], line_nr)?;
                let src = parse_operand(operands[1], line_nr)?;

                let op = match opcode {
                    Opcode::MOV => return Ok(Instruction::Move { dest, src }),
                    Opcode::ADD => BinaryOp::Add,
                    Opcode::SUB => BinaryOp::Sub,
                    Opcode::AND => BinaryOp::And,
                    Opcode::OR => BinaryOp::Or,
                    Opcode::XOR => BinaryOp::Xor,
                    Opcode::SHL => BinaryOp::Shl,
                    Opcode::SHR => BinaryOp::Shr,
                    _ => BinaryOp::Cmp,
                };
                Ok(Instruction::Binary { op, dest, src })
            }
        }
    }

    /// Label jumps become immediate jumps. The sizing pass uses a
    /// placeholder so forward references need no resolution yet.
    fn label_target(&self, name: &str, line_nr: usize, pass: Pass) -> Result<Operand> {
        if pass == Pass::Sizing {
            return Ok(Operand::Immediate(0));
        }

        let address = self.labels.resolve(name).ok_or_else(|| {
            AssemblyError::new(
                AssemblyErrorKind::UnknownLabel,
                format!("`{}`", name),
                line_nr,
            )
        })?;

        let address = Byte::try_from(address).map_err(|_| {
            AssemblyError::new(
                AssemblyErrorKind::InvalidOperandFormat,
                format!("label `{}` at 0x{:x} is not a byte address", name, address),
                line_nr,
            )
        })?;

        Ok(Operand::Immediate(address))
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::StdMem;
    use crate::processor::decode::disassemble;

    use super::*;
    use color_eyre::eyre::Result;

    fn assemble(source: &str) -> std::result::Result<(StdMem, LabelTable), AssemblyErrors> {
        let mut mem = StdMem::default();
        let mut assembler = Assembler::new(source);
        assembler.assemble_into(&mut mem)?;
        Ok((mem, assembler.into_labels()))
    }

    fn kinds(source: &str) -> Vec<AssemblyErrorKind> {
        match assemble(source) {
            Ok(_) => vec![],
            Err(errors) => errors.errors().iter().map(|err| err.kind()).collect(),
        }
    }

    #[test]
    fn encode_addressing_modes() -> Result<()> {
        let assembler = Assembler::new("");
        let cases: &[(&str, &[Byte])] = &[
            ("MOV AX, BX", &[0x10, 0x00, 0x01, 0x02]),
            ("ADD CL, [1F]", &[0x11, 0x01, 0x0C, 0x1F]),
            ("SUB [1F], DH", &[0x12, 0x02, 0x1F, 0x0D]),
            ("AND GX, #0F", &[0x13, 0x03, 0x06, 0x0F]),
            ("OR [10], [11]", &[0x14, 0x05, 0x10, 0x11]),
            ("XOR [10], #FF", &[0x15, 0x06, 0x10, 0xFF]),
            ("SHL AX,#1", &[0x1A, 0x03, 0x01, 0x01]),
            ("SHR EL,  GH", &[0x1B, 0x00, 0x10, 0x11]),
            ("CMP AX, #0x5", &[0x1C, 0x03, 0x01, 0x05]),
            ("NOT AX", &[0x16, 0x00, 0x01]),
            ("NOT [20]", &[0x16, 0x01, 0x20]),
            ("INT #1", &[0x02, 0x03, 0x01]),
            ("INT [2]", &[0x02, 0x01, 0x02]),
            ("INT BL", &[0x02, 0x00, 0x0A]),
            ("JMP #10", &[0x17, 0x03, 0x10]),
            ("JZ [10]", &[0x18, 0x01, 0x10]),
            ("JC DX", &[0x19, 0x00, 0x04]),
            ("MOV MOP, #0", &[0x10, 0x04, 0x00]),
            ("NOP", &[0x00, 0x00]),
            ("HLT", &[0x01, 0x00]),
        ];

        for (text, bytes) in cases {
            assert_eq!(assembler.encode(text)?, bytes.to_vec(), "{}", text);

            let listing = disassemble(bytes);
            assert_eq!(listing.len(), 1, "{}", text);
            assert_eq!(listing[0].len, bytes.len(), "{}", text);
            assert!(listing[0].instruction.is_ok(), "{}", text);
        }

        Ok(())
    }

    #[test]
    fn forward_and_backward_labels() -> Result<()> {
        let source = r#"
            start:
                MOV AX, #1      ; 0x00
            loop: ADD AX, #1    ; 0x04
                JC end          ; 0x08
                JMP loop        ; 0x0b
            end:                ; 0x0e
                HLT
        "#;

        let (mem, labels) = assemble(source)?;

        assert_eq!(labels.resolve("start"), Some(0x00));
        assert_eq!(labels.resolve("loop"), Some(0x04));
        assert_eq!(labels.resolve("end"), Some(0x0E));
        assert_eq!(&mem.data[0x08..0x0E], &[0x19, 0x03, 0x0E, 0x17, 0x03, 0x04]);
        assert_eq!(&mem.data[0x0E..0x10], &[0x01, 0x00]);

        Ok(())
    }

    #[test]
    fn label_addresses_match_emitted_code() -> Result<()> {
        let source = "
            a: JMP d
            b: MOV MOP, #0
               NOT [30]
            c: JZ a
               INT #0
            d: CMP [30], #1
               HLT
        ";
        let (mem, labels) = assemble(source)?;

        let starts: Vec<Word> = disassemble(&mem.data[..21])
            .iter()
            .map(|entry| entry.address)
            .collect();
        assert_eq!(starts, vec![0, 3, 6, 9, 12, 15, 19]);

        for (name, address) in labels.sorted() {
            assert!(starts.contains(&address), "{} at {}", name, address);
        }
        assert_eq!(labels.resolve("d"), Some(15));
        assert_eq!(mem.data[2], 15);

        Ok(())
    }

    #[test]
    fn register_jumps_take_precedence_over_labels() -> Result<()> {
        let (mem, labels) = assemble("AX: NOP\nJMP AX")?;

        assert_eq!(labels.resolve("AX"), Some(0));
        assert_eq!(&mem.data[2..5], &[0x17, 0x00, 0x01]);

        Ok(())
    }

    #[test]
    fn comments_and_blank_lines() -> Result<()> {
        let source = "
            ; header comment

            NOP ; trailing comment: with a colon
                ;
            HLT
        ";
        let (mem, labels) = assemble(source)?;

        assert!(labels.is_empty());
        assert_eq!(&mem.data[..4], &[0x00, 0x00, 0x01, 0x00]);

        Ok(())
    }

    #[test]
    fn error_kinds() {
        assert_eq!(kinds("FOO AX"), vec![AssemblyErrorKind::UnknownInstruction]);
        assert_eq!(kinds("mov AX, BX"), vec![AssemblyErrorKind::UnknownInstruction]);
        assert_eq!(kinds("MOV AX, ZX"), vec![AssemblyErrorKind::UnknownRegister]);
        assert_eq!(kinds("ADD nowhere, #1"), vec![AssemblyErrorKind::UnknownRegister]);
        assert_eq!(kinds("JMP nowhere"), vec![AssemblyErrorKind::UnknownLabel]);
        assert_eq!(kinds("MOV AX, #GG"), vec![AssemblyErrorKind::InvalidOperandFormat]);
        assert_eq!(kinds("MOV AX, #100"), vec![AssemblyErrorKind::InvalidOperandFormat]);
        assert_eq!(kinds("MOV AX, [10"), vec![AssemblyErrorKind::InvalidOperandFormat]);
        assert_eq!(kinds("MOV #1, AX"), vec![AssemblyErrorKind::InvalidOperandFormat]);
        assert_eq!(kinds("MOV MOP, AX"), vec![AssemblyErrorKind::InvalidOperandFormat]);
        assert_eq!(kinds("ADD AX"), vec![AssemblyErrorKind::InvalidInstructionFormat]);
        assert_eq!(kinds("NOP AX"), vec![AssemblyErrorKind::InvalidInstructionFormat]);
        assert_eq!(kinds("JMP AX, BX"), vec![AssemblyErrorKind::InvalidInstructionFormat]);
        assert_eq!(kinds("INT"), vec![AssemblyErrorKind::InvalidInstructionFormat]);
        assert_eq!(kinds(": NOP"), vec![AssemblyErrorKind::InvalidLabel]);
    }

    #[test]
    fn errors_are_per_line() {
        let source = "MOV AX, #1\nBAD\nJMP missing\nHLT";
        let mut mem = StdMem::default();
        let errors = Assembler::new(source)
            .assemble_into(&mut mem)
            .unwrap_err();

        let lines: Vec<_> = errors.errors().iter().map(|err| err.line_nr()).collect();
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(errors.errors()[1].context(), Some("`missing`"));
        assert_eq!(
            errors.to_string(),
            "error [ln: 2]: unknown instruction - `BAD`\nerror [ln: 3]: unknown label - `missing`"
        );

        // the good lines are still written, at their first pass addresses
        assert_eq!(&mem.data[..4], &[0x10, 0x03, 0x01, 0x01]);
        assert_eq!(&mem.data[7..9], &[0x01, 0x00]);
    }

    #[test]
    fn bad_label_keeps_instruction() {
        let mut mem = StdMem::default();
        let errors = Assembler::new("MOV AX, #1\nbad label: HLT\nFOO")
            .assemble_into(&mut mem)
            .unwrap_err();

        let found: Vec<_> = errors
            .errors()
            .iter()
            .map(|err| (err.line_nr(), err.kind()))
            .collect();
        assert_eq!(
            found,
            vec![
                (2, AssemblyErrorKind::InvalidLabel),
                (3, AssemblyErrorKind::UnknownInstruction)
            ]
        );
        assert_eq!(&mem.data[4..6], &[0x01, 0x00]);
    }

    #[test]
    fn unencodable_line_keeps_its_size() {
        let mut mem = StdMem::default();
        let errors = Assembler::new("MOV #1, AX\nend: HLT")
            .assemble_into(&mut mem)
            .unwrap_err();

        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].kind(), AssemblyErrorKind::InvalidOperandFormat);
        assert_eq!(&mem.data[..6], &[0x00, 0x00, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn program_must_fit() {
        let mut mem = Memory::<6>::default();
        let errors = Assembler::new("MOV AX, #1\nMOV BX, #2")
            .assemble_into(&mut mem)
            .unwrap_err();

        assert_eq!(
            errors.errors()[0].kind(),
            AssemblyErrorKind::OutOfMemory { address: 7 }
        );
        assert_eq!(&mem.data[..4], &[0x10, 0x03, 0x01, 0x01]);
    }

    #[test]
    fn reassembly_discards_old_labels() -> Result<()> {
        let mut mem = StdMem::default();
        let mut assembler = Assembler::new("old: NOP");
        assembler.assemble_into(&mut mem)?;
        assert_eq!(assembler.labels().resolve("old"), Some(0));

        let mut assembler = Assembler::new("new: HLT");
        assembler.assemble_into(&mut mem)?;
        assert_eq!(assembler.labels().resolve("old"), None);
        assert_eq!(assembler.labels().resolve("new"), Some(0));

        Ok(())
    }

    #[test]
    fn disassembly_reassembles() -> Result<()> {
        let source = "MOV AX, [1F]\nSHL [01], #03\nJC #00\nMOV MOP, #01\nNOT CH\nHLT";
        let (mem, _) = assemble(source)?;

        let text: Vec<String> = disassemble(&mem.data[..19])
            .into_iter()
            .map(|entry| entry.instruction.map(|i| i.to_string()).unwrap_or_default())
            .collect();
        assert_eq!(text.join("\n"), source);

        Ok(())
    }
}
