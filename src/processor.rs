use std::convert::TryFrom;
use std::fmt;

use log::*;

pub mod decode;
pub mod error;
pub mod flags;
pub mod registers;

use crate::memory::assembler::{Assembler, AssemblyErrors};
use crate::memory::labels::LabelTable;
use crate::memory::{Byte, Memory, Word, MEMORY_SIZE};
use crate::port::{LogPort, OutputPort, Snapshot, INT_CHAR, INT_LEDS};
use decode::{Condition, Instruction, Operand};
use error::{RuntimeError, RuntimeErrorKind};
use flags::Flags;
use registers::RegisterFile;

/// Last fetched opcode and addressing mode. Kept for inspection only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InstructionRegister {
    pub opcode: Byte,
    pub mode: Byte,
}

/// The 256-byte machine
pub type StdProcessor = Processor<MEMORY_SIZE>;

/// Emulates the CPU together with the memory it owns
pub struct Processor<const S: usize> {
    pub registers: RegisterFile,
    pub flags: Flags,
    pub memory: Memory<S>,
    /// Program counter
    pub pc: Word,
    /// Instruction register
    pub ir: InstructionRegister,
    /// Cleared by HLT, fatal errors, reaching the end of memory and [`Processor::stop`]
    pub running: bool,
    port: Box<dyn OutputPort>,
}

impl<const S: usize> Default for Processor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const S: usize> fmt::Debug for Processor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("registers", &self.registers)
            .field("flags", &self.flags)
            .field("pc", &self.pc)
            .field("ir", &self.ir)
            .field("running", &self.running)
            .finish()
    }
}

impl<const S: usize> Processor<S> {
    /// Initializes a zeroed CPU that reports through [`LogPort`]
    pub fn new() -> Self {
        Self::with_port(LogPort)
    }

    pub fn with_port<P: OutputPort + 'static>(port: P) -> Self {
        Self {
            registers: RegisterFile::default(),
            flags: Flags::default(),
            memory: Memory::default(),
            pc: 0,
            ir: InstructionRegister::default(),
            running: false,
            port: Box::new(port),
        }
    }

    pub fn set_port<P: OutputPort + 'static>(&mut self, port: P) {
        self.port = Box::new(port);
    }

    /// Zeroes registers, flags (MOP back to 4-bit), memory, PC and IR and
    /// stops the processor.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::default();
        self.flags = Flags::default();
        self.memory = Memory::default();
        self.pc = 0;
        self.ir = InstructionRegister::default();
        self.running = false;
        self.notify();
    }

    /// Assembles `source` into memory and rewinds PC. Registers and flags
    /// are left alone.
    ///
    /// # Errors
    ///
    /// Lines that fail to assemble are reported together; every other line
    /// is still written.
    pub fn load_program(&mut self, source: &str) -> Result<LabelTable, AssemblyErrors> {
        let mut assembler = Assembler::new(source);
        let result = assembler.assemble_into(&mut self.memory);

        self.pc = 0;
        self.notify();

        result.map(|_| assembler.into_labels())
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            registers: &self.registers,
            flags: &self.flags,
            memory: self.memory.as_slice(),
            pc: self.pc,
            ir: self.ir,
        }
    }

    fn notify(&mut self) {
        // Borrows the fields one by one so `self.port` stays free for `&mut`
        let snapshot = Snapshot {
            registers: &self.registers,
            flags: &self.flags,
            memory: self.memory.as_slice(),
            pc: self.pc,
            ir: self.ir,
        };
        self.port.on_state_changed(&snapshot);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops [`Processor::run`] before its next step. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    fn fetch(&mut self) -> Option<Byte> {
        let byte = self.memory.get(self.pc as usize)?;
        self.pc += 1;
        Some(byte)
    }

    /// Reads an operand's value
    fn load(&self, operand: Operand) -> error::Result<Byte> {
        match operand {
            Operand::Register(register) => Ok(self.registers.read(register)),
            Operand::Memory(address) => {
                self.memory
                    .get(address as usize)
                    .ok_or(RuntimeErrorKind::OutOfBoundsMemory {
                        address: address as usize,
                    })
            }
            Operand::Immediate(value) => Ok(value),
        }
    }

    /// Writes the low byte of `value` to a register or memory operand
    fn store(&mut self, opcode: Byte, operand: Operand, value: i32) -> error::Result<()> {
        let byte = (value & 0xFF) as Byte;
        match operand {
            Operand::Register(register) => self.registers.write(register, byte),
            Operand::Memory(address) => {
                if !self.memory.contains(address as usize) {
                    return Err(RuntimeErrorKind::OutOfBoundsMemory {
                        address: address as usize,
                    });
                }
                self.memory.data[address as usize] = byte;
            }
            Operand::Immediate(_) => return Err(RuntimeErrorKind::ImmediateDestination { opcode }),
        }

        Ok(())
    }

    fn condition_holds(&self, condition: Condition) -> bool {
        match condition {
            Condition::Always => true,
            Condition::Zero => self.flags.zf,
            Condition::Carry => self.flags.cf,
        }
    }

    fn interrupt(&mut self, number: Byte) -> error::Result<()> {
        debug!("Handling interrupt: {}", number);

        match number {
            INT_LEDS | INT_CHAR => {
                let ax = self.registers.ax();
                self.port.on_interrupt(number, ax);
                Ok(())
            }
            _ => Err(RuntimeErrorKind::UnknownInterrupt { number }),
        }
    }

    /// Executes a decoded instruction. PC must already point past it.
    ///
    /// Errors leave registers, memory and flags untouched.
    pub fn execute_instruction(&mut self, instruction: Instruction) -> error::Result<()> {
        let opcode: Byte = instruction.opcode().into();

        match instruction {
            Instruction::Nop => {}
            Instruction::Halt => {
                self.running = false;
                info!("Program halted");
            }
            Instruction::Interrupt(operand) => {
                let number = self.load(operand)?;
                self.interrupt(number)?;
            }
            Instruction::SetMop(value) => {
                self.flags.set_mop(value);
                info!(
                    "MOP mode set to {}",
                    if self.flags.mop { "4-bit" } else { "8-bit" }
                );
            }
            Instruction::Move { dest, src } => {
                let value = self.load(src)?;
                self.store(opcode, dest, value as i32)?;
            }
            Instruction::Binary { op, dest, src } => {
                let a = self.load(dest)? as i32;
                let b = self.load(src)? as i32;
                let result = op.apply(a, b);

                if op.writes_back() {
                    self.store(opcode, dest, result)?;
                }
                self.flags.update_from_result(result);
            }
            Instruction::Not(operand) => {
                let a = self.load(operand)? as i32;
                let result = !a & 0xFF;

                self.store(opcode, operand, result)?;
                self.flags.update_from_result(result);
            }
            Instruction::Jump { condition, target } => {
                if self.condition_holds(condition) {
                    let address = self.load(target)? as usize;
                    if !self.memory.contains(address) {
                        self.running = false;
                        return Err(RuntimeErrorKind::InvalidJumpTarget { address });
                    }
                    self.pc = address as Word;
                }
            }
        }

        Ok(())
    }

    /// Decodes and executes the instruction whose opcode and mode were just
    /// fetched. PC always ends up past the operand bytes the mode implies.
    fn execute(&mut self, opcode: Byte, mode: Byte) -> error::Result<()> {
        let len = decode::operand_len(opcode, mode)?;
        let start = self.pc as usize;
        let end = start + len;
        if end > S {
            return Err(RuntimeErrorKind::TruncatedInstruction { opcode });
        }
        self.pc = end as Word;

        // A branch that is not taken only skips its operand
        let branch = Opcode::try_from(opcode)
            .ok()
            .and_then(|op| Condition::of(op).map(|condition| (op, condition)));
        if let Some((op, condition)) = branch {
            if !self.condition_holds(condition) {
                debug!("{:02x}: {} not taken", start - 2, op);
                return Ok(());
            }
        }

        let instruction = decode::decode(opcode, mode, &self.memory.data[start..end])?;
        debug!("{:02x}: {}", start - 2, instruction);

        self.execute_instruction(instruction)
    }

    fn fetch_and_execute(&mut self) -> error::Result<()> {
        let opcode = self.fetch().ok_or(RuntimeErrorKind::EndOfMemory)?;
        let mode = self
            .fetch()
            .ok_or(RuntimeErrorKind::TruncatedInstruction { opcode })?;
        self.ir = InstructionRegister { opcode, mode };

        trace!(
            "Executing instruction: opcode={:x}, type={:x}, PC={:x}",
            opcode,
            mode,
            self.pc
        );

        self.execute(opcode, mode)
    }

    /// Runs one fetch-decode-execute step and notifies the output port.
    ///
    /// Stepping does not set [`Processor::running`]; only
    /// [`Processor::run_with`] does. A halted processor can be stepped
    /// through a program one instruction at a time and stays halted.
    ///
    /// # Errors
    ///
    /// Returns the error the instruction raised. Fatal errors (see
    /// [`RuntimeErrorKind::is_fatal`]) also stop the processor; the others
    /// only drop the instruction's effect.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        let pc = self.pc;

        if let Err(kind) = self.fetch_and_execute() {
            let error = RuntimeError::new(kind, pc);

            match kind {
                RuntimeErrorKind::EndOfMemory => {
                    self.running = false;
                    info!("Program reached end of memory");
                    self.port.on_error(&error);
                    return Err(error);
                }
                _ if kind.is_fatal() => {
                    self.running = false;
                    error!("{}", error);
                }
                _ => warn!("{}", error),
            }

            self.port.on_error(&error);
            self.notify();
            return Err(error);
        }

        self.notify();
        Ok(())
    }

    /// Runs until HLT, a fatal error, the end of memory or [`Processor::stop`].
    ///
    /// `tick` is called between steps and sets the cadence: it may sleep,
    /// inspect the processor or call [`Processor::stop`]. Steps are never
    /// interrupted.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that stopped execution. Reaching the end of
    /// memory counts as a normal termination.
    pub fn run_with<F>(&mut self, mut tick: F) -> Result<(), RuntimeError>
    where
        F: FnMut(&mut Self),
    {
        self.running = true;

        while self.running {
            match self.step() {
                Err(error) if error.kind == RuntimeErrorKind::EndOfMemory => break,
                Err(error) if error.is_fatal() => return Err(error),
                _ => {}
            }

            if self.running {
                tick(self);
            }
        }

        info!("Program terminated. PC: 0x{:02X}, AX: 0x{:02X}", self.pc, self.registers.ax());

        Ok(())
    }

    /// [`Processor::run_with`] without a cadence
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        self.run_with(|_| {})
    }
}

byte_enum! {
    /// Opcodes and their mnemonics
    pub enum Opcode {
        /// No operation
        NOP = 0x00,
        /// Stop the execution of the program
        HLT = 0x01,
        /// Software interrupt: 0 shows AX on the LEDs, 1 emits AX as a character
        INT = 0x02,
        /// Move data, or set MOP with `MOV MOP, #imm`
        MOV = 0x10,
        /// Add source to destination
        ADD = 0x11,
        /// Subtract source from destination
        SUB = 0x12,
        /// Bitwise and
        AND = 0x13,
        /// Bitwise or
        OR = 0x14,
        /// Bitwise exclusive or
        XOR = 0x15,
        /// Bitwise complement of a register or memory byte
        NOT = 0x16,
        /// Jump to an address
        JMP = 0x17,
        /// Jump if ZF is set
        JZ = 0x18,
        /// Jump if CF is set
        JC = 0x19,
        /// Shift left by the low three bits of the source
        SHL = 0x1A,
        /// Shift right by the low three bits of the source
        SHR = 0x1B,
        /// Subtract without storing, flags only
        CMP = 0x1C,
    }
}
