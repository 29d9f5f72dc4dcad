use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use color_eyre::eyre::{Result, WrapErr};

pub mod assembler;
pub mod labels;

use assembler::{Assembler, AssemblyErrors};

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Size of the machine's address space
pub const MEMORY_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<MEMORY_SIZE>;

/// Reads assembly source from `path`
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read program `{}`", path.display()))
}

/// Emulates memory for use with the CPU. Instructions and data share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Number of addressable bytes
    pub const fn len(&self) -> usize {
        S
    }

    pub const fn is_empty(&self) -> bool {
        S == 0
    }

    /// Returns true if `address` points into the memory
    pub fn contains(&self, address: usize) -> bool {
        address < S
    }

    /// Reads a byte, or `None` if `address` is outside of the memory
    pub fn get(&self, address: usize) -> Option<Byte> {
        self.data.get(address).copied()
    }

    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Word) -> Byte {
        self.data[position as usize]
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Word, value: Byte) {
        self.data[position as usize] = value;
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: Word, data: &[Byte]) {
        self.data[position as usize..position as usize + data.len()].copy_from_slice(data);
    }

    pub fn as_slice(&self) -> &[Byte] {
        &self.data
    }

    /// Assembles the program stored at `path` into a fresh memory image.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        read_source(path)?
            .parse()
            .wrap_err_with(|| format!("Failed to assemble program `{}`", path.display()))
    }

    /// Renders the memory as a 16-column hex table. The byte at `pc` is
    /// wrapped in brackets.
    pub fn hex_dump(&self, pc: Word) -> String {
        let mut out = String::from("    ");
        for col in 0..16 {
            let _ = write!(out, "  {:X} ", col);
        }

        for (row, chunk) in self.data.chunks(16).enumerate() {
            let _ = write!(out, "\n{:02X}: ", row * 16);
            for (col, byte) in chunk.iter().enumerate() {
                if row * 16 + col == pc as usize {
                    let _ = write!(out, "[{:02X}]", byte);
                } else {
                    let _ = write!(out, " {:02X} ", byte);
                }
            }
        }

        out
    }

    /// Logs [`Memory::hex_dump`] at info level
    pub fn dump(&self, pc: Word) {
        log::info!("Memory:\n{}", self.hex_dump(pc));
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = AssemblyErrors;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut memory = Self::default();
        Assembler::new(source).assemble_into(&mut memory)?;
        Ok(memory)
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ]);
    };
}
