use std::convert::TryFrom;
use std::fmt;

use log::warn;

use crate::memory::Byte;

byte_enum! {
    /// Register codes as they appear in the instruction stream. The `X`
    /// registers address both 4-bit banks, `H`/`L` a single bank.
    pub enum Register {
        /// AH:AL
        AX = 0x01,
        /// BH:BL
        BX = 0x02,
        /// CH:CL
        CX = 0x03,
        /// DH:DL
        DX = 0x04,
        /// EH:EL
        EX = 0x05,
        /// GH:GL
        GX = 0x06,
        /// High bank of AX
        AH = 0x07,
        /// Low bank of AX
        AL = 0x08,
        /// High bank of BX
        BH = 0x09,
        /// Low bank of BX
        BL = 0x0A,
        /// High bank of CX
        CH = 0x0B,
        /// Low bank of CX
        CL = 0x0C,
        /// High bank of DX
        DH = 0x0D,
        /// Low bank of DX
        DL = 0x0E,
        /// High bank of EX
        EH = 0x0F,
        /// Low bank of EX
        EL = 0x10,
        /// High bank of GX
        GH = 0x11,
        /// Low bank of GX
        GL = 0x12,
    }
}

/// Which part of a register a code addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    Full,
    High,
    Low,
}

impl Register {
    /// Index of the underlying full register (0 = AX .. 5 = GX) and the
    /// bank the code selects.
    pub fn location(self) -> (usize, Bank) {
        let code = u8::from(self);
        match code {
            0x01..=0x06 => (code as usize - 0x01, Bank::Full),
            _ => {
                let half = code as usize - 0x07;
                let bank = if half % 2 == 0 { Bank::High } else { Bank::Low };
                (half / 2, bank)
            }
        }
    }

    /// Largest value the register can hold
    pub fn mask(self) -> Byte {
        match self.location().1 {
            Bank::Full => 0xFF,
            Bank::High | Bank::Low => 0x0F,
        }
    }
}

/// Six general purpose registers, each stored as two independent 4-bit banks.
///
/// MOP does not affect packing: a full register always reads
/// `(high << 4) | low`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegisterFile {
    /// `[high, low]` per register, every bank in `0..=0xF`
    banks: [[Byte; 2]; 6],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, register: Register) -> Byte {
        let (index, bank) = register.location();
        let [high, low] = self.banks[index];
        match bank {
            Bank::Full => ((high & 0xF) << 4) | (low & 0xF),
            Bank::High => high & 0xF,
            Bank::Low => low & 0xF,
        }
    }

    pub fn write(&mut self, register: Register, value: Byte) {
        let (index, bank) = register.location();
        let banks = &mut self.banks[index];
        match bank {
            Bank::Full => {
                banks[0] = (value >> 4) & 0xF;
                banks[1] = value & 0xF;
            }
            Bank::High => banks[0] = value & 0xF,
            Bank::Low => banks[1] = value & 0xF,
        }
    }

    /// Reads by raw register code. Unknown codes read as 0.
    pub fn get(&self, code: Byte) -> Byte {
        match Register::try_from(code) {
            Ok(register) => self.read(register),
            Err(_) => {
                warn!("Invalid register code: 0x{:02X}", code);
                0
            }
        }
    }

    /// Writes by raw register code. Unknown codes are ignored.
    pub fn set(&mut self, code: Byte, value: Byte) {
        match Register::try_from(code) {
            Ok(register) => self.write(register, value),
            Err(_) => warn!("Invalid register code: 0x{:02X}", code),
        }
    }

    /// `[high, low]` banks of the full register `register` belongs to
    pub fn banks(&self, register: Register) -> [Byte; 2] {
        self.banks[register.location().0]
    }

    pub fn ax(&self) -> Byte {
        self.read(Register::AX)
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = &Register::ALL[..6];
        for (i, register) in full.iter().enumerate() {
            let [high, low] = self.banks[i];
            let name = register.name();
            let prefix = &name[..1];
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(
                f,
                "{}: {:x}{:x} ({}H: {:x}, {}L: {:x})",
                name, high, low, prefix, high, prefix, low
            )?;
        }
        Ok(())
    }
}
