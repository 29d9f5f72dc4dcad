use std::fmt;

/// Status flags.
///
/// `mop` selects the arithmetic width the other flags are derived with
/// (`true` = 4-bit, `false` = 8-bit). `interrupt` is latched but no
/// instruction reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags {
    /// Carry
    pub cf: bool,
    /// Zero
    pub zf: bool,
    /// Sign
    pub sf: bool,
    /// Overflow
    pub of: bool,
    /// Parity, set when the masked result has an even number of one bits
    pub pf: bool,
    /// Interrupt enable
    pub interrupt: bool,
    /// Operation mode
    pub mop: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            cf: false,
            zf: false,
            sf: false,
            of: false,
            pf: false,
            interrupt: false,
            mop: true,
        }
    }
}

impl Flags {
    /// Largest value representable in the current width
    pub fn max_value(&self) -> i32 {
        if self.mop {
            0xF
        } else {
            0xFF
        }
    }

    fn sign_bit(&self) -> i32 {
        if self.mop {
            0x8
        } else {
            0x80
        }
    }

    /// Derives CF/ZF/SF/OF/PF from the unmasked result of an ALU operation.
    pub fn update_from_result(&mut self, result: i32) {
        let max = self.max_value();
        let out_of_range = result > max || result < 0;
        let masked = result & max;

        self.cf = out_of_range;
        self.of = out_of_range;
        self.zf = masked == 0;
        self.sf = masked & self.sign_bit() != 0;
        self.pf = masked.count_ones() % 2 == 0;
    }

    /// Sets the width mode. Any non-zero value selects 4-bit mode.
    pub fn set_mop(&mut self, value: u8) {
        self.mop = value != 0;
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CF: {} ZF: {} SF: {} OF: {} PF: {} IF: {} MOP: {}",
            self.cf as u8,
            self.zf as u8,
            self.sf as u8,
            self.of as u8,
            self.pf as u8,
            self.interrupt as u8,
            if self.mop { "4-bit" } else { "8-bit" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(result: i32, mop: bool) -> Flags {
        let mut flags = Flags {
            mop,
            ..Flags::default()
        };
        flags.update_from_result(result);
        flags
    }

    #[test]
    fn defaults_to_four_bit_mode() {
        let flags = Flags::default();
        assert!(flags.mop);
        assert!(!flags.cf && !flags.zf && !flags.sf && !flags.of && !flags.pf);
    }

    #[test]
    fn nibble_overflow() {
        let flags = derive(0x10, true);
        assert!(flags.cf);
        assert!(flags.of);
        assert!(flags.zf);
        assert!(!flags.sf);
        assert!(flags.pf);
    }

    #[test]
    fn byte_mode_has_wider_range() {
        let flags = derive(0x10, false);
        assert!(!flags.cf);
        assert!(!flags.zf);
        assert!(!flags.sf);
        assert!(!flags.pf);

        let flags = derive(0x100, false);
        assert!(flags.cf && flags.zf);
    }

    #[test]
    fn sign_bit_depends_on_width() {
        assert!(derive(0x8, true).sf);
        assert!(!derive(0x8, false).sf);
        assert!(derive(0x80, false).sf);
    }

    #[test]
    fn negative_results_borrow() {
        let flags = derive(-1, true);
        assert!(flags.cf);
        assert!(flags.of);
        assert!(!flags.zf);
        assert!(flags.sf);

        let flags = derive(-1, false);
        assert!(flags.cf);
        assert!(flags.sf);
        assert!(flags.pf);
    }

    #[test]
    fn parity_is_even_parity() {
        for value in 0..=255i32 {
            let flags = derive(value, false);
            assert_eq!(flags.pf, value.count_ones() % 2 == 0, "value {}", value);
        }
    }

    #[test]
    fn derivation_is_pure() {
        for &result in &[-300, -1, 0, 1, 7, 8, 15, 16, 127, 128, 255, 256, 4000] {
            for &mop in &[true, false] {
                let a = derive(result, mop);
                let mut b = Flags {
                    cf: true,
                    zf: true,
                    sf: true,
                    of: true,
                    pf: true,
                    interrupt: false,
                    mop,
                };
                b.update_from_result(result);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn set_mop_normalizes() {
        let mut flags = Flags::default();
        flags.set_mop(0);
        assert!(!flags.mop);
        flags.set_mop(0x42);
        assert!(flags.mop);
    }
}
