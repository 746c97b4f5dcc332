//! The AM9511A device: stack, status register, and command dispatch.
//!
//! Handlers for the integer and stack-manipulation commands live here;
//! the floating-point families are in `float.rs`. Every handler runs to
//! completion inside [`Am9511::command`], so BUSY is set and cleared
//! within a single call — hosts written against the chip's polling
//! protocol see it already clear on the first status read.

use crate::command::{self, Class};
use crate::stack::Stack;
use crate::status;

use overflow_arith::{
    add16, add32, cm16, cm32, div16, div32, mull16, mull32, mulu16, mulu32, oadd16, oadd32,
    osub16, osub32, sub16, sub32,
};

/// One emulated AM9511A. All state for an instance lives here; a host
/// embedding several devices gets fully independent stacks and status
/// registers.
pub struct Am9511 {
    pub(crate) stack: Stack,
    pub(crate) status: u8,
    /// Operand class latched from the last command byte.
    pub(crate) class: Class,
}

impl Am9511 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: Stack::new(),
            status: 0,
            class: Class::Float,
        }
    }

    /// Push a data byte onto the operand stack.
    pub fn push(&mut self, v: u8) {
        self.stack.push(v);
    }

    /// Pop a data byte from the operand stack.
    pub fn pop(&mut self) -> u8 {
        self.stack.pop()
    }

    /// Read the status register.
    #[must_use]
    pub fn status(&self) -> u8 {
        self.status
    }

    /// Reset the device: stack cleared, pointer and status zeroed.
    pub fn reset(&mut self) {
        self.stack.reset();
        self.status = 0;
        self.class = Class::Float;
    }

    /// Issue a command. Does not return until the command is complete.
    ///
    /// Unassigned opcodes are silent no-ops. Only BUSY survives the
    /// status reset; the handler sets the flags for its own result.
    pub fn command(&mut self, op: u8) {
        self.class = Class::decode(op);
        self.status = status::BUSY;

        match op & command::OP_MASK {
            command::NOP => {}
            command::SQRT => self.sqrt(),
            command::SIN => self.sin(),
            command::COS => self.cos(),
            command::TAN => self.tan(),
            command::ASIN => self.asin(),
            command::ACOS => self.acos(),
            command::ATAN => self.atan(),
            command::LOG => self.log(),
            command::LN => self.ln(),
            command::EXP => self.exp(),
            command::PWR => self.pwr(),
            command::ADD => self.add(),
            command::SUB => self.sub(),
            command::MUL => self.mul(),
            command::DIV => self.div(),
            command::FADD => self.fadd(),
            command::FSUB => self.fsub(),
            command::FMUL => self.fmul(),
            command::FDIV => self.fdiv(),
            command::CHS => self.chs(),
            command::MUU => self.muu(),
            command::PTO => self.pto(),
            command::POP => self.pop_operand(),
            command::XCH => self.xch(),
            command::PUPI => self.pupi(),
            command::FLTD => self.fltd(),
            command::FLTS => self.flts(),
            command::FIXD => self.fixd(),
            command::FIXS => self.fixs(),
            _ => {}
        }

        self.status &= !status::BUSY;
    }

    /// Sign and zero flags for the operand now at the top of the stack.
    ///
    /// The sign/exponent byte is always pushed last, so SIGN is bit 7 of
    /// the byte below the pointer for every class. The zero rule is
    /// class-dependent: integers OR their bytes, floats test the explicit
    /// leading mantissa bit.
    pub(crate) fn sz(&mut self) {
        if self.stack.get(-1) & 0x80 != 0 {
            self.status |= status::SIGN;
        }
        let zero = match self.class {
            Class::Integer16 => self.stack.get(-1) | self.stack.get(-2) == 0,
            Class::Integer32 => {
                self.stack.get(-1) | self.stack.get(-2) | self.stack.get(-3) | self.stack.get(-4)
                    == 0
            }
            Class::Float => self.stack.get(-2) & 0x80 == 0,
        };
        if zero {
            self.status |= status::ZERO;
        }
    }

    /// CHS: two's-complement negate for integers (most-negative input is
    /// left alone and flags OVF); sign-bit flip for non-zero floats.
    fn chs(&mut self) {
        match self.class {
            Class::Integer16 => {
                let (r, ovf) = cm16(self.stack.read(-2));
                self.stack.write(-2, r);
                if ovf {
                    self.status |= status::ERR_OVF;
                }
            }
            Class::Integer32 => {
                let (r, ovf) = cm32(self.stack.read(-4));
                self.stack.write(-4, r);
                if ovf {
                    self.status |= status::ERR_OVF;
                }
            }
            Class::Float => {
                // Only flip the sign of a non-zero value; never overflows
                if self.stack.get(-2) & 0x80 != 0 {
                    let b = self.stack.get(-1);
                    self.stack.set(-1, b ^ 0x80);
                }
            }
        }
        self.sz();
    }

    /// PUPI: push the fixed float encoding of pi.
    fn pupi(&mut self) {
        for b in [0xDA, 0x0F, 0xC9, 0x02] {
            self.stack.push(b);
        }
        self.class = Class::Float;
        self.sz();
    }

    /// PTO: duplicate the top operand of the current width.
    fn pto(&mut self) {
        let w = self.class.width();
        // Each push advances the pointer, so the source byte to copy is
        // always w below it
        for _ in 0..w {
            let b = self.stack.get(-w);
            self.stack.push(b);
        }
        self.sz();
    }

    /// POP: drop the top operand. Flags are recomputed from whatever is
    /// exposed, under the command's class bits — the exposed operand's
    /// true type is unknowable, a quirk the hardware shares.
    fn pop_operand(&mut self) {
        self.stack.adjust(-self.class.width());
        self.sz();
    }

    /// XCH: exchange the top two operands byte for byte.
    fn xch(&mut self) {
        let w = self.class.width();
        for i in 0..w {
            let a = self.stack.get(i - w);
            let b = self.stack.get(i - 2 * w);
            self.stack.set(i - w, b);
            self.stack.set(i - 2 * w, a);
        }
        self.sz();
    }

    /// ADD: TOS + NOS replaces both. Carry is the raw word carry;
    /// overflow comes from the sign-bit predicate.
    fn add(&mut self) {
        if self.class == Class::Integer16 {
            let tos: [u8; 2] = self.stack.read(-2);
            let nos: [u8; 2] = self.stack.read(-4);
            let (r, carry) = add16(nos, tos);
            let ovf = oadd16(nos, tos, r);
            self.stack.adjust(-2);
            self.stack.write(-2, r);
            self.carry_ovf(carry, ovf);
        } else {
            let tos: [u8; 4] = self.stack.read(-4);
            let nos: [u8; 4] = self.stack.read(-8);
            let (r, carry) = add32(nos, tos);
            let ovf = oadd32(nos, tos, r);
            self.stack.adjust(-4);
            self.stack.write(-4, r);
            self.carry_ovf(carry, ovf);
        }
        self.sz();
    }

    /// SUB: NOS - TOS replaces both.
    fn sub(&mut self) {
        if self.class == Class::Integer16 {
            let tos: [u8; 2] = self.stack.read(-2);
            let nos: [u8; 2] = self.stack.read(-4);
            let (r, carry) = sub16(nos, tos);
            let ovf = osub16(nos, tos, r);
            self.stack.adjust(-2);
            self.stack.write(-2, r);
            self.carry_ovf(carry, ovf);
        } else {
            let tos: [u8; 4] = self.stack.read(-4);
            let nos: [u8; 4] = self.stack.read(-8);
            let (r, carry) = sub32(nos, tos);
            let ovf = osub32(nos, tos, r);
            self.stack.adjust(-4);
            self.stack.write(-4, r);
            self.carry_ovf(carry, ovf);
        }
        self.sz();
    }

    /// MUL: signed multiply keeping the low product half; overflow when
    /// the discarded half is non-zero.
    fn mul(&mut self) {
        if self.class == Class::Integer16 {
            let tos: [u8; 2] = self.stack.read(-2);
            let nos: [u8; 2] = self.stack.read(-4);
            let (r, ovf) = mull16(nos, tos);
            self.stack.adjust(-2);
            self.stack.write(-2, r);
            if ovf {
                self.status |= status::ERR_OVF;
            }
        } else {
            let tos: [u8; 4] = self.stack.read(-4);
            let nos: [u8; 4] = self.stack.read(-8);
            let (r, ovf) = mull32(nos, tos);
            self.stack.adjust(-4);
            self.stack.write(-4, r);
            if ovf {
                self.status |= status::ERR_OVF;
            }
        }
        self.sz();
    }

    /// MUU: signed multiply keeping the high product half. Reports no
    /// overflow.
    fn muu(&mut self) {
        if self.class == Class::Integer16 {
            let tos: [u8; 2] = self.stack.read(-2);
            let nos: [u8; 2] = self.stack.read(-4);
            let (r, _) = mulu16(nos, tos);
            self.stack.adjust(-2);
            self.stack.write(-2, r);
        } else {
            let tos: [u8; 4] = self.stack.read(-4);
            let nos: [u8; 4] = self.stack.read(-8);
            let (r, _) = mulu32(nos, tos);
            self.stack.adjust(-4);
            self.stack.write(-4, r);
        }
        self.sz();
    }

    /// DIV: NOS / TOS replaces both; a zero divisor flags DIV0 and leaves
    /// the stack untouched.
    fn div(&mut self) {
        if self.class == Class::Integer16 {
            let tos: [u8; 2] = self.stack.read(-2);
            let nos: [u8; 2] = self.stack.read(-4);
            match div16(nos, tos) {
                Some(r) => {
                    self.stack.adjust(-2);
                    self.stack.write(-2, r);
                }
                None => self.status |= status::ERR_DIV0,
            }
        } else {
            let tos: [u8; 4] = self.stack.read(-4);
            let nos: [u8; 4] = self.stack.read(-8);
            match div32(nos, tos) {
                Some(r) => {
                    self.stack.adjust(-4);
                    self.stack.write(-4, r);
                }
                None => self.status |= status::ERR_DIV0,
            }
        }
        self.sz();
    }

    fn carry_ovf(&mut self, carry: bool, ovf: bool) {
        if carry {
            self.status |= status::CARRY;
        }
        if ovf {
            self.status |= status::ERR_OVF;
        }
    }
}

impl Default for Am9511 {
    fn default() -> Self {
        Self::new()
    }
}
