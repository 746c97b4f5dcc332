//! Command byte layout: `SR(1) | OperandClass(2) | Opcode(5)`.
//!
//! The class bits select the operand width and kind. Both set means
//! 16-bit integer, FIXED alone means 32-bit integer, FIXED clear means
//! 32-bit float. SR requests a completion interrupt on the real chip and
//! has no effect on the emulation.

/// Service request on completion (bit 7).
pub const SR: u8 = 0x80;

/// Single (16-bit) rather than double (32-bit) operand (bit 6).
pub const SINGLE: u8 = 0x40;

/// Fixed-point rather than floating-point operand (bit 5).
pub const FIXED: u8 = 0x20;

/// Opcode field mask (bits 4..0).
pub const OP_MASK: u8 = 0x1F;

pub const NOP: u8 = 0x00;
pub const SQRT: u8 = 0x01;
pub const SIN: u8 = 0x02;
pub const COS: u8 = 0x03;
pub const TAN: u8 = 0x04;
pub const ASIN: u8 = 0x05;
pub const ACOS: u8 = 0x06;
pub const ATAN: u8 = 0x07;
/// Common logarithm (base 10).
pub const LOG: u8 = 0x08;
/// Natural logarithm.
pub const LN: u8 = 0x09;
pub const EXP: u8 = 0x0A;
/// Power: NOS^TOS.
pub const PWR: u8 = 0x0B;
pub const ADD: u8 = 0x0C;
/// Subtract: NOS - TOS.
pub const SUB: u8 = 0x0D;
/// Multiply, lower product half.
pub const MUL: u8 = 0x0E;
/// Divide: NOS / TOS.
pub const DIV: u8 = 0x0F;
pub const FADD: u8 = 0x10;
pub const FSUB: u8 = 0x11;
pub const FMUL: u8 = 0x12;
pub const FDIV: u8 = 0x13;
/// Change sign.
pub const CHS: u8 = 0x14;
/// Multiply, upper product half.
pub const MUU: u8 = 0x16;
/// Duplicate TOS.
pub const PTO: u8 = 0x17;
pub const POP: u8 = 0x18;
/// Exchange TOS and NOS.
pub const XCH: u8 = 0x19;
/// Push pi.
pub const PUPI: u8 = 0x1A;
/// 32-bit integer to float.
pub const FLTD: u8 = 0x1C;
/// 16-bit integer to float.
pub const FLTS: u8 = 0x1D;
/// Float to 32-bit integer.
pub const FIXD: u8 = 0x1E;
/// Float to 16-bit integer.
pub const FIXS: u8 = 0x1F;

/// Operand class, latched from the command byte for the duration of the
/// handler. A handler producing a different-typed result re-latches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Integer16,
    Integer32,
    Float,
}

impl Class {
    /// Decode the class bits of a command byte.
    #[must_use]
    pub fn decode(op: u8) -> Self {
        if op & FIXED != 0 {
            if op & SINGLE != 0 {
                Self::Integer16
            } else {
                Self::Integer32
            }
        } else {
            Self::Float
        }
    }

    /// Operand width on the stack, in bytes.
    #[must_use]
    pub fn width(self) -> i32 {
        match self {
            Self::Integer16 => 2,
            Self::Integer32 | Self::Float => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_decode() {
        assert_eq!(Class::decode(FIXED | SINGLE | ADD), Class::Integer16);
        assert_eq!(Class::decode(FIXED | ADD), Class::Integer32);
        assert_eq!(Class::decode(FADD), Class::Float);
        // SR does not affect the class
        assert_eq!(Class::decode(SR | FIXED | SINGLE | CHS), Class::Integer16);
    }
}
