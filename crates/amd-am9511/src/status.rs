//! Status register bits.
//!
//! The error field (bits 4..1) holds one code at a time; everything but
//! BUSY is recomputed from scratch at the start of each command.

/// Device is mid-command (bit 7). Always clear again by the time
/// `command` returns; the polling contract is host-side.
pub const BUSY: u8 = 0x80;

/// Top of stack is negative (bit 6).
pub const SIGN: u8 = 0x40;

/// Top of stack is zero (bit 5).
pub const ZERO: u8 = 0x20;

/// Mask for the error code field (bits 4..1).
pub const ERROR_MASK: u8 = 0x1E;

/// Carry/borrow out of the most significant bit (bit 0).
pub const CARRY: u8 = 0x01;

/// No error.
pub const ERR_NONE: u8 = 0x00;

/// Result overflowed.
pub const ERR_OVF: u8 = 0x02;

/// Result underflowed.
pub const ERR_UND: u8 = 0x04;

/// Negative argument to SQRT, LN, LOG, or PWR.
pub const ERR_NEG: u8 = 0x08;

/// Divide by zero.
pub const ERR_DIV0: u8 = 0x10;

/// Argument out of range for ASIN, ACOS, EXP, or PWR.
pub const ERR_ARG: u8 = 0x18;
