//! Floating-point command handlers: conversions, basic arithmetic, and
//! the transcendental functions.
//!
//! Operands cross from the wire encoding into the canonical record, are
//! computed in double precision, then re-normalized on the way back. The
//! shared exponent recheck folds an out-of-range exponent by ±128 instead
//! of saturating, exactly as the chip does, and flags OVF or UND.

use crate::apu::Am9511;
use crate::command::Class;
use crate::status;

use float_format::Fp;

/// Exact integer-to-canonical conversion; 32-bit magnitudes wider than
/// the 24-bit mantissa truncate low bits.
fn fp_from_i32(v: i32) -> Fp {
    if v == 0 {
        return Fp::ZERO;
    }
    let sign = v < 0;
    let mag = v.unsigned_abs();
    let n = 32 - mag.leading_zeros() as i32;
    let m24 = if n >= 24 {
        mag >> (n - 24)
    } else {
        mag << (24 - n)
    };
    Fp {
        sign,
        exponent: (n - 1) as i16,
        mantissa_h: (m24 >> 16) as u8,
        mantissa_l: m24 as u16,
    }
}

/// Truncate a canonical float toward zero. Exponents of 32 and up are
/// already outside every fixed target, so they saturate.
fn fp_to_i64(fp: &Fp) -> i64 {
    if fp.is_zero() {
        return 0;
    }
    if fp.exponent >= 32 {
        return if fp.sign { i64::MIN } else { i64::MAX };
    }
    let m = i64::from((u32::from(fp.mantissa_h) << 16) | u32::from(fp.mantissa_l));
    let shift = i32::from(fp.exponent) - 23;
    let mag = if shift >= 0 {
        m << shift
    } else if shift > -24 {
        m >> -shift
    } else {
        0
    };
    if fp.sign { -mag } else { mag }
}

impl Am9511 {
    /// Top-of-stack float operand.
    fn tos_fp(&self) -> Fp {
        Fp::from_am9511(self.stack.read(-4))
    }

    /// Next-on-stack float operand.
    fn nos_fp(&self) -> Fp {
        Fp::from_am9511(self.stack.read(-8))
    }

    /// Re-normalize and commit a float result at the given stack offset.
    ///
    /// Exponent above 63 folds down by 128 and flags OVF; below -64 folds
    /// up by 128 and flags UND. A result that is unrepresentable even
    /// after the fold commits as zero.
    fn commit_float(&mut self, mut fp: Fp, offset: i32) {
        if !fp.is_zero() {
            if fp.exponent > 63 {
                self.status |= status::ERR_OVF;
                fp.exponent -= 128;
            } else if fp.exponent < -64 {
                self.status |= status::ERR_UND;
                fp.exponent += 128;
            }
        }
        let bytes = fp.to_am9511().unwrap_or([0; 4]);
        self.stack.write(offset, bytes);
        self.class = Class::Float;
        self.sz();
    }

    /// FLTS: pop a 16-bit integer, push it as a float.
    pub(crate) fn flts(&mut self) {
        let v = i16::from_le_bytes(self.stack.read(-2));
        // The 2-byte integer becomes a 4-byte float
        self.stack.adjust(2);
        self.commit_float(fp_from_i32(i32::from(v)), -4);
    }

    /// FLTD: pop a 32-bit integer, push it as a float.
    pub(crate) fn fltd(&mut self) {
        let v = i32::from_le_bytes(self.stack.read(-4));
        self.commit_float(fp_from_i32(v), -4);
    }

    /// FIXS: convert the top float to a 16-bit integer. Out of range
    /// flags OVF and leaves the operand untouched.
    pub(crate) fn fixs(&mut self) {
        let v = fp_to_i64(&self.tos_fp());
        if (-32768..=32767).contains(&v) {
            self.stack.adjust(-2);
            self.stack.write(-2, (v as i16).to_le_bytes());
            self.class = Class::Integer16;
        } else {
            self.status |= status::ERR_OVF;
        }
        self.sz();
    }

    /// FIXD: convert the top float to a 32-bit integer.
    pub(crate) fn fixd(&mut self) {
        let v = fp_to_i64(&self.tos_fp());
        if (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&v) {
            self.stack.write(-4, (v as i32).to_le_bytes());
            self.class = Class::Integer32;
        } else {
            self.status |= status::ERR_OVF;
        }
        self.sz();
    }

    /// FADD: NOS + TOS replaces both.
    pub(crate) fn fadd(&mut self) {
        let tos = self.tos_fp().to_f64();
        let nos = self.nos_fp().to_f64();
        self.stack.adjust(-4);
        self.commit_float(Fp::from_f64(nos + tos), -4);
    }

    /// FSUB: NOS - TOS replaces both.
    pub(crate) fn fsub(&mut self) {
        let tos = self.tos_fp().to_f64();
        let nos = self.nos_fp().to_f64();
        self.stack.adjust(-4);
        self.commit_float(Fp::from_f64(nos - tos), -4);
    }

    /// FMUL: NOS * TOS replaces both.
    pub(crate) fn fmul(&mut self) {
        let tos = self.tos_fp().to_f64();
        let nos = self.nos_fp().to_f64();
        self.stack.adjust(-4);
        self.commit_float(Fp::from_f64(nos * tos), -4);
    }

    /// FDIV: NOS / TOS replaces both. A zero divisor drops the divisor,
    /// leaves the numerator as the result, and flags DIV0.
    pub(crate) fn fdiv(&mut self) {
        let tos = self.tos_fp();
        let nos = self.nos_fp();
        self.stack.adjust(-4);
        if tos.is_zero() {
            self.status |= status::ERR_DIV0;
            self.class = Class::Float;
            self.sz();
            return;
        }
        self.commit_float(Fp::from_f64(nos.to_f64() / tos.to_f64()), -4);
    }

    /// SQRT: negative argument flags NEG and commits nothing.
    pub(crate) fn sqrt(&mut self) {
        let x = self.tos_fp().to_f64();
        if x < 0.0 {
            self.status |= status::ERR_NEG;
            self.sz();
            return;
        }
        self.commit_float(Fp::from_f64(x.sqrt()), -4);
    }

    pub(crate) fn sin(&mut self) {
        let x = self.tos_fp().to_f64();
        self.commit_float(Fp::from_f64(x.sin()), -4);
    }

    pub(crate) fn cos(&mut self) {
        let x = self.tos_fp().to_f64();
        self.commit_float(Fp::from_f64(x.cos()), -4);
    }

    /// TAN: the chip cannot resolve arguments below 2^-12; those flag UND
    /// and leave the operand untouched.
    pub(crate) fn tan(&mut self) {
        let x = self.tos_fp().to_f64();
        if x.abs() < (-12.0f64).exp2() {
            self.status |= status::ERR_UND;
            self.sz();
            return;
        }
        self.commit_float(Fp::from_f64(x.tan()), -4);
    }

    /// ASIN: |x| > 1 flags ARG and commits nothing.
    pub(crate) fn asin(&mut self) {
        let x = self.tos_fp().to_f64();
        if x.abs() > 1.0 {
            self.status |= status::ERR_ARG;
            self.sz();
            return;
        }
        self.commit_float(Fp::from_f64(x.asin()), -4);
    }

    /// ACOS: |x| > 1 flags ARG and commits nothing.
    pub(crate) fn acos(&mut self) {
        let x = self.tos_fp().to_f64();
        if x.abs() > 1.0 {
            self.status |= status::ERR_ARG;
            self.sz();
            return;
        }
        self.commit_float(Fp::from_f64(x.acos()), -4);
    }

    pub(crate) fn atan(&mut self) {
        let x = self.tos_fp().to_f64();
        self.commit_float(Fp::from_f64(x.atan()), -4);
    }

    /// LOG (base 10): negative flags NEG, zero flags UND; both leave the
    /// operand untouched.
    pub(crate) fn log(&mut self) {
        let x = self.tos_fp().to_f64();
        if x < 0.0 {
            self.status |= status::ERR_NEG;
            self.sz();
            return;
        }
        if x == 0.0 {
            self.status |= status::ERR_UND;
            self.sz();
            return;
        }
        self.commit_float(Fp::from_f64(x.log10()), -4);
    }

    /// LN: same domain rules as LOG.
    pub(crate) fn ln(&mut self) {
        let x = self.tos_fp().to_f64();
        if x < 0.0 {
            self.status |= status::ERR_NEG;
            self.sz();
            return;
        }
        if x == 0.0 {
            self.status |= status::ERR_UND;
            self.sz();
            return;
        }
        self.commit_float(Fp::from_f64(x.ln()), -4);
    }

    /// EXP: arguments outside ±32 flag ARG; the exponent range could
    /// never hold the result.
    pub(crate) fn exp(&mut self) {
        let x = self.tos_fp().to_f64();
        if x.abs() > 32.0 {
            self.status |= status::ERR_ARG;
            self.sz();
            return;
        }
        self.commit_float(Fp::from_f64(x.exp()), -4);
    }

    /// PWR: NOS^TOS as exp(TOS * ln NOS). A negative base flags NEG, a
    /// zero base gives a zero result, and a product outside ±32 flags
    /// ARG before exponentiation.
    pub(crate) fn pwr(&mut self) {
        let a = self.tos_fp().to_f64();
        let b = self.nos_fp().to_f64();
        if b < 0.0 {
            self.status |= status::ERR_NEG;
            self.sz();
            return;
        }
        if b == 0.0 {
            self.stack.adjust(-4);
            self.commit_float(Fp::ZERO, -4);
            return;
        }
        let t = a * b.ln();
        if t.abs() > 32.0 {
            self.status |= status::ERR_ARG;
            self.sz();
            return;
        }
        self.stack.adjust(-4);
        self.commit_float(Fp::from_f64(t.exp()), -4);
    }
}
