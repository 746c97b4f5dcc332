//! Conversions between 32-bit wire float formats.
//!
//! Hub-and-spoke: every format converts through the canonical [`Fp`]
//! record, so adding a format means one converter pair, not a full matrix.
//! All wire buffers are 4 bytes, little-endian (index 3 holds the sign and
//! exponent end of the format).
//!
//! # Formats
//!
//! | Format          | Exponent                          | Sign              | Zero rule                |
//! |-----------------|-----------------------------------|-------------------|--------------------------|
//! | IEEE 754 single | bias 127, split across bytes 3..2 | bit 7 of byte 3   | biased field all zero    |
//! | Microsoft Basic | bias 129, byte 3                  | bit 7 of byte 2   | byte 3 == 0              |
//! | HiTech C        | bias 65, low 7 bits of byte 3     | bit 7 of byte 3   | mantissa bit 23 clear    |
//! | AM9511          | 7-bit two's complement, offset 1  | bit 7 of byte 3   | mantissa bit 23 clear    |
//!
//! None of the formats here carry NaN, Infinity, or denormals; an IEEE
//! input in that territory is rejected.

use std::fmt;

/// Conversion failure. The output buffer is never partially written: a
/// failed `to_*` call commits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// The canonical exponent does not fit the destination format.
    ExponentOutOfRange(i16),
    /// IEEE NaN/Infinity input (biased exponent all ones).
    NotRepresentable,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExponentOutOfRange(e) => write!(f, "exponent {e} out of range for format"),
            Self::NotRepresentable => write!(f, "NaN/Infinity has no representation"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Canonical float record: separate sign, unbiased exponent, and a
/// normalized 24-bit mantissa with the leading 1 explicit in bit 23.
///
/// The value is `(-1)^sign * 1.f * 2^exponent` where `f` is the mantissa
/// below the leading bit. If bit 7 of `mantissa_h` is clear the value is
/// exactly 0.0 regardless of the other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fp {
    pub sign: bool,
    pub exponent: i16,
    /// High mantissa byte; bit 7 is the explicit leading 1.
    pub mantissa_h: u8,
    pub mantissa_l: u16,
}

impl Fp {
    pub const ZERO: Self = Self {
        sign: false,
        exponent: 0,
        mantissa_h: 0,
        mantissa_l: 0,
    };

    /// A clear leading mantissa bit means exactly 0.0.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mantissa_h & 0x80 == 0
    }

    /// Unpack an IEEE 754 single. A zero biased exponent yields 0.0; an
    /// all-ones biased exponent (NaN/Infinity) is rejected.
    pub fn from_ieee754(bytes: [u8; 4]) -> Result<Self, FormatError> {
        // Exponent: 7 bits from byte 3, top bit of byte 2.
        let e = (u16::from(bytes[3] & 0x7F) << 1) | u16::from(bytes[2] >> 7);
        if e == 0 {
            return Ok(Self::ZERO);
        }
        if e == 0xFF {
            return Err(FormatError::NotRepresentable);
        }
        Ok(Self {
            sign: bytes[3] & 0x80 != 0,
            exponent: e as i16 - 127,
            mantissa_h: (bytes[2] & 0x7F) | 0x80,
            mantissa_l: u16::from_le_bytes([bytes[0], bytes[1]]),
        })
    }

    /// Pack into IEEE 754 single.
    pub fn to_ieee754(&self) -> Result<[u8; 4], FormatError> {
        if self.is_zero() {
            return Ok([0; 4]);
        }
        if !(-126..=127).contains(&self.exponent) {
            return Err(FormatError::ExponentOutOfRange(self.exponent));
        }
        let biased = (self.exponent + 127) as u16;

        // The implied leading 1 is stripped; the low exponent bit takes
        // its place in the mantissa-high byte.
        let mut m_h = self.mantissa_h & 0x7F;
        if biased & 1 != 0 {
            m_h |= 0x80;
        }
        let mut b3 = (biased >> 1) as u8;
        if self.sign {
            b3 |= 0x80;
        }
        Ok([self.mantissa_l as u8, (self.mantissa_l >> 8) as u8, m_h, b3])
    }

    /// Unpack a Microsoft Basic (mbasic/f80) float. A zero exponent byte
    /// means 0.0.
    #[must_use]
    pub fn from_ms_basic(bytes: [u8; 4]) -> Self {
        if bytes[3] == 0 {
            return Self::ZERO;
        }
        Self {
            sign: bytes[2] & 0x80 != 0,
            exponent: i16::from(bytes[3]) - 129,
            mantissa_h: bytes[2] | 0x80,
            mantissa_l: u16::from_le_bytes([bytes[0], bytes[1]]),
        }
    }

    /// Pack into Microsoft Basic format: the sign replaces the leading
    /// mantissa bit.
    pub fn to_ms_basic(&self) -> Result<[u8; 4], FormatError> {
        if self.is_zero() {
            return Ok([0; 4]);
        }
        if !(-129..=126).contains(&self.exponent) {
            return Err(FormatError::ExponentOutOfRange(self.exponent));
        }
        let biased = (self.exponent + 129) as u8;
        let mut m_h = self.mantissa_h & 0x7F;
        if self.sign {
            m_h |= 0x80;
        }
        Ok([
            self.mantissa_l as u8,
            (self.mantissa_l >> 8) as u8,
            m_h,
            biased,
        ])
    }

    /// Unpack a HiTech C float. The leading mantissa bit is explicit; if
    /// clear, the value is 0.0.
    #[must_use]
    pub fn from_hitech(bytes: [u8; 4]) -> Self {
        if bytes[2] & 0x80 == 0 {
            return Self::ZERO;
        }
        Self {
            sign: bytes[3] & 0x80 != 0,
            exponent: i16::from(bytes[3] & 0x7F) - 65,
            mantissa_h: bytes[2],
            mantissa_l: u16::from_le_bytes([bytes[0], bytes[1]]),
        }
    }

    /// Pack into HiTech C format.
    pub fn to_hitech(&self) -> Result<[u8; 4], FormatError> {
        if self.is_zero() {
            return Ok([0; 4]);
        }
        if !(-65..=63).contains(&self.exponent) {
            return Err(FormatError::ExponentOutOfRange(self.exponent));
        }
        let mut b3 = ((self.exponent + 65) & 0x7F) as u8;
        if self.sign {
            b3 |= 0x80;
        }
        Ok([
            self.mantissa_l as u8,
            (self.mantissa_l >> 8) as u8,
            self.mantissa_h,
            b3,
        ])
    }

    /// Unpack an AM9511 float. The exponent field is 7-bit two's
    /// complement (sign-extended here, not bias-subtracted), offset by one
    /// from the canonical exponent.
    #[must_use]
    pub fn from_am9511(bytes: [u8; 4]) -> Self {
        if bytes[2] & 0x80 == 0 {
            return Self::ZERO;
        }
        let e7 = i16::from(bytes[3] & 0x7F);
        let e = if e7 & 0x40 != 0 { e7 - 128 } else { e7 };
        Self {
            sign: bytes[3] & 0x80 != 0,
            exponent: e - 1,
            mantissa_h: bytes[2],
            mantissa_l: u16::from_le_bytes([bytes[0], bytes[1]]),
        }
    }

    /// Pack into AM9511 format.
    pub fn to_am9511(&self) -> Result<[u8; 4], FormatError> {
        if self.is_zero() {
            return Ok([0; 4]);
        }
        if !(-64..=63).contains(&self.exponent) {
            return Err(FormatError::ExponentOutOfRange(self.exponent));
        }
        let mut b3 = ((self.exponent + 1) & 0x7F) as u8;
        if self.sign {
            b3 |= 0x80;
        }
        Ok([
            self.mantissa_l as u8,
            (self.mantissa_l >> 8) as u8,
            self.mantissa_h,
            b3,
        ])
    }

    /// Widen to a host double. Exact: the 24-bit mantissa always fits.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let m = (u32::from(self.mantissa_h) << 16) | u32::from(self.mantissa_l);
        let mag = f64::from(m) * f64::from(self.exponent - 23).exp2();
        if self.sign { -mag } else { mag }
    }

    /// Narrow a host double, truncating the mantissa to 24 bits.
    ///
    /// Values outside any wire format saturate to an exponent far out of
    /// range rather than failing, so a caller's range check catches them.
    #[must_use]
    pub fn from_f64(v: f64) -> Self {
        if v == 0.0 {
            return Self::ZERO;
        }
        let bits = v.to_bits();
        let sign = bits >> 63 != 0;
        let exp_bits = ((bits >> 52) & 0x7FF) as i32;
        if exp_bits == 0x7FF {
            // Infinity or NaN
            return Self {
                sign,
                exponent: i16::MAX / 2,
                mantissa_h: 0x80,
                mantissa_l: 0,
            };
        }
        if exp_bits == 0 {
            // Subnormal double, far below the smallest wire value
            return Self {
                sign,
                exponent: i16::MIN / 2,
                mantissa_h: 0x80,
                mantissa_l: 0,
            };
        }
        let frac = bits & ((1u64 << 52) - 1);
        let m24 = 0x0080_0000_u32 | (frac >> 29) as u32;
        Self {
            sign,
            exponent: (exp_bits - 1023) as i16,
            mantissa_h: (m24 >> 16) as u8,
            mantissa_l: m24 as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AM_PI: [u8; 4] = [0xDA, 0x0F, 0xC9, 0x02];

    #[test]
    fn ieee_round_trip_negative_five() {
        let bytes = [0x00, 0x00, 0xA0, 0xC0]; // -5.0
        let fp = Fp::from_ieee754(bytes).unwrap();
        assert!(fp.sign);
        assert_eq!(fp.exponent, 2);
        assert_eq!(fp.mantissa_h, 0xA0);
        assert_eq!(fp.to_f64(), -5.0);
        assert_eq!(fp.to_ieee754().unwrap(), bytes);
    }

    #[test]
    fn ieee_zero_without_inspecting_mantissa() {
        // Exponent field zero means 0.0 no matter the mantissa bytes
        let fp = Fp::from_ieee754([0xFF, 0xFF, 0x7F, 0x00]).unwrap();
        assert!(fp.is_zero());
        assert_eq!(fp.to_f64(), 0.0);
    }

    #[test]
    fn ieee_rejects_nan_and_infinity() {
        // +Infinity: biased exponent all ones
        assert_eq!(
            Fp::from_ieee754([0x00, 0x00, 0x80, 0x7F]),
            Err(FormatError::NotRepresentable)
        );
    }

    #[test]
    fn ieee_range_check() {
        let fp = Fp {
            sign: false,
            exponent: 200,
            mantissa_h: 0x80,
            mantissa_l: 0,
        };
        assert_eq!(fp.to_ieee754(), Err(FormatError::ExponentOutOfRange(200)));
    }

    #[test]
    fn am9511_pi_round_trips() {
        let fp = Fp::from_am9511(AM_PI);
        assert!(!fp.sign);
        assert_eq!(fp.exponent, 1);
        assert!((fp.to_f64() - 3.141_592).abs() < 1e-6);
        assert_eq!(fp.to_am9511().unwrap(), AM_PI);
    }

    #[test]
    fn am9511_negative_exponent_sign_extends() {
        // 0.5 = 1.0 * 2^-1: stored exponent 0, canonical -1
        let half = Fp::from_f64(0.5);
        assert_eq!(half.exponent, -1);
        let bytes = half.to_am9511().unwrap();
        assert_eq!(bytes, [0x00, 0x00, 0x80, 0x00]);
        assert_eq!(Fp::from_am9511(bytes).to_f64(), 0.5);

        // 2^-33: stored exponent is a negative 7-bit two's-complement value
        let small = Fp::from_f64((-33.0f64).exp2());
        let bytes = small.to_am9511().unwrap();
        assert_eq!(bytes[3] & 0x40, 0x40);
        assert_eq!(Fp::from_am9511(bytes).to_f64(), (-33.0f64).exp2());
    }

    #[test]
    fn am9511_range_check() {
        let fp = Fp {
            sign: false,
            exponent: 64,
            mantissa_h: 0x80,
            mantissa_l: 0,
        };
        assert_eq!(fp.to_am9511(), Err(FormatError::ExponentOutOfRange(64)));
        let fp = Fp { exponent: -65, ..fp };
        assert_eq!(fp.to_am9511(), Err(FormatError::ExponentOutOfRange(-65)));
    }

    #[test]
    fn ms_basic_round_trip() {
        // 1.0: biased exponent 129, sign clear in mantissa-high byte
        let one = Fp::from_f64(1.0);
        let bytes = one.to_ms_basic().unwrap();
        assert_eq!(bytes, [0x00, 0x00, 0x00, 0x81]);
        assert_eq!(Fp::from_ms_basic(bytes).to_f64(), 1.0);

        let neg = Fp::from_f64(-0.75);
        let bytes = neg.to_ms_basic().unwrap();
        assert_eq!(bytes[2] & 0x80, 0x80);
        assert_eq!(Fp::from_ms_basic(bytes).to_f64(), -0.75);
    }

    #[test]
    fn ms_basic_zero_rule() {
        assert!(Fp::from_ms_basic([0xAA, 0xBB, 0xCC, 0x00]).is_zero());
        assert_eq!(Fp::ZERO.to_ms_basic().unwrap(), [0; 4]);
    }

    #[test]
    fn hitech_round_trip() {
        let v = Fp::from_f64(-5.0);
        let bytes = v.to_hitech().unwrap();
        // Sign lives in the exponent byte, leading mantissa bit explicit
        assert_eq!(bytes[3] & 0x80, 0x80);
        assert_eq!(bytes[2] & 0x80, 0x80);
        assert_eq!(Fp::from_hitech(bytes).to_f64(), -5.0);
    }

    #[test]
    fn hitech_zero_rule() {
        assert!(Fp::from_hitech([0x00, 0x00, 0x00, 0x41]).is_zero());
    }

    #[test]
    fn f64_bridge_truncates_to_pupi_constant() {
        // Truncation (not rounding) reproduces the chip's PUPI mantissa
        assert_eq!(Fp::from_f64(std::f64::consts::PI).to_am9511().unwrap(), AM_PI);
    }

    #[test]
    fn f64_bridge_exact_for_dyadic_values() {
        for v in [1.0, -1.0, 0.5, -0.25, 1.5, 12345.0, -65536.0] {
            assert_eq!(Fp::from_f64(v).to_f64(), v, "{v}");
        }
    }

    #[test]
    fn f64_bridge_saturates_out_of_range() {
        let inf = Fp::from_f64(f64::INFINITY);
        assert!(inf.exponent > 63);
        let tiny = Fp::from_f64(f64::MIN_POSITIVE / 4.0);
        assert!(tiny.exponent < -64);
    }
}
