//! Overflow-aware 16 and 32 bit arithmetic over little-endian byte buffers.
//!
//! The AM9511's operand stack holds raw bytes, so every routine here takes
//! and returns little-endian byte arrays rather than native words. Add and
//! subtract report the raw carry/borrow; signed overflow is a separate
//! predicate over the sign bits of both operands and the result, evaluated
//! after the fact. The 32-bit forms are composed from two 16-bit halves
//! with explicit carry propagation, and the multipliers are built up from
//! 8x8 partial products in the classic long-multiplication layout.

/// Add two 16-bit values, returning the sum and the raw carry out of bit 15.
#[must_use]
pub fn add16(a: [u8; 2], b: [u8; 2]) -> ([u8; 2], bool) {
    let (c, carry) = u16::from_le_bytes(a).overflowing_add(u16::from_le_bytes(b));
    (c.to_le_bytes(), carry)
}

/// Add two 32-bit values, returning the sum and the carry out of bit 31.
///
/// Composed from two 16-bit adds with the low carry folded into the high
/// half, never from a wider native word.
#[must_use]
pub fn add32(a: [u8; 4], b: [u8; 4]) -> ([u8; 4], bool) {
    const ONE: [u8; 2] = [0x01, 0x00];
    let (al, ah) = halves32(a);
    let (bl, bh) = halves32(b);

    let (lo, carry) = add16(al, bl);
    if !carry {
        let (hi, carry) = add16(ah, bh);
        return (cat32(lo, hi), carry);
    }

    let (t, c1) = add16(ONE, bh);
    let (hi, c2) = add16(t, ah);
    (cat32(lo, hi), c1 || c2)
}

/// Add two 64-bit values. Supports the 32x32->64 multiply.
fn add64(a: [u8; 8], b: [u8; 8]) -> ([u8; 8], bool) {
    const ONE: [u8; 4] = [0x01, 0x00, 0x00, 0x00];
    let (al, ah) = halves64(a);
    let (bl, bh) = halves64(b);

    let (lo, carry) = add32(al, bl);
    if !carry {
        let (hi, carry) = add32(ah, bh);
        return (cat64(lo, hi), carry);
    }

    let (t, c1) = add32(ONE, bh);
    let (hi, c2) = add32(t, ah);
    (cat64(lo, hi), c1 || c2)
}

/// Subtract b from a (16-bit), returning the difference and the borrow.
///
/// A minuend of 0x8000 always reports a borrow, matching the device.
#[must_use]
pub fn sub16(a: [u8; 2], b: [u8; 2]) -> ([u8; 2], bool) {
    let a16 = u16::from_le_bytes(a);
    let b16 = u16::from_le_bytes(b);
    let c = a16.wrapping_sub(b16);
    let carry = a16 == 0x8000 || a16 < b16;
    (c.to_le_bytes(), carry)
}

/// Subtract b from a (32-bit), returning the difference and the borrow.
#[must_use]
pub fn sub32(a: [u8; 4], b: [u8; 4]) -> ([u8; 4], bool) {
    const ONE: [u8; 2] = [0x01, 0x00];
    let (al, ah) = halves32(a);
    let (bl, bh) = halves32(b);

    let (lo, carry) = sub16(al, bl);
    if !carry {
        let (hi, carry) = sub16(ah, bh);
        return (cat32(lo, hi), carry);
    }

    let (t, c1) = sub16(ah, ONE);
    let (hi, c2) = sub16(t, bh);
    (cat32(lo, hi), c1 || c2)
}

/// Signed overflow predicate for a completed 16-bit add.
///
/// Overflow iff both operands share a sign and the result's sign differs.
/// Computed from the sign bits alone; a and b are the operands, c the sum.
#[must_use]
pub fn oadd16(a: [u8; 2], b: [u8; 2], c: [u8; 2]) -> bool {
    let sa = a[1] & 0x80;
    let sb = b[1] & 0x80;
    let sc = c[1] & 0x80;
    sa == sb && sa != sc
}

/// Signed overflow predicate for a completed 32-bit add.
#[must_use]
pub fn oadd32(a: [u8; 4], b: [u8; 4], c: [u8; 4]) -> bool {
    let sa = a[3] & 0x80;
    let sb = b[3] & 0x80;
    let sc = c[3] & 0x80;
    sa == sb && sa != sc
}

/// Signed overflow predicate for a completed 16-bit subtract (a - b = c).
///
/// Overflow iff the operand signs differ and the result's sign matches
/// the subtrahend's.
#[must_use]
pub fn osub16(a: [u8; 2], b: [u8; 2], c: [u8; 2]) -> bool {
    let sa = a[1] & 0x80;
    let sb = b[1] & 0x80;
    let sc = c[1] & 0x80;
    sa != sb && sb == sc
}

/// Signed overflow predicate for a completed 32-bit subtract.
#[must_use]
pub fn osub32(a: [u8; 4], b: [u8; 4], c: [u8; 4]) -> bool {
    let sa = a[3] & 0x80;
    let sb = b[3] & 0x80;
    let sc = c[3] & 0x80;
    sa != sb && sb == sc
}

/// 16-bit two's-complement negate.
///
/// 0x8000 has no positive counterpart: it is returned unchanged with the
/// overflow flag set.
#[must_use]
pub fn cm16(a: [u8; 2]) -> ([u8; 2], bool) {
    let v = u16::from_le_bytes(a);
    if v == 0x8000 {
        return (a, true);
    }
    (v.wrapping_neg().to_le_bytes(), false)
}

/// 32-bit two's-complement negate; 0x8000_0000 is returned unchanged with
/// the overflow flag set.
#[must_use]
pub fn cm32(a: [u8; 4]) -> ([u8; 4], bool) {
    let lo = u16::from_le_bytes([a[0], a[1]]);
    let hi = u16::from_le_bytes([a[2], a[3]]);
    if lo == 0 && hi == 0x8000 {
        return (a, true);
    }
    let (nlo, carry) = (!lo).overflowing_add(1);
    let nhi = if carry { (!hi).wrapping_add(1) } else { !hi };
    (cat32(nlo.to_le_bytes(), nhi.to_le_bytes()), false)
}

/// Exact 8x8->16 multiply, the primitive every wider multiply is built on.
#[must_use]
pub fn mul8(m: u8, n: u8) -> u16 {
    u16::from(m) * u16::from(n)
}

/// Unsigned 16x16->32 multiply from four 8x8 partial products.
///
/// ```text
///                                  [mHigh mLow]
///                                * [nHigh nLow]
///                                  ------------
///                  [mHigh * nLow] [mLow * nLow]
/// + [mHigh * nHigh] [mLow * nHigh]
///   -------------------------------------------
/// ```
#[must_use]
pub fn mul16(m: [u8; 2], n: [u8; 2]) -> [u8; 4] {
    let ll = mul8(m[0], n[0]);
    let hl = mul8(m[1], n[0]);
    let lh = mul8(m[0], n[1]);
    let hh = mul8(m[1], n[1]);

    // Low partial sits at byte 0.
    let mut r = [0u8; 4];
    r[0] = ll as u8;
    r[1] = (ll >> 8) as u8;

    // Middle partials overlap at byte 1; their carry lands in the top half.
    let (mid, carry) = add16(hl.to_le_bytes(), lh.to_le_bytes());
    let mut r2 = [0u8; 4];
    r2[1] = mid[0];
    r2[2] = mid[1];

    let top = hh + u16::from(carry);
    let mut r3 = [0u8; 4];
    r3[2] = top as u8;
    r3[3] = (top >> 8) as u8;

    let (r, _) = add32(r, r2);
    let (r, _) = add32(r, r3);
    r
}

/// Unsigned 32x32->64 multiply from four 16x16 partials at staggered
/// offsets, summed with explicit 64-bit carry propagation.
#[must_use]
pub fn mul32(a: [u8; 4], b: [u8; 4]) -> [u8; 8] {
    let (al, ah) = halves32(a);
    let (bl, bh) = halves32(b);

    let mut r0 = [0u8; 8];
    let mut r1 = [0u8; 8];
    let mut r2 = [0u8; 8];
    let mut r3 = [0u8; 8];
    r0[0..4].copy_from_slice(&mul16(bl, al));
    r1[2..6].copy_from_slice(&mul16(bl, ah));
    r2[2..6].copy_from_slice(&mul16(bh, al));
    r3[4..8].copy_from_slice(&mul16(bh, ah));

    let (r, _) = add64(r0, r1);
    let (r, _) = add64(r, r2);
    let (r, _) = add64(r, r3);
    r
}

/// Signed 16-bit multiply keeping the low product half.
///
/// Overflow when the discarded high half is non-zero. Either operand being
/// 0x8000 short-circuits to (0x8000, overflow).
#[must_use]
pub fn mull16(a: [u8; 2], b: [u8; 2]) -> ([u8; 2], bool) {
    if a == [0x00, 0x80] || b == [0x00, 0x80] {
        return ([0x00, 0x80], true);
    }
    let r = mul16(a, b);
    ([r[0], r[1]], r[2] | r[3] != 0)
}

/// Signed 16-bit multiply keeping the high product half. Never overflows,
/// except for the 0x8000 operand short-circuit.
#[must_use]
pub fn mulu16(a: [u8; 2], b: [u8; 2]) -> ([u8; 2], bool) {
    if a == [0x00, 0x80] || b == [0x00, 0x80] {
        return ([0x00, 0x80], true);
    }
    let r = mul16(a, b);
    ([r[2], r[3]], false)
}

/// Signed 32-bit multiply keeping the low product half.
#[must_use]
pub fn mull32(a: [u8; 4], b: [u8; 4]) -> ([u8; 4], bool) {
    const MOST_NEG: [u8; 4] = [0x00, 0x00, 0x00, 0x80];
    if a == MOST_NEG || b == MOST_NEG {
        return (MOST_NEG, true);
    }
    let r = mul32(a, b);
    let overflow = r[4] | r[5] | r[6] | r[7] != 0;
    ([r[0], r[1], r[2], r[3]], overflow)
}

/// Signed 32-bit multiply keeping the high product half.
#[must_use]
pub fn mulu32(a: [u8; 4], b: [u8; 4]) -> ([u8; 4], bool) {
    const MOST_NEG: [u8; 4] = [0x00, 0x00, 0x00, 0x80];
    if a == MOST_NEG || b == MOST_NEG {
        return (MOST_NEG, true);
    }
    let r = mul32(a, b);
    ([r[4], r[5], r[6], r[7]], false)
}

/// Truncating signed 16-bit division. Returns None (writing nothing) for a
/// zero divisor; most-negative / -1 wraps.
#[must_use]
pub fn div16(a: [u8; 2], b: [u8; 2]) -> Option<[u8; 2]> {
    let divisor = i16::from_le_bytes(b);
    if divisor == 0 {
        return None;
    }
    Some(i16::from_le_bytes(a).wrapping_div(divisor).to_le_bytes())
}

/// Truncating signed 32-bit division. Returns None for a zero divisor.
#[must_use]
pub fn div32(a: [u8; 4], b: [u8; 4]) -> Option<[u8; 4]> {
    let divisor = i32::from_le_bytes(b);
    if divisor == 0 {
        return None;
    }
    Some(i32::from_le_bytes(a).wrapping_div(divisor).to_le_bytes())
}

fn halves32(a: [u8; 4]) -> ([u8; 2], [u8; 2]) {
    ([a[0], a[1]], [a[2], a[3]])
}

fn cat32(lo: [u8; 2], hi: [u8; 2]) -> [u8; 4] {
    [lo[0], lo[1], hi[0], hi[1]]
}

fn halves64(a: [u8; 8]) -> ([u8; 4], [u8; 4]) {
    ([a[0], a[1], a[2], a[3]], [a[4], a[5], a[6], a[7]])
}

fn cat64(lo: [u8; 4], hi: [u8; 4]) -> [u8; 8] {
    [lo[0], lo[1], lo[2], lo[3], hi[0], hi[1], hi[2], hi[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le16(v: i16) -> [u8; 2] {
        v.to_le_bytes()
    }

    fn le32(v: i32) -> [u8; 4] {
        v.to_le_bytes()
    }

    #[test]
    fn add16_carry_and_overflow_are_independent() {
        // 0x7FFF + 0x7FFF: signed overflow, no unsigned carry
        let (c, carry) = add16(le16(0x7FFF), le16(0x7FFF));
        assert_eq!(c, [0xFE, 0xFF]);
        assert!(!carry);
        assert!(oadd16(le16(0x7FFF), le16(0x7FFF), c));

        // 0xFFFF + 0x0001: unsigned carry, no signed overflow (-1 + 1 = 0)
        let (c, carry) = add16([0xFF, 0xFF], le16(1));
        assert_eq!(c, [0x00, 0x00]);
        assert!(carry);
        assert!(!oadd16([0xFF, 0xFF], le16(1), c));

        // 1 + 1: neither
        let (c, carry) = add16(le16(1), le16(1));
        assert_eq!(c, le16(2));
        assert!(!carry);
        assert!(!oadd16(le16(1), le16(1), c));
    }

    #[test]
    fn add16_negative_overflow() {
        let (c, _) = add16(le16(-0x8000), le16(-1));
        assert!(oadd16(le16(-0x8000), le16(-1), c));
    }

    #[test]
    fn add32_carry_ripples_between_halves() {
        // Low halves carry into the high halves
        let (c, carry) = add32(le32(0x0000_FFFF), le32(0x0000_0001));
        assert_eq!(c, le32(0x0001_0000));
        assert!(!carry);

        let (c, carry) = add32([0xFF; 4], le32(1));
        assert_eq!(c, le32(0));
        assert!(carry);
    }

    #[test]
    fn add32_matches_wide_arithmetic() {
        let cases = [
            (0x1234_5678i32, 0x0EDC_BA98),
            (-5, 3),
            (i32::MAX, 1),
            (i32::MIN, -1),
        ];
        for (a, b) in cases {
            let (c, carry) = add32(le32(a), le32(b));
            let wide = u64::from(a as u32) + u64::from(b as u32);
            assert_eq!(c, le32(a.wrapping_add(b)), "sum for {a:#x} + {b:#x}");
            assert_eq!(carry, wide > u64::from(u32::MAX), "carry for {a:#x} + {b:#x}");
        }
    }

    #[test]
    fn sub16_borrow() {
        let (c, borrow) = sub16(le16(1), le16(2));
        assert_eq!(c, [0xFF, 0xFF]);
        assert!(borrow);

        let (c, borrow) = sub16(le16(5), le16(3));
        assert_eq!(c, le16(2));
        assert!(!borrow);
    }

    #[test]
    fn sub16_most_negative_minuend_reports_borrow() {
        let (c, borrow) = sub16([0x00, 0x80], le16(0));
        assert_eq!(c, [0x00, 0x80]);
        assert!(borrow);
    }

    #[test]
    fn osub16_sign_rule() {
        // 0x7FFF - (-1) = 0x8000: positive minus negative gives negative
        let (c, _) = sub16(le16(0x7FFF), le16(-1));
        assert_eq!(c, [0x00, 0x80]);
        assert!(osub16(le16(0x7FFF), le16(-1), c));

        let (c, _) = sub16(le16(5), le16(3));
        assert!(!osub16(le16(5), le16(3), c));
    }

    #[test]
    fn sub32_matches_wide_arithmetic() {
        for (a, b) in [(7i32, 9), (0x0001_0000, 1), (-1, i32::MAX), (0, 0)] {
            let (c, _) = sub32(le32(a), le32(b));
            assert_eq!(c, le32(a.wrapping_sub(b)), "difference for {a:#x} - {b:#x}");
        }
    }

    #[test]
    fn cm16_negates_and_flags_most_negative() {
        let (c, ovf) = cm16(le16(5));
        assert_eq!(c, le16(-5));
        assert!(!ovf);

        let (c, ovf) = cm16(le16(-5));
        assert_eq!(c, le16(5));
        assert!(!ovf);

        let (c, ovf) = cm16([0x00, 0x80]);
        assert_eq!(c, [0x00, 0x80]);
        assert!(ovf);
    }

    #[test]
    fn cm32_negates_and_flags_most_negative() {
        let (c, ovf) = cm32(le32(0x1234_5678));
        assert_eq!(c, le32(-0x1234_5678));
        assert!(!ovf);

        let (c, ovf) = cm32([0x00, 0x00, 0x00, 0x80]);
        assert_eq!(c, [0x00, 0x00, 0x00, 0x80]);
        assert!(ovf);
    }

    #[test]
    fn mul16_matches_native() {
        for (a, b) in [(0u16, 0u16), (1, 1), (0xFF, 0xFF), (0xFFFF, 0xFFFF), (300, 7000)] {
            let r = mul16(a.to_le_bytes(), b.to_le_bytes());
            let wide = u32::from(a) * u32::from(b);
            assert_eq!(r, wide.to_le_bytes(), "{a} * {b}");
        }
    }

    #[test]
    fn mul32_matches_native() {
        for (a, b) in [
            (0u32, 0u32),
            (0xFFFF_FFFF, 0xFFFF_FFFF),
            (0x1234_5678, 0x9ABC_DEF0),
            (65537, 65537),
        ] {
            let r = mul32(a.to_le_bytes(), b.to_le_bytes());
            let wide = u64::from(a) * u64::from(b);
            assert_eq!(r, wide.to_le_bytes(), "{a:#x} * {b:#x}");
        }
    }

    #[test]
    fn mull16_low_half_and_overflow() {
        let (r, ovf) = mull16(le16(3), le16(4));
        assert_eq!(r, le16(12));
        assert!(!ovf);

        // 0x100 * 0x100 = 0x10000: low half zero, high half non-zero
        let (r, ovf) = mull16(le16(0x100), le16(0x100));
        assert_eq!(r, le16(0));
        assert!(ovf);

        let (r, ovf) = mull16([0x00, 0x80], le16(1));
        assert_eq!(r, [0x00, 0x80]);
        assert!(ovf);
    }

    #[test]
    fn mulu16_high_half_never_overflows() {
        let (r, ovf) = mulu16(le16(0x100), le16(0x100));
        assert_eq!(r, le16(1));
        assert!(!ovf);

        let (r, ovf) = mulu16(le16(3), le16(4));
        assert_eq!(r, le16(0));
        assert!(!ovf);
    }

    #[test]
    fn mull32_and_mulu32() {
        let (r, ovf) = mull32(le32(0x10000), le32(0x10000));
        assert_eq!(r, le32(0));
        assert!(ovf);

        let (r, ovf) = mulu32(le32(0x10000), le32(0x10000));
        assert_eq!(r, le32(1));
        assert!(!ovf);

        let (r, ovf) = mull32([0x00, 0x00, 0x00, 0x80], le32(2));
        assert_eq!(r, [0x00, 0x00, 0x00, 0x80]);
        assert!(ovf);
    }

    #[test]
    fn div16_truncates_toward_zero() {
        assert_eq!(div16(le16(7), le16(2)), Some(le16(3)));
        assert_eq!(div16(le16(-7), le16(2)), Some(le16(-3)));
        assert_eq!(div16(le16(7), le16(-2)), Some(le16(-3)));
    }

    #[test]
    fn div16_zero_divisor() {
        assert_eq!(div16(le16(7), le16(0)), None);
    }

    #[test]
    fn div32_zero_divisor_and_wrap() {
        assert_eq!(div32(le32(100), le32(0)), None);
        assert_eq!(div32(le32(100), le32(-10)), Some(le32(-10)));
        // Most negative / -1 wraps rather than trapping
        assert_eq!(
            div32([0x00, 0x00, 0x00, 0x80], le32(-1)),
            Some([0x00, 0x00, 0x00, 0x80])
        );
    }
}
