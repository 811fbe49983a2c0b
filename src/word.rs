//! 256-bit word arithmetic. Every function here is total (no panics) and
//! matches the wrap-on-overflow, div-by-zero-is-zero semantics of the
//! machine; keeping them in one module means every opcode handler that
//! touches arithmetic goes through the same, single, well-tested path.

use crate::convert::{abs, addmod_wide, is_negative, mulmod_wide, negate};
use ethereum_types::U256;

pub fn add(a: U256, b: U256) -> U256 {
    a.overflowing_add(b).0
}

pub fn mul(a: U256, b: U256) -> U256 {
    a.overflowing_mul(b).0
}

pub fn sub(a: U256, b: U256) -> U256 {
    a.overflowing_sub(b).0
}

pub fn div(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a / b
    }
}

pub fn modulo(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a % b
    }
}

/// Smallest negative 256-bit two's-complement value, -2^255.
fn min_i256() -> U256 {
    U256::one() << 255
}

pub fn sdiv(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let min = min_i256();
    if a == min && b == U256::MAX {
        // -2^255 / -1 overflows back to -2^255 in two's-complement arithmetic.
        return min;
    }
    let neg = is_negative(a) != is_negative(b);
    let quotient = abs(a) / abs(b);
    if neg {
        negate(quotient)
    } else {
        quotient
    }
}

pub fn smod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let remainder = abs(a) % abs(b);
    if is_negative(a) {
        negate(remainder)
    } else {
        remainder
    }
}

pub fn addmod(a: U256, b: U256, m: U256) -> U256 {
    if m.is_zero() {
        U256::zero()
    } else {
        addmod_wide(a, b, m)
    }
}

pub fn mulmod(a: U256, b: U256, m: U256) -> U256 {
    if m.is_zero() {
        U256::zero()
    } else {
        mulmod_wide(a, b, m)
    }
}

pub fn exp(base: U256, exponent: U256) -> U256 {
    let mut result = U256::one();
    let mut base = base;
    let mut exponent = exponent;
    while !exponent.is_zero() {
        if exponent.bit(0) {
            result = mul(result, base);
        }
        base = mul(base, base);
        exponent >>= 1;
    }
    result
}

/// Number of significant bytes in `e`, i.e. `ceil(bits(e) / 8)`; 0 if `e` is zero.
pub fn exp_byte_len(e: U256) -> u64 {
    if e.is_zero() {
        0
    } else {
        ((e.bits() + 7) / 8) as u64
    }
}

pub fn signextend(k: U256, v: U256) -> U256 {
    if k >= U256::from(32u64) {
        return v;
    }
    let k = k.low_u32() as usize;
    let mut bytes = [0u8; 32];
    v.to_big_endian(&mut bytes);
    let sign_byte_index = 31 - k;
    let negative = bytes[sign_byte_index] & 0x80 != 0;
    let fill = if negative { 0xffu8 } else { 0x00u8 };
    for byte in bytes.iter_mut().take(sign_byte_index) {
        *byte = fill;
    }
    U256::from_big_endian(&bytes)
}

pub fn byte(index: U256, value: U256) -> U256 {
    if index >= U256::from(32u64) {
        return U256::zero();
    }
    let index = index.low_u32() as usize;
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    U256::from(bytes[index])
}

pub fn lt(a: U256, b: U256) -> U256 {
    bool_word(a < b)
}

pub fn gt(a: U256, b: U256) -> U256 {
    bool_word(a > b)
}

pub fn slt(a: U256, b: U256) -> U256 {
    bool_word(signed_cmp(a, b) == std::cmp::Ordering::Less)
}

pub fn sgt(a: U256, b: U256) -> U256 {
    bool_word(signed_cmp(a, b) == std::cmp::Ordering::Greater)
}

pub fn eq(a: U256, b: U256) -> U256 {
    bool_word(a == b)
}

pub fn is_zero(a: U256) -> U256 {
    bool_word(a.is_zero())
}

fn signed_cmp(a: U256, b: U256) -> std::cmp::Ordering {
    match (is_negative(a), is_negative(b)) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.cmp(&b),
    }
}

fn bool_word(b: bool) -> U256 {
    if b {
        U256::one()
    } else {
        U256::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_wraps_to_twos_complement() {
        assert_eq!(sub(U256::from(1u64), U256::from(2u64)), U256::MAX);
    }

    #[test]
    fn div_by_zero_is_zero() {
        assert_eq!(div(U256::from(5u64), U256::zero()), U256::zero());
    }

    #[test]
    fn div_mod_consistency() {
        let a = U256::from(17u64);
        let b = U256::from(5u64);
        assert_eq!(add(mul(div(a, b), b), modulo(a, b)), a);
    }

    #[test]
    fn sdiv_min_by_neg_one_does_not_panic() {
        let min = U256::one() << 255;
        assert_eq!(sdiv(min, U256::MAX), min);
    }

    #[test]
    fn addmod_avoids_256_bit_overflow() {
        // a + b overflows 256 bits, so naively computing add(a,b) then modulo
        // would lose the carry; addmod must use wider intermediate precision.
        // 2^256 mod 7 == 2 (2^3 == 1 mod 7, and 256 == 3*85 + 1), so
        // a == U256::MAX == 2^256 - 1 == 1 mod 7, and b == 10 == 3 mod 7.
        let a = U256::MAX;
        let b = U256::from(10u64);
        let m = U256::from(7u64);
        assert_eq!(addmod(a, b, m), U256::from(4u64));
    }

    #[test]
    fn mulmod_avoids_256_bit_overflow() {
        let a = U256::MAX;
        let b = U256::from(10u64);
        let m = U256::from(7u64);
        assert_eq!(mulmod(a, b, m), U256::from(3u64));
    }

    #[test]
    fn signextend_of_full_width_is_identity() {
        let v = U256::from(0x7fu64);
        assert_eq!(signextend(U256::from(31u64), v), v);
    }

    #[test]
    fn signextend_sets_high_bytes_when_negative() {
        let v = U256::from(0xffu64); // low byte 0xff, treated as -1 when k=0
        let result = signextend(U256::zero(), v);
        assert_eq!(result, U256::MAX);
    }

    #[test]
    fn byte_extracts_most_significant_first() {
        let v = U256::from(0x0102u64);
        assert_eq!(byte(U256::from(31u64), v), U256::from(0x02u64));
        assert_eq!(byte(U256::from(30u64), v), U256::from(0x01u64));
    }

    #[test]
    fn exp_byte_len_matches_byte_count() {
        assert_eq!(exp_byte_len(U256::zero()), 0);
        assert_eq!(exp_byte_len(U256::from(1u64)), 1);
        assert_eq!(exp_byte_len(U256::from(256u64)), 2);
    }
}
