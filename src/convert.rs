//! Byte-level bridges between the 256-bit word type and the wider accumulator
//! ADDMOD/MULMOD need. Implemented as manual big-endian round trips rather than
//! relying on an inter-crate `From`/`TryFrom` impl, so correctness doesn't hinge
//! on unconfirmed conversions between `U256` and `U512`.

use ethereum_types::{U256, U512};

pub fn widen(v: U256) -> U512 {
    let mut narrow = [0u8; 32];
    v.to_big_endian(&mut narrow);
    let mut wide = [0u8; 64];
    wide[32..].copy_from_slice(&narrow);
    U512::from_big_endian(&wide)
}

/// Truncates to the low 256 bits. Callers must ensure the value already fits
/// (e.g. it is the result of a reduction mod a `U256`), since high bits are
/// silently dropped rather than checked.
pub fn narrow(v: U512) -> U256 {
    let mut wide = [0u8; 64];
    v.to_big_endian(&mut wide);
    U256::from_big_endian(&wide[32..])
}

pub fn is_negative(v: U256) -> bool {
    v.bit(255)
}

/// Two's-complement negation within 256 bits.
pub fn negate(v: U256) -> U256 {
    (!v).overflowing_add(U256::one()).0
}

/// Magnitude of a two's-complement signed word, as an unsigned word.
pub fn abs(v: U256) -> U256 {
    if is_negative(v) {
        negate(v)
    } else {
        v
    }
}

/// `(a + b) mod m` computed without 256-bit overflow. Caller guarantees `m != 0`.
pub fn addmod_wide(a: U256, b: U256, m: U256) -> U256 {
    let sum = widen(a) + widen(b);
    narrow(sum % widen(m))
}

/// `(a * b) mod m` computed without 256-bit overflow. Caller guarantees `m != 0`.
pub fn mulmod_wide(a: U256, b: U256, m: U256) -> U256 {
    let product = widen(a) * widen(b);
    narrow(product % widen(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_narrow_roundtrip() {
        let v = U256::from(123456789u64);
        assert_eq!(narrow(widen(v)), v);
    }

    #[test]
    fn negate_is_involution() {
        let v = U256::from(42u64);
        assert_eq!(negate(negate(v)), v);
    }

    #[test]
    fn abs_of_min_i256_is_itself() {
        let min_i256 = U256::one() << 255;
        assert_eq!(abs(min_i256), min_i256);
    }
}
