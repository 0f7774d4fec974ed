//! Adapter between MSB-first canonical codes and the LSB-first bit stream.
//!
//! Canonical codes are numbered with their first bit in the most significant
//! position, while [`BitBuffer`](crate::bitstreams::BitBuffer) emits the least
//! significant bit first. Reversing a code within its own length before writing
//! it is the only place where the two conventions meet.

use num_traits::PrimInt;

/// Width in bits of `T`.
#[inline(always)]
fn width<T: PrimInt>() -> u32 {
    T::zero().count_zeros()
}

/// Reverses the lowest `bits` bits of `value`. Higher bits are dropped.
#[inline(always)]
pub fn invert_bits<T: PrimInt>(value: T, bits: u32) -> T {
    let width = width::<T>();
    assert!(bits <= width, "Cannot invert {} bits of a {}-bit integer", bits, width);

    if bits == 0 {
        return T::zero();
    }

    value.reverse_bits().unsigned_shr(width - bits)
}

/// Reverses every bit of `value`.
#[cfg(test)]
fn invert_all<T: PrimInt>(value: T) -> T {
    invert_bits(value, width::<T>())
}

#[test]
fn test_invert_palindrome_byte() {
    assert_eq!(invert_all(0x42u8), 0x42);
}

#[test]
fn test_invert_low_bits() {
    assert_eq!(invert_bits(0x42u8, 2), 0x01);
    assert_eq!(invert_bits(0b110u64, 1), 0);
    assert_eq!(invert_bits(0xFFu8, 0), 0);
}

#[test]
fn test_invert_words() {
    assert_eq!(invert_all(0xBEEFu16), 0xF77D);
    assert_eq!(invert_bits(0xC0FFEEu32, 24), 0x77FF03);
    assert_eq!(invert_bits(1u64, 64), 1 << 63);
}

#[test]
fn test_invert_is_involution() {
    for len in 1..=64 {
        let value = 0x9E37_79B9_7F4A_7C15u64 & (u64::MAX >> (64 - len));
        assert_eq!(invert_bits(invert_bits(value, len), len), value);
    }
}
