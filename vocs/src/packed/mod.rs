mod internal;

pub use self::internal::{Iter, PackedArray};

/// Number of 64 bit words needed to store `len` entries of `bits` bits each, if representable.
pub fn word_count(len: usize, bits: u8) -> Option<usize> {
	let total = len.checked_mul(bits as usize)?;

	Some(total / 64 + (total % 64 != 0) as usize)
}
