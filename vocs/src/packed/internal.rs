use crate::{Error, Result};
use crate::packed::word_count;

struct Indices {
	start: usize,
	end: usize
}

/// A fixed length array of unsigned integers that are all `bits` wide, packed back to back
/// into 64 bit words. Entries are stored little endian within each word, and an entry may
/// straddle two adjacent words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArray {
	words: Box<[u64]>,
	len: usize,
	bits: u8
}

impl PackedArray {
	/// Creates a zeroed array of `len` entries.
	pub fn new(len: usize, bits: u8) -> Result<Self> {
		let count = Self::checked_word_count(len, bits)?;

		Ok(PackedArray {
			words: vec![0; count].into_boxed_slice(),
			len,
			bits
		})
	}

	/// Loads an array from serialized signed words. The number of words must match the
	/// number needed for `len` entries exactly.
	pub fn from_words(words: &[i64], len: usize, bits: u8) -> Result<Self> {
		let expected = Self::checked_word_count(len, bits)?;

		if words.len() != expected {
			return Err(Error::WordCount { expected, actual: words.len() });
		}

		Ok(PackedArray {
			words: words.iter().map(|&word| word as u64).collect(),
			len,
			bits
		})
	}

	fn checked_word_count(len: usize, bits: u8) -> Result<usize> {
		if bits == 0 || bits > 64 {
			return Err(Error::InvalidBits(bits));
		}

		word_count(len, bits).ok_or(Error::CapacityOverflow { len, bits })
	}

	/// Reinterprets every word as signed, the way they are stored in NBT long arrays.
	pub fn to_words(&self) -> Vec<i64> {
		self.words.iter().map(|&word| word as i64).collect()
	}

	fn mask(&self) -> u64 {
		if self.bits == 64 {
			u64::MAX
		} else {
			(1u64 << self.bits) - 1
		}
	}

	fn indices(&self, index: usize) -> (Indices, u32) {
		let bits = self.bits as usize;

		let bit_index = index * bits;
		// Calculate the indices to the u64 array.
		let start = bit_index / 64;
		let end = ((bit_index + bits) - 1) / 64;
		let sub_index = (bit_index % 64) as u32;

		(Indices { start, end }, sub_index)
	}

	fn check_index(&self, index: usize) -> Result<()> {
		if index >= self.len {
			Err(Error::IndexOutOfRange { index, len: self.len })
		} else {
			Ok(())
		}
	}

	pub fn get(&self, index: usize) -> Result<u64> {
		self.check_index(index)?;

		Ok(self.get_unchecked(index))
	}

	fn get_unchecked(&self, index: usize) -> u64 {
		let (indices, sub_index) = self.indices(index);

		let mut raw = self.words[indices.start] >> sub_index;

		// Straddling implies sub_index > 0, so the shift below stays under 64.
		if indices.start != indices.end {
			raw |= self.words[indices.end] << (64 - sub_index);
		}

		raw & self.mask()
	}

	pub fn set(&mut self, index: usize, value: u64) -> Result<()> {
		self.check_index(index)?;

		let bitmask = self.mask();

		if value > bitmask {
			return Err(Error::ValueOutOfRange { value, bits: self.bits });
		}

		let (indices, sub_index) = self.indices(index);

		self.words[indices.start] = self.words[indices.start] & !(bitmask << sub_index) | value << sub_index;

		if indices.start != indices.end {
			// The high word holds the top `bits - (64 - sub_index)` bits of the value.
			let low_bits = 64 - sub_index;
			let high_mask = bitmask >> low_bits;

			self.words[indices.end] = self.words[indices.end] & !high_mask | value >> low_bits;
		}

		Ok(())
	}

	/// Returns true if any entry equals `value`.
	pub fn contains(&self, value: u64) -> bool {
		self.iter().any(|entry| entry == value)
	}

	pub fn iter(&self) -> Iter {
		Iter { array: self, index: 0 }
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn bits(&self) -> u8 {
		self.bits
	}

	pub fn raw_storage(&self) -> &[u64] {
		&self.words
	}
}

pub struct Iter<'a> {
	array: &'a PackedArray,
	index: usize
}

impl<'a> Iterator for Iter<'a> {
	type Item = u64;

	fn next(&mut self) -> Option<u64> {
		if self.index >= self.array.len {
			return None;
		}

		let value = self.array.get_unchecked(self.index);
		self.index += 1;

		Some(value)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.array.len - self.index;

		(remaining, Some(remaining))
	}
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> IntoIterator for &'a PackedArray {
	type Item = u64;
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Iter<'a> {
		self.iter()
	}
}
