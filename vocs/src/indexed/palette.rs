use crate::{Error, Result};
use crate::indexed::Target;
use bit_vec::BitVec;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::mem;

/// An ordered list of distinct-ish values, with a reverse map for constant time lookups.
///
/// Some operations, such as `append` and `replace`, may leave duplicate entries behind.
/// The reverse map always points at the first occurrence of a value, and `compact` merges
/// duplicates back together.
#[derive(Debug, Clone)]
pub struct Palette<B> where B: Target {
	entries: Vec<B>,
	reverse: FxHashMap<B, u32>
}

impl<B> Palette<B> where B: Target {
	pub fn new(default: B) -> Self {
		let mut reverse = FxHashMap::default();
		reverse.insert(default.clone(), 0);

		Palette { entries: vec![default], reverse }
	}

	/// Creates a palette from a list of entries, such as one read from a file.
	pub fn from_entries(entries: Vec<B>) -> Result<Self> {
		if entries.is_empty() {
			return Err(Error::EmptyPalette);
		}

		let mut palette = Palette { entries, reverse: FxHashMap::default() };
		palette.rebuild_reverse();

		Ok(palette)
	}

	fn rebuild_reverse(&mut self) {
		self.reverse.clear();

		for (index, entry) in self.entries.iter().enumerate() {
			self.reverse.entry(entry.clone()).or_insert(index as u32);
		}
	}

	/// Gets the first index that holds the target.
	pub fn index_of(&self, target: &B) -> Option<u32> {
		self.reverse.get(target).copied()
	}

	/// Adds an entry to the end of the palette, without checking for an existing copy.
	pub fn append(&mut self, target: B) -> u32 {
		let index = self.entries.len() as u32;

		self.reverse.entry(target.clone()).or_insert(index);
		self.entries.push(target);

		index
	}

	pub fn get(&self, index: u32) -> Option<&B> {
		self.entries.get(index as usize)
	}

	pub fn entries(&self) -> &[B] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Overwrites the entry at `index` in place, returning the previous entry.
	pub fn replace(&mut self, index: u32, target: B) -> Result<B> {
		let len = self.entries.len();
		let slot = self.entries.get_mut(index as usize).ok_or(Error::PaletteIndex { index: index as u64, len })?;

		let old = mem::replace(slot, target.clone());

		if let Entry::Occupied(mut occupied) = self.reverse.entry(old.clone()) {
			if *occupied.get() == index {
				match self.entries.iter().position(|entry| *entry == old) {
					Some(other) => { occupied.insert(other as u32); },
					None => { occupied.remove(); }
				}
			}
		}

		match self.reverse.entry(target) {
			Entry::Occupied(mut occupied) => if *occupied.get() > index {
				occupied.insert(index);
			},
			Entry::Vacant(vacant) => { vacant.insert(index); }
		}

		Ok(old)
	}

	/// Transforms every entry exactly once, in order.
	pub fn map<F>(&mut self, mut f: F) where F: FnMut(&B) -> B {
		for entry in self.entries.iter_mut() {
			*entry = f(entry);
		}

		self.rebuild_reverse();
	}

	/// Rebuilds the palette from index 0 and every referenced entry, merging duplicates into
	/// their first occurrence. Returns a table mapping each old index to its new index.
	/// Unreferenced entries map to 0.
	pub fn compact(&mut self, referenced: &BitVec) -> Vec<u32> {
		let mut mapping = vec![0; self.entries.len()];
		let mut entries = Vec::with_capacity(self.entries.len());
		let mut reverse = FxHashMap::default();

		for (index, entry) in mem::take(&mut self.entries).into_iter().enumerate() {
			if index != 0 && !referenced.get(index).unwrap_or(false) {
				continue;
			}

			mapping[index] = match reverse.entry(entry) {
				Entry::Occupied(occupied) => *occupied.get(),
				Entry::Vacant(vacant) => {
					let new_index = entries.len() as u32;
					entries.push(vacant.key().clone());
					vacant.insert(new_index);

					new_index
				}
			};
		}

		self.entries = entries;
		self.reverse = reverse;

		mapping
	}

	/// Bits per entry needed to index every entry, never less than 2.
	pub fn needed_bits(&self) -> u8 {
		let len = self.entries.len();

		let bits = if len <= 1 {
			0
		} else {
			usize::BITS - (len - 1).leading_zeros()
		};

		bits.max(2) as u8
	}
}

#[cfg(test)]
mod test {
	use super::Palette;
	use crate::Error;
	use bit_vec::BitVec;

	#[test]
	fn test_needed_bits() {
		let mut palette = Palette::new(0u32);
		assert_eq!(palette.needed_bits(), 2);

		for value in 1..5 {
			palette.append(value);
		}

		// 5 entries
		assert_eq!(palette.needed_bits(), 3);

		for value in 5..8 {
			palette.append(value);
		}

		// 8 entries
		assert_eq!(palette.needed_bits(), 3);

		palette.append(8);
		assert_eq!(palette.needed_bits(), 4);
	}

	#[test]
	fn test_first_occurrence_wins() {
		let mut palette = Palette::from_entries(vec!['a', 'b', 'c', 'b']).unwrap();
		assert_eq!(palette.index_of(&'b'), Some(1));

		palette.replace(1, 'z').unwrap();
		assert_eq!(palette.index_of(&'b'), Some(3));
		assert_eq!(palette.index_of(&'z'), Some(1));

		palette.replace(0, 'c').unwrap();
		assert_eq!(palette.index_of(&'c'), Some(0));
		assert_eq!(palette.index_of(&'a'), None);
	}

	#[test]
	fn test_compact_merges_and_skips() {
		let mut palette = Palette::from_entries(vec!['a', 'b', 'c', 'b', 'd', 'a']).unwrap();

		let mut referenced = BitVec::from_elem(6, false);
		referenced.set(2, true);
		referenced.set(3, true);
		referenced.set(1, true);
		referenced.set(5, true);

		let mapping = palette.compact(&referenced);

		assert_eq!(palette.entries(), &['a', 'b', 'c']);
		assert_eq!(mapping, vec![0, 1, 2, 1, 0, 0]);
		assert_eq!(palette.index_of(&'d'), None);
	}

	#[test]
	fn test_compact_keeps_unreferenced_default() {
		let mut palette = Palette::from_entries(vec!['a', 'b']).unwrap();

		let mut referenced = BitVec::from_elem(2, false);
		referenced.set(1, true);

		assert_eq!(palette.compact(&referenced), vec![0, 1]);
		assert_eq!(palette.entries(), &['a', 'b']);
	}

	#[test]
	fn test_empty_palette() {
		assert_eq!(Palette::<u8>::from_entries(Vec::new()).err(), Some(Error::EmptyPalette));
		assert_eq!(Palette::new(1u8).replace(1, 2).err(), Some(Error::PaletteIndex { index: 1, len: 1 }));
	}
}
