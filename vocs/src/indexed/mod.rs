mod palette;

use crate::{Error, Result};
use crate::packed::PackedArray;
use crate::position::Dimensions;
use bit_vec::BitVec;
use log::{debug, warn};
use std::fmt::Debug;
use std::hash::Hash;

pub use self::palette::Palette;

pub trait Target: Eq + Hash + Clone + Debug {}
impl<T> Target for T where T: Eq + Hash + Clone + Debug {}

/// A dense box of voxels, each holding an index into a palette.
///
/// Palette index 0 always holds the sentinel value that represents an empty voxel. Setting
/// voxels may leave unreferenced or duplicate palette entries behind until the next
/// `compact`, which `to_packed` always runs first.
#[derive(Debug, Clone)]
pub struct IndexedVolume<B> where B: Target {
	dimensions: Dimensions,
	cells: Box<[u32]>,
	palette: Palette<B>,
	sentinel: B
}

impl<B> IndexedVolume<B> where B: Target {
	/// Creates a volume filled with the sentinel.
	pub fn new(dimensions: Dimensions, sentinel: B) -> Self {
		IndexedVolume {
			dimensions,
			cells: vec![0; dimensions.volume()].into_boxed_slice(),
			palette: Palette::new(sentinel.clone()),
			sentinel
		}
	}

	/// Loads a volume from packed palette indices in YZX order.
	pub fn from_packed(dimensions: Dimensions, sentinel: B, palette: Palette<B>, packed: &PackedArray) -> Result<Self> {
		if packed.len() != dimensions.volume() {
			return Err(Error::LengthMismatch { expected: dimensions.volume(), actual: packed.len() });
		}

		let len = palette.len();
		let mut cells = Vec::with_capacity(packed.len());

		for index in packed {
			if index >= len as u64 {
				return Err(Error::PaletteIndex { index, len });
			}

			cells.push(index as u32);
		}

		let mut volume = IndexedVolume {
			dimensions,
			cells: cells.into_boxed_slice(),
			palette,
			sentinel
		};

		if volume.palette.get(0) != Some(&volume.sentinel) {
			warn!("Palette index 0 holds {:?} instead of {:?}, moving it to the end", volume.palette.get(0), volume.sentinel);

			volume.restore_sentinel()?;
		}

		Ok(volume)
	}

	pub fn dimensions(&self) -> Dimensions {
		self.dimensions
	}

	pub fn volume(&self) -> usize {
		self.dimensions.volume()
	}

	pub fn palette(&self) -> &Palette<B> {
		&self.palette
	}

	pub fn sentinel(&self) -> &B {
		&self.sentinel
	}

	/// Raw palette indices in YZX order.
	pub fn cells(&self) -> &[u32] {
		&self.cells
	}

	fn index(&self, x: usize, y: usize, z: usize) -> Result<usize> {
		self.dimensions.index(x, y, z).ok_or(Error::OutOfBounds { x, y, z })
	}

	fn entry(&self, index: u32) -> Result<&B> {
		self.palette.get(index).ok_or(Error::PaletteIndex { index: index as u64, len: self.palette.len() })
	}

	pub fn get(&self, x: usize, y: usize, z: usize) -> Result<&B> {
		let index = self.index(x, y, z)?;

		self.entry(self.cells[index])
	}

	pub fn get_index(&self, x: usize, y: usize, z: usize) -> Result<u32> {
		Ok(self.cells[self.index(x, y, z)?])
	}

	/// Sets a voxel, adding the target to the palette if it is not there yet.
	pub fn set(&mut self, x: usize, y: usize, z: usize, target: &B) -> Result<()> {
		let index = self.index(x, y, z)?;

		let association = match self.palette.index_of(target) {
			Some(association) => association,
			None => self.palette.append(target.clone())
		};

		self.cells[index] = association;

		Ok(())
	}

	/// Sets a voxel to a raw palette index, which must already exist.
	pub fn set_index(&mut self, x: usize, y: usize, z: usize, association: u32) -> Result<()> {
		let index = self.index(x, y, z)?;

		self.entry(association)?;
		self.cells[index] = association;

		Ok(())
	}

	/// Flags every palette entry equal to `target`.
	fn matching(&self, target: &B) -> Vec<bool> {
		self.palette.entries().iter().map(|entry| entry == target).collect()
	}

	/// Counts voxels that do not hold the sentinel.
	pub fn count(&self) -> usize {
		let empty = self.matching(&self.sentinel);

		self.cells.iter().filter(|&&cell| !empty[cell as usize]).count()
	}

	/// Returns true if at least one voxel holds the target.
	pub fn contains(&self, target: &B) -> bool {
		let matching = self.matching(target);

		if !matching.iter().any(|&flag| flag) {
			return false;
		}

		self.cells.iter().any(|&cell| matching[cell as usize])
	}

	/// Applies `f` to every palette entry once, so that each voxel ends up holding `f` of its
	/// previous value. The palette is compacted afterwards.
	pub fn filter<F>(&mut self, f: F) -> Result<()> where F: FnMut(&B) -> B {
		self.palette.map(f);

		if self.palette.get(0) != Some(&self.sentinel) {
			self.restore_sentinel()?;
		}

		self.compact();

		Ok(())
	}

	/// Moves whatever is in palette slot 0 to a new slot at the end, together with every voxel
	/// referencing it, then puts the sentinel back into slot 0.
	fn restore_sentinel(&mut self) -> Result<()> {
		let displaced = self.palette.replace(0, self.sentinel.clone())?;
		let tail = self.palette.append(displaced);

		self.remap_default(tail);

		Ok(())
	}

	fn remap_default(&mut self, association: u32) {
		for cell in self.cells.iter_mut() {
			if *cell == 0 {
				*cell = association;
			}
		}
	}

	/// Replaces every occurrence of `old` with `new`. Unused palette entries are left for the
	/// next `compact`.
	pub fn replace(&mut self, old: &B, new: B) -> Result<()> {
		let slots: Vec<u32> = self.palette.entries().iter()
			.enumerate()
			.filter(|(_, entry)| *entry == old)
			.map(|(index, _)| index as u32)
			.collect();

		for &slot in &slots {
			if slot != 0 {
				self.palette.replace(slot, new.clone())?;
			}
		}

		if slots.first() == Some(&0) && new != self.sentinel {
			let association = match self.palette.index_of(&new) {
				Some(association) if association != 0 => association,
				_ => self.palette.append(new)
			};

			self.remap_default(association);
		}

		Ok(())
	}

	/// Drops unreferenced palette entries and merges duplicates. Running it twice in a row
	/// changes nothing the second time.
	pub fn compact(&mut self) {
		let mut referenced = BitVec::from_elem(self.palette.len(), false);

		for &cell in self.cells.iter() {
			referenced.set(cell as usize, true);
		}

		let before = self.palette.len();
		let mapping = self.palette.compact(&referenced);

		if self.palette.len() != before {
			debug!("Compacted palette from {} to {} entries", before, self.palette.len());

			for cell in self.cells.iter_mut() {
				*cell = mapping[*cell as usize];
			}
		}
	}

	/// Compacts the palette, then packs every voxel index in YZX order using the fewest bits
	/// the palette allows.
	pub fn to_packed(&mut self) -> Result<PackedArray> {
		self.compact();

		let mut packed = PackedArray::new(self.volume(), self.palette.needed_bits())?;

		for (index, &cell) in self.cells.iter().enumerate() {
			packed.set(index, cell as u64)?;
		}

		Ok(packed)
	}

	/// Iterates over every voxel in YZX order.
	pub fn iter(&self) -> impl Iterator<Item = ((usize, usize, usize), &B)> {
		let entries = self.palette.entries();

		self.dimensions.positions().zip(self.cells.iter()).map(move |(position, &cell)| (position, &entries[cell as usize]))
	}
}
