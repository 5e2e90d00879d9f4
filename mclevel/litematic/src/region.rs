use crate::block::{BlockState, AIR};
use crate::bounds::BoundingBox;
use crate::entity::Entity;
use crate::schematic::Schematic;
use crate::tile_entity::TileEntity;
use crate::{nbt, Error, Result};
use log::trace;
use nbt_turbo::writer::{CompoundWriter, Output};
use nbt_turbo::Compound;
use std::ops::RangeInclusive;
use vocs::indexed::{IndexedVolume, Palette};
use vocs::packed::PackedArray;
use vocs::position::Dimensions;

/// Lowest coordinate covered by an extent, relative to its origin.
fn own_min(extent: i32) -> i32 {
	if extent < 0 { extent + 1 } else { 0 }
}

/// Highest coordinate covered by an extent, relative to its origin.
fn own_max(extent: i32) -> i32 {
	if extent < 0 { 0 } else { extent - 1 }
}

/// A box of blocks placed in a schematic.
///
/// The region spans `width` by `height` by `length` blocks from its origin. A negative extent
/// grows the region towards negative coordinates instead, so the block at own coordinate 0
/// is always the corner at the origin. Coordinates passed to `get` and `set` are relative to
/// the origin, and range over `min_x()..=max_x()` and so on.
#[derive(Debug, Clone)]
pub struct Region {
	x: i32,
	y: i32,
	z: i32,
	width: i32,
	height: i32,
	length: i32,
	blocks: IndexedVolume<BlockState>,
	pub entities: Vec<Entity>,
	pub tile_entities: Vec<TileEntity>,
	/// Raw scheduled block updates, kept as is.
	pub block_ticks: Vec<Compound>,
	/// Raw scheduled fluid updates, kept as is.
	pub fluid_ticks: Vec<Compound>
}

impl Region {
	/// Creates a region filled with air.
	pub fn new(x: i32, y: i32, z: i32, width: i32, height: i32, length: i32) -> Result<Self> {
		let dimensions = Region::dimensions(x, y, z, width, height, length)?;

		Ok(Region::with_blocks(x, y, z, width, height, length, IndexedVolume::new(dimensions, AIR.clone())))
	}

	fn with_blocks(x: i32, y: i32, z: i32, width: i32, height: i32, length: i32, blocks: IndexedVolume<BlockState>) -> Self {
		Region {
			x, y, z,
			width, height, length,
			blocks,
			entities: Vec::new(),
			tile_entities: Vec::new(),
			block_ticks: Vec::new(),
			fluid_ticks: Vec::new()
		}
	}

	/// Checks that the extents are non-zero and that the whole region fits in `i32`
	/// schematic coordinates.
	fn dimensions(x: i32, y: i32, z: i32, width: i32, height: i32, length: i32) -> Result<Dimensions> {
		let invalid = || Error::InvalidDimension(width, height, length);

		if width == 0 || height == 0 || length == 0 {
			return Err(invalid());
		}

		for &(origin, extent) in &[(x, width), (y, height), (z, length)] {
			origin.checked_add(own_min(extent)).ok_or_else(invalid)?;
			origin.checked_add(own_max(extent)).ok_or_else(invalid)?;
		}

		let size = |extent: i32| extent.unsigned_abs() as usize;

		Dimensions::new(size(width), size(height), size(length)).map_err(|_| invalid())
	}

	pub fn x(&self) -> i32 {
		self.x
	}

	pub fn y(&self) -> i32 {
		self.y
	}

	pub fn z(&self) -> i32 {
		self.z
	}

	pub fn width(&self) -> i32 {
		self.width
	}

	pub fn height(&self) -> i32 {
		self.height
	}

	pub fn length(&self) -> i32 {
		self.length
	}

	/// Converts own coordinates to indices into the storage, where every axis starts at 0.
	pub fn storage_position(&self, x: i32, y: i32, z: i32) -> Result<(usize, usize, usize)> {
		let axis = |coordinate: i32, extent: i32| -> Option<usize> {
			let shifted = coordinate as i64 - own_min(extent) as i64;

			if shifted >= 0 && shifted < extent.unsigned_abs() as i64 {
				Some(shifted as usize)
			} else {
				None
			}
		};

		match (axis(x, self.width), axis(y, self.height), axis(z, self.length)) {
			(Some(x), Some(y), Some(z)) => Ok((x, y, z)),
			_ => Err(Error::OutOfBounds(x, y, z))
		}
	}

	pub fn get(&self, x: i32, y: i32, z: i32) -> Result<&BlockState> {
		let (x, y, z) = self.storage_position(x, y, z)?;

		Ok(self.blocks.get(x, y, z)?)
	}

	pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockState) -> Result<()> {
		let (x, y, z) = self.storage_position(x, y, z)?;

		Ok(self.blocks.set(x, y, z, &block)?)
	}

	/// Number of blocks that are not air.
	pub fn count(&self) -> usize {
		self.blocks.count()
	}

	pub fn volume(&self) -> usize {
		self.blocks.volume()
	}

	/// Returns true if at least one block of the region is in the given state.
	pub fn contains(&self, block: &BlockState) -> bool {
		self.blocks.contains(block)
	}

	pub fn palette(&self) -> &Palette<BlockState> {
		self.blocks.palette()
	}

	/// Palette indexed storage, with every axis starting at 0.
	pub fn storage(&self) -> &IndexedVolume<BlockState> {
		&self.blocks
	}

	/// Maps every distinct block state of the region through `f`. `f` is called once per
	/// palette entry, not once per block.
	pub fn filter<F>(&mut self, f: F) -> Result<()> where F: FnMut(&BlockState) -> BlockState {
		Ok(self.blocks.filter(f)?)
	}

	/// Replaces every block in the `old` state with `new`, including air.
	pub fn replace(&mut self, old: &BlockState, new: BlockState) -> Result<()> {
		Ok(self.blocks.replace(old, new)?)
	}

	/// Removes unused and duplicate palette entries.
	pub fn compact(&mut self) {
		self.blocks.compact()
	}

	pub fn min_x(&self) -> i32 {
		own_min(self.width)
	}

	pub fn max_x(&self) -> i32 {
		own_max(self.width)
	}

	pub fn min_y(&self) -> i32 {
		own_min(self.height)
	}

	pub fn max_y(&self) -> i32 {
		own_max(self.height)
	}

	pub fn min_z(&self) -> i32 {
		own_min(self.length)
	}

	pub fn max_z(&self) -> i32 {
		own_max(self.length)
	}

	// The constructor guarantees that these sums fit.

	pub fn min_schem_x(&self) -> i32 {
		self.x + self.min_x()
	}

	pub fn max_schem_x(&self) -> i32 {
		self.x + self.max_x()
	}

	pub fn min_schem_y(&self) -> i32 {
		self.y + self.min_y()
	}

	pub fn max_schem_y(&self) -> i32 {
		self.y + self.max_y()
	}

	pub fn min_schem_z(&self) -> i32 {
		self.z + self.min_z()
	}

	pub fn max_schem_z(&self) -> i32 {
		self.z + self.max_z()
	}

	pub fn x_range(&self) -> RangeInclusive<i32> {
		self.min_x()..=self.max_x()
	}

	pub fn y_range(&self) -> RangeInclusive<i32> {
		self.min_y()..=self.max_y()
	}

	pub fn z_range(&self) -> RangeInclusive<i32> {
		self.min_z()..=self.max_z()
	}

	/// Every own coordinate of the region, X outermost and Z innermost.
	pub fn positions(&self) -> impl Iterator<Item = (i32, i32, i32)> {
		let (y_range, z_range) = (self.y_range(), self.z_range());

		self.x_range().flat_map(move |x| {
			let z_range = z_range.clone();

			y_range.clone().flat_map(move |y| z_range.clone().map(move |z| (x, y, z)))
		})
	}

	/// The blocks covered by the region, in schematic coordinates.
	pub fn bounding_box(&self) -> BoundingBox {
		BoundingBox {
			min_x: self.min_schem_x(),
			min_y: self.min_schem_y(),
			min_z: self.min_schem_z(),
			max_x: self.max_schem_x(),
			max_y: self.max_schem_y(),
			max_z: self.max_schem_z()
		}
	}

	/// Wraps this region in a new schematic, stored under the schematic's name.
	pub fn into_schematic(self, name: &str, author: &str, description: &str) -> Result<Schematic> {
		let mut schematic = Schematic::new(name, author, description);
		schematic.insert_region(name, self)?;

		Ok(schematic)
	}

	/// Writes the region into the compound currently being written. The palette is compacted
	/// first, so that the block states use as few bits as possible.
	pub fn write(&mut self, writer: &mut CompoundWriter<impl Output>) -> Result<()> {
		let packed = self.blocks.to_packed()?;
		let palette = self.blocks.palette().entries();

		trace!("Writing a {}x{}x{} region with {} palette entries at {} bits per block", self.width, self.height, self.length, palette.len(), packed.bits());

		writer
			.compound("Position", |writer| { writer.i32("x", self.x).i32("y", self.y).i32("z", self.z); })
			.compound("Size", |writer| { writer.i32("x", self.width).i32("y", self.height).i32("z", self.length); })
			.compound_array("BlockStatePalette", palette.len(), |array| {
				for state in palette {
					array.compound(|writer| state.write(writer));
				}
			})
			.compounds("Entities", self.entities.iter().map(Entity::data))
			.compounds("TileEntities", self.tile_entities.iter().map(TileEntity::data))
			.compounds("PendingBlockTicks", &self.block_ticks)
			.compounds("PendingFluidTicks", &self.fluid_ticks)
			.i64_array("BlockStates", &packed.to_words());

		Ok(())
	}

	pub fn from_nbt(compound: &Compound) -> Result<Self> {
		let position = nbt::compound(compound, "Position")?;
		let size = nbt::compound(compound, "Size")?;

		let (x, y, z) = (nbt::i32(position, "x")?, nbt::i32(position, "y")?, nbt::i32(position, "z")?);
		let (width, height, length) = (nbt::i32(size, "x")?, nbt::i32(size, "y")?, nbt::i32(size, "z")?);

		let dimensions = Region::dimensions(x, y, z, width, height, length)?;

		let states = nbt::compounds(nbt::list(compound, "BlockStatePalette")?, "BlockStatePalette")?
			.into_iter()
			.map(BlockState::from_nbt)
			.collect::<Result<Vec<_>>>()?;

		let palette = Palette::from_entries(states)?;
		let packed = PackedArray::from_words(nbt::i64_array(compound, "BlockStates")?, dimensions.volume(), palette.needed_bits())?;

		trace!("Reading a {}x{}x{} region with {} palette entries at {} bits per block", width, height, length, palette.len(), packed.bits());

		let blocks = IndexedVolume::from_packed(dimensions, AIR.clone(), palette, &packed)?;
		let mut region = Region::with_blocks(x, y, z, width, height, length, blocks);

		for entity in nbt::optional_compounds(compound, "Entities")? {
			region.entities.push(Entity::from_nbt(entity.clone())?);
		}

		for tile_entity in nbt::optional_compounds(compound, "TileEntities")? {
			region.tile_entities.push(TileEntity::from_nbt(tile_entity.clone())?);
		}

		region.block_ticks = nbt::optional_compounds(compound, "PendingBlockTicks")?.into_iter().cloned().collect();
		region.fluid_ticks = nbt::optional_compounds(compound, "PendingFluidTicks")?.into_iter().cloned().collect();

		Ok(region)
	}
}
