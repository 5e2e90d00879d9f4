use crate::{nbt, Error, Result};
use nbt_turbo::{Compound, Kind, Tag};

const AXES: [&str; 3] = ["x", "y", "z"];

/// Extra data attached to a single block, such as the contents of a chest. The position is
/// relative to the minimum corner of the region.
#[derive(Debug, Clone, PartialEq)]
pub struct TileEntity {
	data: Compound
}

impl TileEntity {
	pub fn new((x, y, z): (i32, i32, i32)) -> Self {
		let mut tile_entity = TileEntity { data: Compound::new() };
		tile_entity.set_position((x, y, z));

		tile_entity
	}

	/// Wraps a compound, filling in any missing coordinate with 0.
	pub fn from_nbt(mut data: Compound) -> Result<Self> {
		for &axis in &AXES {
			if nbt::optional_i32(&data, axis)?.is_none() {
				data.insert(axis, 0i32);
			}
		}

		Ok(TileEntity { data })
	}

	fn coordinate(&self, axis: &str) -> i32 {
		self.data.get(axis).and_then(Tag::as_i32).unwrap_or(0)
	}

	pub fn position(&self) -> (i32, i32, i32) {
		(self.coordinate("x"), self.coordinate("y"), self.coordinate("z"))
	}

	pub fn set_position(&mut self, (x, y, z): (i32, i32, i32)) {
		self.data.insert("x", x);
		self.data.insert("y", y);
		self.data.insert("z", z);
	}

	pub fn get_tag(&self, key: &str) -> Option<&Tag> {
		self.data.get(key)
	}

	/// Inserts a raw tag. Coordinates must stay ints.
	pub fn insert_tag(&mut self, key: &str, tag: Tag) -> Result<()> {
		if AXES.contains(&key) && tag.as_i32().is_none() {
			return Err(Error::UnexpectedKind { key: key.to_string(), expected: Kind::I32, found: tag.kind() });
		}

		self.data.insert(key, tag);

		Ok(())
	}

	pub fn data(&self) -> &Compound {
		&self.data
	}

	pub fn into_data(self) -> Compound {
		self.data
	}
}
