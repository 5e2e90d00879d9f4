use super::{read_varint, rename, write_varint};
use crate::block::BlockState;
use crate::entity::Entity;
use crate::file::{self, SaveOptions};
use crate::region::Region;
use crate::tile_entity::TileEntity;
use crate::{nbt, Error, Result, SPONGE_VERSION};
use log::trace;
use nbt_turbo::writer::{CompoundWriter, Output};
use nbt_turbo::{Compound, Kind, List};
use rustc_hash::FxHashMap;
use std::convert::TryFrom;

/// Sponge sizes are unsigned shorts stored in signed short tags.
fn extent(value: i32, axis: &str) -> Result<i16> {
	let size = value.unsigned_abs();

	if size > u16::MAX as u32 {
		return Err(Error::Unsupported(format!("Sponge schematics are at most {} blocks {}, this region is {}", u16::MAX, axis, size)));
	}

	Ok(size as u16 as i16)
}

fn take_id(data: &mut Compound) -> Result<()> {
	let id = data.remove("Id").ok_or_else(|| Error::MissingKey { key: "Id".to_string() })?;
	data.insert("id", id);

	Ok(())
}

impl Region {
	/// Encodes the region as a Sponge schematic file, compressed as configured.
	pub fn to_sponge(&mut self, data_version: i32, options: &SaveOptions) -> Result<Vec<u8>> {
		file::encode("Schematic", options, |writer| self.write_sponge(writer, data_version))
	}

	pub fn write_sponge(&mut self, writer: &mut CompoundWriter<impl Output>, data_version: i32) -> Result<()> {
		let width = extent(self.width(), "wide")?;
		let height = extent(self.height(), "high")?;
		let length = extent(self.length(), "long")?;

		self.compact();

		let palette = self.palette().entries();
		let palette_max = i32::try_from(palette.len()).map_err(|_| Error::Unsupported(format!("palette of {} entries is too large", palette.len())))?;

		let mut block_data = Vec::with_capacity(self.volume());

		for &cell in self.storage().cells() {
			write_varint(&mut block_data, cell);
		}

		let entities: Vec<Compound> = self.entities.iter().map(|entity| {
			let (x, y, z) = self.shift_f64(entity.position());
			let mut data = entity.data().clone();

			data.insert("Pos", List::from_f64s(&[x, y, z]));

			if data.contains_key("TileX") {
				data.insert("TileX", x as i32);
				data.insert("TileY", y as i32);
				data.insert("TileZ", z as i32);
			}

			rename(&mut data, "id", "Id");
			data
		}).collect();

		let block_entities: Vec<Compound> = self.tile_entities.iter().map(|tile_entity| {
			let (x, y, z) = tile_entity.position();
			let mut data = tile_entity.data().clone();

			for key in &["x", "y", "z"] {
				data.remove(key);
			}

			data.insert("Pos", vec![x, y, z]);
			rename(&mut data, "id", "Id");
			data
		}).collect();

		trace!("Writing a {}x{}x{} Sponge schematic with {} palette entries", width as u16, height as u16, length as u16, palette.len());

		writer
			.i32("DataVersion", data_version)
			.i32("Version", SPONGE_VERSION)
			.i16("Width", width)
			.i16("Height", height)
			.i16("Length", length)
			.i32_array("Offset", &[0, 0, 0])
			.i32("PaletteMax", palette_max)
			.compound("Palette", |writer| {
				for (index, state) in palette.iter().enumerate() {
					writer.i32(&state.to_identifier(true), index as i32);
				}
			})
			.u8_array("BlockData", &block_data)
			.compounds("Entities", &entities)
			.compounds("BlockEntities", &block_entities);

		Ok(())
	}

	/// Builds a region at the origin from a Sponge schematic, returning it together with the
	/// data version of the schematic.
	pub fn from_sponge(root: &Compound) -> Result<(Region, i32)> {
		let data_version = nbt::i32(root, "DataVersion")?;

		let size = |key: &str| nbt::i16(root, key).map(|value| value as u16 as i32);
		let mut region = Region::new(0, 0, 0, size("Width")?, size("Height")?, size("Length")?)?;

		let (dx, dy, dz) = match nbt::optional_i32_array(root, "Offset")? {
			Some(&[x, y, z]) => (x as f64, y as f64, z as f64),
			Some(other) => return Err(Error::Corrupted(format!("\"Offset\" should hold 3 ints, found {}", other.len()))),
			None => (0.0, 0.0, 0.0)
		};

		for entity in nbt::optional_compounds(root, "Entities")? {
			let mut data = entity.clone();
			take_id(&mut data)?;

			let mut entity = Entity::from_nbt(data)?;
			let (x, y, z) = entity.position();
			entity.set_position((x - dx, y - dy, z - dz));

			region.entities.push(entity);
		}

		for block_entity in nbt::optional_compounds(root, "BlockEntities")? {
			let mut data = block_entity.clone();
			take_id(&mut data)?;

			let position = match data.remove("Pos") {
				Some(tag) => match tag.as_i32_array() {
					Some(&[x, y, z]) => (x, y, z),
					_ => return Err(Error::Corrupted(format!("\"Pos\" of a block entity should be an array of 3 ints, found {:?}", tag)))
				},
				None => return Err(Error::MissingKey { key: "Pos".to_string() })
			};

			let mut tile_entity = TileEntity::from_nbt(data)?;
			tile_entity.set_position(position);

			region.tile_entities.push(tile_entity);
		}

		let mut palette = FxHashMap::default();

		for (identifier, tag) in nbt::compound(root, "Palette")?.iter() {
			let index = tag.as_i32().ok_or_else(|| Error::UnexpectedKind {
				key: identifier.to_string(),
				expected: Kind::I32,
				found: tag.kind()
			})?;

			palette.insert(index as u32, identifier.parse::<BlockState>()?);
		}

		let block_data = nbt::u8_array(root, "BlockData")?;
		let mut indices = Vec::with_capacity(region.volume());
		let mut position = 0;

		while position < block_data.len() {
			let index = read_varint(block_data, &mut position)
				.ok_or_else(|| Error::Corrupted(format!("invalid varint in \"BlockData\" at byte {}", position)))?;

			indices.push(index);
		}

		if indices.len() != region.volume() {
			return Err(Error::Corrupted(format!("\"BlockData\" holds {} blocks, but the region has a volume of {}", indices.len(), region.volume())));
		}

		trace!("Reading a Sponge schematic with {} palette entries into a {}x{}x{} region", palette.len(), region.width(), region.height(), region.length());

		let dimensions = region.storage().dimensions();

		for (offset, index) in indices.into_iter().enumerate() {
			let state = palette.get(&index)
				.ok_or_else(|| Error::Corrupted(format!("block {} uses palette index {}, which is not in the palette", offset, index)))?;

			let (x, y, z) = dimensions.position(offset);
			region.set(x as i32, y as i32, z as i32, state.clone())?;
		}

		Ok((region, data_version))
	}
}
