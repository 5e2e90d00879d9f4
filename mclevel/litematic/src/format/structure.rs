use crate::block::BlockState;
use crate::entity::Entity;
use crate::file::{self, SaveOptions};
use crate::region::Region;
use crate::tile_entity::TileEntity;
use crate::{nbt, Error, Result};
use log::trace;
use nbt_turbo::writer::{CompoundWriter, Output};
use nbt_turbo::{Compound, List, Tag};
use rustc_hash::FxHashMap;
use std::convert::TryFrom;

impl Region {
	/// Encodes the region as a structure block file, compressed as configured.
	pub fn to_structure(&mut self, data_version: i32, options: &SaveOptions) -> Result<Vec<u8>> {
		file::encode("", options, |writer| self.write_structure(writer, data_version))
	}

	pub fn write_structure(&mut self, writer: &mut CompoundWriter<impl Output>, data_version: i32) -> Result<()> {
		self.compact();

		let size = |extent: i32| i32::try_from(extent.unsigned_abs())
			.map_err(|_| Error::Unsupported(format!("structure of {} blocks along an axis is too large", extent.unsigned_abs())));

		let size = [size(self.width())?, size(self.height())?, size(self.length())?];

		let entities: Vec<Compound> = self.entities.iter().map(|entity| {
			let (x, y, z) = self.shift_f64(entity.position());

			let mut compound = Compound::new();
			compound.insert("nbt", entity.data().clone());
			compound.insert("pos", List::from_f64s(&[x, y, z]));
			compound.insert("blockPos", List::from_i32s(&[x.floor() as i32, y.floor() as i32, z.floor() as i32]));
			compound
		}).collect();

		let tile_entities: FxHashMap<(i32, i32, i32), Compound> = self.tile_entities.iter().map(|tile_entity| {
			let mut data = tile_entity.data().clone();

			for key in &["x", "y", "z"] {
				data.remove(key);
			}

			(tile_entity.position(), data)
		}).collect();

		let storage = self.storage();
		let dimensions = storage.dimensions();
		let palette = storage.palette().entries();
		let cells = storage.cells();

		trace!("Writing a {}x{}x{} structure with {} palette entries", size[0], size[1], size[2], palette.len());

		writer
			.list("size", &List::from_i32s(&size))
			.i32("DataVersion", data_version)
			.compounds("entities", &entities)
			.compound_array("palette", palette.len(), |array| {
				for state in palette {
					array.compound(|writer| state.write(writer));
				}
			})
			.compound_array("blocks", dimensions.volume(), |array| {
				for x in 0..dimensions.x() {
					for y in 0..dimensions.y() {
						for z in 0..dimensions.z() {
							let cell = cells[(y * dimensions.z() + z) * dimensions.x() + x];

							array.compound(|writer| {
								if let Some(data) = tile_entities.get(&(x as i32, y as i32, z as i32)) {
									writer.compound_tag("nbt", data);
								}

								writer
									.list("pos", &List::from_i32s(&[x as i32, y as i32, z as i32]))
									.i32("state", cell as i32);
							});
						}
					}
				}
			});

		Ok(())
	}

	/// Builds a region at the origin from a structure file, returning it together with the
	/// data version of the structure.
	pub fn from_structure(root: &Compound) -> Result<(Region, i32)> {
		let data_version = nbt::i32(root, "DataVersion")?;

		let size = nbt::ints(nbt::list(root, "size")?, "size", 3)?;
		let mut region = Region::new(0, 0, 0, size[0], size[1], size[2])?;

		// Structures saved with several palettes keep them in "palettes", the first one is used.
		let palette = match nbt::optional_list(root, "palette")? {
			Some(palette) => palette,
			None => nbt::list(root, "palettes")?
				.get(0)
				.and_then(Tag::as_list)
				.ok_or_else(|| Error::Corrupted("\"palettes\" does not hold a palette".to_string()))?
		};

		let palette = nbt::compounds(palette, "palette")?
			.into_iter()
			.map(BlockState::from_nbt)
			.collect::<Result<Vec<_>>>()?;

		trace!("Reading a structure with {} palette entries into a {}x{}x{} region", palette.len(), size[0], size[1], size[2]);

		for entity in nbt::optional_compounds(root, "entities")? {
			let position = nbt::doubles(nbt::list(entity, "pos")?, "pos", 3)?;

			let mut read = Entity::from_nbt(nbt::compound(entity, "nbt")?.clone())?;
			read.set_position((position[0], position[1], position[2]));

			region.entities.push(read);
		}

		for block in nbt::compounds(nbt::list(root, "blocks")?, "blocks")? {
			let position = nbt::ints(nbt::list(block, "pos")?, "pos", 3)?;
			let (x, y, z) = (position[0], position[1], position[2]);

			let index = nbt::i32(block, "state")?;
			let state = usize::try_from(index).ok()
				.and_then(|index| palette.get(index))
				.ok_or_else(|| Error::Corrupted(format!("block at ({}, {}, {}) uses state {}, but the palette has {} entries", x, y, z, index, palette.len())))?;

			region.set(x, y, z, state.clone())?;

			if let Some(data) = nbt::optional_compound(block, "nbt")? {
				let mut tile_entity = TileEntity::from_nbt(data.clone())?;
				tile_entity.set_position((x, y, z));

				region.tile_entities.push(tile_entity);
			}
		}

		Ok((region, data_version))
	}
}

#[cfg(test)]
mod test {
	use crate::block::{BlockState, AIR};
	use crate::entity::Entity;
	use crate::file::{self, Compression, SaveOptions};
	use crate::region::Region;
	use crate::tile_entity::TileEntity;
	use crate::Error;
	use assert_matches::assert_matches;
	use nbt_turbo::{Compound, Endian, List, Tag};

	fn structure(region: &mut Region) -> Compound {
		let options = SaveOptions { compression: Compression::Fast, ..SaveOptions::default() };
		let bytes = region.to_structure(3100, &options).unwrap();

		file::read_nbt(&bytes, Endian::Big).unwrap().1
	}

	fn block(id: &str) -> BlockState {
		BlockState::new(id).unwrap()
	}

	#[test]
	fn test_round_trip() {
		let mut region = Region::new(0, 0, 0, -2, 3, 2).unwrap();
		let furnace = block("minecraft:furnace").with_property("facing", "north");

		region.set(-1, 2, 1, furnace.clone()).unwrap();
		region.set(0, 0, 0, block("minecraft:sand")).unwrap();

		let mut tile_entity = TileEntity::new((0, 2, 1));
		tile_entity.insert_tag("id", Tag::from("minecraft:furnace")).unwrap();
		tile_entity.insert_tag("BurnTime", Tag::I16(20)).unwrap();
		region.tile_entities.push(tile_entity);

		let mut bat = Entity::new("minecraft:bat");
		bat.set_position((-0.25, 1.5, 0.75));
		region.entities.push(bat);

		let root = structure(&mut region);

		assert_eq!(root.get("size"), Some(&Tag::List(List::from_i32s(&[2, 3, 2]))));

		let blocks = root.get("blocks").and_then(Tag::as_list).unwrap();
		assert_eq!(blocks.len(), 12);

		let with_nbt: Vec<&Compound> = blocks.iter().filter_map(Tag::as_compound).filter(|block| block.contains_key("nbt")).collect();
		assert_eq!(with_nbt.len(), 1);
		assert_eq!(with_nbt[0].get("pos"), Some(&Tag::List(List::from_i32s(&[0, 2, 1]))));

		let entity = root.get("entities").and_then(Tag::as_list).and_then(|list| list.get(0)).and_then(Tag::as_compound).unwrap();
		assert_eq!(entity.get("blockPos"), Some(&Tag::List(List::from_i32s(&[0, 1, 0]))));

		let (read, data_version) = Region::from_structure(&root).unwrap();

		assert_eq!(data_version, 3100);
		assert_eq!(read.get(0, 2, 1).unwrap(), &furnace);
		assert_eq!(read.get(1, 0, 0).unwrap(), &block("minecraft:sand"));
		assert_eq!(read.get(0, 0, 0).unwrap(), &*AIR);

		assert_eq!(read.tile_entities.len(), 1);
		assert_eq!(read.tile_entities[0].position(), (0, 2, 1));
		assert_eq!(read.tile_entities[0].get_tag("BurnTime"), Some(&Tag::I16(20)));

		assert_eq!(read.entities[0].position(), (0.75, 1.5, 0.75));
	}

	#[test]
	fn test_first_of_several_palettes() {
		let mut region = Region::new(0, 0, 0, 1, 1, 1).unwrap();
		region.set(0, 0, 0, block("minecraft:red_wool")).unwrap();

		let mut root = structure(&mut region);
		let palette = root.remove("palette").unwrap();

		let other = List::from_compounds(vec![block("minecraft:blue_wool").to_nbt(), block("minecraft:blue_wool").to_nbt()]);

		root.insert("palettes", List::from_tags(vec![palette, Tag::List(other)]).unwrap());

		let (read, _) = Region::from_structure(&root).unwrap();
		assert_eq!(read.get(0, 0, 0).unwrap(), &block("minecraft:red_wool"));
	}

	#[test]
	fn test_state_out_of_range() {
		let mut region = Region::new(0, 0, 0, 1, 1, 1).unwrap();
		let mut root = structure(&mut region);

		let mut bad = Compound::new();
		bad.insert("pos", List::from_i32s(&[0, 0, 0]));
		bad.insert("state", 1i32);
		root.insert("blocks", List::from_compounds(vec![bad]));

		assert_matches!(Region::from_structure(&root), Err(Error::Corrupted(_)));
	}
}
