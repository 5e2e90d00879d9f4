use crate::bounds::BoundingBox;
use crate::file::{self, LoadOptions, SaveOptions};
use crate::region::Region;
use crate::regions::{self, Enclosure, RegionMap};
use crate::{nbt, Error, Result, DEFAULT_NAME, LITEMATIC_SUB_VERSION, LITEMATIC_VERSION, MINECRAFT_DATA_VERSION, SOFTWARE};
use log::{debug, warn};
use nbt_turbo::writer::{CompoundWriter, Output};
use nbt_turbo::{Compound, Kind};
use std::convert::TryFrom;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, or 0 if the clock is set before it.
fn now() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as i64)
		.unwrap_or(0)
}

fn int(value: i64, what: &str) -> Result<i32> {
	i32::try_from(value).map_err(|_| Error::Unsupported(format!("{} of {} does not fit in a 32-bit integer", what, value)))
}

/// A Litematica schematic: metadata plus a set of named regions.
#[derive(Debug, Clone)]
pub struct Schematic {
	pub name: String,
	pub author: String,
	pub description: String,
	/// Milliseconds since the Unix epoch.
	pub created: i64,
	pub modified: i64,
	pub version: i32,
	pub sub_version: i32,
	pub minecraft_data_version: i32,
	pub preview: Vec<i32>,
	/// Software recorded in a loaded file.
	pub software: Option<String>,
	regions: RegionMap
}

impl Schematic {
	pub fn new(name: &str, author: &str, description: &str) -> Self {
		let time = now();

		Schematic {
			name: name.to_string(),
			author: author.to_string(),
			description: description.to_string(),
			created: time,
			modified: time,
			version: LITEMATIC_VERSION,
			sub_version: LITEMATIC_SUB_VERSION,
			minecraft_data_version: MINECRAFT_DATA_VERSION,
			preview: Vec::new(),
			software: None,
			regions: regions::region_map()
		}
	}

	pub fn regions(&self) -> &RegionMap {
		&self.regions
	}

	/// Direct access to the regions. The bounding box is still kept correct, at the cost of a
	/// recomputation after removals.
	pub fn regions_mut(&mut self) -> &mut RegionMap {
		&mut self.regions
	}

	pub fn region(&self, name: &str) -> Option<&Region> {
		self.regions.get(&name.to_string())
	}

	pub fn region_mut(&mut self, name: &str) -> Option<&mut Region> {
		self.regions.get_mut(&name.to_string())
	}

	/// Adds a region, returning the region previously stored under the same name.
	pub fn insert_region(&mut self, name: &str, region: Region) -> Result<Option<Region>> {
		let replaced = self.regions.insert(name.to_string(), region)?;
		self.refresh();

		Ok(replaced)
	}

	pub fn remove_region(&mut self, name: &str) -> Option<Region> {
		let removed = self.regions.remove(&name.to_string());
		self.refresh();

		removed
	}

	fn refresh(&mut self) {
		if self.regions.state().stale {
			let bounds = Enclosure::compute(self.regions.values());

			*self.regions.state_mut() = Enclosure { bounds, stale: false };
		}
	}

	/// Union of the bounding boxes of every region, or `None` without regions.
	pub fn bounding_box(&self) -> Option<BoundingBox> {
		let enclosure = self.regions.state();

		if enclosure.stale {
			Enclosure::compute(self.regions.values())
		} else {
			enclosure.bounds
		}
	}

	pub fn width(&self) -> i64 {
		self.bounding_box().map_or(0, |bounds| bounds.width())
	}

	pub fn height(&self) -> i64 {
		self.bounding_box().map_or(0, |bounds| bounds.height())
	}

	pub fn length(&self) -> i64 {
		self.bounding_box().map_or(0, |bounds| bounds.length())
	}

	/// Number of non-air blocks across every region.
	pub fn total_blocks(&self) -> usize {
		self.regions.values().map(Region::count).sum()
	}

	pub fn total_volume(&self) -> usize {
		self.regions.values().map(Region::volume).sum()
	}

	/// Sets the modification time to now.
	pub fn update_metadata(&mut self) {
		self.modified = now();
	}

	/// Writes the root compound of a Litematic file.
	pub fn write(&mut self, writer: &mut CompoundWriter<impl Output>, save_software: bool) -> Result<()> {
		let bounds = self.bounding_box().ok_or(Error::EmptySchematic)?;

		let enclosing = (int(bounds.width(), "width")?, int(bounds.height(), "height")?, int(bounds.length(), "length")?);
		let region_count = int(self.regions.len() as i64, "region count")?;
		let total_blocks = int(self.total_blocks() as i64, "block count")?;
		let total_volume = int(self.total_volume() as i64, "volume")?;

		let software = if save_software { Some(SOFTWARE) } else { self.software.as_deref() };

		writer
			.i32("Version", self.version)
			.i32("SubVersion", self.sub_version)
			.i32("MinecraftDataVersion", self.minecraft_data_version)
			.compound("Metadata", |writer| {
				writer
					.compound("EnclosingSize", |writer| { writer.i32("x", enclosing.0).i32("y", enclosing.1).i32("z", enclosing.2); })
					.string("Author", &self.author)
					.string("Description", &self.description)
					.string("Name", &self.name);

				if let Some(software) = software {
					writer.string("Software", software);
				}

				writer
					.i32("RegionCount", region_count)
					.i64("TimeCreated", self.created)
					.i64("TimeModified", self.modified)
					.i32("TotalBlocks", total_blocks)
					.i32("TotalVolume", total_volume)
					.i32_array("PreviewImageData", &self.preview);
			});

		let mut regions = writer.compound_writer("Regions");

		for (name, region) in self.regions.iter_mut() {
			let mut region_writer = regions.compound_writer(name);
			region.write(&mut region_writer)?;
			region_writer.end();
		}

		regions.end();

		Ok(())
	}

	/// Reads the root compound of a Litematic file, checking the metadata against the regions.
	pub fn from_nbt(root: &Compound) -> Result<Self> {
		let metadata = nbt::compound(root, "Metadata")?;

		let version = nbt::i32(root, "Version")?;

		if version > LITEMATIC_VERSION {
			warn!("Reading a schematic of Litematic version {}, newer than the supported version {}", version, LITEMATIC_VERSION);
		}

		let mut schematic = Schematic::new(nbt::string(metadata, "Name")?, nbt::string(metadata, "Author")?, nbt::string(metadata, "Description")?);

		schematic.version = version;
		schematic.sub_version = nbt::optional_i32(root, "SubVersion")?.unwrap_or(0);
		schematic.minecraft_data_version = nbt::i32(root, "MinecraftDataVersion")?;
		schematic.created = nbt::i64(metadata, "TimeCreated")?;
		schematic.modified = nbt::i64(metadata, "TimeModified")?;
		schematic.software = nbt::optional_string(metadata, "Software")?.map(String::from);

		if let Some(preview) = nbt::optional_i32_array(metadata, "PreviewImageData")? {
			schematic.preview = preview.to_vec();
		}

		for (name, tag) in nbt::compound(root, "Regions")?.iter() {
			let compound = tag.as_compound().ok_or_else(|| Error::UnexpectedKind {
				key: name.to_string(),
				expected: Kind::Compound,
				found: tag.kind()
			})?;

			schematic.insert_region(name, Region::from_nbt(compound)?)?;
		}

		let enclosing = nbt::compound(metadata, "EnclosingSize")?;

		let axes = [
			("width", nbt::i32(enclosing, "x")?, schematic.width()),
			("height", nbt::i32(enclosing, "y")?, schematic.height()),
			("length", nbt::i32(enclosing, "z")?, schematic.length())
		];

		for &(axis, stored, actual) in &axes {
			if stored as i64 != actual {
				return Err(Error::Corrupted(format!("metadata {} is {}, but the regions span {}", axis, stored, actual)));
			}
		}

		if let Some(count) = nbt::optional_i32(metadata, "RegionCount")? {
			if count as i64 != schematic.regions.len() as i64 {
				return Err(Error::Corrupted(format!("metadata lists {} regions, but {} were read", count, schematic.regions.len())));
			}
		}

		Ok(schematic)
	}

	/// Encodes the schematic as the contents of a file.
	pub fn to_bytes(&mut self, options: &SaveOptions) -> Result<Vec<u8>> {
		if options.update_metadata {
			self.update_metadata();
		}

		file::encode("", options, |writer| self.write(writer, options.save_software))
	}

	pub fn from_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
		let (_, root) = file::read_nbt(bytes, options.endian)?;

		Schematic::from_nbt(&root)
	}

	pub fn write_to<W: Write>(&mut self, mut out: W, options: &SaveOptions) -> Result<()> {
		let bytes = self.to_bytes(options)?;
		out.write_all(&bytes)?;

		Ok(())
	}

	pub fn read_from<R: Read>(mut input: R, options: &LoadOptions) -> Result<Self> {
		let mut bytes = Vec::new();
		input.read_to_end(&mut bytes)?;

		Schematic::from_bytes(&bytes, options)
	}

	pub fn save<P: AsRef<Path>>(&mut self, path: P, options: &SaveOptions) -> Result<()> {
		let bytes = self.to_bytes(options)?;
		fs::write(path.as_ref(), &bytes)?;

		debug!("Saved schematic {:?} with {} regions to {} ({} bytes)", self.name, self.regions.len(), path.as_ref().display(), bytes.len());

		Ok(())
	}

	pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
		let bytes = fs::read(path.as_ref())?;
		let schematic = Schematic::from_bytes(&bytes, options)?;

		debug!("Loaded schematic {:?} with {} regions from {} ({} bytes)", schematic.name, schematic.regions.len(), path.as_ref().display(), bytes.len());

		Ok(schematic)
	}
}

impl Default for Schematic {
	fn default() -> Self {
		Schematic::new(DEFAULT_NAME, "", "")
	}
}

#[cfg(test)]
mod test {
	use super::Schematic;
	use crate::block::BlockState;
	use crate::file::{Compression, LoadOptions, SaveOptions};
	use crate::region::Region;
	use crate::{Error, LITEMATIC_SUB_VERSION, SOFTWARE};
	use assert_matches::assert_matches;
	use nbt_turbo::writer::CompoundWriter;
	use nbt_turbo::{reader, Compound, Endian, Tag};

	fn cube(x: i32, size: i32) -> Region {
		Region::new(x, 0, 0, size, 10, 10).unwrap()
	}

	fn root(schematic: &mut Schematic) -> Compound {
		let mut writer = CompoundWriter::start("", Vec::new());
		schematic.write(&mut writer, true).unwrap();

		reader::read_root(&writer.end(), Endian::Big).unwrap().1
	}

	fn edit_metadata<F>(root: &mut Compound, edit: F) where F: FnOnce(&mut Compound) {
		let mut metadata = root.get("Metadata").and_then(Tag::as_compound).unwrap().clone();
		edit(&mut metadata);
		root.insert("Metadata", metadata);
	}

	#[test]
	fn test_bounding_box_bookkeeping() {
		let mut schematic = Schematic::default();
		assert_eq!(schematic.width(), 0);

		schematic.insert_region("a", cube(0, 10)).unwrap();
		assert_eq!(schematic.width(), 10);

		schematic.insert_region("b", cube(90, 10)).unwrap();
		assert_eq!(schematic.width(), 100);

		schematic.insert_region("c", cube(50, 10)).unwrap();
		assert_eq!(schematic.width(), 100);

		schematic.remove_region("b");
		assert_eq!(schematic.width(), 60);

		schematic.insert_region("c", cube(49, -10)).unwrap();
		assert_eq!(schematic.width(), 50);

		assert_eq!(schematic.height(), 10);
		assert_eq!(schematic.length(), 10);
	}

	#[test]
	fn test_direct_removal_recomputes() {
		let mut schematic = Schematic::default();
		schematic.insert_region("a", cube(0, 10)).unwrap();
		schematic.insert_region("b", cube(90, 10)).unwrap();

		schematic.regions_mut().remove(&"b".to_string());

		assert_eq!(schematic.width(), 10);
		assert_eq!(schematic.bounding_box().unwrap().max_x, 9);
	}

	#[test]
	fn test_empty_region_name() {
		let mut schematic = Schematic::default();

		assert_matches!(schematic.insert_region("", cube(0, 1)), Err(Error::Rejected(_)));
		assert!(schematic.regions().is_empty());
	}

	#[test]
	fn test_empty_schematic() {
		let mut schematic = Schematic::default();
		let mut writer = CompoundWriter::start("", Vec::new());

		assert_matches!(schematic.write(&mut writer, true), Err(Error::EmptySchematic));
	}

	#[test]
	fn test_metadata() {
		let mut schematic = Schematic::new("House", "someone", "A small house");
		let mut region = Region::new(0, 0, 0, 3, 3, -3).unwrap();
		region.set(1, 1, -1, BlockState::new("minecraft:stone").unwrap()).unwrap();
		schematic.insert_region("house", region).unwrap();
		schematic.preview = vec![1, 2, 3];

		let root = root(&mut schematic);
		let metadata = root.get("Metadata").and_then(Tag::as_compound).unwrap();

		assert_eq!(metadata.get("TotalBlocks"), Some(&Tag::I32(1)));
		assert_eq!(metadata.get("TotalVolume"), Some(&Tag::I32(27)));
		assert_eq!(metadata.get("RegionCount"), Some(&Tag::I32(1)));
		assert_eq!(metadata.get("Software").and_then(Tag::as_str), Some(SOFTWARE));

		let read = Schematic::from_nbt(&root).unwrap();

		assert_eq!((read.name.as_str(), read.author.as_str(), read.description.as_str()), ("House", "someone", "A small house"));
		assert_eq!((read.created, read.modified), (schematic.created, schematic.modified));
		assert_eq!(read.sub_version, LITEMATIC_SUB_VERSION);
		assert_eq!(read.preview, vec![1, 2, 3]);
		assert_eq!(read.software.as_deref(), Some(SOFTWARE));
		assert_eq!(read.region("house").unwrap().get(1, 1, -1).unwrap(), &BlockState::new("minecraft:stone").unwrap());
	}

	#[test]
	fn test_missing_sub_version() {
		let mut schematic = Schematic::default();
		schematic.insert_region("a", cube(0, 2)).unwrap();

		let mut root = root(&mut schematic);
		root.remove("SubVersion");

		assert_eq!(Schematic::from_nbt(&root).unwrap().sub_version, 0);
	}

	#[test]
	fn test_mismatched_metadata() {
		let mut schematic = Schematic::default();
		schematic.insert_region("a", cube(0, 5)).unwrap();
		let original = root(&mut schematic);

		let mut root = original.clone();
		edit_metadata(&mut root, |metadata| {
			let mut size = Compound::new();
			size.insert("x", 6i32);
			size.insert("y", 10i32);
			size.insert("z", 10i32);

			metadata.insert("EnclosingSize", size);
		});
		assert_matches!(Schematic::from_nbt(&root), Err(Error::Corrupted(_)));

		let mut root = original.clone();
		edit_metadata(&mut root, |metadata| { metadata.insert("RegionCount", 2i32); });
		assert_matches!(Schematic::from_nbt(&root), Err(Error::Corrupted(_)));

		let mut root = original;
		edit_metadata(&mut root, |metadata| { metadata.remove("RegionCount"); });
		assert!(Schematic::from_nbt(&root).is_ok());
	}

	#[test]
	fn test_bytes_round_trip() {
		let mut schematic = Schematic::default();
		schematic.insert_region("a", cube(-4, 4)).unwrap();

		let options = SaveOptions { update_metadata: false, save_software: false, compression: Compression::Best, endian: Endian::Little };
		let bytes = schematic.to_bytes(&options).unwrap();

		let read = Schematic::from_bytes(&bytes, &LoadOptions { endian: Endian::Little }).unwrap();

		assert_eq!(read.modified, schematic.modified);
		assert_eq!(read.software, None);
		assert_eq!(read.bounding_box(), schematic.bounding_box());
	}
}
