use assert_matches::assert_matches;
use litematic::nbt_turbo::{Endian, Tag};
use litematic::{BlockState, Compression, Error, LoadOptions, Region, SaveOptions, Schematic};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const IDS: [&str; 9] = ["air", "stone", "granite", "diorite", "andesite", "dirt", "grass_block", "cobblestone", "oak_planks"];

fn random_string(rng: &mut StdRng, len: usize) -> String {
	rng.sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

fn random_block(rng: &mut StdRng) -> BlockState {
	let id = IDS[rng.gen_range(0..IDS.len())];

	BlockState::new(&format!("minecraft:{}", id)).unwrap()
}

fn random_schematic(rng: &mut StdRng) -> Schematic {
	let name = random_string(rng, 15);
	let author = random_string(rng, 15);
	let description = random_string(rng, 100);

	let mut schematic = Schematic::new(&name, &author, &description);

	while schematic.regions().is_empty() || rng.gen_bool(0.8) {
		let (x, y, z) = (rng.gen_range(-20..20), rng.gen_range(-20..20), rng.gen_range(-20..20));
		let (width, height, length) = (rng.gen_range(-20..20), rng.gen_range(-20..20), rng.gen_range(-20..20));

		if width == 0 || height == 0 || length == 0 {
			continue;
		}

		let name = random_string(rng, 10);
		schematic.insert_region(&name, Region::new(x, y, z, width, height, length).unwrap()).unwrap();
	}

	for region in schematic.regions_mut().values_mut() {
		while rng.gen_bool(0.999) {
			let block = random_block(rng);
			let x = rng.gen_range(region.x_range());
			let y = rng.gen_range(region.y_range());
			let z = rng.gen_range(region.z_range());

			region.set(x, y, z, block).unwrap();
		}
	}

	schematic
}

fn assert_same(written: &Schematic, read: &Schematic) {
	assert_eq!(written.name, read.name);
	assert_eq!(written.author, read.author);
	assert_eq!(written.description, read.description);
	assert_eq!((written.width(), written.height(), written.length()), (read.width(), read.height(), read.length()));
	assert_eq!(written.regions().len(), read.regions().len());
	assert_eq!(written.total_blocks(), read.total_blocks());

	for (name, written) in written.regions().iter() {
		let read = read.region(name).unwrap();

		assert_eq!(written.bounding_box(), read.bounding_box());
		assert_eq!((written.x_range(), written.y_range(), written.z_range()), (read.x_range(), read.y_range(), read.z_range()));

		for (x, y, z) in written.positions() {
			assert_eq!(written.get(x, y, z).unwrap(), read.get(x, y, z).unwrap(), "block at ({}, {}, {}) of region {:?}", x, y, z, name);
		}
	}
}

#[test]
fn test_random_schematics_survive_saving() {
	let directory = tempfile::tempdir().unwrap();
	let mut rng = StdRng::seed_from_u64(0x5eed);

	for _ in 0..25 {
		let mut schematic = random_schematic(&mut rng);
		let path = directory.path().join(format!("{}.litematic", schematic.name));

		schematic.save(&path, &SaveOptions::default()).unwrap();
		let read = Schematic::load(&path, &LoadOptions::default()).unwrap();

		assert_same(&schematic, &read);
	}
}

#[test]
fn test_save_options() {
	let mut rng = StdRng::seed_from_u64(42);
	let mut schematic = random_schematic(&mut rng);

	let options = [
		(Compression::None, Endian::Big),
		(Compression::Fast, Endian::Little),
		(Compression::Best, Endian::Big),
		(Compression::None, Endian::Little)
	];

	for &(compression, endian) in &options {
		let save = SaveOptions { compression, endian, ..SaveOptions::default() };

		let mut bytes = Vec::new();
		schematic.write_to(&mut bytes, &save).unwrap();

		let read = Schematic::read_from(&bytes[..], &LoadOptions { endian }).unwrap();
		assert_same(&schematic, &read);
	}
}

#[test]
fn test_modification_time() {
	let mut schematic = Region::new(0, 0, 0, 1, 1, 1).unwrap().into_schematic("Single", "", "").unwrap();
	schematic.created = 1;
	schematic.modified = 1;

	let kept = SaveOptions { update_metadata: false, ..SaveOptions::default() };
	let read = Schematic::from_bytes(&schematic.to_bytes(&kept).unwrap(), &LoadOptions::default()).unwrap();
	assert_eq!((read.created, read.modified), (1, 1));

	let read = Schematic::from_bytes(&schematic.to_bytes(&SaveOptions::default()).unwrap(), &LoadOptions::default()).unwrap();
	assert_eq!(read.created, 1);
	assert!(read.modified > 1);
}

#[test]
fn test_wrong_byte_order_fails() {
	let mut schematic = Region::new(0, 0, 0, 2, 2, 2).unwrap().into_schematic("Small", "", "").unwrap();
	let bytes = schematic.to_bytes(&SaveOptions::default()).unwrap();

	assert!(Schematic::from_bytes(&bytes, &LoadOptions { endian: Endian::Little }).is_err());
}

#[test]
fn test_corrupted_block_states() {
	let mut schematic = Region::new(0, 0, 0, 4, 4, 4).unwrap().into_schematic("Cube", "", "").unwrap();
	let bytes = schematic.to_bytes(&SaveOptions { compression: Compression::None, ..SaveOptions::default() }).unwrap();

	let (_, mut root) = litematic::file::read_nbt(&bytes, Endian::Big).unwrap();

	let mut regions = root.get("Regions").and_then(Tag::as_compound).unwrap().clone();
	let mut cube = regions.get("Cube").and_then(Tag::as_compound).unwrap().clone();

	cube.insert("BlockStates", Tag::I64Array(vec![0; 5]));
	regions.insert("Cube", cube);
	root.insert("Regions", regions);

	assert_matches!(Schematic::from_nbt(&root), Err(Error::Storage(_)));
}

#[test]
fn test_missing_file() {
	let directory = tempfile::tempdir().unwrap();

	assert_matches!(Schematic::load(directory.path().join("missing.litematic"), &LoadOptions::default()), Err(Error::Io(_)));
}
