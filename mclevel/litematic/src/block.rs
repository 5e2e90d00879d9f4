use crate::{nbt, Error, Result};
use nbt_turbo::writer::{CompoundWriter, Output};
use nbt_turbo::{Compound, Kind};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The empty block. Palette index 0 of every region holds a block state equal to this one.
pub static AIR: Lazy<BlockState> = Lazy::new(|| BlockState {
	id: "minecraft:air".to_string(),
	properties: BTreeMap::new()
});

/// A block identifier together with its properties, such as
/// `minecraft:oak_log[axis=y]`. Block states are immutable values: the `with_*` methods
/// return modified copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockState {
	id: String,
	properties: BTreeMap<String, String>
}

fn valid_namespace(c: char) -> bool {
	matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn valid_path(c: char) -> bool {
	valid_namespace(c) || c == '/'
}

/// Checks for `namespace:path`, with non-empty parts and exactly one colon.
fn check_identifier(id: &str) -> Result<()> {
	let mut parts = id.splitn(2, ':');

	let namespace = parts.next().unwrap_or("");
	let path = parts.next().unwrap_or("");

	let valid = !namespace.is_empty() && !path.is_empty()
		&& namespace.chars().all(valid_namespace)
		&& path.chars().all(valid_path);

	if valid {
		Ok(())
	} else {
		Err(Error::InvalidIdentifier(id.to_string()))
	}
}

impl BlockState {
	pub fn new(id: &str) -> Result<Self> {
		BlockState::from_parts(id, BTreeMap::new())
	}

	pub fn from_parts(id: &str, properties: BTreeMap<String, String>) -> Result<Self> {
		check_identifier(id)?;

		Ok(BlockState { id: id.to_string(), properties })
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn property(&self, name: &str) -> Option<&str> {
		self.properties.get(name).map(String::as_str)
	}

	pub fn properties(&self) -> &BTreeMap<String, String> {
		&self.properties
	}

	/// Number of properties.
	pub fn len(&self) -> usize {
		self.properties.len()
	}

	pub fn is_empty(&self) -> bool {
		self.properties.is_empty()
	}

	/// Copy with a different identifier, keeping the properties.
	pub fn with_id(&self, id: &str) -> Result<Self> {
		BlockState::from_parts(id, self.properties.clone())
	}

	pub fn with_property(&self, name: &str, value: &str) -> Self {
		let mut other = self.clone();
		other.properties.insert(name.to_string(), value.to_string());

		other
	}

	pub fn without_property(&self, name: &str) -> Self {
		let mut other = self.clone();
		other.properties.remove(name);

		other
	}

	/// Copy with several properties changed at once. A value of `None` removes the property.
	pub fn with_properties<'a, I>(&self, changes: I) -> Self where I: IntoIterator<Item = (&'a str, Option<&'a str>)> {
		let mut other = self.clone();

		for (name, value) in changes {
			match value {
				Some(value) => { other.properties.insert(name.to_string(), value.to_string()); },
				None => { other.properties.remove(name); }
			}
		}

		other
	}

	/// Formats the state as `id[key=value,...]` with sorted keys. With `skip_empty`, a state
	/// without properties is just its identifier.
	pub fn to_identifier(&self, skip_empty: bool) -> String {
		let mut identifier = self.id.clone();

		if skip_empty && self.properties.is_empty() {
			return identifier;
		}

		identifier.push('[');

		for (index, (name, value)) in self.properties.iter().enumerate() {
			if index != 0 {
				identifier.push(',');
			}

			identifier.push_str(name);
			identifier.push('=');
			identifier.push_str(value);
		}

		identifier.push(']');
		identifier
	}

	pub fn write(&self, writer: &mut CompoundWriter<impl Output>) {
		writer.string("Name", &self.id);

		if !self.properties.is_empty() {
			writer.compound("Properties", |writer| {
				for (name, value) in &self.properties {
					writer.string(name, value);
				}
			});
		}
	}

	pub fn to_nbt(&self) -> Compound {
		let mut compound = Compound::new();
		compound.insert("Name", self.id.as_str());

		if !self.properties.is_empty() {
			let mut properties = Compound::new();

			for (name, value) in &self.properties {
				properties.insert(name.as_str(), value.as_str());
			}

			compound.insert("Properties", properties);
		}

		compound
	}

	pub fn from_nbt(compound: &Compound) -> Result<Self> {
		let id = nbt::string(compound, "Name")?;
		let mut properties = BTreeMap::new();

		if let Some(tags) = nbt::optional_compound(compound, "Properties")? {
			for (name, tag) in tags.iter() {
				let value = tag.as_str().ok_or_else(|| Error::UnexpectedKind {
					key: name.to_string(),
					expected: Kind::String,
					found: tag.kind()
				})?;

				properties.insert(name.to_string(), value.to_string());
			}
		}

		BlockState::from_parts(id, properties)
	}
}

impl Display for BlockState {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(&self.to_identifier(true))
	}
}

impl FromStr for BlockState {
	type Err = Error;

	/// Parses `id` or `id[key=value,...]`.
	fn from_str(identifier: &str) -> Result<Self> {
		let invalid = || Error::InvalidIdentifier(identifier.to_string());

		let (id, state) = match identifier.find('[') {
			Some(start) => {
				if !identifier.ends_with(']') {
					return Err(invalid());
				}

				(&identifier[..start], &identifier[start + 1..identifier.len() - 1])
			},
			None => (identifier, "")
		};

		let mut properties = BTreeMap::new();

		for property in state.split(',').filter(|property| !property.is_empty()) {
			let mut parts = property.splitn(2, '=');

			match (parts.next(), parts.next()) {
				(Some(name), Some(value)) if !name.is_empty() => {
					properties.insert(name.to_string(), value.to_string());
				},
				_ => return Err(invalid())
			}
		}

		BlockState::from_parts(id, properties)
	}
}

#[cfg(test)]
mod test {
	use super::{BlockState, AIR};
	use crate::Error;
	use assert_matches::assert_matches;
	use nbt_turbo::writer::CompoundWriter;
	use nbt_turbo::{reader, Endian};

	#[test]
	fn test_identifier_grammar() {
		assert!(BlockState::new("minecraft:stone").is_ok());
		assert!(BlockState::new("my_mod.v2:blocks/fancy-stairs").is_ok());

		for invalid in &["stone", ":stone", "minecraft:", "Minecraft:stone", "a:b:c", "mine/craft:stone", "minecraft:st one", ""] {
			assert_matches!(BlockState::new(invalid), Err(Error::InvalidIdentifier(_)), "{:?} should be rejected", invalid);
		}
	}

	#[test]
	fn test_air_is_a_value() {
		assert_eq!(*AIR, BlockState::new("minecraft:air").unwrap());
		assert_ne!(*AIR, BlockState::new("minecraft:cave_air").unwrap());
	}

	#[test]
	fn test_sorted_identifier() {
		let sign = BlockState::new("minecraft:oak_sign").unwrap()
			.with_property("waterlogged", "false")
			.with_property("rotation", "0");

		assert_eq!(sign.to_identifier(true), "minecraft:oak_sign[rotation=0,waterlogged=false]");
		assert_eq!(AIR.to_identifier(true), "minecraft:air");
		assert_eq!(AIR.to_identifier(false), "minecraft:air[]");
		assert_eq!(sign.to_string(), sign.to_identifier(true));

		assert_eq!("minecraft:oak_sign[waterlogged=false,rotation=0]".parse::<BlockState>().unwrap(), sign);
		assert_eq!("minecraft:air[]".parse::<BlockState>().unwrap(), *AIR);
	}

	#[test]
	fn test_malformed_identifiers() {
		for invalid in &["minecraft:stone[", "minecraft:stone[axis]", "minecraft:stone[=y]", "minecraft:stone[axis=y"] {
			assert_matches!(invalid.parse::<BlockState>(), Err(Error::InvalidIdentifier(_)), "{:?} should be rejected", invalid);
		}
	}

	#[test]
	fn test_property_edits() {
		let log = BlockState::new("minecraft:oak_log").unwrap().with_property("axis", "y");

		assert_eq!(log.property("axis"), Some("y"));
		assert_eq!(log.len(), 1);
		assert!(log.without_property("axis").is_empty());

		let changed = log.with_properties(vec![("axis", None), ("lit", Some("true"))]);
		assert_eq!(changed.property("axis"), None);
		assert_eq!(changed.property("lit"), Some("true"));

		let birch = log.with_id("minecraft:birch_log").unwrap();
		assert_eq!(birch.property("axis"), Some("y"));
		assert_matches!(log.with_id("birch"), Err(Error::InvalidIdentifier(_)));
	}

	#[test]
	fn test_nbt_forms_agree() {
		let log = BlockState::new("minecraft:oak_log").unwrap().with_property("axis", "x");

		let bytes = CompoundWriter::write("", Vec::new(), |writer| log.write(writer));
		let (_, compound) = reader::read_root(&bytes, Endian::Big).unwrap();

		assert_eq!(compound, log.to_nbt());
		assert_eq!(BlockState::from_nbt(&compound).unwrap(), log);
		assert!(!AIR.to_nbt().contains_key("Properties"));
	}
}
