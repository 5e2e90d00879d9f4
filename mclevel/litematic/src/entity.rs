use crate::{nbt, Error, Result};
use nbt_turbo::{Compound, Kind, List, Tag};

/// A mob, item, minecart, or any other non-block object in a region. The compound is kept
/// as is, with `Pos`, `Rotation` and `Motion` filled in when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
	data: Compound
}

impl Entity {
	pub fn new(id: &str) -> Self {
		let mut data = Compound::new();
		data.insert("id", id);

		Entity::with_defaults(data)
	}

	pub fn from_nbt(data: Compound) -> Result<Self> {
		nbt::string(&data, "id")?;

		for &(key, len) in &[("Pos", 3), ("Rotation", 2), ("Motion", 3)] {
			if let Some(list) = nbt::optional_list(&data, key)? {
				nbt::doubles(list, key, len)?;
			}
		}

		Ok(Entity::with_defaults(data))
	}

	fn with_defaults(mut data: Compound) -> Self {
		if !data.contains_key("Pos") {
			data.insert("Pos", List::from_f64s(&[0.0; 3]));
		}

		if !data.contains_key("Rotation") {
			data.insert("Rotation", List::from_f32s(&[0.0; 2]));
		}

		if !data.contains_key("Motion") {
			data.insert("Motion", List::from_f64s(&[0.0; 3]));
		}

		Entity { data }
	}

	fn numbers(&self, key: &str) -> impl Iterator<Item = f64> + '_ {
		self.data.get(key)
			.and_then(Tag::as_list)
			.into_iter()
			.flat_map(|list| list.iter().map(|tag| tag.as_f64().unwrap_or(0.0)))
	}

	fn triple(&self, key: &str) -> (f64, f64, f64) {
		let mut numbers = self.numbers(key);

		(numbers.next().unwrap_or(0.0), numbers.next().unwrap_or(0.0), numbers.next().unwrap_or(0.0))
	}

	pub fn id(&self) -> &str {
		self.data.get("id").and_then(Tag::as_str).unwrap_or("")
	}

	pub fn set_id(&mut self, id: &str) {
		self.data.insert("id", id);
	}

	/// Position within the region.
	pub fn position(&self) -> (f64, f64, f64) {
		self.triple("Pos")
	}

	pub fn set_position(&mut self, (x, y, z): (f64, f64, f64)) {
		self.data.insert("Pos", List::from_f64s(&[x, y, z]));
	}

	/// Yaw and pitch in degrees.
	pub fn rotation(&self) -> (f64, f64) {
		let mut numbers = self.numbers("Rotation");

		(numbers.next().unwrap_or(0.0), numbers.next().unwrap_or(0.0))
	}

	pub fn set_rotation(&mut self, (yaw, pitch): (f64, f64)) {
		self.data.insert("Rotation", List::from_f32s(&[yaw as f32, pitch as f32]));
	}

	/// Velocity in blocks per tick.
	pub fn motion(&self) -> (f64, f64, f64) {
		self.triple("Motion")
	}

	pub fn set_motion(&mut self, (x, y, z): (f64, f64, f64)) {
		self.data.insert("Motion", List::from_f64s(&[x, y, z]));
	}

	pub fn get_tag(&self, key: &str) -> Option<&Tag> {
		self.data.get(key)
	}

	/// Inserts a raw tag. Tags backing the typed accessors must keep their expected shape.
	pub fn insert_tag(&mut self, key: &str, tag: Tag) -> Result<()> {
		let shape = match key {
			"id" => tag.as_str().map(|_| ()).ok_or(Kind::String),
			"Pos" | "Motion" => check_numbers(&tag, 3),
			"Rotation" => check_numbers(&tag, 2),
			_ => Ok(())
		};

		if let Err(expected) = shape {
			return Err(Error::UnexpectedKind { key: key.to_string(), expected, found: tag.kind() });
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

fn check_numbers(tag: &Tag, len: usize) -> std::result::Result<(), Kind> {
	match tag.as_list() {
		Some(list) if list.len() == len && list.iter().all(|tag| tag.as_f64().is_some()) => Ok(()),
		_ => Err(Kind::List)
	}
}

#[cfg(test)]
mod test {
	use super::Entity;
	use crate::Error;
	use assert_matches::assert_matches;
	use nbt_turbo::{Compound, List, Tag};

	#[test]
	fn test_defaults() {
		let pig = Entity::new("minecraft:pig");

		assert_eq!(pig.id(), "minecraft:pig");
		assert_eq!(pig.position(), (0.0, 0.0, 0.0));
		assert_eq!(pig.rotation(), (0.0, 0.0));
		assert_eq!(pig.motion(), (0.0, 0.0, 0.0));
	}

	#[test]
	fn test_from_nbt_requires_id() {
		assert_matches!(Entity::from_nbt(Compound::new()), Err(Error::MissingKey { ref key }) if key == "id");

		let mut data = Compound::new();
		data.insert("id", "minecraft:cow");
		data.insert("Pos", List::from_f64s(&[1.0, 2.0]));

		assert_matches!(Entity::from_nbt(data), Err(Error::Corrupted(_)));
	}

	#[test]
	fn test_setters_update_data() {
		let mut sheep = Entity::new("minecraft:sheep");
		sheep.set_position((1.5, 64.0, -3.25));
		sheep.set_rotation((90.0, -45.0));
		sheep.insert_tag("Color", Tag::I8(3)).unwrap();

		assert_eq!(sheep.position(), (1.5, 64.0, -3.25));
		assert_eq!(sheep.rotation(), (90.0, -45.0));
		assert_eq!(sheep.get_tag("Color"), Some(&Tag::I8(3)));
		assert_eq!(sheep.data().get("Pos"), Some(&Tag::List(List::from_f64s(&[1.5, 64.0, -3.25]))));

		assert_matches!(sheep.insert_tag("Pos", Tag::I32(0)), Err(Error::UnexpectedKind { .. }));
		assert_matches!(sheep.insert_tag("id", Tag::I32(0)), Err(Error::UnexpectedKind { .. }));
		assert_eq!(sheep.position(), (1.5, 64.0, -3.25));
	}
}
