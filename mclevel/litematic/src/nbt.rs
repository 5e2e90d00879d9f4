//! Typed lookups into parsed compounds, reporting missing keys and unexpected tag kinds.

use crate::{Error, Result};
use nbt_turbo::{Compound, Kind, List, Tag};

fn optional<'a, T>(compound: &'a Compound, key: &str, expected: Kind, extract: fn(&'a Tag) -> Option<T>) -> Result<Option<T>> {
	match compound.get(key) {
		None => Ok(None),
		Some(tag) => match extract(tag) {
			Some(value) => Ok(Some(value)),
			None => Err(Error::UnexpectedKind { key: key.to_string(), expected, found: tag.kind() })
		}
	}
}

fn required<T>(value: Result<Option<T>>, key: &str) -> Result<T> {
	value?.ok_or_else(|| Error::MissingKey { key: key.to_string() })
}

pub fn optional_i16(compound: &Compound, key: &str) -> Result<Option<i16>> {
	optional(compound, key, Kind::I16, Tag::as_i16)
}

pub fn i16(compound: &Compound, key: &str) -> Result<i16> {
	required(optional_i16(compound, key), key)
}

pub fn optional_i32(compound: &Compound, key: &str) -> Result<Option<i32>> {
	optional(compound, key, Kind::I32, Tag::as_i32)
}

pub fn i32(compound: &Compound, key: &str) -> Result<i32> {
	required(optional_i32(compound, key), key)
}

pub fn i64(compound: &Compound, key: &str) -> Result<i64> {
	required(optional(compound, key, Kind::I64, Tag::as_i64), key)
}

pub fn optional_string<'a>(compound: &'a Compound, key: &str) -> Result<Option<&'a str>> {
	optional(compound, key, Kind::String, Tag::as_str)
}

pub fn string<'a>(compound: &'a Compound, key: &str) -> Result<&'a str> {
	required(optional_string(compound, key), key)
}

pub fn optional_compound<'a>(compound: &'a Compound, key: &str) -> Result<Option<&'a Compound>> {
	optional(compound, key, Kind::Compound, Tag::as_compound)
}

pub fn compound<'a>(compound: &'a Compound, key: &str) -> Result<&'a Compound> {
	required(optional_compound(compound, key), key)
}

pub fn optional_list<'a>(compound: &'a Compound, key: &str) -> Result<Option<&'a List>> {
	optional(compound, key, Kind::List, Tag::as_list)
}

pub fn list<'a>(compound: &'a Compound, key: &str) -> Result<&'a List> {
	required(optional_list(compound, key), key)
}

pub fn optional_i32_array<'a>(compound: &'a Compound, key: &str) -> Result<Option<&'a [i32]>> {
	optional(compound, key, Kind::I32Array, Tag::as_i32_array)
}

pub fn i64_array<'a>(compound: &'a Compound, key: &str) -> Result<&'a [i64]> {
	required(optional(compound, key, Kind::I64Array, Tag::as_i64_array), key)
}

pub fn u8_array<'a>(compound: &'a Compound, key: &str) -> Result<&'a [u8]> {
	required(optional(compound, key, Kind::U8Array, Tag::as_u8_array), key)
}

/// Every element of a list stored under `key`, which must all be compounds.
pub fn compounds<'a>(list: &'a List, key: &str) -> Result<Vec<&'a Compound>> {
	list.iter()
		.map(|tag| tag.as_compound().ok_or_else(|| Error::UnexpectedKind { key: key.to_string(), expected: Kind::Compound, found: tag.kind() }))
		.collect()
}

/// Compounds of a list that may be absent, which reads as empty.
pub fn optional_compounds<'a>(compound: &'a Compound, key: &str) -> Result<Vec<&'a Compound>> {
	match optional_list(compound, key)? {
		Some(list) => compounds(list, key),
		None => Ok(Vec::new())
	}
}

/// A list of exactly `len` numbers, either floating point kind accepted.
pub fn doubles(list: &List, key: &str, len: usize) -> Result<Vec<f64>> {
	if list.len() != len {
		return Err(Error::Corrupted(format!("{:?} should hold {} numbers, found {}", key, len, list.len())));
	}

	list.iter()
		.map(|tag| tag.as_f64().ok_or_else(|| Error::UnexpectedKind { key: key.to_string(), expected: Kind::F64, found: tag.kind() }))
		.collect()
}

/// A list of exactly `len` ints.
pub fn ints(list: &List, key: &str, len: usize) -> Result<Vec<i32>> {
	if list.len() != len {
		return Err(Error::Corrupted(format!("{:?} should hold {} numbers, found {}", key, len, list.len())));
	}

	list.iter()
		.map(|tag| tag.as_i32().ok_or_else(|| Error::UnexpectedKind { key: key.to_string(), expected: Kind::I32, found: tag.kind() }))
		.collect()
}

#[cfg(test)]
mod test {
	use crate::Error;
	use assert_matches::assert_matches;
	use nbt_turbo::{Compound, Kind, List};

	#[test]
	fn test_missing_and_mismatched() {
		let mut compound = Compound::new();
		compound.insert("x", 4i32);
		compound.insert("name", "stone");

		assert_eq!(super::i32(&compound, "x").unwrap(), 4);
		assert_eq!(super::optional_i32(&compound, "y").unwrap(), None);
		assert_matches!(super::i32(&compound, "y"), Err(Error::MissingKey { ref key }) if key == "y");
		assert_matches!(super::i32(&compound, "name"), Err(Error::UnexpectedKind { expected: Kind::I32, found: Kind::String, .. }));
		assert_eq!(super::string(&compound, "name").unwrap(), "stone");
	}

	#[test]
	fn test_number_lists() {
		let list = List::from_f32s(&[1.5, 2.0]);

		assert_eq!(super::doubles(&list, "Rotation", 2).unwrap(), vec![1.5, 2.0]);
		assert_matches!(super::doubles(&list, "Rotation", 3), Err(Error::Corrupted(_)));
		assert_matches!(super::ints(&list, "pos", 2), Err(Error::UnexpectedKind { .. }));
	}
}
