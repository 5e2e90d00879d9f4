use crate::{Error, Result};
use std::slice;
use std::vec;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Kind {
	End,
	I8,
	I16,
	I32,
	I64,
	F32,
	F64,
	U8Array,
	String,
	List,
	Compound,
	I32Array,
	I64Array
}

impl Kind {
	pub fn from_id(id: u8) -> Option<Kind> {
		Some(match id {
			0 => Kind::End,
			1 => Kind::I8,
			2 => Kind::I16,
			3 => Kind::I32,
			4 => Kind::I64,
			5 => Kind::F32,
			6 => Kind::F64,
			7 => Kind::U8Array,
			8 => Kind::String,
			9 => Kind::List,
			10 => Kind::Compound,
			11 => Kind::I32Array,
			12 => Kind::I64Array,
			_ => return None
		})
	}

	pub fn id(self) -> u8 {
		self as u8
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	F32(f32),
	F64(f64),
	U8Array(Vec<u8>),
	String(String),
	List(List),
	Compound(Compound),
	I32Array(Vec<i32>),
	I64Array(Vec<i64>)
}

impl Tag {
	pub fn kind(&self) -> Kind {
		match self {
			Tag::I8(_) => Kind::I8,
			Tag::I16(_) => Kind::I16,
			Tag::I32(_) => Kind::I32,
			Tag::I64(_) => Kind::I64,
			Tag::F32(_) => Kind::F32,
			Tag::F64(_) => Kind::F64,
			Tag::U8Array(_) => Kind::U8Array,
			Tag::String(_) => Kind::String,
			Tag::List(_) => Kind::List,
			Tag::Compound(_) => Kind::Compound,
			Tag::I32Array(_) => Kind::I32Array,
			Tag::I64Array(_) => Kind::I64Array
		}
	}

	pub fn as_i8(&self) -> Option<i8> {
		match *self {
			Tag::I8(value) => Some(value),
			_ => None
		}
	}

	pub fn as_i16(&self) -> Option<i16> {
		match *self {
			Tag::I16(value) => Some(value),
			_ => None
		}
	}

	pub fn as_i32(&self) -> Option<i32> {
		match *self {
			Tag::I32(value) => Some(value),
			_ => None
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match *self {
			Tag::I64(value) => Some(value),
			_ => None
		}
	}

	/// Widens either floating point kind to an `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match *self {
			Tag::F32(value) => Some(value as f64),
			Tag::F64(value) => Some(value),
			_ => None
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Tag::String(value) => Some(value),
			_ => None
		}
	}

	pub fn as_u8_array(&self) -> Option<&[u8]> {
		match self {
			Tag::U8Array(value) => Some(value),
			_ => None
		}
	}

	pub fn as_i32_array(&self) -> Option<&[i32]> {
		match self {
			Tag::I32Array(value) => Some(value),
			_ => None
		}
	}

	pub fn as_i64_array(&self) -> Option<&[i64]> {
		match self {
			Tag::I64Array(value) => Some(value),
			_ => None
		}
	}

	pub fn as_list(&self) -> Option<&List> {
		match self {
			Tag::List(value) => Some(value),
			_ => None
		}
	}

	pub fn as_compound(&self) -> Option<&Compound> {
		match self {
			Tag::Compound(value) => Some(value),
			_ => None
		}
	}
}

macro_rules! tag_from {
	($($from:ty => $variant:ident),*) => {
		$(
			impl From<$from> for Tag {
				fn from(value: $from) -> Self {
					Tag::$variant(value)
				}
			}
		)*
	}
}

tag_from! {
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	f32 => F32,
	f64 => F64,
	Vec<u8> => U8Array,
	String => String,
	List => List,
	Compound => Compound,
	Vec<i32> => I32Array,
	Vec<i64> => I64Array
}

impl<'a> From<&'a str> for Tag {
	fn from(value: &'a str) -> Self {
		Tag::String(value.to_owned())
	}
}

/// A homogeneous list of tags. An empty list has the kind `End` until the first push.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
	kind: Kind,
	items: Vec<Tag>
}

impl List {
	pub fn new() -> Self {
		List { kind: Kind::End, items: Vec::new() }
	}

	/// Builds a list from tags that must all share one kind.
	pub fn from_tags(items: Vec<Tag>) -> Result<Self> {
		let mut list = List::new();
		list.items.reserve(items.len());

		for item in items {
			list.push(item)?;
		}

		Ok(list)
	}

	pub fn from_compounds(compounds: Vec<Compound>) -> Self {
		Self::homogeneous(Kind::Compound, compounds.into_iter().map(Tag::Compound).collect())
	}

	pub fn from_i32s(values: &[i32]) -> Self {
		Self::homogeneous(Kind::I32, values.iter().map(|&value| Tag::I32(value)).collect())
	}

	pub fn from_f32s(values: &[f32]) -> Self {
		Self::homogeneous(Kind::F32, values.iter().map(|&value| Tag::F32(value)).collect())
	}

	pub fn from_f64s(values: &[f64]) -> Self {
		Self::homogeneous(Kind::F64, values.iter().map(|&value| Tag::F64(value)).collect())
	}

	fn homogeneous(kind: Kind, items: Vec<Tag>) -> Self {
		let kind = if items.is_empty() { Kind::End } else { kind };

		List { kind, items }
	}

	pub fn push(&mut self, tag: Tag) -> Result<()> {
		let found = tag.kind();

		if self.kind == Kind::End {
			self.kind = found;
		} else if self.kind != found {
			return Err(Error::ListKindMismatch { expected: self.kind, found });
		}

		self.items.push(tag);

		Ok(())
	}

	/// Kind of the elements, `End` for an empty list.
	pub fn kind(&self) -> Kind {
		self.kind
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Tag> {
		self.items.get(index)
	}

	pub fn iter(&self) -> slice::Iter<Tag> {
		self.items.iter()
	}

	/// Yields each element as a compound, or `None` for an element of any other kind.
	pub fn compounds(&self) -> impl Iterator<Item = Option<&Compound>> {
		self.items.iter().map(Tag::as_compound)
	}
}

impl Default for List {
	fn default() -> Self {
		List::new()
	}
}

impl<'a> IntoIterator for &'a List {
	type Item = &'a Tag;
	type IntoIter = slice::Iter<'a, Tag>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}

impl IntoIterator for List {
	type Item = Tag;
	type IntoIter = vec::IntoIter<Tag>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}

/// A compound tag. Entries keep their insertion order so that re-encoding a parsed tree
/// reproduces the original field order.
#[derive(Debug, Clone, Default)]
pub struct Compound {
	entries: Vec<(String, Tag)>
}

impl Compound {
	pub fn new() -> Self {
		Compound { entries: Vec::new() }
	}

	fn position(&self, key: &str) -> Option<usize> {
		self.entries.iter().position(|(name, _)| name == key)
	}

	/// Inserts a tag, replacing an existing entry with the same name in place.
	pub fn insert<K, T>(&mut self, key: K, tag: T) -> Option<Tag> where K: Into<String>, T: Into<Tag> {
		let key = key.into();
		let tag = tag.into();

		match self.position(&key) {
			Some(index) => Some(std::mem::replace(&mut self.entries[index].1, tag)),
			None => {
				self.entries.push((key, tag));
				None
			}
		}
	}

	pub fn get(&self, key: &str) -> Option<&Tag> {
		self.position(key).map(|index| &self.entries[index].1)
	}

	pub fn get_mut(&mut self, key: &str) -> Option<&mut Tag> {
		match self.position(key) {
			Some(index) => Some(&mut self.entries[index].1),
			None => None
		}
	}

	pub fn remove(&mut self, key: &str) -> Option<Tag> {
		self.position(key).map(|index| self.entries.remove(index).1)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.position(key).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
		self.entries.iter().map(|(name, tag)| (name.as_str(), tag))
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(name, _)| name.as_str())
	}
}

/// Compounds compare as unordered maps.
impl PartialEq for Compound {
	fn eq(&self, other: &Compound) -> bool {
		self.len() == other.len() && self.iter().all(|(name, tag)| other.get(name) == Some(tag))
	}
}

impl IntoIterator for Compound {
	type Item = (String, Tag);
	type IntoIter = vec::IntoIter<(String, Tag)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}
