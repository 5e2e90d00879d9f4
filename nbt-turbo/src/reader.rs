use crate::{Compound, Endian, Error, Kind, List, Result, Tag};
use std::convert::TryInto;
use std::str;

/// Maximum nesting of lists and compounds accepted by the reader.
pub const MAX_DEPTH: usize = 512;

/// Parses a complete NBT stream whose root is a named compound, returning the root name and
/// its contents. Trailing bytes after the root compound are ignored.
pub fn read_root(bytes: &[u8], endian: Endian) -> Result<(String, Compound)> {
	let mut reader = Reader::new(bytes, endian);

	let id = reader.u8()?;
	let kind = reader.kind(id)?;

	if kind != Kind::Compound {
		return Err(Error::RootNotCompound(kind));
	}

	let name = reader.string()?;
	let root = reader.compound(0)?;

	Ok((name, root))
}

pub struct Reader<'a> {
	bytes: &'a [u8],
	position: usize,
	endian: Endian
}

macro_rules! take {
	($($name:ident: $ty:ty),*) => {
		$(
			fn $name(&mut self) -> Result<$ty> {
				const SIZE: usize = std::mem::size_of::<$ty>();

				let slice = self.take(SIZE)?;
				let mut raw = [0; SIZE];
				raw.copy_from_slice(slice);

				Ok(match self.endian {
					Endian::Big => <$ty>::from_be_bytes(raw),
					Endian::Little => <$ty>::from_le_bytes(raw)
				})
			}
		)*
	}
}

impl<'a> Reader<'a> {
	pub fn new(bytes: &'a [u8], endian: Endian) -> Self {
		Reader { bytes, position: 0, endian }
	}

	/// Number of bytes consumed so far.
	pub fn position(&self) -> usize {
		self.position
	}

	fn take(&mut self, len: usize) -> Result<&'a [u8]> {
		let remaining = self.bytes.len() - self.position;

		if len > remaining {
			return Err(Error::UnexpectedEof { position: self.position, needed: len - remaining });
		}

		let slice = &self.bytes[self.position..self.position + len];
		self.position += len;

		Ok(slice)
	}

	fn u8(&mut self) -> Result<u8> {
		Ok(self.take(1)?[0])
	}

	take! {
		u16: u16,
		i16: i16,
		i32: i32,
		i64: i64,
		u32: u32,
		u64: u64
	}

	fn kind(&self, id: u8) -> Result<Kind> {
		// The id byte has already been consumed.
		Kind::from_id(id).ok_or(Error::UnknownKind { id, position: self.position - 1 })
	}

	fn string(&mut self) -> Result<String> {
		let len = self.u16()? as usize;
		let position = self.position;
		let raw = self.take(len)?;

		match str::from_utf8(raw) {
			Ok(value) => Ok(value.to_owned()),
			Err(source) => Err(Error::InvalidString { position, source })
		}
	}

	/// Reads an array or list length, then checks that at least `element` bytes per entry
	/// remain before anything is allocated.
	fn length(&mut self, element: usize) -> Result<usize> {
		let position = self.position;
		let len = self.i32()?;

		if len < 0 {
			return Err(Error::NegativeLength { len, position });
		}

		let len = len as usize;
		let needed = len.saturating_mul(element);
		let remaining = self.bytes.len() - self.position;

		if needed > remaining {
			return Err(Error::UnexpectedEof { position: self.position, needed: needed - remaining });
		}

		Ok(len)
	}

	fn compound(&mut self, depth: usize) -> Result<Compound> {
		if depth >= MAX_DEPTH {
			return Err(Error::TooDeep(MAX_DEPTH));
		}

		let mut compound = Compound::new();

		loop {
			let id = self.u8()?;
			let kind = self.kind(id)?;

			if kind == Kind::End {
				return Ok(compound);
			}

			let name = self.string()?;
			let tag = self.payload(kind, depth + 1)?;

			compound.insert(name, tag);
		}
	}

	fn list(&mut self, depth: usize) -> Result<List> {
		if depth >= MAX_DEPTH {
			return Err(Error::TooDeep(MAX_DEPTH));
		}

		let id = self.u8()?;
		let kind = self.kind(id)?;
		let len = self.length(minimum_size(kind))?;

		if kind == Kind::End {
			// Lists of End may carry a length, but hold no payloads.
			return Ok(List::new());
		}

		let mut items = Vec::with_capacity(len);

		for _ in 0..len {
			items.push(self.payload(kind, depth + 1)?);
		}

		List::from_tags(items)
	}

	fn payload(&mut self, kind: Kind, depth: usize) -> Result<Tag> {
		Ok(match kind {
			Kind::End => return Err(Error::UnknownKind { id: 0, position: self.position }),
			Kind::I8 => Tag::I8(self.u8()? as i8),
			Kind::I16 => Tag::I16(self.i16()?),
			Kind::I32 => Tag::I32(self.i32()?),
			Kind::I64 => Tag::I64(self.i64()?),
			Kind::F32 => Tag::F32(f32::from_bits(self.u32()?)),
			Kind::F64 => Tag::F64(f64::from_bits(self.u64()?)),
			Kind::U8Array => {
				let len = self.length(1)?;

				Tag::U8Array(self.take(len)?.to_vec())
			},
			Kind::String => Tag::String(self.string()?),
			Kind::List => Tag::List(self.list(depth)?),
			Kind::Compound => Tag::Compound(self.compound(depth)?),
			Kind::I32Array => {
				let len = self.length(4)?;
				let raw = self.take(len * 4)?;

				Tag::I32Array(raw.chunks_exact(4).map(|chunk| {
					let chunk: [u8; 4] = chunk.try_into().unwrap_or_default();

					match self.endian {
						Endian::Big => i32::from_be_bytes(chunk),
						Endian::Little => i32::from_le_bytes(chunk)
					}
				}).collect())
			},
			Kind::I64Array => {
				let len = self.length(8)?;
				let raw = self.take(len * 8)?;

				Tag::I64Array(raw.chunks_exact(8).map(|chunk| {
					let chunk: [u8; 8] = chunk.try_into().unwrap_or_default();

					match self.endian {
						Endian::Big => i64::from_be_bytes(chunk),
						Endian::Little => i64::from_le_bytes(chunk)
					}
				}).collect())
			}
		})
	}
}

/// Smallest encoded size of one payload of the given kind.
fn minimum_size(kind: Kind) -> usize {
	match kind {
		Kind::End => 0,
		Kind::I8 | Kind::Compound => 1,
		Kind::I16 | Kind::String => 2,
		Kind::I32 | Kind::F32 | Kind::U8Array | Kind::I32Array | Kind::I64Array => 4,
		Kind::I64 | Kind::F64 => 8,
		Kind::List => 5
	}
}
