use crate::{Compound, Endian, Kind, List, Tag};

pub trait Output {
	fn push(&mut self, value: u8);
	fn extend_from_slice(&mut self, slice: &[u8]);
}

impl<T> Output for &mut T where T: Output {
	fn push(&mut self, value: u8) {
		T::push(self, value)
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		T::extend_from_slice(self, slice);
	}
}

impl Output for Vec<u8> {
	fn push(&mut self, value: u8) {
		Vec::push(self, value)
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		Vec::extend_from_slice(self, slice)
	}
}

macro_rules! put {
	($($name:ident: $ty:ty),*) => {
		$(
			fn $name(&mut self, value: $ty) {
				let bytes = match self.endian {
					Endian::Big => value.to_be_bytes(),
					Endian::Little => value.to_le_bytes()
				};

				self.out.extend_from_slice(&bytes);
			}
		)*
	}
}

pub struct CompoundWriter<T: Output> {
	out: T,
	endian: Endian
}

impl<T: Output> CompoundWriter<T> {
	/// Begins a new big endian compound tag.
	pub fn start(name: &str, out: T) -> Self {
		CompoundWriter::start_with(name, out, Endian::Big)
	}

	/// Begins a new compound tag, encoding numbers in the given byte order.
	pub fn start_with(name: &str, out: T, endian: Endian) -> Self {
		let mut writer = CompoundWriter { out, endian };

		writer.header(Kind::Compound, name);
		writer
	}

	pub fn write<F>(name: &str, out: T, filler: F) -> T where F: FnOnce(&mut CompoundWriter<T>) {
		CompoundWriter::write_with(name, out, Endian::Big, filler)
	}

	pub fn write_with<F>(name: &str, out: T, endian: Endian, filler: F) -> T where F: FnOnce(&mut CompoundWriter<T>) {
		let mut writer = CompoundWriter::start_with(name, out, endian);

		filler(&mut writer);

		writer.end()
	}

	pub fn endian(&self) -> Endian {
		self.endian
	}

	/// Ends the compound tag, returning the buffer.
	pub fn end(mut self) -> T {
		self.out.push(0);
		self.out
	}

	put! {
		put_u16: u16,
		put_i16: i16,
		put_i32: i32,
		put_i64: i64,
		put_u32: u32,
		put_u64: u64
	}

	fn header(&mut self, kind: Kind, name: &str) {
		self.out.push(kind.id());
		self.raw_string(name);
	}

	fn raw_string(&mut self, value: &str) {
		assert!(value.len() <= 32767, "Tag string too long: {} bytes", value.len());

		self.put_u16(value.len() as u16);
		self.out.extend_from_slice(value.as_bytes());
	}

	fn array_length(&mut self, len: usize) {
		assert!(len <= std::i32::MAX as usize, "Array too long: {} (maximum length: {})", len, std::i32::MAX);

		self.put_i32(len as i32);
	}

	pub fn bool(&mut self, name: &str, value: bool) -> &mut Self {
		self.i8(name, value as i8)
	}

	pub fn i8(&mut self, name: &str, value: i8) -> &mut Self {
		self.header(Kind::I8, name);
		self.out.push(value as u8);

		self
	}

	pub fn i16(&mut self, name: &str, value: i16) -> &mut Self {
		self.header(Kind::I16, name);
		self.put_i16(value);

		self
	}

	pub fn i32(&mut self, name: &str, value: i32) -> &mut Self {
		self.header(Kind::I32, name);
		self.put_i32(value);

		self
	}

	pub fn i64(&mut self, name: &str, value: i64) -> &mut Self {
		self.header(Kind::I64, name);
		self.put_i64(value);

		self
	}

	pub fn f32(&mut self, name: &str, value: f32) -> &mut Self {
		self.header(Kind::F32, name);
		self.put_u32(value.to_bits());

		self
	}

	pub fn f64(&mut self, name: &str, value: f64) -> &mut Self {
		self.header(Kind::F64, name);
		self.put_u64(value.to_bits());

		self
	}

	pub fn string(&mut self, name: &str, value: &str) -> &mut Self {
		self.header(Kind::String, name);
		self.raw_string(value);

		self
	}

	pub fn u8_array(&mut self, name: &str, value: &[u8]) -> &mut Self {
		self.header(Kind::U8Array, name);
		self.array_length(value.len());

		self.out.extend_from_slice(value);

		self
	}

	pub fn i32_array(&mut self, name: &str, value: &[i32]) -> &mut Self {
		self.header(Kind::I32Array, name);
		self.array_length(value.len());

		for &entry in value {
			self.put_i32(entry);
		}

		self
	}

	pub fn i64_array(&mut self, name: &str, value: &[i64]) -> &mut Self {
		self.header(Kind::I64Array, name);
		self.array_length(value.len());

		for &entry in value {
			self.put_i64(entry);
		}

		self
	}

	/// Writes an already built list.
	pub fn list(&mut self, name: &str, value: &List) -> &mut Self {
		self.header(Kind::List, name);
		self.list_payload(value);

		self
	}

	/// Writes an already built tag of any kind.
	pub fn tag(&mut self, name: &str, value: &Tag) -> &mut Self {
		self.header(value.kind(), name);
		self.payload(value);

		self
	}

	/// Writes an already built compound as a nested compound tag.
	pub fn compound_tag(&mut self, name: &str, value: &Compound) -> &mut Self {
		self.header(Kind::Compound, name);
		self.compound_payload(value);

		self
	}

	/// Writes every entry of a compound into the compound currently being written.
	pub fn entries(&mut self, value: &Compound) -> &mut Self {
		for (name, tag) in value.iter() {
			self.tag(name, tag);
		}

		self
	}

	fn list_payload(&mut self, value: &List) {
		self.out.push(value.kind().id());
		self.array_length(value.len());

		for tag in value {
			self.payload(tag);
		}
	}

	fn compound_payload(&mut self, value: &Compound) {
		self.entries(value);
		self.out.push(0);
	}

	fn payload(&mut self, value: &Tag) {
		match value {
			&Tag::I8(value) => self.out.push(value as u8),
			&Tag::I16(value) => self.put_i16(value),
			&Tag::I32(value) => self.put_i32(value),
			&Tag::I64(value) => self.put_i64(value),
			&Tag::F32(value) => self.put_u32(value.to_bits()),
			&Tag::F64(value) => self.put_u64(value.to_bits()),
			Tag::U8Array(value) => {
				self.array_length(value.len());
				self.out.extend_from_slice(value);
			},
			Tag::String(value) => self.raw_string(value),
			Tag::List(value) => self.list_payload(value),
			Tag::Compound(value) => self.compound_payload(value),
			Tag::I32Array(value) => {
				self.array_length(value.len());

				for &entry in value {
					self.put_i32(entry);
				}
			},
			Tag::I64Array(value) => {
				self.array_length(value.len());

				for &entry in value {
					self.put_i64(entry);
				}
			}
		}
	}

	pub fn compound_writer(&mut self, name: &str) -> CompoundWriter<&mut T> {
		CompoundWriter::start_with(name, &mut self.out, self.endian)
	}

	pub fn compound<F>(&mut self, name: &str, filler: F) -> &mut Self where F: FnOnce(&mut CompoundWriter<&mut T>) {
		let mut writer = CompoundWriter::start_with(name, &mut self.out, self.endian);

		filler(&mut writer);

		writer.end();

		self
	}

	pub fn compound_array<F>(&mut self, name: &str, len: usize, filler: F) -> &mut Self where F: FnOnce(&mut CompoundArrayWriter<T>) {
		self.header(Kind::List, name);

		if len == 0 {
			// Kind::End + length of 0
			self.out.extend_from_slice(&[0; 5]);

			return self;
		}

		self.out.push(Kind::Compound.id());
		self.array_length(len);

		let mut writer = CompoundArrayWriter {
			out: &mut self.out,
			endian: self.endian,
			remaining: len
		};

		filler(&mut writer);

		assert_eq!(writer.remaining, 0, "Attempted to end an incomplete CompoundArrayWriter, {} element(s) remaining", writer.remaining);

		self
	}

	/// Writes a list of already built compounds.
	pub fn compounds<'c, I>(&mut self, name: &str, values: I) -> &mut Self where I: IntoIterator<Item = &'c Compound>, I::IntoIter: ExactSizeIterator {
		let values = values.into_iter();

		self.compound_array(name, values.len(), |array| {
			for value in values {
				array.compound(|writer| { writer.entries(value); });
			}
		})
	}
}

pub struct CompoundArrayWriter<'w, T: Output> {
	out: &'w mut T,
	endian: Endian,
	remaining: usize
}

impl<'w, T> CompoundArrayWriter<'w, T> where T: Output {
	pub fn compound<F>(&mut self, filler: F) where F: FnOnce(&mut CompoundWriter<&mut T>) {
		assert_ne!(self.remaining, 0);
		self.remaining -= 1;

		let mut writer = CompoundWriter {
			// re-borrow the output
			out: &mut *self.out,
			endian: self.endian
		};

		filler(&mut writer);

		writer.end();
	}
}
