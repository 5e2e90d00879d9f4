use crate::Result;
use deflate::write::GzEncoder;
use flate2::read::GzDecoder;
use nbt_turbo::reader;
use nbt_turbo::writer::{CompoundWriter, Output};
use nbt_turbo::{Compound, Endian};
use std::borrow::Cow;
use std::io::{self, Read, Write};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression applied to saved files.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Compression {
	/// Raw tag bytes.
	None,
	Fast,
	Default,
	Best
}

impl Default for Compression {
	fn default() -> Self {
		Compression::Default
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SaveOptions {
	/// Set the modification time of the schematic to now before saving.
	pub update_metadata: bool,
	/// Record this library as the software that wrote the file.
	pub save_software: bool,
	pub compression: Compression,
	pub endian: Endian
}

impl Default for SaveOptions {
	fn default() -> Self {
		SaveOptions {
			update_metadata: true,
			save_software: true,
			compression: Compression::Default,
			endian: Endian::Big
		}
	}
}

/// Compression is detected from the file contents, only the byte order has to be known.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LoadOptions {
	pub endian: Endian
}

/// Gzip compressing output for a `CompoundWriter`. Small writes are batched before they
/// reach the encoder.
pub struct GzipOutput {
	buffer: Vec<u8>,
	writer: GzEncoder<Vec<u8>>,
	// Output cannot fail, so the first encoder error is kept until `finish`.
	error: Option<io::Error>
}

impl GzipOutput {
	pub fn new(level: deflate::Compression) -> Self {
		Self::with_capacity(level, 4096)
	}

	pub fn with_capacity(level: deflate::Compression, capacity: usize) -> Self {
		GzipOutput {
			buffer: Vec::with_capacity(256),
			writer: GzEncoder::new(Vec::with_capacity(capacity), level),
			error: None
		}
	}

	fn write(&mut self, slice: &[u8]) {
		if self.error.is_none() {
			if let Err(error) = self.writer.write_all(slice) {
				self.error = Some(error);
			}
		}
	}

	fn flush(&mut self) {
		let buffer = std::mem::take(&mut self.buffer);
		self.write(&buffer);

		self.buffer = buffer;
		self.buffer.clear();
	}

	fn maybe_flush(&mut self) {
		if self.buffer.len() > 255 {
			self.flush();
		}
	}

	pub fn finish(mut self) -> io::Result<Vec<u8>> {
		self.flush();

		match self.error.take() {
			Some(error) => Err(error),
			None => self.writer.finish()
		}
	}
}

impl Output for GzipOutput {
	fn push(&mut self, byte: u8) {
		self.buffer.push(byte);
		self.maybe_flush();
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		if slice.len() < 128 {
			self.buffer.extend_from_slice(slice);
			self.maybe_flush();
		} else {
			self.flush();
			self.write(slice);
		}
	}
}

pub enum FileOutput {
	Plain(Vec<u8>),
	Gzip(GzipOutput)
}

impl FileOutput {
	pub fn new(compression: Compression) -> Self {
		let level = match compression {
			Compression::None => return FileOutput::Plain(Vec::with_capacity(4096)),
			Compression::Fast => deflate::Compression::Fast,
			Compression::Default => deflate::Compression::Default,
			Compression::Best => deflate::Compression::Best
		};

		FileOutput::Gzip(GzipOutput::new(level))
	}

	pub fn finish(self) -> io::Result<Vec<u8>> {
		match self {
			FileOutput::Plain(bytes) => Ok(bytes),
			FileOutput::Gzip(output) => output.finish()
		}
	}
}

impl Output for FileOutput {
	fn push(&mut self, byte: u8) {
		match self {
			FileOutput::Plain(bytes) => bytes.push(byte),
			FileOutput::Gzip(output) => output.push(byte)
		}
	}

	fn extend_from_slice(&mut self, slice: &[u8]) {
		match self {
			FileOutput::Plain(bytes) => bytes.extend_from_slice(slice),
			FileOutput::Gzip(output) => output.extend_from_slice(slice)
		}
	}
}

/// Writes a root compound named `name` through `filler`, then compresses it as configured.
pub fn encode<F>(name: &str, options: &SaveOptions, filler: F) -> Result<Vec<u8>> where F: FnOnce(&mut CompoundWriter<FileOutput>) -> Result<()> {
	let mut writer = CompoundWriter::start_with(name, FileOutput::new(options.compression), options.endian);

	filler(&mut writer)?;

	Ok(writer.end().finish()?)
}

pub fn is_gzip(bytes: &[u8]) -> bool {
	bytes.starts_with(&GZIP_MAGIC)
}

/// Inflates gzip data, passing anything else through untouched.
pub fn decompress(bytes: &[u8]) -> Result<Cow<[u8]>> {
	if !is_gzip(bytes) {
		return Ok(Cow::Borrowed(bytes));
	}

	let mut inflated = Vec::with_capacity(bytes.len() * 4);
	GzDecoder::new(bytes).read_to_end(&mut inflated)?;

	Ok(Cow::Owned(inflated))
}

/// Parses a possibly compressed tag file, returning the root name and compound.
pub fn read_nbt(bytes: &[u8], endian: Endian) -> Result<(String, Compound)> {
	let raw = decompress(bytes)?;

	Ok(reader::read_root(&raw, endian)?)
}

#[cfg(test)]
mod test {
	use super::{encode, is_gzip, read_nbt, Compression, SaveOptions};
	use crate::Error;
	use assert_matches::assert_matches;
	use nbt_turbo::Endian;

	fn options(compression: Compression, endian: Endian) -> SaveOptions {
		SaveOptions { compression, endian, ..SaveOptions::default() }
	}

	#[test]
	fn test_compression_levels() {
		let long = vec![7i64; 2048];

		for &compression in &[Compression::None, Compression::Fast, Compression::Default, Compression::Best] {
			let bytes = encode("root", &options(compression, Endian::Big), |writer| {
				writer.string("name", "test").i64_array("long", &long);
				Ok(())
			}).unwrap();

			assert_eq!(is_gzip(&bytes), compression != Compression::None);

			let (name, root) = read_nbt(&bytes, Endian::Big).unwrap();
			assert_eq!(name, "root");
			assert_eq!(root.get("name").and_then(|tag| tag.as_str()), Some("test"));
			assert_eq!(root.get("long").and_then(|tag| tag.as_i64_array()), Some(&long[..]));
		}
	}

	#[test]
	fn test_little_endian() {
		let bytes = encode("", &options(Compression::Fast, Endian::Little), |writer| {
			writer.i32("x", 0x0102_0304);
			Ok(())
		}).unwrap();

		let (_, root) = read_nbt(&bytes, Endian::Little).unwrap();
		assert_eq!(root.get("x").and_then(|tag| tag.as_i32()), Some(0x0102_0304));
	}

	#[test]
	fn test_filler_error() {
		let result = encode("", &SaveOptions::default(), |_| Err(Error::EmptySchematic));

		assert_matches!(result, Err(Error::EmptySchematic));
	}

	#[test]
	fn test_truncated_gzip() {
		let bytes = encode("", &SaveOptions::default(), |writer| {
			writer.i64_array("long", &[1, 2, 3]);
			Ok(())
		}).unwrap();

		assert_matches!(read_nbt(&bytes[..bytes.len() / 2], Endian::Big), Err(Error::Io(_)));
	}
}
