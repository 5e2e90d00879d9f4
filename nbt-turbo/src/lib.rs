//! # `nbt-turbo`: Named Binary Tag encoding
//!
//! Writing is streaming: a `CompoundWriter` pushes bytes straight into an `Output` as
//! fields are added, without building a tree first. Reading goes the other way and parses
//! a complete byte buffer into an owned `Compound` tree.
//!
//! Both directions default to the big endian layout used by Java Edition. The little endian
//! layout is available through `Endian::Little`.

pub mod reader;
pub mod writer;
mod error;
mod tag;

pub use error::{Error, Result};
pub use tag::{Compound, Kind, List, Tag};

/// Byte order of every multi-byte number in a tag stream.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Endian {
	Big,
	Little
}

impl Default for Endian {
	fn default() -> Self {
		Endian::Big
	}
}
