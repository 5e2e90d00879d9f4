use nbt_turbo::Kind;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("region size {0}x{1}x{2} is invalid: every axis must be non-zero and fit in the coordinate space")]
	InvalidDimension(i32, i32, i32),
	#[error("invalid block state identifier {0:?}")]
	InvalidIdentifier(String),
	#[error("position ({0}, {1}, {2}) is outside of the region")]
	OutOfBounds(i32, i32, i32),
	#[error("required key {key:?} is missing")]
	MissingKey { key: String },
	#[error("key {key:?} should hold a {expected:?} tag, found {found:?}")]
	UnexpectedKind { key: String, expected: Kind, found: Kind },
	#[error("corrupted schematic: {0}")]
	Corrupted(String),
	#[error("cannot save a schematic without any regions")]
	EmptySchematic,
	#[error("rejected: {0}")]
	Rejected(String),
	#[error("unsupported: {0}")]
	Unsupported(String),
	#[error(transparent)]
	Storage(#[from] vocs::Error),
	#[error(transparent)]
	Nbt(#[from] nbt_turbo::Error),
	#[error(transparent)]
	Io(#[from] io::Error)
}

pub type Result<T> = std::result::Result<T, Error>;
