use crate::Kind;
use std::str::Utf8Error;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("unexpected end of input at byte {position}, {needed} more byte(s) needed")]
	UnexpectedEof { position: usize, needed: usize },
	#[error("unknown tag kind {id} at byte {position}")]
	UnknownKind { id: u8, position: usize },
	#[error("invalid UTF-8 in string at byte {position}: {source}")]
	InvalidString { position: usize, source: Utf8Error },
	#[error("negative length {len} at byte {position}")]
	NegativeLength { len: i32, position: usize },
	#[error("tags nested deeper than {0} levels")]
	TooDeep(usize),
	#[error("root tag must be a compound, found {0:?}")]
	RootNotCompound(Kind),
	#[error("list holds {expected:?} tags, cannot add a {found:?} tag")]
	ListKindMismatch { expected: Kind, found: Kind }
}

pub type Result<T> = std::result::Result<T, Error>;
