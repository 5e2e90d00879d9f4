#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("bits per entry must be between 1 and 64, got {0}")]
	InvalidBits(u8),
	#[error("{len} entries of {bits} bits do not fit in memory")]
	CapacityOverflow { len: usize, bits: u8 },
	#[error("index {index} is out of range for length {len}")]
	IndexOutOfRange { index: usize, len: usize },
	#[error("value {value} does not fit in {bits} bits")]
	ValueOutOfRange { value: u64, bits: u8 },
	#[error("expected {expected} words of packed data, found {actual}")]
	WordCount { expected: usize, actual: usize },
	#[error("dimensions must be non-zero, got {0}x{1}x{2}")]
	InvalidDimension(usize, usize, usize),
	#[error("volume of {0}x{1}x{2} overflows")]
	VolumeOverflow(usize, usize, usize),
	#[error("palette index {index} is out of range for a palette of {len} entries")]
	PaletteIndex { index: u64, len: usize },
	#[error("palette must contain at least one entry")]
	EmptyPalette,
	#[error("position ({x}, {y}, {z}) is outside of the volume")]
	OutOfBounds { x: usize, y: usize, z: usize },
	#[error("expected {expected} packed entries, found {actual}")]
	LengthMismatch { expected: usize, actual: usize }
}

pub type Result<T> = std::result::Result<T, Error>;
