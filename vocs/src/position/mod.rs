use crate::{Error, Result};

/// Size of a box of voxels. Voxels are linearized in YZX order: X varies fastest, then Z,
/// then Y.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Dimensions {
	x: usize,
	y: usize,
	z: usize,
	volume: usize
}

impl Dimensions {
	pub fn new(x: usize, y: usize, z: usize) -> Result<Self> {
		if x == 0 || y == 0 || z == 0 {
			return Err(Error::InvalidDimension(x, y, z));
		}

		let volume = x.checked_mul(y)
			.and_then(|area| area.checked_mul(z))
			.ok_or(Error::VolumeOverflow(x, y, z))?;

		Ok(Dimensions { x, y, z, volume })
	}

	pub fn x(&self) -> usize {
		self.x
	}

	pub fn y(&self) -> usize {
		self.y
	}

	pub fn z(&self) -> usize {
		self.z
	}

	pub fn volume(&self) -> usize {
		self.volume
	}

	/// Returns the YZX index of a position, or `None` if it lies outside of the box.
	pub fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
		if x >= self.x || y >= self.y || z >= self.z {
			return None;
		}

		Some(y * (self.x * self.z) + z * self.x + x)
	}

	/// Inverse of `index`. The index must be less than the volume.
	pub fn position(&self, index: usize) -> (usize, usize, usize) {
		let layer = self.x * self.z;

		(index % self.x, index / layer, (index % layer) / self.x)
	}

	/// Iterates over every position in YZX order.
	pub fn positions(&self) -> impl Iterator<Item = (usize, usize, usize)> {
		let dimensions = *self;

		(0..self.volume).map(move |index| dimensions.position(index))
	}
}
