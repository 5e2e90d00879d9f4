/// An inclusive box of block positions in schematic coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BoundingBox {
	pub min_x: i32,
	pub min_y: i32,
	pub min_z: i32,
	pub max_x: i32,
	pub max_y: i32,
	pub max_z: i32
}

impl BoundingBox {
	/// Smallest box containing both boxes.
	pub fn union(&self, other: &BoundingBox) -> BoundingBox {
		BoundingBox {
			min_x: self.min_x.min(other.min_x),
			min_y: self.min_y.min(other.min_y),
			min_z: self.min_z.min(other.min_z),
			max_x: self.max_x.max(other.max_x),
			max_y: self.max_y.max(other.max_y),
			max_z: self.max_z.max(other.max_z)
		}
	}

	/// Returns true if any face of `other` lies on the matching face of this box. Removing such
	/// a box from a union may shrink the union.
	pub fn shares_face(&self, other: &BoundingBox) -> bool {
		self.min_x == other.min_x || self.max_x == other.max_x ||
		self.min_y == other.min_y || self.max_y == other.max_y ||
		self.min_z == other.min_z || self.max_z == other.max_z
	}

	pub fn width(&self) -> i64 {
		self.max_x as i64 - self.min_x as i64 + 1
	}

	pub fn height(&self) -> i64 {
		self.max_y as i64 - self.min_y as i64 + 1
	}

	pub fn length(&self) -> i64 {
		self.max_z as i64 - self.min_z as i64 + 1
	}

	pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
		(self.min_x..=self.max_x).contains(&x) &&
		(self.min_y..=self.max_y).contains(&y) &&
		(self.min_z..=self.max_z).contains(&z)
	}
}

#[cfg(test)]
mod test {
	use super::BoundingBox;

	fn cube(x: i32, size: i32) -> BoundingBox {
		BoundingBox { min_x: x, min_y: 0, min_z: 0, max_x: x + size - 1, max_y: size - 1, max_z: size - 1 }
	}

	#[test]
	fn test_union() {
		let union = cube(0, 10).union(&cube(90, 10));

		assert_eq!(union.width(), 100);
		assert_eq!(union.height(), 10);
		assert!(union.contains(50, 5, 5));
		assert!(!union.contains(50, 10, 5));
	}

	#[test]
	fn test_shares_face() {
		let union = cube(0, 10).union(&cube(90, 10));

		assert!(union.shares_face(&cube(90, 10)));
		// Every cube starting at y = 0 touches the bottom face.
		assert!(union.shares_face(&cube(50, 5)));

		let inner = BoundingBox { min_x: 20, min_y: 2, min_z: 2, max_x: 30, max_y: 5, max_z: 5 };
		assert!(!union.shares_face(&inner));
	}
}
