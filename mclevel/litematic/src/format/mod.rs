//! Conversions between a single region and the schematic formats of other tools: Sponge
//! schematics (version 2) as used by WorldEdit, and the structure files of vanilla
//! structure blocks.
//!
//! Both formats store blocks from a corner at (0, 0, 0). Entity positions are moved from the
//! region's own coordinates into storage coordinates on export, tile entity positions are
//! already relative to that corner.

mod sponge;
mod structure;

use crate::region::Region;
use nbt_turbo::Compound;

/// Appends `value` as a LEB128 varint: 7 bits per byte, low bits first, with the high bit
/// set on every byte but the last.
pub(crate) fn write_varint(out: &mut Vec<u8>, mut value: u32) {
	loop {
		let byte = (value & 0x7f) as u8;
		value >>= 7;

		if value == 0 {
			out.push(byte);
			return;
		}

		out.push(byte | 0x80);
	}
}

/// Decodes the varint at `position`, advancing past it. Returns `None` for a truncated
/// varint or one that does not fit in 32 bits.
pub(crate) fn read_varint(bytes: &[u8], position: &mut usize) -> Option<u32> {
	let mut value = 0u32;

	for shift in (0..35).step_by(7) {
		let byte = *bytes.get(*position)?;
		*position += 1;

		let bits = (byte & 0x7f) as u32;

		if shift == 28 && bits > 0x0f {
			return None;
		}

		value |= bits << shift;

		if byte & 0x80 == 0 {
			return Some(value);
		}
	}

	None
}

impl Region {
	/// Offset from own coordinates to storage coordinates.
	pub(crate) fn storage_offset(&self) -> (i32, i32, i32) {
		(-self.min_x(), -self.min_y(), -self.min_z())
	}

	/// Moves an own coordinate position into storage coordinates, without bounds checks.
	pub(crate) fn shift_f64(&self, (x, y, z): (f64, f64, f64)) -> (f64, f64, f64) {
		let (dx, dy, dz) = self.storage_offset();

		(x + dx as f64, y + dy as f64, z + dz as f64)
	}
}

/// Moves the tag under `from` to `to`, if there is one.
pub(crate) fn rename(compound: &mut Compound, from: &str, to: &str) {
	if let Some(tag) = compound.remove(from) {
		compound.insert(to, tag);
	}
}

#[cfg(test)]
mod test {
	use super::{read_varint, write_varint};
	use crate::region::Region;

	#[test]
	fn test_varint_bytes() {
		let cases: &[(u32, &[u8])] = &[
			(0, &[0]),
			(1, &[1]),
			(127, &[0x7f]),
			(128, &[0x80, 0x01]),
			(300, &[0xac, 0x02]),
			(u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f])
		];

		for &(value, bytes) in cases {
			let mut out = Vec::new();
			write_varint(&mut out, value);
			assert_eq!(out, bytes);

			let mut position = 0;
			assert_eq!(read_varint(bytes, &mut position), Some(value));
			assert_eq!(position, bytes.len());
		}
	}

	#[test]
	fn test_bad_varints() {
		assert_eq!(read_varint(&[0x80], &mut 0), None);
		assert_eq!(read_varint(&[], &mut 0), None);
		assert_eq!(read_varint(&[0xff, 0xff, 0xff, 0xff, 0x1f], &mut 0), None);
		assert_eq!(read_varint(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x01], &mut 0), None);
	}

	#[test]
	fn test_shift() {
		let region = Region::new(5, 5, 5, -4, 2, -1).unwrap();

		assert_eq!(region.storage_offset(), (3, 0, 0));
		assert_eq!(region.shift_f64((0.5, 0.5, 0.5)), (3.5, 0.5, 0.5));
	}
}
