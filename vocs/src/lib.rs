#![forbid(unsafe_code)]

//! # `vocs`: Voxel storage
//!
//! Dense, palette compressed storage for arbitrarily sized boxes of voxels.
//!
//! A volume stores one small integer per voxel. Each integer indexes into a palette of
//! distinct values, so a box holding millions of blocks but only a handful of distinct
//! block states stays small. The integers are bit packed into 64 bit words when the volume
//! is serialized, using only as many bits per entry as the palette needs.
//!
//! The storage is generic over the palette value, and knows nothing about any file format.

// Variable length bit collections
extern crate bit_vec;

// Fast hash map
extern crate rustc_hash;

mod error;

pub use error::{Error, Result};

/// Sizes and linear ordering of three dimensional boxes.
pub mod position;

/// Variable length bit packed storage. Usually accessed using a palette.
pub mod packed;

/// Palette indexed volumes.
pub mod indexed;
