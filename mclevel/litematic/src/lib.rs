//! # `litematic`: Litematica schematics
//!
//! A `Schematic` holds named `Region`s, each a box of block states stored as indices into
//! a palette. Saving compacts every palette and packs the indices into as few bits per block
//! as the palette size allows.
//!
//! ```no_run
//! use litematic::{BlockState, LoadOptions, Region, SaveOptions, Schematic};
//!
//! # fn main() -> litematic::Result<()> {
//! let mut region = Region::new(0, 0, 0, 16, 4, -16)?;
//! region.set(0, 0, -15, BlockState::new("minecraft:stone")?)?;
//!
//! let mut schematic = region.into_schematic("Floor", "someone", "")?;
//! schematic.save("floor.litematic", &SaveOptions::default())?;
//!
//! let loaded = Schematic::load("floor.litematic", &LoadOptions::default())?;
//! assert_eq!(loaded.total_blocks(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Single regions also convert to and from Sponge schematics and vanilla structure files,
//! see `Region::to_sponge` and `Region::to_structure`.

pub mod block;
pub mod bounds;
pub mod entity;
mod error;
pub mod file;
mod format;
pub mod nbt;
pub mod region;
pub mod regions;
pub mod schematic;
pub mod tile_entity;

pub use block::{BlockState, AIR};
pub use bounds::BoundingBox;
pub use entity::Entity;
pub use error::{Error, Result};
pub use file::{Compression, LoadOptions, SaveOptions};
pub use region::Region;
pub use regions::{ObservedMap, RegionMap};
pub use schematic::Schematic;
pub use tile_entity::TileEntity;

pub use nbt_turbo;

/// Litematic format version written by this library.
pub const LITEMATIC_VERSION: i32 = 6;
pub const LITEMATIC_SUB_VERSION: i32 = 1;
pub const SPONGE_VERSION: i32 = 2;
/// Minecraft 1.18.2
pub const MINECRAFT_DATA_VERSION: i32 = 2975;
pub const DEFAULT_NAME: &str = "Unnamed";
/// Recorded in the metadata of saved files.
pub const SOFTWARE: &str = concat!("litematic_", env!("CARGO_PKG_VERSION"));
