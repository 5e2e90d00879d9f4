use crate::bounds::BoundingBox;
use crate::region::Region;
use crate::{Error, Result};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

pub type Validator<K, V> = Arc<dyn Fn(&K, &V) -> std::result::Result<(), String> + Send + Sync>;
pub type Hook<S, K, V> = Arc<dyn Fn(&mut S, &K, &V) + Send + Sync>;

/// An insertion ordered map that validates every value before storing it, and notifies
/// hooks of additions and removals. The hooks share a piece of state owned by the map.
pub struct ObservedMap<K, V, S> {
	entries: Vec<(K, V)>,
	state: S,
	validator: Validator<K, V>,
	on_add: Option<Hook<S, K, V>>,
	on_remove: Option<Hook<S, K, V>>
}

impl<K, V, S> ObservedMap<K, V, S> where K: PartialEq {
	pub fn new<F>(state: S, validator: F) -> Self where F: Fn(&K, &V) -> std::result::Result<(), String> + Send + Sync + 'static {
		ObservedMap {
			entries: Vec::new(),
			state,
			validator: Arc::new(validator),
			on_add: None,
			on_remove: None
		}
	}

	pub fn on_add<F>(mut self, hook: F) -> Self where F: Fn(&mut S, &K, &V) + Send + Sync + 'static {
		self.on_add = Some(Arc::new(hook));
		self
	}

	pub fn on_remove<F>(mut self, hook: F) -> Self where F: Fn(&mut S, &K, &V) + Send + Sync + 'static {
		self.on_remove = Some(Arc::new(hook));
		self
	}

	fn position(&self, key: &K) -> Option<usize> {
		self.entries.iter().position(|(other, _)| other == key)
	}

	fn added(&mut self, index: usize) {
		if let Some(hook) = &self.on_add {
			let (key, value) = &self.entries[index];
			hook(&mut self.state, key, value);
		}
	}

	fn removed(&mut self, key: &K, value: &V) {
		if let Some(hook) = &self.on_remove {
			hook(&mut self.state, key, value);
		}
	}

	/// Stores a value, returning the value it replaced. Replacing keeps the original position
	/// of the key. A rejected value leaves the map untouched.
	pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
		(self.validator)(&key, &value).map_err(Error::Rejected)?;

		match self.position(&key) {
			Some(index) => {
				let old = std::mem::replace(&mut self.entries[index].1, value);

				if let Some(hook) = &self.on_remove {
					hook(&mut self.state, &self.entries[index].0, &old);
				}

				self.added(index);

				Ok(Some(old))
			},
			None => {
				self.entries.push((key, value));
				self.added(self.entries.len() - 1);

				Ok(None)
			}
		}
	}

	pub fn remove(&mut self, key: &K) -> Option<V> {
		let index = self.position(key)?;
		let (key, value) = self.entries.remove(index);

		self.removed(&key, &value);

		Some(value)
	}

	pub fn clear(&mut self) {
		for (key, value) in std::mem::take(&mut self.entries) {
			self.removed(&key, &value);
		}
	}

	pub fn get(&self, key: &K) -> Option<&V> {
		self.position(key).map(|index| &self.entries[index].1)
	}

	/// Mutable access to a value. Hooks are not notified of changes made through it.
	pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
		match self.position(key) {
			Some(index) => Some(&mut self.entries[index].1),
			None => None
		}
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.position(key).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
		self.entries.iter().map(|(key, value)| (key, value))
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
		self.entries.iter_mut().map(|(key, value)| (&*key, value))
	}

	pub fn keys(&self) -> impl Iterator<Item = &K> {
		self.entries.iter().map(|(key, _)| key)
	}

	pub fn values(&self) -> impl Iterator<Item = &V> {
		self.entries.iter().map(|(_, value)| value)
	}

	pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
		self.entries.iter_mut().map(|(_, value)| value)
	}

	pub fn state(&self) -> &S {
		&self.state
	}

	pub(crate) fn state_mut(&mut self) -> &mut S {
		&mut self.state
	}
}

impl<K, V, S> Clone for ObservedMap<K, V, S> where K: Clone, V: Clone, S: Clone {
	fn clone(&self) -> Self {
		ObservedMap {
			entries: self.entries.clone(),
			state: self.state.clone(),
			validator: self.validator.clone(),
			on_add: self.on_add.clone(),
			on_remove: self.on_remove.clone()
		}
	}
}

impl<K, V, S> Debug for ObservedMap<K, V, S> where K: Debug, V: Debug, S: Debug {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.debug_struct("ObservedMap")
			.field("entries", &self.entries)
			.field("state", &self.state)
			.finish()
	}
}

/// Cached union of the bounding boxes of a set of regions. Once `stale`, the cached box no
/// longer reflects the regions and has to be recomputed from scratch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enclosure {
	pub bounds: Option<BoundingBox>,
	pub stale: bool
}

impl Enclosure {
	pub fn compute<'r, I>(regions: I) -> Option<BoundingBox> where I: IntoIterator<Item = &'r Region> {
		regions.into_iter()
			.map(Region::bounding_box)
			.fold(None, |union: Option<BoundingBox>, bounds| Some(match union {
				Some(union) => union.union(&bounds),
				None => bounds
			}))
	}
}

/// Named regions of a schematic, keeping the union of their bounding boxes current.
pub type RegionMap = ObservedMap<String, Region, Enclosure>;

pub fn region_map() -> RegionMap {
	ObservedMap::new(Enclosure::default(), |name: &String, _: &Region| {
		if name.is_empty() {
			Err("region names cannot be empty".to_string())
		} else {
			Ok(())
		}
	})
	.on_add(|enclosure: &mut Enclosure, _: &String, region: &Region| {
		if enclosure.stale {
			return;
		}

		let bounds = region.bounding_box();

		enclosure.bounds = Some(match enclosure.bounds {
			Some(union) => union.union(&bounds),
			None => bounds
		});
	})
	.on_remove(|enclosure: &mut Enclosure, _: &String, region: &Region| {
		if let Some(union) = enclosure.bounds {
			if union.shares_face(&region.bounding_box()) {
				enclosure.stale = true;
			}
		}
	})
}
