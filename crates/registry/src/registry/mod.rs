//! The class registry: bulk discovery, lookup and fallback loading.
//!
//! Lookups first consult the discovery index. [`ClassRegistry::load`] adds a
//! second tier: a miss on a dotted path imports the path directly and caches
//! the result under the requested string.
//!
//! Discovery runs at most once implicitly. The first [`list`] or [`get`]
//! walks every configured root; afterwards the registry only re-walks when
//! [`discover_all`] is called again.
//!
//! [`list`]: ClassRegistry::list
//! [`get`]: ClassRegistry::get
//! [`discover_all`]: ClassRegistry::discover_all

mod discovery;
mod resolve;
#[cfg(test)]
mod tests;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

pub use self::discovery::iter_item_classes;
pub use self::resolve::import_class;
use crate::class::ClassRef;
use crate::error::{ConfigurationError, RegistryError};
use crate::module::{ModuleTable, ModuleWalker};
use crate::settings::{BOT_NAME, Settings};

/// One module in which a class name was found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
	pub module: String,
	pub class_name: String,
}

#[derive(Debug, Default)]
struct RegistryState {
	roots: Vec<String>,
	items: FxHashMap<String, ClassRef>,
	found: FxHashMap<String, Vec<Occurrence>>,
	loaded: bool,
}

/// Name-indexed registry of item classes.
///
/// All methods take `&self`; discovery and index mutation are serialized by
/// an internal lock so a shared instance can be used from several threads.
pub struct ClassRegistry<W = ModuleTable> {
	walker: W,
	warn_only: bool,
	state: Mutex<RegistryState>,
}

impl ClassRegistry<ModuleTable> {
	/// Creates a registry over the link-time module table and the project
	/// settings from [`Settings::load`].
	pub fn from_inventory(lazy: bool) -> Result<Self, RegistryError> {
		Self::new(ModuleTable::collect(), None, lazy)
	}
}

impl<W: ModuleWalker> ClassRegistry<W> {
	/// Creates a registry.
	///
	/// Roots come from `ITEM_MODULES`. Unless `lazy`, discovery runs
	/// immediately with `<BOT_NAME>.items` appended to the roots. Without
	/// `settings`, [`Settings::load`] supplies them.
	pub fn new(walker: W, settings: Option<&Settings>, lazy: bool) -> Result<Self, RegistryError> {
		let loaded;
		let settings = match settings {
			Some(settings) => settings,
			None => {
				loaded = Settings::load()?;
				&loaded
			}
		};

		let registry = Self::with_roots(walker, settings.item_modules()?, settings.warn_only()?);

		if !lazy {
			let bot_name = settings.bot_name()?.ok_or(ConfigurationError::MissingSetting(BOT_NAME))?;
			registry.discover_all(Some(&format!("{bot_name}.items")))?;
		}

		Ok(registry)
	}

	/// Creates a lazy registry over explicit roots, bypassing settings.
	pub(crate) fn with_roots(walker: W, roots: Vec<String>, warn_only: bool) -> Self {
		Self {
			walker,
			warn_only,
			state: Mutex::new(RegistryState {
				roots,
				..RegistryState::default()
			}),
		}
	}

	/// Walks every configured root and indexes the item classes found.
	///
	/// `extra_root` is appended to the configured roots first. A root that
	/// cannot be walked aborts discovery with an error, unless
	/// `ITEM_LOADER_WARN_ONLY` is set, in which case it is logged and skipped.
	/// Classes indexed before a failure stay indexed either way.
	pub fn discover_all(&self, extra_root: Option<&str>) -> Result<(), ConfigurationError> {
		let mut state = self.state.lock();
		if let Some(root) = extra_root {
			state.roots.push(root.to_owned());
		}
		self.discover_locked(&mut state)
	}

	/// Returns every indexed name, bootstrapping discovery if needed.
	///
	/// Order is unspecified.
	pub fn list(&self) -> Result<Vec<String>, ConfigurationError> {
		let mut state = self.state.lock();
		self.ensure_loaded(&mut state)?;
		Ok(state.items.keys().cloned().collect())
	}

	/// Looks up an indexed class by name, bootstrapping discovery if needed.
	///
	/// Never imports; an empty name returns `None` without bootstrapping.
	pub fn get(&self, name: &str) -> Result<Option<ClassRef>, ConfigurationError> {
		if name.is_empty() {
			return Ok(None);
		}
		let mut state = self.state.lock();
		self.ensure_loaded(&mut state)?;
		Ok(state.items.get(name).copied())
	}

	/// Resolves `path` as a short name, a previously loaded path, or a dotted
	/// `<module>.<Class>` path imported on demand.
	///
	/// Successful imports are cached under `path` itself. Every failure is
	/// logged and reported as `None`.
	pub fn load(&self, path: &str) -> Option<ClassRef> {
		match self.get(path) {
			Ok(Some(class)) => return Some(class),
			Ok(None) if path.is_empty() => return None,
			Ok(None) => {}
			Err(error) => {
				tracing::warn!(path, %error, "class not found");
				return None;
			}
		}

		match import_class(&self.walker, path) {
			Ok(class) => {
				self.state.lock().items.insert(path.to_owned(), class);
				tracing::debug!(path, class = %class, "cached class loaded by path");
				Some(class)
			}
			Err(error) => {
				tracing::warn!(path, %error, "class not found");
				None
			}
		}
	}

	/// Returns true once a discovery run has completed.
	pub fn is_loaded(&self) -> bool {
		self.state.lock().loaded
	}

	/// Configured discovery roots in search order.
	pub fn roots(&self) -> Vec<String> {
		self.state.lock().roots.clone()
	}

	/// Modules in which a class called `name` was found by the latest
	/// discovery run.
	pub fn occurrences(&self, name: &str) -> Vec<Occurrence> {
		self.state.lock().found.get(name).cloned().unwrap_or_default()
	}

	/// Names found in more than one module, sorted by name.
	pub fn duplicates(&self) -> Vec<(String, Vec<Occurrence>)> {
		let state = self.state.lock();
		let mut dups: Vec<_> = state
			.found
			.iter()
			.filter(|(_, seen)| seen.len() > 1)
			.map(|(name, seen)| (name.clone(), seen.clone()))
			.collect();
		dups.sort_by(|a, b| a.0.cmp(&b.0));
		dups
	}

	#[cfg(test)]
	fn walker(&self) -> &W {
		&self.walker
	}

	fn ensure_loaded(&self, state: &mut RegistryState) -> Result<(), ConfigurationError> {
		if state.loaded {
			return Ok(());
		}
		self.discover_locked(state)
	}
}

impl<W> core::fmt::Debug for ClassRegistry<W> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("ClassRegistry")
			.field("roots", &state.roots)
			.field("items", &state.items.len())
			.field("loaded", &state.loaded)
			.field("warn_only", &self.warn_only)
			.finish()
	}
}
