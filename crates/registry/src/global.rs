//! Process-wide registry instance.

use std::sync::OnceLock;

use crate::error::RegistryError;
use crate::module::ModuleTable;
use crate::registry::ClassRegistry;
use crate::settings::Settings;

static REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();

/// Returns the process-wide registry, creating it on first access.
///
/// The default instance is lazy, walks the link-time module table, and reads
/// [`Settings::load`]. Unreadable settings are logged and replaced by empty
/// ones. Use [`install`] beforehand to choose a different configuration.
pub fn registry() -> &'static ClassRegistry {
	REGISTRY.get_or_init(|| {
		let settings = Settings::load().unwrap_or_else(|error| {
			tracing::error!(%error, "failed to load registry settings; using defaults");
			Settings::default()
		});
		match ClassRegistry::new(ModuleTable::collect(), Some(&settings), true) {
			Ok(registry) => registry,
			Err(error) => {
				tracing::error!(%error, "invalid registry settings; using defaults");
				ClassRegistry::with_roots(ModuleTable::collect(), Vec::new(), false)
			}
		}
	})
}

/// Installs `registry` as the process-wide instance.
///
/// Fails if an instance already exists, including one created by
/// [`registry`].
pub fn install(registry: ClassRegistry) -> Result<&'static ClassRegistry, RegistryError> {
	REGISTRY.set(registry).map_err(|_| RegistryError::AlreadyInstalled)?;
	Ok(self::registry())
}
