//! Error taxonomy for discovery, resolution and configuration.

use std::path::PathBuf;

/// A module path could not be imported from the module table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
	/// No module or package is registered under the path.
	#[error("no module named '{0}'")]
	ModuleNotFound(String),
	/// The module exists but the walker could not produce it.
	#[error("module '{module}' failed to import: {reason}")]
	Failed { module: String, reason: String },
}

/// Bulk discovery or construction could not be configured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
	/// A configured root could not be walked.
	#[error("could not load items from module '{root}': {source}")]
	UnresolvableRoot {
		root: String,
		#[source]
		source: ImportError,
	},
	/// A setting required to compute the default root is absent.
	#[error("missing setting: {0}")]
	MissingSetting(&'static str),
}

/// Fallback resolution of a dotted path failed.
///
/// [`ClassRegistry::load`](crate::ClassRegistry::load) absorbs every variant;
/// [`import_class`](crate::import_class) surfaces them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
	/// The path has no separator to split into module and class name.
	#[error("malformed class path '{0}': expected <module>.<Class>")]
	MalformedPath(String),
	/// The containing module could not be imported.
	#[error(transparent)]
	Import(#[from] ImportError),
	/// The module has no binding with the requested name.
	#[error("module '{module}' has no attribute '{name}'")]
	MissingAttribute { module: String, name: String },
	/// The binding exists but is not a class.
	#[error("'{0}' is not a class")]
	NotAClass(String),
}

/// The settings source could not be read.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("failed to read settings file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse settings{}: {source}", .path.as_ref().map(|p| format!(" file {}", p.display())).unwrap_or_default())]
	Parse {
		path: Option<PathBuf>,
		#[source]
		source: toml::de::Error,
	},
	/// A setting holds a value of the wrong shape.
	#[error("setting {key} must be {expected}")]
	InvalidType { key: String, expected: &'static str },
}

/// Errors from constructing or installing a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	#[error(transparent)]
	Configuration(#[from] ConfigurationError),

	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error("a process-wide class registry is already installed")]
	AlreadyInstalled,
}
