//! Configuration source for the registry.
//!
//! Settings are a flat TOML table keyed by upper-case names:
//!
//! ```toml
//! BOT_NAME = "shop"
//! ITEM_MODULES = ["shop.items", "catalog.items"]
//! ITEM_LOADER_WARN_ONLY = true
//! ```

use std::path::{Path, PathBuf};

use crate::error::SettingsError;

/// Project identifier; the default discovery root is `<BOT_NAME>.items`.
pub const BOT_NAME: &str = "BOT_NAME";
/// Roots searched by discovery.
pub const ITEM_MODULES: &str = "ITEM_MODULES";
/// Downgrades unresolvable roots from errors to warnings.
pub const ITEM_LOADER_WARN_ONLY: &str = "ITEM_LOADER_WARN_ONLY";

/// Environment variable naming the settings file.
pub const SETTINGS_ENV: &str = "LODE_SETTINGS";
/// Settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "lode.toml";

/// Key/value settings backed by a TOML table.
#[derive(Debug, Clone, Default)]
pub struct Settings {
	values: toml::Table,
}

impl Settings {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
		let values = toml::from_str(content).map_err(|source| SettingsError::Parse { path: None, source })?;
		Ok(Self { values })
	}

	pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
		let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let values = toml::from_str(&content).map_err(|source| SettingsError::Parse {
			path: Some(path.to_path_buf()),
			source,
		})?;
		Ok(Self { values })
	}

	/// Loads the project settings.
	///
	/// Reads the file named by `LODE_SETTINGS`, else `lode.toml` in the
	/// working directory, else returns empty settings.
	pub fn load() -> Result<Self, SettingsError> {
		match Self::locate() {
			Some(path) => {
				tracing::debug!(path = %path.display(), "loading settings");
				Self::from_path(&path)
			}
			None => Ok(Self::default()),
		}
	}

	fn locate() -> Option<PathBuf> {
		if let Some(path) = std::env::var_os(SETTINGS_ENV).filter(|v| !v.is_empty()) {
			return Some(PathBuf::from(path));
		}
		let local = PathBuf::from(DEFAULT_SETTINGS_FILE);
		local.is_file().then_some(local)
	}

	/// Returns the raw value for `key`.
	pub fn get(&self, key: &str) -> Option<&toml::Value> {
		self.values.get(key)
	}

	pub fn set(&mut self, key: &str, value: impl Into<toml::Value>) -> &mut Self {
		self.values.insert(key.to_owned(), value.into());
		self
	}

	/// Builder-style [`set`](Self::set).
	pub fn with(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
		self.set(key, value);
		self
	}

	pub fn get_str(&self, key: &str) -> Result<Option<&str>, SettingsError> {
		match self.get(key) {
			None => Ok(None),
			Some(toml::Value::String(s)) => Ok(Some(s)),
			Some(_) => Err(invalid(key, "a string")),
		}
	}

	/// Reads a list of strings. A plain string is split on commas. Missing
	/// keys read as empty.
	pub fn get_list(&self, key: &str) -> Result<Vec<String>, SettingsError> {
		match self.get(key) {
			None => Ok(Vec::new()),
			Some(toml::Value::String(s)) => Ok(s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect()),
			Some(toml::Value::Array(items)) => items
				.iter()
				.map(|item| item.as_str().map(str::to_owned).ok_or_else(|| invalid(key, "a list of strings")))
				.collect(),
			Some(_) => Err(invalid(key, "a list of strings")),
		}
	}

	/// Reads a flag. Accepts booleans, `0`/`1`, and the strings
	/// `"true"`/`"false"`/`"0"`/`"1"`. Missing keys read as false.
	pub fn get_bool(&self, key: &str) -> Result<bool, SettingsError> {
		match self.get(key) {
			None => Ok(false),
			Some(toml::Value::Boolean(b)) => Ok(*b),
			Some(toml::Value::Integer(0)) => Ok(false),
			Some(toml::Value::Integer(1)) => Ok(true),
			Some(toml::Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
				"true" | "1" => Ok(true),
				"false" | "0" => Ok(false),
				_ => Err(invalid(key, "a boolean")),
			},
			Some(_) => Err(invalid(key, "a boolean")),
		}
	}

	pub fn bot_name(&self) -> Result<Option<&str>, SettingsError> {
		self.get_str(BOT_NAME)
	}

	pub fn item_modules(&self) -> Result<Vec<String>, SettingsError> {
		self.get_list(ITEM_MODULES)
	}

	pub fn warn_only(&self) -> Result<bool, SettingsError> {
		self.get_bool(ITEM_LOADER_WARN_ONLY)
	}
}

fn invalid(key: &str, expected: &'static str) -> SettingsError {
	SettingsError::InvalidType {
		key: key.to_owned(),
		expected,
	}
}
