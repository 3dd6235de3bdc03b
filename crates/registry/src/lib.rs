//! Lazy, name-indexed registry of item classes.
//!
//! Item classes (record types) are declared in ordinary modules with
//! [`item_class!`]. The [`ClassRegistry`] discovers them by walking the
//! configured item modules and resolves them by short name, or by full
//! dotted path when the name was never discovered.
//!
//! ```ignore
//! mod items {
//!     pub struct Product { pub name: String }
//!     lode_registry::item_class!(Product, fields: [name]);
//! }
//!
//! let registry = lode_registry::registry();
//! let product = registry.get("Product")?;
//! let same = registry.load("my_crate.items.Product");
//! ```
//!
//! # Modules
//!
//! - [`class`] - class descriptors and the [`Item`] marker
//! - [`module`] - the module table and the [`ModuleWalker`] seam
//! - [`registry`] - discovery, lookup and fallback loading
//! - [`settings`] - the configuration source
//! - [`error`] - error types

pub mod class;
pub mod error;
mod global;
mod macros;
pub mod module;
pub mod registry;
pub mod settings;

pub use class::{ClassDef, ClassKind, ClassRef, Item};
pub use error::{ConfigurationError, ImportError, RegistryError, ResolutionError, SettingsError};
pub use global::{install, registry};
pub use module::{Member, Module, ModuleEntry, ModuleIter, ModuleTable, ModuleTableBuilder, ModuleWalker};
pub use registry::{ClassRegistry, Occurrence, import_class, iter_item_classes};
pub use settings::Settings;

#[doc(hidden)]
pub mod __private {
	pub use inventory;
	pub use paste::paste;
}
