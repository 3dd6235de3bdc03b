//! Module table and the walker seam used by discovery.
//!
//! Rust has no runtime import machinery, so modules are described statically:
//! each binding a module exposes is registered once (usually by
//! [`item_class!`](crate::item_class) and its sibling macros) and gathered
//! into a [`ModuleTable`]. The registry only sees modules through
//! [`ModuleWalker`], so discovery also runs over hand-built or failing walkers.

pub mod path;
mod table;

pub use table::{ModuleTable, ModuleTableBuilder};

use crate::class::ClassRef;
use crate::error::ImportError;

/// A top-level binding in a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
	/// A class, declared here or re-exported from elsewhere.
	Class(ClassRef),
	/// Any non-class value (constants, functions, submodule aliases).
	Value,
}

/// An importable module and its top-level bindings.
#[derive(Debug, Clone, Default)]
pub struct Module {
	name: String,
	members: Vec<(&'static str, Member)>,
}

impl Module {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			members: Vec::new(),
		}
	}

	/// Fully-qualified dotted name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Bindings in registration order.
	pub fn members(&self) -> impl Iterator<Item = (&'static str, Member)> + '_ {
		self.members.iter().copied()
	}

	/// Looks up a binding by name. A later binding of the same name shadows
	/// an earlier one.
	pub fn member(&self, name: &str) -> Option<Member> {
		self.members.iter().rev().find(|(n, _)| *n == name).map(|(_, m)| *m)
	}

	pub(crate) fn bind(&mut self, name: &'static str, member: Member) {
		self.members.push((name, member));
	}
}

/// Lazy sequence of modules produced by [`ModuleWalker::walk`].
pub type ModuleIter<'a> = Box<dyn Iterator<Item = Result<&'a Module, ImportError>> + 'a>;

/// Enumerates and imports modules by dotted path.
pub trait ModuleWalker: Send + Sync {
	/// Yields `root` and every module beneath it, parents before children.
	///
	/// An unresolvable root is an error, never an empty sequence, so callers
	/// can tell an empty package from a bad root. Individual items may also
	/// fail when a submodule cannot be produced.
	fn walk(&self, root: &str) -> Result<ModuleIter<'_>, ImportError>;

	/// Imports a single module.
	fn import_module(&self, path: &str) -> Result<&Module, ImportError>;
}

/// Link-time registration of a module binding.
///
/// Submitted through `inventory` by the registration macros and gathered by
/// [`ModuleTable::collect`].
#[derive(Debug)]
pub struct ModuleEntry {
	pub module: &'static str,
	pub binding: Option<(&'static str, Member)>,
}

inventory::collect!(ModuleEntry);

impl ModuleEntry {
	/// Declares `module` without binding anything in it.
	pub const fn declare(module: &'static str) -> Self {
		Self { module, binding: None }
	}

	/// Binds `name` to `member` in `module`.
	pub const fn bind(module: &'static str, name: &'static str, member: Member) -> Self {
		Self {
			module,
			binding: Some((name, member)),
		}
	}
}
