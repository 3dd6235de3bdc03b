use std::collections::BTreeMap;
use std::ops::Bound;

use super::{Member, Module, ModuleEntry, ModuleIter, ModuleWalker, path};
use crate::class::{ClassDef, ClassRef};
use crate::error::ImportError;

/// Sorted map from dotted module path to [`Module`].
///
/// Every ancestor of a registered module is present as an implicit, empty
/// package, so `shop` and `shop.items` resolve once `shop.items.product`
/// is registered.
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
	modules: BTreeMap<String, Module>,
}

impl ModuleTable {
	pub fn builder() -> ModuleTableBuilder {
		ModuleTableBuilder::default()
	}

	/// Builds the table from every [`ModuleEntry`] linked into the binary.
	pub fn collect() -> Self {
		let mut builder = Self::builder();
		let mut count = 0usize;
		for entry in inventory::iter::<ModuleEntry> {
			builder.push(entry);
			count += 1;
		}
		let table = builder.build();
		tracing::debug!(entries = count, modules = table.len(), "collected module table");
		table
	}

	pub fn len(&self) -> usize {
		self.modules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.modules.is_empty()
	}

	/// Returns true when `path` names a module or package.
	pub fn contains(&self, path: &str) -> bool {
		self.modules.contains_key(&path::normalize(path))
	}

	/// Iterates module paths in sorted order.
	pub fn module_names(&self) -> impl Iterator<Item = &str> {
		self.modules.keys().map(String::as_str)
	}
}

impl ModuleWalker for ModuleTable {
	fn walk(&self, root: &str) -> Result<ModuleIter<'_>, ImportError> {
		let root = path::normalize(root);
		if !self.modules.contains_key(&root) {
			return Err(ImportError::ModuleNotFound(root));
		}

		// Keys sharing the `root` prefix are contiguous in sorted order; the
		// filter drops siblings such as `shop.items_extra`.
		let range = self.modules.range::<str, _>((Bound::Included(root.as_str()), Bound::Unbounded));
		let prefix = root.clone();
		Ok(Box::new(
			range
				.take_while(move |(name, _)| name.starts_with(prefix.as_str()))
				.filter(move |(name, _)| path::is_within(name, &root))
				.map(|(_, module)| Ok(module)),
		))
	}

	fn import_module(&self, module: &str) -> Result<&Module, ImportError> {
		let module = path::normalize(module);
		self.modules.get(&module).ok_or(ImportError::ModuleNotFound(module))
	}
}

/// Explicit registration of modules and bindings.
#[derive(Debug, Default)]
pub struct ModuleTableBuilder {
	modules: BTreeMap<String, Module>,
}

impl ModuleTableBuilder {
	/// Declares a module with no bindings of its own.
	pub fn module(mut self, module: &str) -> Self {
		self.entry(module);
		self
	}

	/// Binds `class` under its own name in `module`.
	///
	/// Binding a class in a module other than its declaring module is a
	/// re-export.
	pub fn class(self, module: &str, class: &'static ClassDef) -> Self {
		self.bind(module, class.name, Member::Class(ClassRef::new(class)))
	}

	/// Binds a non-class value under `name` in `module`.
	pub fn value(self, module: &str, name: &'static str) -> Self {
		self.bind(module, name, Member::Value)
	}

	/// Binds `member` under `name` in `module`.
	pub fn bind(mut self, module: &str, name: &'static str, member: Member) -> Self {
		self.entry(module).bind(name, member);
		self
	}

	pub fn push(&mut self, entry: &ModuleEntry) {
		let module = self.entry(entry.module);
		if let Some((name, member)) = entry.binding {
			module.bind(name, member);
		}
	}

	pub fn build(mut self) -> ModuleTable {
		let packages: Vec<String> = self
			.modules
			.keys()
			.flat_map(|name| path::ancestors(name).map(str::to_owned))
			.collect();
		for package in packages {
			self.modules.entry(package.clone()).or_insert_with(|| Module::new(package));
		}
		ModuleTable { modules: self.modules }
	}

	fn entry(&mut self, module: &str) -> &mut Module {
		let name = path::normalize(module);
		self.modules.entry(name.clone()).or_insert_with(|| Module::new(name))
	}
}
