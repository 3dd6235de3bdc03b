use super::{ClassRegistry, Occurrence, RegistryState};
use crate::class::ClassRef;
use crate::error::{ConfigurationError, ImportError};
use crate::module::{Member, Module, ModuleWalker};

/// Iterates the record classes declared in `module` itself.
///
/// Re-exports (classes bound here but declared elsewhere) and non-record
/// classes are skipped.
pub fn iter_item_classes(module: &Module) -> impl Iterator<Item = ClassRef> + '_ {
	module.members().filter_map(move |(_, member)| match member {
		Member::Class(class) if class.is_item() && class.declared_in(module.name()) => Some(class),
		_ => None,
	})
}

impl<W: ModuleWalker> ClassRegistry<W> {
	pub(super) fn discover_locked(&self, state: &mut RegistryState) -> Result<(), ConfigurationError> {
		state.found.clear();
		let roots = state.roots.clone();

		for root in &roots {
			if let Err(source) = self.walk_root(state, root) {
				if !self.warn_only {
					return Err(ConfigurationError::UnresolvableRoot { root: root.clone(), source });
				}
				tracing::warn!(root = %root, error = %source, "could not load items from module; skipping");
			}
		}

		state.loaded = true;
		tracing::debug!(roots = roots.len(), items = state.items.len(), "item discovery complete");
		report_duplicates(state);
		Ok(())
	}

	fn walk_root(&self, state: &mut RegistryState, root: &str) -> Result<(), ImportError> {
		for module in self.walker.walk(root)? {
			index_module(state, module?);
		}
		Ok(())
	}
}

fn index_module(state: &mut RegistryState, module: &Module) {
	for class in iter_item_classes(module) {
		tracing::trace!(module = module.name(), name = class.name(), "indexed item class");
		let seen = state.found.entry(class.name().to_owned()).or_default();
		// Overlapping roots scan a module more than once per run.
		if !seen.iter().any(|o| o.module == module.name()) {
			seen.push(Occurrence {
				module: module.name().to_owned(),
				class_name: class.name().to_owned(),
			});
		}
		state.items.insert(class.name().to_owned(), class);
	}
}

fn report_duplicates(state: &RegistryState) {
	for (name, seen) in &state.found {
		if seen.len() < 2 {
			continue;
		}
		let modules: Vec<&str> = seen.iter().map(|o| o.module.as_str()).collect();
		tracing::warn!(
			name = %name,
			modules = ?modules,
			"item class name defined in several modules; the last one scanned is used",
		);
	}
}
