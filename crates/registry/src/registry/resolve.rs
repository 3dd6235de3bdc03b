use crate::class::ClassRef;
use crate::error::ResolutionError;
use crate::module::{Member, ModuleWalker, path};

/// Resolves a `<module>.<Class>` path through `walker` without caching.
///
/// Either separator form is accepted. Any class resolves, record class or
/// not; non-class bindings are rejected.
pub fn import_class<W: ModuleWalker + ?Sized>(walker: &W, class_path: &str) -> Result<ClassRef, ResolutionError> {
	let (module_path, name) = path::split_class_path(class_path).ok_or_else(|| ResolutionError::MalformedPath(class_path.to_owned()))?;
	let module = walker.import_module(&module_path)?;
	match module.member(name) {
		Some(Member::Class(class)) => Ok(class),
		Some(Member::Value) => Err(ResolutionError::NotAClass(class_path.to_owned())),
		None => Err(ResolutionError::MissingAttribute {
			module: module_path,
			name: name.to_owned(),
		}),
	}
}
