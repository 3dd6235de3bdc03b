//! Class descriptors for record types and other module-level classes.

use std::any::TypeId;
use std::hash::{Hash, Hasher};

use crate::module::path;

/// Whether a class is a record class or some other class binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
	/// A record class; implements [`Item`] and participates in discovery.
	Item,
	/// Any other class. Resolvable through fallback loads, never discovered.
	Plain,
}

/// Static descriptor of a class bound in a module.
///
/// Descriptors are declared once, usually through [`item_class!`] or
/// [`plain_class!`], and referenced through [`ClassRef`].
///
/// [`item_class!`]: crate::item_class
/// [`plain_class!`]: crate::plain_class
pub struct ClassDef {
	/// Declared short name.
	pub name: &'static str,
	/// Declaring module, either `module_path!()` form or dotted.
	pub module: &'static str,
	pub kind: ClassKind,
	/// Field names in declaration order, for introspection.
	pub fields: &'static [&'static str],
	type_id: fn() -> TypeId,
}

impl ClassDef {
	/// Describes `T` as a record class declared in `module`.
	pub const fn item<T: 'static>(name: &'static str, module: &'static str, fields: &'static [&'static str]) -> Self {
		Self {
			name,
			module,
			kind: ClassKind::Item,
			fields,
			type_id: TypeId::of::<T>,
		}
	}

	/// Describes `T` as a non-record class declared in `module`.
	pub const fn plain<T: 'static>(name: &'static str, module: &'static str) -> Self {
		Self {
			name,
			module,
			kind: ClassKind::Plain,
			fields: &[],
			type_id: TypeId::of::<T>,
		}
	}

	/// Returns the [`TypeId`] of the described Rust type.
	pub fn rust_type_id(&self) -> TypeId {
		(self.type_id)()
	}
}

impl core::fmt::Debug for ClassDef {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("ClassDef")
			.field("name", &self.name)
			.field("module", &self.module)
			.field("kind", &self.kind)
			.field("fields", &self.fields)
			.finish()
	}
}

/// Handle to a [`ClassDef`] with identity semantics.
///
/// Two handles compare equal only when they point at the same descriptor,
/// which is what "the same class object" means for lookups.
#[derive(Clone, Copy)]
pub struct ClassRef(&'static ClassDef);

impl ClassRef {
	pub const fn new(def: &'static ClassDef) -> Self {
		Self(def)
	}

	pub fn def(self) -> &'static ClassDef {
		self.0
	}

	pub fn name(self) -> &'static str {
		self.0.name
	}

	pub fn kind(self) -> ClassKind {
		self.0.kind
	}

	pub fn is_item(self) -> bool {
		self.0.kind == ClassKind::Item
	}

	/// Dotted path of the declaring module.
	pub fn module(self) -> String {
		path::normalize(self.0.module)
	}

	/// Dotted path `<module>.<name>`.
	pub fn qualified_name(self) -> String {
		format!("{}.{}", self.module(), self.0.name)
	}

	/// Returns true when the class was declared in `module`, whichever
	/// separator either side uses.
	pub fn declared_in(self, module: &str) -> bool {
		path::same_module(self.0.module, module)
	}

	/// Returns true when this class describes the Rust type `T`.
	pub fn is<T: 'static>(self) -> bool {
		self.0.rust_type_id() == TypeId::of::<T>()
	}
}

impl PartialEq for ClassRef {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self.0, other.0)
	}
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::ptr::hash(self.0, state);
	}
}

impl core::fmt::Debug for ClassRef {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "<class {}>", self.qualified_name())
	}
}

impl core::fmt::Display for ClassRef {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.write_str(&self.qualified_name())
	}
}

/// Marker for record classes.
///
/// Implemented by [`item_class!`](crate::item_class), which also registers the
/// type in its declaring module.
pub trait Item: 'static {
	const CLASS: &'static ClassDef;

	fn class() -> ClassRef {
		ClassRef::new(Self::CLASS)
	}
}
