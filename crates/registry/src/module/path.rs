//! Module path helpers.
//!
//! Paths are accepted in dotted form (`shop.items.product`) and in
//! `module_path!()` form (`shop::items::product`); both normalize to dotted.

/// Iterates the non-empty segments of a module path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
	path.split(['.', ':']).filter(|s| !s.is_empty())
}

/// Normalizes a module path to dotted form.
pub fn normalize(path: &str) -> String {
	segments(path).collect::<Vec<_>>().join(".")
}

/// Compares two module paths segment-wise.
pub fn same_module(a: &str, b: &str) -> bool {
	segments(a).eq(segments(b))
}

/// Returns true when `module` is `root` itself or lies beneath it.
///
/// Both arguments must already be dotted.
pub fn is_within(module: &str, root: &str) -> bool {
	module.strip_prefix(root).is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Splits a class path on its last separator into `(module, name)`.
///
/// Returns `None` when either side would be empty.
pub fn split_class_path(path: &str) -> Option<(String, &str)> {
	let idx = path.rfind(['.', ':'])?;
	let name = &path[idx + 1..];
	let module = normalize(&path[..idx]);
	if name.is_empty() || module.is_empty() {
		return None;
	}
	Some((module, name))
}

/// Yields every strict ancestor of a dotted path, outermost first.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
	path.match_indices('.').map(move |(idx, _)| &path[..idx])
}
