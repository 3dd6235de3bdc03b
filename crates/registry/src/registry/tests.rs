use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::class::ClassDef;
use crate::error::{ImportError, ResolutionError};
use crate::module::{Member, Module, ModuleIter};
use crate::settings::{ITEM_LOADER_WARN_ONLY, ITEM_MODULES};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

struct Product;
struct CatalogProduct;
struct Review;
struct Helper;

static PRODUCT: ClassDef = ClassDef::item::<Product>("Product", "shop.items.product", &["name", "price"]);
static CATALOG_PRODUCT: ClassDef = ClassDef::item::<CatalogProduct>("Product", "catalog::items::product", &["sku"]);
static REVIEW: ClassDef = ClassDef::item::<Review>("Review", "shop.items.review", &["rating"]);
static HELPER: ClassDef = ClassDef::plain::<Helper>("Helper", "shop.items.product");

fn shop_table() -> ModuleTable {
	ModuleTable::builder()
		.class("shop.items.product", &PRODUCT)
		.class("shop.items.product", &HELPER)
		.value("shop.items.product", "CURRENCY")
		.class("shop.items.review", &REVIEW)
		.class("shop.items.review", &PRODUCT)
		.class("catalog.items.product", &CATALOG_PRODUCT)
		.build()
}

fn settings(roots: &[&str]) -> Settings {
	let roots: Vec<toml::Value> = roots.iter().map(|r| toml::Value::from(*r)).collect();
	Settings::new().with(ITEM_MODULES, roots)
}

fn lazy_registry(roots: &[&str]) -> ClassRegistry {
	ClassRegistry::new(shop_table(), Some(&settings(roots)), true).expect("lazy construction never walks")
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
	names.sort();
	names
}

/// Wraps a table, counting imports and optionally failing one module mid-walk.
struct CountingWalker {
	table: ModuleTable,
	imports: AtomicUsize,
	walks: AtomicUsize,
	broken: Option<&'static str>,
}

impl CountingWalker {
	fn new(table: ModuleTable) -> Self {
		Self {
			table,
			imports: AtomicUsize::new(0),
			walks: AtomicUsize::new(0),
			broken: None,
		}
	}
}

impl ModuleWalker for CountingWalker {
	fn walk(&self, root: &str) -> Result<ModuleIter<'_>, ImportError> {
		self.walks.fetch_add(1, Ordering::SeqCst);
		let inner = self.table.walk(root)?;
		let broken = self.broken;
		Ok(Box::new(inner.map(move |module| match module {
			Ok(m) if Some(m.name()) == broken => Err(ImportError::Failed {
				module: m.name().to_owned(),
				reason: "boom".into(),
			}),
			other => other,
		})))
	}

	fn import_module(&self, path: &str) -> Result<&Module, ImportError> {
		self.imports.fetch_add(1, Ordering::SeqCst);
		self.table.import_module(path)
	}
}

#[test]
fn product_scenario() {
	let table = ModuleTable::builder().class("shop.items.product", &PRODUCT).build();
	let registry = ClassRegistry::new(table, Some(&settings(&["shop.items"])), true).unwrap();

	assert_eq!(registry.list().unwrap(), ["Product"]);
	let product = registry.get("Product").unwrap().expect("Product is discovered");
	assert_eq!(product, ClassRef::new(&PRODUCT));
	assert!(product.is::<Product>());

	let by_path = registry.load("shop.items.product.Product").expect("path resolves");
	assert_eq!(by_path, product);
	assert_eq!(registry.get("shop.items.product.Product").unwrap(), Some(product));
	assert_eq!(sorted(registry.list().unwrap()), ["Product", "shop.items.product.Product"]);
}

#[test]
fn discovery_skips_reexports_and_plain_classes() {
	let registry = lazy_registry(&["shop.items"]);
	assert_eq!(sorted(registry.list().unwrap()), ["Product", "Review"]);
	assert_eq!(registry.get("Helper").unwrap(), None);
	assert_eq!(
		registry.occurrences("Product"),
		[Occurrence {
			module: "shop.items.product".into(),
			class_name: "Product".into(),
		}]
	);
	assert!(registry.duplicates().is_empty());
}

#[test]
fn discovery_is_idempotent() {
	let registry = lazy_registry(&["shop.items", "catalog.items"]);
	registry.discover_all(None).unwrap();
	let first: Vec<_> = sorted(registry.list().unwrap()).into_iter().map(|n| (registry.get(&n).unwrap(), n)).collect();

	registry.discover_all(None).unwrap();
	let second: Vec<_> = sorted(registry.list().unwrap()).into_iter().map(|n| (registry.get(&n).unwrap(), n)).collect();

	assert_eq!(first, second);
	assert_eq!(registry.occurrences("Product").len(), 2, "occurrences are rebuilt, not accumulated");
}

#[test]
fn lazy_bootstrap_matches_explicit_discovery() {
	let lazy = lazy_registry(&["shop.items"]);
	assert!(!lazy.is_loaded());
	let via_get = lazy.get("Review").unwrap();
	assert!(lazy.is_loaded());

	let explicit = lazy_registry(&["shop.items"]);
	explicit.discover_all(None).unwrap();
	assert_eq!(via_get, explicit.get("Review").unwrap());
	assert_eq!(via_get, Some(ClassRef::new(&REVIEW)));
}

#[test]
fn bootstrap_runs_once() {
	let walker = CountingWalker::new(shop_table());
	let registry = ClassRegistry::new(walker, Some(&settings(&["shop.items"])), true).unwrap();
	registry.get("Product").unwrap();
	registry.list().unwrap();
	registry.get("Review").unwrap();
	assert_eq!(registry.walker().walks.load(Ordering::SeqCst), 1);
}

#[test]
fn last_scanned_module_wins() {
	let registry = lazy_registry(&["shop.items", "catalog.items"]);
	let product = registry.get("Product").unwrap().unwrap();
	assert_eq!(product, ClassRef::new(&CATALOG_PRODUCT));
	assert_eq!(product.module(), "catalog.items.product");

	let dups = registry.duplicates();
	assert_eq!(dups.len(), 1);
	assert_eq!(dups[0].0, "Product");
	let modules: Vec<_> = dups[0].1.iter().map(|o| o.module.as_str()).collect();
	assert_eq!(modules, ["shop.items.product", "catalog.items.product"]);
}

#[test]
fn overlapping_roots_are_not_duplicates() {
	let registry = lazy_registry(&["shop", "shop.items", "shop.items.product"]);
	registry.discover_all(Some("shop.items")).unwrap();

	assert!(registry.duplicates().is_empty());
	assert_eq!(
		registry.occurrences("Product"),
		[Occurrence {
			module: "shop.items.product".into(),
			class_name: "Product".into(),
		}]
	);
	assert_eq!(sorted(registry.list().unwrap()), ["Product", "Review"]);
}

#[test]
fn default_root_already_configured_is_not_a_duplicate() {
	let settings = settings(&["shop.items"]).with(BOT_NAME, "shop");
	let registry = ClassRegistry::new(shop_table(), Some(&settings), false).unwrap();

	assert_eq!(registry.roots(), ["shop.items", "shop.items"]);
	assert!(registry.duplicates().is_empty());
	assert_eq!(registry.occurrences("Review").len(), 1);
}

/// Counts warning-level events.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
		if *event.metadata().level() == tracing::Level::WARN {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}
}

fn warnings_during(f: impl FnOnce()) -> usize {
	let count = Arc::new(AtomicUsize::new(0));
	let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
	tracing::subscriber::with_default(subscriber, f);
	count.load(Ordering::SeqCst)
}

#[test]
fn absorbed_load_failures_emit_one_warning_each() {
	let registry = lazy_registry(&["shop.items"]);
	registry.discover_all(None).unwrap();

	for path in [
		"not.a.real.module.Bar",
		"shop.items.product.Bar",
		"shop.items.product.CURRENCY",
		"Bar",
	] {
		assert_eq!(warnings_during(|| assert_eq!(registry.load(path), None)), 1, "{path}");
	}
	assert_eq!(warnings_during(|| assert!(registry.load("Review").is_some())), 0);
	assert_eq!(warnings_during(|| assert_eq!(registry.load(""), None)), 0);

	let failing = lazy_registry(&["missing.items"]);
	assert_eq!(warnings_during(|| assert_eq!(failing.load("Product"), None)), 1);
}

#[test]
fn load_caches_fallback_without_reimport() {
	let walker = CountingWalker::new(shop_table());
	let registry = ClassRegistry::new(walker, Some(&settings(&[])), true).unwrap();

	let helper = registry.load("shop.items.product.Helper").expect("plain classes load by path");
	assert_eq!(helper, ClassRef::new(&HELPER));
	assert_eq!(registry.walker().imports.load(Ordering::SeqCst), 1);

	assert_eq!(registry.get("shop.items.product.Helper").unwrap(), Some(helper));
	assert_eq!(registry.load("shop.items.product.Helper"), Some(helper));
	assert_eq!(registry.walker().imports.load(Ordering::SeqCst), 1);
}

#[test]
fn path_key_is_distinct_from_short_name() {
	let registry = lazy_registry(&["shop.items"]);
	let short = registry.get("Product").unwrap().unwrap();

	let reexported = registry.load("shop.items.review.Product").unwrap();
	assert_eq!(reexported, short);
	assert_eq!(sorted(registry.list().unwrap()), ["Product", "Review", "shop.items.review.Product"]);

	let other = registry.load("catalog::items::product::Product").unwrap();
	assert_ne!(other, short);
	assert_eq!(registry.get("Product").unwrap(), Some(short));
	assert_eq!(registry.get("catalog::items::product::Product").unwrap(), Some(other));
	assert_eq!(registry.get("catalog.items.product.Product").unwrap(), None);
}

#[rstest]
#[case::unknown_module("not.a.real.module.Bar")]
#[case::missing_attribute("shop.items.product.Bar")]
#[case::not_a_class("shop.items.product.CURRENCY")]
#[case::no_separator("Bar")]
#[case::empty("")]
fn load_failures_are_absorbed(#[case] path: &str) {
	let registry = lazy_registry(&["shop.items"]);
	let before = sorted(registry.list().unwrap());
	assert_eq!(registry.load(path), None);
	assert_eq!(sorted(registry.list().unwrap()), before, "failed loads are not cached");
}

#[test]
fn import_class_reports_reasons() {
	let table = shop_table();
	assert_eq!(import_class(&table, "Bar"), Err(ResolutionError::MalformedPath("Bar".into())));
	assert_eq!(
		import_class(&table, "not.real.Bar"),
		Err(ResolutionError::Import(ImportError::ModuleNotFound("not.real".into())))
	);
	assert_eq!(
		import_class(&table, "shop.items.product.Bar"),
		Err(ResolutionError::MissingAttribute {
			module: "shop.items.product".into(),
			name: "Bar".into(),
		})
	);
	assert_eq!(
		import_class(&table, "shop.items.product.CURRENCY"),
		Err(ResolutionError::NotAClass("shop.items.product.CURRENCY".into()))
	);
	assert_eq!(import_class(&table, "shop.items.review.Review"), Ok(ClassRef::new(&REVIEW)));
}

#[test]
fn warn_only_skips_unresolvable_roots() {
	let settings = settings(&["missing.items", "shop.items"]).with(ITEM_LOADER_WARN_ONLY, true);
	let registry = ClassRegistry::new(shop_table(), Some(&settings), true).unwrap();

	registry.discover_all(None).expect("warn-only never fails");
	assert!(registry.is_loaded());
	assert_eq!(sorted(registry.list().unwrap()), ["Product", "Review"]);
}

#[test]
fn unresolvable_root_is_fatal_by_default() {
	let registry = lazy_registry(&["shop.items", "missing.items"]);

	let err = registry.discover_all(None).unwrap_err();
	assert_eq!(
		err,
		ConfigurationError::UnresolvableRoot {
			root: "missing.items".into(),
			source: ImportError::ModuleNotFound("missing.items".into()),
		}
	);
	assert!(!registry.is_loaded());
	assert!(registry.get("Product").is_err(), "lookups retry discovery and fail again");
	assert_eq!(registry.load("Product"), None);
}

#[test]
fn fatal_abort_keeps_classes_indexed_before_failure() {
	let mut walker = CountingWalker::new(shop_table());
	walker.broken = Some("shop.items.review");
	let registry = ClassRegistry::new(walker, Some(&settings(&["catalog.items", "shop.items"])), true).unwrap();

	let err = registry.discover_all(None).unwrap_err();
	assert!(matches!(
		err,
		ConfigurationError::UnresolvableRoot {
			ref root,
			source: ImportError::Failed { .. },
		} if root == "shop.items"
	));
	assert!(!registry.is_loaded());

	// `catalog.items` was indexed, then `shop.items.product` before the
	// broken module.
	let found = registry.occurrences("Product");
	assert_eq!(found.len(), 2);
	assert!(registry.occurrences("Review").is_empty());
}

#[test]
fn warn_only_keeps_modules_walked_before_failure() {
	let mut walker = CountingWalker::new(shop_table());
	walker.broken = Some("shop.items.review");
	let settings = settings(&["shop.items"]).with(ITEM_LOADER_WARN_ONLY, "1");
	let registry = ClassRegistry::new(walker, Some(&settings), true).unwrap();

	assert_eq!(registry.list().unwrap(), ["Product"]);
	assert!(registry.is_loaded());
}

#[test]
fn extra_root_is_appended() {
	let registry = lazy_registry(&["shop.items"]);
	registry.discover_all(Some("catalog.items")).unwrap();
	assert_eq!(registry.roots(), ["shop.items", "catalog.items"]);
	assert_eq!(registry.get("Product").unwrap(), Some(ClassRef::new(&CATALOG_PRODUCT)));
}

#[test]
fn eager_construction_uses_bot_name_root() {
	let settings = Settings::new().with(BOT_NAME, "shop");
	let registry = ClassRegistry::new(shop_table(), Some(&settings), false).unwrap();
	assert!(registry.is_loaded());
	assert_eq!(registry.roots(), ["shop.items"]);
	assert_eq!(sorted(registry.list().unwrap()), ["Product", "Review"]);
}

#[test]
fn eager_construction_requires_bot_name() {
	let err = ClassRegistry::new(shop_table(), Some(&Settings::new()), false).unwrap_err();
	assert!(matches!(err, RegistryError::Configuration(ConfigurationError::MissingSetting(BOT_NAME))));
}

#[test]
fn eager_construction_propagates_bad_default_root() {
	let settings = Settings::new().with(BOT_NAME, "warehouse");
	let err = ClassRegistry::new(shop_table(), Some(&settings), false).unwrap_err();
	assert!(matches!(err, RegistryError::Configuration(ConfigurationError::UnresolvableRoot { .. })));
}

#[test]
fn invalid_settings_fail_construction() {
	let settings = Settings::new().with(ITEM_MODULES, 7i64);
	let err = ClassRegistry::new(shop_table(), Some(&settings), true).unwrap_err();
	assert!(matches!(err, RegistryError::Settings(_)));
}

#[test]
fn empty_name_does_not_bootstrap() {
	let registry = lazy_registry(&["missing.items"]);
	assert_eq!(registry.get("").unwrap(), None);
	assert!(!registry.is_loaded());
}

#[test]
fn concurrent_bootstrap_walks_once() {
	let walker = CountingWalker::new(shop_table());
	let registry = ClassRegistry::new(walker, Some(&settings(&["shop.items"])), true).unwrap();

	std::thread::scope(|scope| {
		for _ in 0..8 {
			scope.spawn(|| {
				assert_eq!(registry.get("Review").unwrap(), Some(ClassRef::new(&REVIEW)));
				assert!(registry.load("shop.items.product.Helper").is_some());
			});
		}
	});

	assert_eq!(registry.walker().walks.load(Ordering::SeqCst), 1);
	assert_eq!(registry.get("shop.items.product.Helper").unwrap(), Some(ClassRef::new(&HELPER)));
}

#[test]
fn iter_item_classes_filters_module_members() {
	let table = shop_table();
	let review = table.import_module("shop.items.review").unwrap();
	let classes: Vec<_> = iter_item_classes(review).collect();
	assert_eq!(classes, [ClassRef::new(&REVIEW)]);

	let product = table.import_module("shop.items.product").unwrap();
	assert_eq!(product.member("Helper"), Some(Member::Class(ClassRef::new(&HELPER))));
	assert_eq!(iter_item_classes(product).collect::<Vec<_>>(), [ClassRef::new(&PRODUCT)]);
}
