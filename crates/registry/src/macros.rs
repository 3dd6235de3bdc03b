//! Registration macros.
//!
//! Each macro submits a [`ModuleEntry`](crate::ModuleEntry) for the module it
//! is invoked in, so [`ModuleTable::collect`](crate::ModuleTable::collect)
//! sees the binding without any startup code.

/// Declares a record class in the current module.
///
/// Implements [`Item`](crate::Item) for the type and binds it under its own
/// name, making it visible to discovery.
///
/// ```ignore
/// pub struct Product { pub name: String, pub price: u32 }
/// lode_registry::item_class!(Product, fields: [name, price]);
/// ```
#[macro_export]
macro_rules! item_class {
	($ty:ident $(, fields: [$($field:ident),* $(,)?])? $(,)?) => {
		$crate::__private::paste! {
			#[doc(hidden)]
			#[allow(non_upper_case_globals)]
			pub static [<ITEM_CLASS_ $ty>]: $crate::ClassDef = $crate::ClassDef::item::<$ty>(
				stringify!($ty),
				module_path!(),
				&[$($(stringify!($field)),*)?],
			);

			impl $crate::Item for $ty {
				const CLASS: &'static $crate::ClassDef = &[<ITEM_CLASS_ $ty>];
			}

			$crate::__private::inventory::submit! {
				$crate::ModuleEntry::bind(
					module_path!(),
					stringify!($ty),
					$crate::Member::Class($crate::ClassRef::new(&[<ITEM_CLASS_ $ty>])),
				)
			}
		}
	};
}

/// Declares a non-record class in the current module.
///
/// The class resolves through fallback loads but is never discovered.
#[macro_export]
macro_rules! plain_class {
	($ty:ident $(,)?) => {
		$crate::__private::paste! {
			#[doc(hidden)]
			#[allow(non_upper_case_globals)]
			pub static [<PLAIN_CLASS_ $ty>]: $crate::ClassDef = $crate::ClassDef::plain::<$ty>(stringify!($ty), module_path!());

			$crate::__private::inventory::submit! {
				$crate::ModuleEntry::bind(
					module_path!(),
					stringify!($ty),
					$crate::Member::Class($crate::ClassRef::new(&[<PLAIN_CLASS_ $ty>])),
				)
			}
		}
	};
}

/// Re-exports a record class declared elsewhere under `$alias` in the
/// current module. Discovery skips re-exports.
#[macro_export]
macro_rules! item_reexport {
	($alias:ident = $ty:ty $(,)?) => {
		$crate::__private::inventory::submit! {
			$crate::ModuleEntry::bind(
				module_path!(),
				stringify!($alias),
				$crate::Member::Class($crate::ClassRef::new(<$ty as $crate::Item>::CLASS)),
			)
		}
	};
}

/// Binds a non-class value name in the current module.
#[macro_export]
macro_rules! module_value {
	($name:ident $(,)?) => {
		$crate::__private::inventory::submit! {
			$crate::ModuleEntry::bind(module_path!(), stringify!($name), $crate::Member::Value)
		}
	};
}

/// Declares the current module so it can be walked or imported even when it
/// binds nothing.
#[macro_export]
macro_rules! item_module {
	() => {
		$crate::__private::inventory::submit! {
			$crate::ModuleEntry::declare(module_path!())
		}
	};
}
