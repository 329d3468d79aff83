use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use strata_catalog::{Location, MANIFEST_NAME, MemoryCatalog};

use crate::cache::TypeCache;
use crate::error::RegistryError;
use crate::id::ResolverId;
use crate::registry::ResolverRegistry;
use crate::symbol::LoadedType;
use crate::test_fixtures::FixtureRegistry;
use crate::unit::UnitResolver;

fn two_ids(ids: &BTreeSet<ResolverId>) -> (ResolverId, ResolverId) {
	let mut iter = ids.iter().copied();
	(iter.next().unwrap(), iter.next().unwrap())
}

/// An exported symbol present in the archive's byte-code resolves, and
/// repeated resolution returns the pointer-identical cached type.
#[test]
fn test_exported_symbol_resolves_and_caches() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[("pkg.a.Widget", b"widget")])
		.build();
	let ids = registry.register(&[Location::from("mem:a")]).unwrap();
	let archive = registry.get(*ids.first().unwrap()).unwrap();

	let first = archive.resolve("pkg.a.Widget").unwrap();
	assert_eq!(first.origin, Location::from("mem:a"));
	assert_eq!(first.namespace, "pkg.a");
	assert_eq!(&first.bytecode[..], b"widget");

	let second = archive.resolve("pkg.a.Widget").unwrap();
	assert!(Arc::ptr_eq(&first, &second), "cache must pin one type per symbol");
}

/// Every resolver observes the same pinned type for one symbol.
#[test]
fn test_same_type_across_resolvers() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[("pkg.a.Widget", b"widget")])
		.build();
	let unit = UnitResolver::new(registry.clone(), &[Location::from("mem:a")]).unwrap();
	let archive = registry.get(*unit.member_ids().first().unwrap()).unwrap();

	let via_archive = archive.resolve("pkg.a.Widget").unwrap();
	let via_unit = unit.resolve("pkg.a.Widget").unwrap();
	assert!(Arc::ptr_eq(&via_archive, &via_unit));
}

/// A symbol exported and present in B resolves through A once an import edge
/// A -> B is wired, even though it is outside A's own export set.
#[test]
fn test_import_edge_grants_visibility() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[("pkg.a.Widget", b"a")])
		.archive("mem:b", &["pkg.b"], &[("pkg.b.Widget", b"b")])
		.build();
	let ids = registry
		.register(&[Location::from("mem:a"), Location::from("mem:b")])
		.unwrap();
	let (a, b) = two_ids(&ids);
	registry.wire_import(a, b).unwrap();

	let loaded = registry.get(a).unwrap().resolve("pkg.b.Widget").unwrap();
	assert_eq!(loaded.origin, Location::from("mem:b"));
}

/// Cyclic import graphs (A imports B, B imports A) terminate with a
/// not-found failure for unresolvable symbols on either side.
#[test]
fn test_cyclic_imports_terminate() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[])
		.archive("mem:b", &["pkg.b"], &[])
		.build();
	let ids = registry
		.register(&[Location::from("mem:a"), Location::from("mem:b")])
		.unwrap();
	let (a, b) = two_ids(&ids);
	registry.wire_import(a, b).unwrap();
	registry.wire_import(b, a).unwrap();

	let err = registry.get(a).unwrap().resolve("pkg.zzz.Missing").unwrap_err();
	assert_eq!(err.symbol, "pkg.zzz.Missing");
	assert!(registry.get(b).unwrap().resolve("pkg.zzz.Missing").is_err());
}

/// Local lookup only serves namespaces the archive exports, even when the
/// byte-code is physically present.
#[test]
fn test_local_lookup_requires_export() {
	let registry = FixtureRegistry::new()
		.archive(
			"mem:b",
			&["pkg.b"],
			&[("pkg.b.Widget", b"b"), ("hidden.Thing", b"h")],
		)
		.build();
	let ids = registry.register(&[Location::from("mem:b")]).unwrap();
	let archive = registry.get(*ids.first().unwrap()).unwrap();

	assert!(archive.local_lookup("pkg.b.Widget").is_ok());
	assert!(archive.local_lookup("hidden.Thing").is_err(), "unexported namespace");
	assert!(archive.local_lookup("pkg.b.Absent").is_err(), "exported but absent");
}

/// Local lookup never follows imports: the cascade is bounded to one hop.
#[test]
fn test_local_lookup_does_not_cascade() {
	let registry = FixtureRegistry::new()
		.archive("mem:b", &["pkg.x"], &[])
		.archive("mem:c", &["pkg.x"], &[("pkg.x.Deep", b"deep")])
		.build();
	let ids = registry
		.register(&[Location::from("mem:b"), Location::from("mem:c")])
		.unwrap();
	let (b, c) = two_ids(&ids);
	registry.wire_import(b, c).unwrap();

	let archive_b = registry.get(b).unwrap();
	assert!(archive_b.resolve("pkg.x.Deep").is_ok(), "resolve cascades one hop");
	assert!(archive_b.local_lookup("pkg.x.Deep").is_err(), "local lookup must not");
}

/// A cache entry published through another archive never satisfies local
/// lookup: visibility requires the byte-code to be locally present, even
/// after the process-wide cache is warm.
#[test]
fn test_local_lookup_rejects_foreign_cache_entries() {
	let registry = FixtureRegistry::new()
		.archive("mem:b", &["pkg.x"], &[])
		.archive("mem:c", &["pkg.x"], &[("pkg.x.Deep", b"deep")])
		.build();
	let ids = registry
		.register(&[Location::from("mem:b"), Location::from("mem:c")])
		.unwrap();
	let (b, c) = two_ids(&ids);

	// Warm the cache through the owning archive.
	let loaded = registry.get(c).unwrap().resolve("pkg.x.Deep").unwrap();
	assert_eq!(loaded.origin, Location::from("mem:c"));

	// The non-owning archive exports the namespace but holds no byte-code;
	// the warm cache must not make it answer for the owner.
	assert!(registry.get(b).unwrap().local_lookup("pkg.x.Deep").is_err());

	// The owner still serves the pinned entry.
	let again = registry.get(c).unwrap().local_lookup("pkg.x.Deep").unwrap();
	assert!(Arc::ptr_eq(&loaded, &again));
}

/// A symbol on the host default path whose namespace no archive exports is
/// found through the unit resolver, never through an archive's local lookup.
#[test]
fn test_host_symbol_unexported_namespace() {
	let registry = FixtureRegistry::new()
		.host(MemoryCatalog::builder("host:std").with_type("util.Helper", b"help").build())
		.archive("mem:a", &["pkg.a"], &[])
		.build();
	let unit = UnitResolver::new(registry.clone(), &[Location::from("mem:a")]).unwrap();

	assert!(registry.ids_exporting("util.Helper").is_empty());
	let member = registry.get(*unit.member_ids().first().unwrap()).unwrap();
	assert!(member.local_lookup("util.Helper").is_err());

	let loaded = unit.resolve("util.Helper").unwrap();
	assert_eq!(loaded.origin, Location::from("host:std"));
}

/// Symbols on the common search path serve archives whose own search fails,
/// via the namespace-filtered fallback hop.
#[test]
fn test_common_path_serves_unexported() {
	let registry = FixtureRegistry::new().archive("mem:a", &["pkg.a"], &[]).build();
	let ids = registry.register(&[Location::from("mem:a")]).unwrap();
	registry.common().add_location(Arc::new(
		MemoryCatalog::builder("mem:common").with_type("shared.Util", b"util").build(),
	));

	let loaded = registry.get(*ids.first().unwrap()).unwrap().resolve("shared.Util").unwrap();
	assert_eq!(loaded.origin, Location::from("mem:common"));
}

/// The common resolver's top-level resolve scans every registered archive,
/// not just namespace-index candidates.
#[test]
fn test_common_resolve_scans_all_archives() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[])
		.archive("mem:b", &["pkg.b"], &[("pkg.b.Widget", b"b")])
		.build();
	registry
		.register(&[Location::from("mem:a"), Location::from("mem:b")])
		.unwrap();

	let loaded = registry.common().resolve("pkg.b.Widget").unwrap();
	assert_eq!(loaded.origin, Location::from("mem:b"));
	assert!(registry.common().resolve("pkg.zzz.Missing").is_err());
}

/// The namespace index returns exactly the exporting archive's id.
#[test]
fn test_ids_exporting_exact() {
	let registry = FixtureRegistry::new()
		.archive("mem:x", &["x"], &[])
		.archive("mem:y", &["y"], &[])
		.build();
	let ids = registry
		.register(&[Location::from("mem:x"), Location::from("mem:y")])
		.unwrap();
	let (x, y) = two_ids(&ids);

	assert_eq!(registry.ids_exporting("x.Thing"), BTreeSet::from([x]));
	assert_eq!(registry.ids_exporting("y.Thing"), BTreeSet::from([y]));
	assert!(registry.ids_exporting("z.Thing").is_empty());
}

/// Resource enumeration is a union: every source holding the name appears,
/// members first, then the common path, then the unit's own path.
#[test]
fn test_resource_enumeration_union() {
	let svc = "META-INF/service.txt";
	let registry = FixtureRegistry::new()
		.archive_catalog(
			"mem:a",
			&["pkg.a"],
			MemoryCatalog::builder("mem:a").with_resource(svc, b"from-a").build(),
		)
		.archive_catalog(
			"mem:b",
			&["pkg.b"],
			MemoryCatalog::builder("mem:b").with_resource(svc, b"from-b").build(),
		)
		.build();
	let unit = UnitResolver::new(
		registry.clone(),
		&[Location::from("mem:a"), Location::from("mem:b")],
	)
	.unwrap();
	registry.common().add_location(Arc::new(
		MemoryCatalog::builder("mem:common").with_resource(svc, b"from-common").build(),
	));
	unit.add_location(Arc::new(
		MemoryCatalog::builder("mem:own").with_resource(svc, b"from-own").build(),
	));

	let hits = unit.resources(svc);
	let origins: Vec<Location> = hits.iter().map(|hit| hit.origin.clone()).collect();
	assert_eq!(
		origins,
		vec![
			Location::from("mem:a"),
			Location::from("mem:b"),
			Location::from("mem:common"),
			Location::from("mem:own"),
		]
	);

	// First-match lookup takes the first member hit.
	let first = unit.resource(svc).unwrap();
	assert_eq!(first.origin, Location::from("mem:a"));
	assert_eq!(&first.data[..], b"from-a");
}

/// Location enumeration is a true union of members, common path and own path.
#[test]
fn test_locations_union() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[])
		.archive("mem:b", &["pkg.b"], &[])
		.build();
	let unit = UnitResolver::new(
		registry.clone(),
		&[Location::from("mem:a"), Location::from("mem:b")],
	)
	.unwrap();
	registry.common().add_location(Arc::new(MemoryCatalog::empty("mem:common")));
	unit.add_location(Arc::new(MemoryCatalog::empty("mem:own")));

	assert_eq!(
		unit.locations(),
		vec![
			Location::from("mem:a"),
			Location::from("mem:b"),
			Location::from("mem:common"),
			Location::from("mem:own"),
		]
	);
}

/// Registering an empty location is a precondition violation.
#[test]
fn test_register_empty_location() {
	let registry = FixtureRegistry::new().build();
	let err = registry.register(&[Location::from("")]).unwrap_err();
	assert!(matches!(err, RegistryError::InvalidArgument(_)));
}

/// Registration is all-or-nothing: one failing location leaves the registry
/// untouched.
#[test]
fn test_register_all_or_nothing() {
	let registry = FixtureRegistry::new().archive("mem:a", &["pkg.a"], &[]).build();
	let err = registry
		.register(&[Location::from("mem:a"), Location::from("mem:unknown")])
		.unwrap_err();
	assert!(matches!(err, RegistryError::Metadata(_)));
	assert!(registry.all_ids().is_empty(), "no partial registration");
}

/// Wiring imports against unknown ids fails without mutating anything.
#[test]
fn test_wire_import_unknown_id() {
	let registry = FixtureRegistry::new().archive("mem:a", &["pkg.a"], &[]).build();
	let ids = registry.register(&[Location::from("mem:a")]).unwrap();
	let a = *ids.first().unwrap();
	let bogus = ResolverId::new(999);

	assert!(matches!(
		registry.wire_import(a, bogus).unwrap_err(),
		RegistryError::InvalidArgument(_)
	));
	assert!(matches!(
		registry.wire_import(bogus, a).unwrap_err(),
		RegistryError::InvalidArgument(_)
	));
	assert!(registry.get(a).unwrap().imported_ids().is_empty());
}

/// Diagnostic broadcasts fan out to every member (which gate on their export
/// sets), the common resolver and the unit's own flags.
#[test]
fn test_diagnostics_broadcast() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[])
		.archive("mem:b", &["pkg.b"], &[])
		.build();
	let unit = UnitResolver::new(
		registry.clone(),
		&[Location::from("mem:a"), Location::from("mem:b")],
	)
	.unwrap();
	let (a, b) = two_ids(unit.member_ids());
	let archive_a = registry.get(a).unwrap();
	let archive_b = registry.get(b).unwrap();

	unit.set_namespace_diagnostics("pkg.a", true);
	assert!(archive_a.diagnostics().enabled_for("pkg.a.Widget"));
	assert!(!archive_b.diagnostics().enabled_for("pkg.b.Widget"), "gated by export set");
	assert!(unit.diagnostics().enabled_for("pkg.a.Widget"));
	assert!(registry.common().diagnostics().enabled_for("pkg.a.Widget"));

	unit.set_symbol_diagnostics("pkg.b.Widget", true);
	assert!(archive_b.diagnostics().enabled_for("pkg.b.Widget"));
	assert!(!archive_a.diagnostics().enabled_for("pkg.b.Widget"));

	unit.set_default_diagnostics(true);
	assert!(archive_a.diagnostics().enabled_for("anything.Else"));

	unit.clear_diagnostics();
	assert!(!archive_a.diagnostics().enabled_for("pkg.a.Widget"));
	assert!(!archive_b.diagnostics().enabled_for("pkg.b.Widget"));
	assert!(!unit.diagnostics().enabled_for("pkg.a.Widget"));
}

/// Every resolver renders a trace-friendly one-line description.
#[test]
fn test_resolver_display() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[])
		.build();
	let unit = UnitResolver::new(registry.clone(), &[Location::from("mem:a")]).unwrap();
	let id = *unit.member_ids().first().unwrap();
	registry.wire_import(id, id).unwrap();

	let archive = registry.get(id).unwrap();
	assert_eq!(
		archive.to_string(),
		format!("ArchiveResolver[{id}, location=mem:a, exports={{\"pkg.a\"}}, imports={{{id}}}]"),
	);
	assert_eq!(registry.common().to_string(), "CommonResolver[path=[]]");
	assert_eq!(
		unit.to_string(),
		format!("UnitResolver[members={{{id}}}, own=[]]"),
	);
}

/// The full wiring scenario: A (exports pkg.a) imports B (exports pkg.b).
/// `pkg.b.Widget` resolves via A; `pkg.c.Missing` exhausts every hop and
/// fails with not-found.
#[test]
fn test_full_scenario() {
	let registry = FixtureRegistry::new()
		.archive("mem:l1", &["pkg.a"], &[("pkg.a.Widget", b"a")])
		.archive("mem:l2", &["pkg.b"], &[("pkg.b.Widget", b"b")])
		.build();
	let unit = UnitResolver::new(
		registry.clone(),
		&[Location::from("mem:l1"), Location::from("mem:l2")],
	)
	.unwrap();
	let (a, b) = two_ids(unit.member_ids());
	registry.wire_import(a, b).unwrap();

	let loaded = registry.get(a).unwrap().resolve("pkg.b.Widget").unwrap();
	assert_eq!(loaded.origin, Location::from("mem:l2"));

	assert_eq!(registry.get(a).unwrap().resolve("pkg.c.Missing").unwrap_err().symbol, "pkg.c.Missing");
	assert_eq!(unit.resolve("pkg.c.Missing").unwrap_err().symbol, "pkg.c.Missing");
}

/// Dropping a unit façade never frees its member archives; the registry owns
/// them until it is torn down.
#[test]
fn test_unit_drop_keeps_archives() {
	let registry = FixtureRegistry::new()
		.archive("mem:a", &["pkg.a"], &[("pkg.a.Widget", b"a")])
		.build();
	let unit = UnitResolver::new(registry.clone(), &[Location::from("mem:a")]).unwrap();
	let id = *unit.member_ids().first().unwrap();
	drop(unit);

	let archive = registry.get(id).expect("archive must outlive the unit");
	assert!(archive.resolve("pkg.a.Widget").is_ok());
}

/// The cache pins the first publication of a symbol; later inserts return
/// the existing entry.
#[test]
fn test_cache_insert_idempotent() {
	let cache = TypeCache::new();
	let first = cache.insert(LoadedType::new(
		"pkg.a.Widget",
		Arc::from(&b"one"[..]),
		Location::from("mem:one"),
	));
	let second = cache.insert(LoadedType::new(
		"pkg.a.Widget",
		Arc::from(&b"two"[..]),
		Location::from("mem:two"),
	));
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(second.origin, Location::from("mem:one"));
	assert_eq!(cache.len(), 1);
}

/// End-to-end with the default kernel wiring: directory archives with
/// manifest metadata, registered through a unit resolver.
#[test]
fn test_dir_registry_end_to_end() {
	let root = tempfile::tempdir().unwrap();
	let dir_a = root.path().join("a");
	let dir_b = root.path().join("b");
	fs::create_dir_all(dir_a.join("pkg/a")).unwrap();
	fs::create_dir_all(dir_b.join("pkg/b")).unwrap();
	fs::write(dir_a.join(MANIFEST_NAME), "[archive]\nexports = [\"pkg.a\"]\n").unwrap();
	fs::write(dir_b.join(MANIFEST_NAME), "[archive]\nexports = [\"pkg.b\"]\n").unwrap();
	fs::write(dir_a.join("pkg/a/Widget.tc"), b"widget-a").unwrap();
	fs::write(dir_b.join("pkg/b/Widget.tc"), b"widget-b").unwrap();

	let registry = ResolverRegistry::new();
	let unit = UnitResolver::new(
		registry.clone(),
		&[Location::from(dir_a.as_path()), Location::from(dir_b.as_path())],
	)
	.unwrap();
	let (a, b) = two_ids(unit.member_ids());
	registry.wire_import(a, b).unwrap();

	let loaded = registry.get(a).unwrap().resolve("pkg.b.Widget").unwrap();
	assert_eq!(&loaded.bytecode[..], b"widget-b");
	assert_eq!(&unit.resolve("pkg.a.Widget").unwrap().bytecode[..], b"widget-a");
	assert!(unit.resolve("pkg.c.Missing").is_err());

	// Manifests are also plain resources.
	let manifest = unit.resource(MANIFEST_NAME).unwrap();
	assert_eq!(manifest.origin, Location::from(dir_a.as_path()));
}

/// Registrations interleave with lookups without deadlocking: lookups clone
/// resolver handles out of the lock before resolving.
#[test]
fn test_concurrent_register_and_resolve() {
	let mut fixture = FixtureRegistry::new()
		.archive("mem:base", &["pkg.base"], &[("pkg.base.Widget", b"base")]);
	for i in 0..16 {
		fixture = fixture.archive(&format!("mem:extra{i}"), &["pkg.extra"], &[]);
	}
	let registry = fixture.build();
	let unit = UnitResolver::new(registry.clone(), &[Location::from("mem:base")]).unwrap();

	std::thread::scope(|scope| {
		let reg = registry.clone();
		scope.spawn(move || {
			for i in 0..16 {
				reg.register(&[Location::from(format!("mem:extra{i}").as_str())]).unwrap();
			}
		});
		for _ in 0..4 {
			let unit = &unit;
			scope.spawn(move || {
				for _ in 0..64 {
					assert!(unit.resolve("pkg.base.Widget").is_ok());
					assert!(unit.resolve("pkg.base.Missing").is_err());
				}
			});
		}
	});

	assert_eq!(registry.all_ids().len(), 17);
}
