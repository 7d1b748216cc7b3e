//! Registry → Container lifecycle tests.
//!
//! Fragment fixtures live either in a `MemorySource` or, for the reload and
//! manifest tests, in an isolated `TempDir`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use leaf_registry::{
    CachingSource, FileSource, Manifest, MemorySource, Registry, ResolvedUnit, Source,
    SourceError, TemplateError, DEFAULT_MANIFEST,
};
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const BASE: &str = "{% block H %}{% endblock %}{% block M %}{% endblock %}{% block F %}{% endblock %}";

fn page_fragments() -> MemorySource {
    MemorySource::from_iter([
        ("path/to/base.html", BASE),
        ("path/to/header.html", "{% block H %}Header{% endblock %}"),
        ("path/to/main.html", "{% block M %}Main{% endblock %}"),
        ("path/to/footer.html", "{% block F %}Footer{% endblock %}"),
    ])
}

fn page_registry() -> Registry {
    let registry = Registry::new(page_fragments());
    registry.define(
        "page",
        [
            "path/to/base.html",
            "path/to/header.html",
            "path/to/footer.html",
            "path/to/main.html",
        ],
    );
    registry
}

/// Counts every load that reaches the wrapped source.
struct CountingSource<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S> CountingSource<S> {
    fn new(inner: S) -> Self {
        CountingSource { inner, calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<S: Source> Source for CountingSource<S> {
    fn load(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load(name)
    }
}

fn execute_to_string(registry: &Registry, name: &str) -> Result<String, TemplateError> {
    let mut sink = Vec::new();
    registry.execute(name, &mut sink, &())?;
    Ok(String::from_utf8(sink).expect("utf8"))
}

// ---------------------------------------------------------------------------
// 1. Registry
// ---------------------------------------------------------------------------

#[test]
fn define_then_execute_fills_every_hole() {
    let registry = page_registry();
    assert_eq!(execute_to_string(&registry, "page").unwrap(), "HeaderMainFooter");
}

#[test]
fn later_fragments_override_same_named_blocks() {
    let registry = Registry::new(MemorySource::from_iter([
        ("f1", "<{% block B %}f1{% endblock %}>"),
        ("f2", "{% block B %}f2{% endblock %}"),
        ("f3", "{% block B %}f3{% endblock %}"),
    ]));
    registry.define("forward", ["f1", "f2", "f3"]);
    registry.define("partial", ["f1", "f3", "f2"]);

    assert_eq!(execute_to_string(&registry, "forward").unwrap(), "<f3>");
    assert_eq!(execute_to_string(&registry, "partial").unwrap(), "<f2>");
}

#[rstest]
#[case("unknown")]
#[case("")]
#[case("page ")]
fn unregistered_names_are_not_found(#[case] name: &str) {
    let registry = page_registry();
    let err = registry.get(name).unwrap_err();
    assert!(err.is_not_found(), "get: {err}");
    let err = execute_to_string(&registry, name).unwrap_err();
    assert!(err.is_not_found(), "execute: {err}");

    let container = registry.compile().expect("compile");
    assert!(container.get(name).unwrap_err().is_not_found());
    let mut sink = Vec::new();
    assert!(container.execute(name, &mut sink, &()).unwrap_err().is_not_found());
}

#[test]
fn set_then_get_renders_like_the_original_unit() {
    let unit = ResolvedUnit::parse("base", "Hello World!").unwrap();
    let registry = Registry::default();
    registry.set("my_template", unit.clone());

    let fetched = registry.get("my_template").unwrap();
    assert!(ResolvedUnit::ptr_eq(&unit, &fetched));
    assert_eq!(fetched.render(&()).unwrap(), unit.render(&()).unwrap());
}

#[test]
fn get_resolves_on_every_call() {
    let source = Arc::new(CountingSource::new(page_fragments()));
    let registry = Registry::with_shared_source(source.clone());
    registry.define("page", ["path/to/base.html", "path/to/main.html"]);

    registry.get("page").unwrap();
    registry.get("page").unwrap();
    assert_eq!(source.calls(), 4, "two fragments, two resolutions");
}

#[test]
fn missing_fragment_error_carries_source_error() {
    let registry = Registry::new(page_fragments());
    registry.define("page", ["path/to/base.html", "path/to/nope.html"]);

    let err = registry.get("page").unwrap_err();
    match &err {
        TemplateError::FragmentLoad { template, fragment, source } => {
            assert_eq!(template, "page");
            assert_eq!(fragment, "path/to/nope.html");
            assert!(source.is_not_found());
        }
        other => panic!("expected FragmentLoad, got: {other}"),
    }
    assert!(err.to_string().contains("path/to/nope.html"));
}

#[test]
fn render_errors_surface_from_execute() {
    let registry = Registry::default();
    registry.set("greet", ResolvedUnit::parse("greet", "Hi {{ who }}").unwrap());

    let err = execute_to_string(&registry, "greet").unwrap_err();
    assert!(matches!(err, TemplateError::Render { .. }), "got: {err}");

    let mut sink = Vec::new();
    registry.execute("greet", &mut sink, &json!({ "who": "there" })).unwrap();
    assert_eq!(sink, b"Hi there");
}

// ---------------------------------------------------------------------------
// 2. Compile
// ---------------------------------------------------------------------------

#[test]
fn compile_resolves_every_template() {
    let registry = page_registry();
    registry.set("static", ResolvedUnit::parse("static", "Hello World!").unwrap());

    let container = registry.compile().expect("compile");
    assert_eq!(container.names(), ["page", "static"]);
    assert_eq!(container.render("page", &()).unwrap(), "HeaderMainFooter");
    assert_eq!(container.render("static", &()).unwrap(), "Hello World!");
}

#[test]
fn compile_is_all_or_nothing() {
    let registry = page_registry();
    registry.define("broken", ["path/to/base.html", "path/to/missing.html"]);

    let err = registry.compile().unwrap_err();
    assert_eq!(err.template(), "broken");
    assert!(matches!(err, TemplateError::FragmentLoad { .. }), "got: {err}");
}

#[test]
fn compile_with_a_malformed_fragment_fails() {
    let registry = Registry::new(MemorySource::from_iter([("bad", "{% block x %}")]));
    registry.define("bad", ["bad"]);
    let err = registry.compile().unwrap_err();
    assert!(matches!(err, TemplateError::ParseOrMerge { .. }), "got: {err}");
}

#[test]
fn compiling_twice_is_deterministic() {
    let registry = page_registry();
    let first = registry.compile().unwrap();
    let second = registry.compile().unwrap();
    assert_eq!(first.names(), second.names());
    for name in first.names() {
        assert_eq!(first.render(name, &()).unwrap(), second.render(name, &()).unwrap());
    }
}

#[test]
fn container_does_no_io_after_compile() {
    let source = Arc::new(CountingSource::new(page_fragments()));
    let registry = Registry::with_shared_source(source.clone());
    registry.define("page", ["path/to/base.html", "path/to/header.html"]);

    let container = registry.compile().unwrap();
    let after_compile = source.calls();
    for _ in 0..10 {
        container.render("page", &()).unwrap();
    }
    assert_eq!(source.calls(), after_compile);
}

#[test]
fn container_is_a_snapshot() {
    let fragments = Arc::new(MemorySource::from_iter([("body", "v1")]));
    let registry = Registry::with_shared_source(fragments.clone());
    registry.define("page", ["body"]);
    let container = registry.compile().unwrap();

    fragments.insert("body", "v2");
    registry.define("later", ["body"]);

    assert_eq!(container.render("page", &()).unwrap(), "v1");
    assert!(!container.contains("later"));
    assert_eq!(registry.get("page").unwrap().render(&()).unwrap(), "v2");
}

#[test]
fn container_serves_concurrent_readers() {
    let container = Arc::new(page_registry().compile().unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            thread::spawn(move || container.render("page", &()).expect("render"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "HeaderMainFooter");
    }
}

#[test]
fn registry_accepts_concurrent_definitions() {
    let registry = Arc::new(Registry::new(MemorySource::from_iter([("x", "X")])));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.define(format!("t{i}"), ["x"]))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(registry.len(), 8);
    assert_eq!(registry.compile().unwrap().len(), 8);
}

// ---------------------------------------------------------------------------
// 3. Hot reload and caching over the filesystem
// ---------------------------------------------------------------------------

fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, content).expect("write fixture");
}

#[test]
fn file_edits_are_picked_up_without_rebuilding() {
    let dir = TempDir::new().unwrap();
    write(&dir, "base.html", "<{% block body %}{% endblock %}>");
    write(&dir, "body.html", "{% block body %}v1{% endblock %}");

    let registry = Registry::new(FileSource::new(dir.path()));
    registry.define("page", ["base.html", "body.html"]);
    assert_eq!(execute_to_string(&registry, "page").unwrap(), "<v1>");

    write(&dir, "body.html", "{% block body %}v2{% endblock %}");
    assert_eq!(execute_to_string(&registry, "page").unwrap(), "<v2>");
}

#[test]
fn cached_files_are_read_once() {
    let dir = TempDir::new().unwrap();
    write(&dir, "base.html", "<{% block body %}{% endblock %}>");
    write(&dir, "body.html", "{% block body %}v1{% endblock %}");

    let registry = Registry::new(CachingSource::new(FileSource::new(dir.path())));
    registry.define("page", ["base.html", "body.html"]);
    assert_eq!(execute_to_string(&registry, "page").unwrap(), "<v1>");

    write(&dir, "body.html", "{% block body %}v2{% endblock %}");
    assert_eq!(execute_to_string(&registry, "page").unwrap(), "<v1>");
}

#[test]
fn cached_fragments_keep_merge_order() {
    let source = CachingSource::new(MemorySource::from_iter([
        ("a", "[{% block b %}a{% endblock %}]"),
        ("b", "{% block b %}b{% endblock %}"),
    ]));
    let registry = Registry::new(source);
    registry.define("ab", ["a", "b"]);
    registry.define("ba", ["b", "a"]);
    assert_eq!(execute_to_string(&registry, "ab").unwrap(), "[b]");
    // "a" has text outside its block, so it replaces "b" as the root.
    assert_eq!(execute_to_string(&registry, "ba").unwrap(), "[a]");
}

#[test]
fn manifest_builds_a_compilable_registry() {
    let dir = TempDir::new().unwrap();
    write(&dir, "templates/base.html", BASE);
    write(&dir, "templates/header.html", "{% block H %}Header{% endblock %}");
    write(&dir, "templates/main.html", "{% block M %}{{ title }}{% endblock %}");
    write(&dir, "templates/footer.html", "{% block F %}Footer{% endblock %}");
    write(
        &dir,
        DEFAULT_MANIFEST,
        "root: templates\ncache: true\ntemplates:\n  page: [base.html, header.html, footer.html, main.html]\n",
    );

    let manifest = Manifest::load(&dir.path().join(DEFAULT_MANIFEST)).expect("manifest");
    let container = manifest.to_registry(dir.path()).compile().expect("compile");
    assert_eq!(
        container.render("page", &json!({ "title": "Main" })).unwrap(),
        "HeaderMainFooter"
    );
}
