//! Integration tests for field resolution.

use std::path::Path;
use xmpstamp::config::{DocstructUse, MetadataSource, OutputField, Scope, SourceSpec};
use xmpstamp::model::{
    DocStruct, DocumentStructure, MetadataType, NodeId, Person, ProcessProperties, Ruleset,
    StructureType,
};
use xmpstamp::render::render_image;
use xmpstamp::resolve::{Context, Resolver};
use xmpstamp::variables::{VariableReplacer, VariableResolver};

struct Work {
    doc: DocumentStructure,
    ruleset: Ruleset,
    pages: Vec<NodeId>,
}

/// Monograph with two chapters over four pages; page 1 has no chapter.
fn work() -> Work {
    let mut doc = DocumentStructure::new();
    let book = doc.add_node(
        DocStruct::new("Monograph")
            .with_metadata("Author", "A. Smith")
            .with_metadata("Author", "B. Jones")
            .with_metadata("TitleDocMain", "Collected Essays")
            .with_person(Person::new("Editor", "Ada", "Lovelace")),
    );
    let ch1 = doc.add_node(DocStruct::new("Chapter").with_metadata("TitleDocMain", "Beginnings"));
    let ch2 = doc.add_node(DocStruct::new("Chapter").with_metadata("TitleDocMain", "Endings"));
    doc.add_child(book, ch1);
    doc.add_child(book, ch2);

    let root = doc.add_node(DocStruct::new("BoundBook"));
    let mut pages = Vec::new();
    for n in 1..=4 {
        let page = doc.add_node(DocStruct::new("page").with_metadata("physPageNumber", n.to_string()));
        doc.add_child(root, page);
        doc.add_reference(page, book);
        pages.push(page);
    }
    doc.add_reference(pages[1], ch1);
    doc.add_reference(pages[2], ch1);
    doc.add_reference(pages[3], ch2);

    doc.set_logical_root(book);
    doc.set_physical_root(root);

    let ruleset = Ruleset::new()
        .with_metadata_type(MetadataType::new("Author"))
        .with_metadata_type(MetadataType::new("TitleDocMain"))
        .with_metadata_type(MetadataType::new("physPageNumber"))
        .with_metadata_type(MetadataType::person("Editor"))
        .with_structure_type(StructureType::new("Monograph").with_label("en", "Monograph"))
        .with_structure_type(StructureType::new("Chapter").with_label("en", "Chapter 1"));

    Work {
        doc,
        ruleset,
        pages,
    }
}

#[test]
fn test_end_to_end_tokens() {
    let w = work();
    let properties = ProcessProperties::new();
    let variables = VariableReplacer::new();
    let resolver = Resolver::new(&w.ruleset, &properties, &variables);

    let fields = vec![
        OutputField::new("dc:title").with_source(SourceSpec::docstruct("en", DocstructUse::Last)),
        OutputField::new("dc:creator").with_source(
            MetadataSource::new("Author", Scope::Logical)
                .with_use_first(true)
                .into(),
        ),
    ];

    let top = w.doc.top_structs(&w.ruleset).unwrap();
    let image = Path::new("/images/00000002.tif");
    let ctx = Context::new(&w.doc, top, image).with_page(w.pages[1]);

    let tokens = render_image(&resolver, &fields, &ctx).unwrap();
    assert_eq!(tokens, vec!["dc:title=Chapter 1", "dc:creator=A. Smith"]);
}

#[test]
fn test_use_first_ignores_later_candidates() {
    let w = work();
    let properties = ProcessProperties::new();
    let variables = VariableReplacer::new();
    let resolver = Resolver::new(&w.ruleset, &properties, &variables);
    let top = w.doc.top_structs(&w.ruleset).unwrap();
    let ctx = Context::new(&w.doc, top, Path::new("a.tif")).with_page(w.pages[3]);

    let first = OutputField::new("t").with_source(SourceSpec::metadata("TitleDocMain", Scope::Any));
    assert_eq!(resolver.resolve(&first, &ctx).unwrap(), "Collected Essays");

    let all = OutputField::new("t").with_source(
        MetadataSource::new("TitleDocMain", Scope::Any)
            .with_use_first(false)
            .with_separator(" | ")
            .into(),
    );
    assert_eq!(resolver.resolve(&all, &ctx).unwrap(), "Collected Essays | Endings");
}

#[test]
fn test_join_has_no_stray_separators() {
    let w = work();
    let properties = ProcessProperties::new();
    let variables = VariableReplacer::new();
    let resolver = Resolver::new(&w.ruleset, &properties, &variables);
    let top = w.doc.top_structs(&w.ruleset).unwrap();
    // page 1 carries no title and the monograph has no anchor
    let ctx = Context::new(&w.doc, top, Path::new("a.tif")).with_page(w.pages[0]);

    let field = OutputField::new("-xmp-dc:description")
        .with_separator(", ")
        .with_source(SourceSpec::metadata("TitleDocMain", Scope::Page))
        .with_source(SourceSpec::text(""))
        .with_source(SourceSpec::metadata("Editor", Scope::Logical))
        .with_source(SourceSpec::metadata("TitleDocMain", Scope::Anchor))
        .with_source(SourceSpec::metadata("physPageNumber", Scope::Page));

    let value = resolver.resolve(&field, &ctx).unwrap();
    assert_eq!(value, "Lovelace, Ada, 1");
    assert!(!value.starts_with(", "));
    assert!(!value.ends_with(", "));
    assert!(!value.contains(", , "));
}

#[test]
fn test_resolution_is_deterministic() {
    let w = work();
    let properties = ProcessProperties::new();
    let variables = VariableReplacer::new();
    let resolver = Resolver::new(&w.ruleset, &properties, &variables);
    let top = w.doc.top_structs(&w.ruleset).unwrap();

    let fields = vec![
        OutputField::new("a").with_source(SourceSpec::docstruct("en", DocstructUse::All)),
        OutputField::new("b").with_source(
            MetadataSource::new("Author", Scope::Logical)
                .with_use_first(false)
                .into(),
        ),
        OutputField::new("c").with_source(SourceSpec::filename(false)),
    ];

    for page in &w.pages {
        let ctx = Context::new(&w.doc, top, Path::new("/x/1.tif")).with_page(*page);
        let first = render_image(&resolver, &fields, &ctx).unwrap();
        let second = render_image(&resolver, &fields, &ctx).unwrap();
        assert_eq!(first, second);
    }
}

/// Resolver that echoes the expression in upper case.
struct Shouting;

impl VariableResolver for Shouting {
    fn replace(&self, expression: &str, _ctx: &Context<'_>) -> String {
        expression.to_uppercase()
    }
}

#[test]
fn test_variable_resolver_is_pluggable() {
    let w = work();
    let properties = ProcessProperties::new();
    let resolver = Resolver::new(&w.ruleset, &properties, &Shouting);
    let top = w.doc.top_structs(&w.ruleset).unwrap();
    let ctx = Context::new(&w.doc, top, Path::new("a.tif"));

    let field = OutputField::new("v").with_source(SourceSpec::variable("{meta.TitleDocMain}"));
    assert_eq!(resolver.resolve(&field, &ctx).unwrap(), "{META.TITLEDOCMAIN}");

    let variables = VariableReplacer::new();
    let resolver = Resolver::new(&w.ruleset, &properties, &variables);
    assert_eq!(resolver.resolve(&field, &ctx).unwrap(), "Collected Essays");
}
