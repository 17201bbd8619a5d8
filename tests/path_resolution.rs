use chic_intercept::diagnostics::Span;
use chic_intercept::pathmap::{PathMap, PathMapEntry};
use chic_intercept::symbols::MethodSymbol;
use chic_intercept::{InterceptionDeclaration, LocationSpec, resolve_interceptions};

mod common;
use common::{Fixture, codes};

#[test]
fn null_and_empty_path_literals_are_rejected() {
    let mut fixture = Fixture::new();
    fixture.add_file("Program.chic", "M(1);\n");
    let interceptor_id = fixture.add_method(MethodSymbol::ordinary("M1"));

    let declarations = [
        InterceptionDeclaration {
            interceptor: interceptor_id,
            target: LocationSpec::Path {
                path: None,
                line: 1,
                character: 1,
            },
            site: Span::new(0, 10),
            declared_in_compilation: true,
        },
        InterceptionDeclaration::at_path(interceptor_id, "", 1, 1, Span::new(20, 30)),
    ];
    let resolution = resolve_interceptions(&fixture.compilation(), &declarations, &fixture.binder);
    assert_eq!(codes(&resolution), ["ICP0001", "ICP0001"]);
}

#[test]
fn missing_file_with_unique_suffix_suggests_the_candidate() {
    let mut fixture = Fixture::new();
    fixture.add_file("/Users/me/projects/Program.chic", "M(1);\n");
    let interceptor_id = fixture.add_method(MethodSymbol::ordinary("M1"));

    let declarations = [InterceptionDeclaration::at_path(
        interceptor_id,
        "projects/Program.chic",
        1,
        1,
        Span::new(0, 10),
    )];
    let resolution = resolve_interceptions(&fixture.compilation(), &declarations, &fixture.binder);

    assert_eq!(codes(&resolution), ["ICP0003"]);
    let diagnostic = &resolution.diagnostics[0];
    assert!(diagnostic
        .message
        .contains("did you mean `/Users/me/projects/Program.chic`?"));
    assert_eq!(
        diagnostic.suggestions[0].replacement.as_deref(),
        Some("/Users/me/projects/Program.chic")
    );
}

#[test]
fn physical_path_under_a_map_is_pointed_at_the_mapped_spelling() {
    let mut fixture = Fixture::new();
    fixture.add_file("/Users/me/projects/Program.chic", "M(1);\n");
    fixture.path_map = PathMap::from_pairs([("/Users/me/projects/", "/_/")]);
    let interceptor_id = fixture.add_method(MethodSymbol::ordinary("M1"));

    let declarations = [InterceptionDeclaration::at_path(
        interceptor_id,
        "/Users/me/projects/Program.chic",
        1,
        1,
        Span::new(0, 10),
    )];
    let resolution = resolve_interceptions(&fixture.compilation(), &declarations, &fixture.binder);

    assert_eq!(codes(&resolution), ["ICP0004"]);
    assert!(resolution.diagnostics[0].message.contains("/_/Program.chic"));
}

#[test]
fn mapped_path_resolves_through_the_whole_pipeline() {
    let mut fixture = Fixture::new();
    let file = fixture.add_file("/Users/me/projects/Program.chic", "M(1);\n");
    fixture.path_map = PathMap::from_pairs([("/Users/me/projects/", "/_/")]);
    let target_id = fixture.add_method(MethodSymbol::ordinary("M"));
    let interceptor_id = fixture.add_method(MethodSymbol::ordinary("M1"));
    let offset = fixture.bind_call(file, "M", target_id);

    let declarations = [InterceptionDeclaration::at_path(
        interceptor_id,
        "/_/Program.chic",
        1,
        1,
        Span::new(0, 10),
    )];
    let resolution = resolve_interceptions(&fixture.compilation(), &declarations, &fixture.binder);

    assert!(resolution.diagnostics.is_empty(), "{:?}", resolution.diagnostics);
    assert_eq!(resolution.interceptor_for(file, offset), Some(interceptor_id));
}

#[test]
fn two_files_reducing_to_one_mapped_path_are_ambiguous() {
    let mut fixture = Fixture::new();
    fixture.add_file("/repo/Program.chic", "M(1);\n");
    fixture.add_file("/mirror/Program.chic", "M(1);\n");
    fixture.path_map = PathMap::from_pairs([("/repo/", "/_/"), ("/mirror/", "/_/")]);
    let interceptor_id = fixture.add_method(MethodSymbol::ordinary("M1"));

    let declarations = [InterceptionDeclaration::at_path(
        interceptor_id,
        "/_/Program.chic",
        1,
        1,
        Span::new(0, 10),
    )];
    let resolution = resolve_interceptions(&fixture.compilation(), &declarations, &fixture.binder);

    assert_eq!(codes(&resolution), ["ICP0005"]);
    assert!(resolution.map.is_empty());
}

#[test]
fn path_map_round_trips_through_serde() {
    let map = PathMap::from_pairs([("/src/", "/_/"), ("/gen/", "/_g/")]);
    let json = serde_json::to_string(&map).expect("serialize");
    let parsed: PathMap = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, map);
    assert_eq!(
        parsed.entries()[0],
        PathMapEntry::new("/src/", "/_/")
    );
}
