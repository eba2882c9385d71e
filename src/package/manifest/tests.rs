use std::path::{Path, PathBuf};

use super::parse::{Declaration, NamespaceDecl};
use super::*;
use crate::config::project::Project;
use crate::error::Error;

fn parse(yaml: &str) -> Project {
    Project::parse(yaml, Path::new("opa.project")).unwrap()
}

// ── parsing declaration shapes ─────────────────────────────

#[test]
fn test_parse_bare_string() {
    let project = parse("dependencies:\n  lib: file:../lib\n");
    let dep = &project.dependencies["lib"];
    assert_eq!(dep.name, "lib");
    assert_eq!(dep.location(), "file:../lib");
    assert_eq!(dep.namespace(), Some("lib"));
}

#[test]
fn test_parse_structured_namespace() {
    let project = parse(
        r#"
dependencies:
  lib:
    location: git+https://example/repo#v1.0
    namespace: ns
"#,
    );
    let dep = &project.dependencies["lib"];
    assert_eq!(dep.location(), "git+https://example/repo#v1.0");
    assert_eq!(dep.namespace(), Some("ns"));
}

#[test]
fn test_parse_namespace_false() {
    let project = parse(
        r#"
dependencies:
  lib:
    location: file:../lib
    namespace: false
"#,
    );
    assert_eq!(project.dependencies["lib"].namespace(), None);
}

#[test]
fn test_parse_namespace_true_or_missing_defaults_to_key() {
    let project = parse(
        r#"
dependencies:
  a:
    location: file:a
    namespace: true
  b:
    location: file:b
"#,
    );
    assert_eq!(project.dependencies["a"].namespace(), Some("a"));
    assert_eq!(project.dependencies["b"].namespace(), Some("b"));
}

#[test]
fn test_parse_empty_namespace_disables() {
    let project = parse("dependencies:\n  a:\n    location: file:a\n    namespace: \"\"\n");
    assert_eq!(project.dependencies["a"].namespace(), None);
}

#[test]
fn test_parse_invalid_namespace_type() {
    let yaml = "dependencies:\n  a:\n    location: file:a\n    namespace: 42\n";
    let err = Project::parse(yaml, Path::new("opa.project")).unwrap_err();
    assert!(matches!(err, Error::ManifestParse { .. }), "{:?}", err);
}

#[test]
fn test_parse_missing_location() {
    let yaml = "dependencies:\n  a:\n    namespace: x\n";
    let err = Project::parse(yaml, Path::new("opa.project")).unwrap_err();
    assert!(matches!(err, Error::ManifestParse { .. }));
}

#[test]
fn test_parse_null_dependencies() {
    let project = parse("name: app\ndependencies:\n");
    assert!(project.dependencies.is_empty());
}

// ── serialization ──────────────────────────────────────────

#[test]
fn test_declaration_forms() {
    let bare = Dependency::new("lib", DependencyInfo::new("file:lib", Some("lib".to_string())));
    assert_eq!(
        Declaration::from_dependency(&bare),
        Declaration::Bare("file:lib".to_string())
    );

    let named = Dependency::new("lib", DependencyInfo::new("file:lib", Some("ns".to_string())));
    assert_eq!(
        Declaration::from_dependency(&named),
        Declaration::Structured {
            location: "file:lib".to_string(),
            namespace: Some(NamespaceDecl::Named("ns".to_string())),
        }
    );

    let off = Dependency::new("lib", DependencyInfo::new("file:lib", None));
    assert_eq!(
        Declaration::from_dependency(&off),
        Declaration::Structured {
            location: "file:lib".to_string(),
            namespace: Some(NamespaceDecl::Enabled(false)),
        }
    );
}

#[test]
fn test_serialize_keyed_by_name() {
    let mut project = Project::new("/p");
    project.set_dependency("bare", DependencyInfo::new("file:../bare", Some("bare".to_string())));
    project.set_dependency(
        "named",
        DependencyInfo::new("git+https://example/repo#v1.0", Some("ns".to_string())),
    );
    project.set_dependency("plain", DependencyInfo::new("file:../plain", None));

    let yaml = project.to_yaml().unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    let deps = &doc["dependencies"];
    assert_eq!(deps["bare"].as_str(), Some("file:../bare"));
    assert_eq!(
        deps["named"]["location"].as_str(),
        Some("git+https://example/repo#v1.0")
    );
    assert_eq!(deps["named"]["namespace"].as_str(), Some("ns"));
    assert_eq!(deps["plain"]["location"].as_str(), Some("file:../plain"));
    assert_eq!(deps["plain"]["namespace"].as_bool(), Some(false));
}

#[test]
fn test_roundtrip_all_shapes() {
    let yaml = r#"
dependencies:
  bare: file:../bare
  named:
    location: git+https://example/repo#v1.0
    namespace: ns
  plain:
    location: file:../plain
    namespace: false
"#;
    let first = parse(yaml);
    let second = parse(&first.to_yaml().unwrap());

    assert_eq!(first.dependencies.len(), 3);
    for (name, dep) in first.dependencies.iter() {
        let again = &second.dependencies[name];
        assert_eq!(dep.info, again.info, "{}", name);
        assert_eq!(
            Declaration::from_dependency(dep),
            Declaration::from_dependency(again)
        );
    }
}

// ── Dependency ─────────────────────────────────────────────

#[test]
fn test_dependency_dir_uses_identity() {
    let dep = Dependency::new("lib", DependencyInfo::new("file:../lib", Some("lib".to_string())));
    let expected = crate::hash::dependency_id(Some("lib"), "file:../lib").to_hex();
    assert_eq!(dep.dir(Path::new("/root")), PathBuf::from("/root").join(expected));
}

#[test]
fn test_source_and_test_dirs() {
    let mut dep = Dependency::new("lib", DependencyInfo::new("file:lib", None));
    assert_eq!(dep.source_dir(), None);

    dep.set_resolved_dir(PathBuf::from("/deps/abc"));
    assert_eq!(dep.source_dir(), Some(PathBuf::from("/deps/abc")));
    assert_eq!(dep.test_dir(), None);

    let mut nested = Project::new("/deps/abc");
    nested.source = Some("src".to_string());
    nested.tests = Some("test".to_string());
    dep.project = Some(nested);
    assert_eq!(dep.source_dir(), Some(PathBuf::from("/deps/abc/src")));
    assert_eq!(dep.test_dir(), Some(PathBuf::from("/deps/abc/test")));
}

#[test]
fn test_set_and_remove_dependency() {
    let mut project = Project::new("/p");
    project.set_dependency("a", DependencyInfo::new("file:a", Some("a".to_string())));
    project.set_dependency("a", DependencyInfo::new("file:b", Some("a".to_string())));
    assert_eq!(project.dependencies.len(), 1);
    assert_eq!(project.dependencies["a"].location(), "file:b");

    assert!(project.remove_dependency("a"));
    assert!(!project.remove_dependency("a"));
}

// ── walk / render ──────────────────────────────────────────

fn tree() -> Project {
    let mut root = Project::new("/app");
    root.name = Some("app".to_string());
    root.set_dependency("a", DependencyInfo::new("file:a", Some("a".to_string())));
    root.set_dependency("b", DependencyInfo::new("file:b", None));

    let mut nested = Project::new("/deps/a");
    nested.name = Some("liba".to_string());
    nested.set_dependency("c", DependencyInfo::new("file:c", Some("c".to_string())));
    root.dependencies.get_mut("a").unwrap().project = Some(nested);
    root
}

#[test]
fn test_walk_preorder() {
    let mut seen = Vec::new();
    walk_dependencies(&tree(), |dep| -> Result<(), ()> {
        seen.push(dep.name.clone());
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, vec!["a", "c", "b"]);
}

#[test]
fn test_walk_stops_on_error() {
    let mut seen = Vec::new();
    let result = walk_dependencies(&tree(), |dep| {
        seen.push(dep.name.clone());
        if dep.name == "c" {
            Err("stop")
        } else {
            Ok(())
        }
    });
    assert_eq!(result, Err("stop"));
    assert_eq!(seen, vec!["a", "c"]);
}

#[test]
fn test_render_tree() {
    insta::assert_snapshot!(tree().render_tree(), @r"
    root (app)
      a (liba)
        c
      b
    ");
}
