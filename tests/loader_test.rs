//! Tests for TocLoader against the markup and structured fixtures

use std::path::PathBuf;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use navtoc::application::services::TocLoader;
use navtoc::application::ApplicationError;
use navtoc::config::Settings;
use navtoc::domain::DomainError;
use navtoc::infrastructure::traits::RealFileSystem;
use navtoc::util::testing;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

fn loader(settings: Settings) -> TocLoader {
    TocLoader::new(Arc::new(RealFileSystem), Arc::new(settings))
}

fn labels_in_order(tree: &navtoc::domain::NavTree) -> Vec<String> {
    tree.iter()
        .map(|(_, n)| n.entry.labels.default_label().to_string())
        .collect()
}

#[test]
fn given_guide_toc_when_loading_then_builds_nested_sections() {
    testing::init_test_setup();
    let tree = loader(Settings::default())
        .load(&resource("guide_toc.cs"))
        .unwrap();

    assert_eq!(
        labels_in_order(&tree),
        vec![
            "Contents",
            "App Components",
            "App Fundamentals",
            "Activities",
            "Fragments",
            "Loaders",
            "Intents and Intent Filters",
            "Animation and Graphics",
            "Overview",
            "OpenGL",
            "Glossary",
        ]
    );
    assert_eq!(tree.depth(), 4);

    let fragments = tree.find("/guide/components/fragments.html").unwrap();
    let node = tree.get(fragments).unwrap();
    assert_eq!(node.entry.labels.get("zh-CN"), Some("片段"));
    assert_eq!(node.entry.labels.get("ja"), None);
}

#[test]
fn given_toroot_and_define_when_loading_then_template_is_applied() {
    let mut settings = Settings::default();
    settings.toroot = "/docs/".to_string();
    settings.defines.push("preview".to_string());

    let tree = loader(settings).load(&resource("guide_toc.cs")).unwrap();

    assert!(tree.find("/docs/guide/preview/index.html").is_some());
    assert!(tree.find("/guide/components/index.html").is_none());
    assert!(tree.find("/docs/guide/components/index.html").is_some());
}

#[test]
fn given_toml_toc_when_loading_then_document_title_names_root() {
    let mut settings = Settings::default();
    settings.toroot = "/".to_string();
    let tree = loader(settings).load(&resource("toc.toml")).unwrap();

    let root = tree.root_node();
    assert_eq!(root.entry.labels.default_label(), "Dev Guide");
    assert_eq!(tree.children(tree.root()).len(), 3);
    assert!(tree.find("/guide/topics/ui/menus.html").is_some());
}

#[rstest]
#[case("toc.json", r#"{"entries": [{"url": "/a", "labels": {"en": "A"}}]}"#, 2)]
#[case("toc.toml", "[[entries]]\nurl = \"/a\"\nlabels = { en = \"A\" }\n", 2)]
#[case("toc.html", "<ul><li><a href=\"/a\">A</a></li><li></li></ul>", 2)]
fn given_each_format_when_loading_then_detects_by_extension(
    #[case] name: &str,
    #[case] content: &str,
    #[case] expected_len: usize,
) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(name);
    std::fs::write(&path, content).unwrap();

    let tree = loader(Settings::default()).load(&path).unwrap();

    assert_eq!(tree.len(), expected_len);
    assert!(tree.find("/a").is_some());
}

#[test]
fn given_missing_file_when_loading_then_reports_path() {
    let err = loader(Settings::default())
        .load(&resource("does-not-exist.cs"))
        .unwrap_err();
    match err {
        ApplicationError::OperationFailed { context, .. } => {
            assert!(context.contains("does-not-exist.cs"), "context: {context}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_unbalanced_if_when_loading_then_reports_directive_line() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken_toc.cs");
    std::fs::write(&path, "<ul>\n<?cs if:beta ?>\n<li><a href=\"/b\">B</a></li>\n</ul>\n").unwrap();

    let err = loader(Settings::default()).load(&path).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::UnbalancedDirective { line: 2, .. })
    ));
}

#[test]
fn given_entry_without_default_label_when_loading_then_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("toc.toml");
    std::fs::write(&path, "[[entries]]\nurl = \"/ja\"\nlabels = { ja = \"概要\" }\n").unwrap();

    let err = loader(Settings::default()).load(&path).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MissingDefaultLabel { .. })
    ));
}

#[test]
fn given_directory_when_loading_then_reports_path() {
    let temp = TempDir::new().unwrap();

    let err = loader(Settings::default()).load(temp.path()).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
}
