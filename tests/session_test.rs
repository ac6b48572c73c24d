//! Tests for NavigationSession: activation, toggling and language switching

use std::io;
use std::sync::{Arc, Mutex};

use rstest::rstest;

use navtoc::application::services::{LanguageSelector, NavigationSession};
use navtoc::application::ApplicationError;
use navtoc::domain::{
    Affordance, CollapsePolicy, DomainError, LanguageSet, TocDocument, TocEntry, TreeBuilder,
};
use navtoc::infrastructure::traits::PreferenceStore;

/// In-memory preference store
#[derive(Default)]
struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.value.lock().unwrap().clone())
    }

    fn save(&self, code: &str) -> io::Result<()> {
        *self.value.lock().unwrap() = Some(code.to_string());
        Ok(())
    }
}

// Contents
// ├── Components (/a/)          en, zh
// │   ├── Fragments (/a/x)      en, zh
// │   └── Services (/a/s/)
// │       └── Bound (/a/s/b)
// └── Graphics (/g/)
//     └── OpenGL (/g/gl)
fn document() -> TocDocument {
    TocDocument {
        entries: vec![
            TocEntry::new("/a/")
                .label("en", "Components")
                .label("zh", "组件")
                .child(TocEntry::new("/a/x").label("en", "Fragments").label("zh", "片段"))
                .child(
                    TocEntry::new("/a/s/")
                        .label("en", "Services")
                        .child(TocEntry::new("/a/s/b").label("en", "Bound")),
                ),
            TocEntry::new("/g/")
                .label("en", "Graphics")
                .child(TocEntry::new("/g/gl").label("en", "OpenGL")),
        ],
        ..TocDocument::default()
    }
}

fn session_with(policy: CollapsePolicy, store: Arc<MemoryStore>) -> NavigationSession {
    let tree = TreeBuilder::default().build(&document()).unwrap();
    let selector = LanguageSelector::new(LanguageSet::new("en", ["en", "zh", "fr", "ja"]), store);
    NavigationSession::new(tree, selector, policy)
}

fn session() -> NavigationSession {
    session_with(CollapsePolicy::Preserve, Arc::new(MemoryStore::default()))
}

#[test]
fn given_active_leaf_when_rendering_in_zh_then_shows_translated_chain() {
    let mut session = session();
    session.activate("/a/x").unwrap();
    session.set_language("zh").unwrap();

    let out = session.render();
    let section = out.find("/a/").unwrap();
    assert_eq!(section.label, "组件");
    assert_eq!(section.affordance, Affordance::Expanded);
    let leaf = out.find("/a/x").unwrap();
    assert_eq!(leaf.label, "片段");
    assert!(leaf.active);
}

#[test]
fn given_language_without_labels_when_rendering_then_falls_back_to_default() {
    let mut session = session();
    session.activate("/a/x").unwrap();

    let out = session.render_with("fr").unwrap();

    assert_eq!(out.find("/a/x").unwrap().label, "Fragments");
    assert_eq!(out.find("/a/x").unwrap().language, "en");
    assert_eq!(session.language(), "en", "render_with must not persist");
}

#[rstest]
#[case("en")]
#[case("zh")]
#[case("fr")]
#[case("ja")]
fn given_any_language_when_rendering_expanded_tree_then_every_label_is_non_empty(
    #[case] lang: &str,
) {
    let mut session = session();
    for url in ["/a/", "/a/s/", "/g/"] {
        session.toggle_url(url).unwrap();
    }

    let out = session.render_with(lang).unwrap();

    let labels = out.visible_labels();
    assert_eq!(labels.len(), 7);
    assert!(labels.iter().all(|l| !l.is_empty()));
}

#[test]
fn given_active_url_when_activating_then_only_ancestor_chain_is_expanded() {
    let mut session = session();
    let idx = session.activate("/a/s/b").unwrap();

    let tree = session.tree();
    for ancestor in tree.ancestors(idx) {
        assert!(tree.is_expanded(ancestor));
    }
    let graphics = tree.find("/g/").unwrap();
    assert!(!tree.is_expanded(graphics));
    assert_eq!(
        session.breadcrumbs(idx),
        vec!["Contents", "Components", "Services", "Bound"]
    );
}

#[test]
fn given_active_section_when_activating_then_only_strict_ancestors_expand() {
    let mut session = session();
    let idx = session.activate("/a/s/").unwrap();

    let tree = session.tree();
    assert!(!tree.is_expanded(idx));
    for ancestor in tree.ancestors(idx) {
        assert!(tree.is_expanded(ancestor));
    }
    let out = session.render();
    let section = out.find("/a/s/").unwrap();
    assert!(section.active);
    assert_eq!(section.affordance, Affordance::Collapsed);
    assert!(out.find("/a/s/b").is_none());
}

#[test]
fn given_unknown_active_url_when_activating_then_renders_collapsed() {
    let mut session = session();

    assert!(session.activate("/nowhere.html").is_none());

    let out = session.render();
    assert_eq!(out.visible_labels(), vec!["Contents", "Components", "Graphics"]);
    assert!(out
        .children
        .iter()
        .all(|c| c.affordance == Affordance::Collapsed));
}

#[rstest]
#[case(CollapsePolicy::Preserve)]
#[case(CollapsePolicy::Discard)]
fn given_collapsed_section_when_toggling_twice_then_output_is_unchanged(
    #[case] policy: CollapsePolicy,
) {
    let mut session = session_with(policy, Arc::new(MemoryStore::default()));
    session.activate("/a/x").unwrap();
    let before = session.render();

    let graphics = session.find("/g/").unwrap();
    session.toggle(graphics).unwrap();
    session.toggle(graphics).unwrap();

    assert_eq!(session.render(), before);
}

#[test]
fn given_preserve_policy_when_reopening_section_then_deeper_expansion_returns() {
    let mut session = session();
    session.toggle_url("/a/").unwrap();
    session.toggle_url("/a/s/").unwrap();
    let before = session.render();

    let collapsed = session.toggle_url("/a/").unwrap();
    assert_eq!(collapsed.affordance, Affordance::Collapsed);
    assert!(collapsed.children.is_empty());
    let reopened = session.toggle_url("/a/").unwrap();

    assert!(reopened.find("/a/s/b").is_some());
    assert_eq!(session.render(), before);
}

#[test]
fn given_discard_policy_when_reopening_section_then_deeper_sections_are_collapsed() {
    let mut session = session_with(CollapsePolicy::Discard, Arc::new(MemoryStore::default()));
    session.toggle_url("/a/").unwrap();
    session.toggle_url("/a/s/").unwrap();

    session.toggle_url("/a/").unwrap();
    let reopened = session.toggle_url("/a/").unwrap();

    assert!(reopened.find("/a/s/b").is_none());
    assert_eq!(
        reopened.find("/a/s/").unwrap().affordance,
        Affordance::Collapsed
    );
}

#[test]
fn given_toggle_on_one_section_when_rendering_then_siblings_are_untouched() {
    let mut session = session();
    session.toggle_url("/g/").unwrap();

    let tree = session.tree();
    assert!(!tree.is_expanded(tree.find("/a/").unwrap()));
    assert!(tree.is_expanded(tree.find("/g/").unwrap()));
}

#[test]
fn given_leaf_or_unknown_url_when_toggling_then_fails_without_change() {
    let mut session = session();
    let before = session.render();

    let leaf = session.toggle_url("/g/gl").unwrap_err();
    assert!(matches!(
        leaf,
        ApplicationError::Domain(DomainError::NotASection(_))
    ));
    let unknown = session.toggle_url("/missing").unwrap_err();
    assert!(matches!(
        unknown,
        ApplicationError::Domain(DomainError::NodeNotFound(_))
    ));
    assert_eq!(session.render(), before);
}

#[test]
fn given_unsupported_language_when_setting_then_current_is_unchanged() {
    let store = Arc::new(MemoryStore::default());
    let mut session = session_with(CollapsePolicy::Preserve, store.clone());
    session.set_language("zh").unwrap();

    let err = session.set_language("klingon").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::UnsupportedLanguage { .. })
    ));
    assert_eq!(session.language(), "zh");
    assert_eq!(store.load().unwrap().as_deref(), Some("zh"));
}

#[test]
fn given_url_with_fragment_when_finding_then_matches_page() {
    let session = session();
    assert_eq!(session.find("/a/x#lifecycle"), session.find("/a/x"));
    assert!(session.find("/a/x").is_some());
    assert!(session.find("").is_none());
}
