//! Integration tests for the editor crate: pages, bindings and the
//! toolbar flow driven by a host

use sitebuilder_editor::{
    EditorConfig, EditorError, FieldBindings, FieldValue, Page, Placement, Rect, StaticHost,
    ToolbarButton, ToolbarEvent, ToolbarState,
};
use std::cell::RefCell;
use std::rc::Rc;

const PROJECT: &str = r#"{
    "hero.title": { "text": "<h1>Grow your business</h1>" },
    "hero.subtitle": { "text": "Templates that convert" },
    "hero.image": { "image": "/img/hero.png" },
    "hero.cta": { "button": { "text": "Start", "url": "/signup" } }
}"#;

type Changes = Rc<RefCell<Vec<(String, FieldValue)>>>;

fn page() -> (Page, Changes) {
    let changes: Changes = Rc::new(RefCell::new(Vec::new()));
    let log = changes.clone();
    let bindings = FieldBindings::from_json(PROJECT, true)
        .unwrap()
        .with_sink(move |eid: &str, value: &FieldValue| {
            log.borrow_mut().push((eid.to_string(), value.clone()));
        });

    let config = EditorConfig {
        rich_text_fields: vec!["hero.title".into(), "hero.subtitle".into()],
        ..EditorConfig::default()
    };
    (Page::new(bindings, config), changes)
}

#[test]
fn test_editing_one_field_leaves_others_alone() -> anyhow::Result<()> {
    let (mut page, changes) = page();
    let subtitle_before = page.bindings().get_text("hero.subtitle", "fallback");

    let title = page.session("hero.title", "Welcome");
    title.sync_selection(&StaticHost::selecting(0, 0, 4));
    title.handle_toolbar(ToolbarEvent::Pressed(ToolbarButton::Italic));

    // Mounting another region must not leak state into it
    let subtitle = page.session("hero.subtitle", "fallback");
    assert!(!subtitle.is_dirty());

    page.commit_all()?;

    let changes = changes.borrow();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].0, "hero.title");
    assert_eq!(
        page.bindings().get_text("hero.title", ""),
        "<h1><em>Grow</em> your business</h1>"
    );
    assert_eq!(page.bindings().get_text("hero.subtitle", "fallback"), subtitle_before);
    Ok(())
}

#[test]
fn test_unknown_field_mounts_template_default() {
    let (mut page, _) = page();
    let session = page.session("footer.note", "Made with care");
    assert_eq!(session.document().to_plain_text(), "Made with care");
    assert!(!session.is_rich());
}

#[test]
fn test_uncommitted_session_is_discarded_on_unmount() -> anyhow::Result<()> {
    let (mut page, changes) = page();
    let session = page.session("hero.subtitle", "");
    session.sync_selection(&StaticHost::selecting(0, 0, 9));
    session.handle_toolbar(ToolbarEvent::Pressed(ToolbarButton::Bold));
    assert!(session.is_dirty());

    assert!(page.unmount("hero.subtitle").is_some());
    assert!(!page.commit("hero.subtitle")?);
    assert!(changes.borrow().is_empty());
    Ok(())
}

#[test]
fn test_image_and_button_replacements() -> anyhow::Result<()> {
    let (mut page, changes) = page();
    page.set_image("hero.image", "/img/new.png", Some("/gallery"))?;
    page.set_button("hero.cta", "Try it", "/trial")?;

    assert_eq!(page.bindings().get_image("hero.image", ""), "/img/new.png");
    assert_eq!(page.bindings().get_image_link("hero.image").as_deref(), Some("/gallery"));
    assert_eq!(page.bindings().get_button("hero.cta", "", "").url, "/trial");
    assert_eq!(changes.borrow().len(), 2);
    Ok(())
}

#[test]
fn test_read_only_page_refuses_commit() {
    let bindings = FieldBindings::from_json(PROJECT, false).unwrap();
    let config = EditorConfig {
        rich_text_fields: vec!["hero.title".into()],
        ..EditorConfig::default()
    };
    let mut page = Page::new(bindings, config);

    let session = page.session("hero.title", "");
    session.sync_selection(&StaticHost::selecting(0, 0, 4));
    session.handle_toolbar(ToolbarEvent::Pressed(ToolbarButton::Bold));

    let err = page.commit("hero.title").unwrap_err();
    assert!(matches!(err, EditorError::ReadOnly));
}

#[test]
fn test_link_flow_through_toolbar() {
    let (mut page, _) = page();
    let session = page.session("hero.subtitle", "");
    session.sync_selection(&StaticHost::selecting(0, 0, 9));

    let response = session.handle_toolbar(ToolbarEvent::Pressed(ToolbarButton::Link));
    assert!(response.prevent_default);
    assert!(matches!(session.toolbar().state(), ToolbarState::LinkInputOpen(_)));

    session.handle_toolbar(ToolbarEvent::LinkDraftChanged("/templates".into()));
    let response = session.handle_toolbar(ToolbarEvent::SubmitLink);
    assert!(response.command.is_some());
    assert_eq!(
        session.document().to_field_text(),
        r#"<p><a href="/templates">Templates</a> that convert</p>"#
    );
    assert_eq!(session.toolbar().state(), &ToolbarState::Visible);
}

#[test]
fn test_toolbar_hides_when_selection_collapses() {
    let (mut page, _) = page();
    let session = page.session("hero.title", "");

    let update = session.sync_selection(&StaticHost::selecting(0, 0, 4)).unwrap();
    assert!(update.visible);
    assert_eq!(update.position.map(|p| p.placement), Some(Placement::Above));

    session.sync_selection(&StaticHost::selecting(0, 2, 2));
    assert_eq!(session.toolbar().state(), &ToolbarState::Hidden);
}

#[test]
fn test_toolbar_below_selection_near_region_top() {
    let (mut page, _) = page();
    let session = page.session("hero.title", "");
    let host = StaticHost {
        selection_rect: Some(Rect::new(40.0, 10.0, 60.0, 18.0)),
        ..StaticHost::selecting(0, 0, 4)
    };

    let update = session.sync_selection(&host).unwrap();
    let position = update.position.unwrap();
    assert_eq!(position.placement, Placement::Below);
    assert_eq!(position.y, 36.0);
    assert_eq!(position.x, 0.0);
}
