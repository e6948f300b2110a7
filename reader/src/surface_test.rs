use super::*;

fn built(n: usize) -> HeadlessSurface {
    let mut surface = HeadlessSurface::new();
    let pages = (0..n)
        .map(|i| PageView { reference: format!("p{i}.jpg"), loaded: i == 1 })
        .collect();
    surface.apply(Command::BuildPages { pages });
    surface
}

#[test]
fn tag_names_match_stylesheet_classes() {
    assert_eq!(PageTag::Active.as_str(), "active");
    assert_eq!(PageTag::Prev.as_str(), "prev");
    assert_eq!(PageTag::ExitLeft.as_str(), "exit-left");
    assert_eq!(PageTag::ExitRight.as_str(), "exit-right");
}

#[test]
fn build_pages_activates_first_and_assigns_loaded_sources() {
    let surface = built(3);
    assert_eq!(surface.page_count(), 3);
    assert!(surface.has_tag(0, PageTag::Active));
    assert!(!surface.has_tag(1, PageTag::Active));

    let first = surface.page(0).unwrap();
    assert_eq!(first.source, None);
    assert!(first.loading_visible);

    let second = surface.page(1).unwrap();
    assert_eq!(second.source.as_deref(), Some("p1.jpg"));
    assert!(!second.loading_visible);
}

#[test]
fn commands_on_missing_pages_are_ignored() {
    let mut surface = built(2);
    surface.remove_page(1);
    assert!(!surface.has_page(1));

    surface.apply(Command::AddTag { page: 1, tag: PageTag::Active });
    surface.apply(Command::SetImageSource { page: 1, reference: "x".into() });
    surface.apply(Command::ShowLoading { page: 7 });

    assert_eq!(surface.page(1), None);
    assert_eq!(surface.image_source(1), None);
    assert_eq!(surface.log().len(), 4);
}

#[test]
fn failure_marker_hides_spinner_and_source_clears_it() {
    let mut surface = built(1);
    surface.apply(Command::ShowLoadFailed { page: 0 });
    let page = surface.page(0).unwrap();
    assert!(page.failed);
    assert!(!page.loading_visible);

    surface.apply(Command::ShowLoading { page: 0 });
    assert!(!surface.page(0).unwrap().failed);

    surface.apply(Command::SetImageSource { page: 0, reference: "p0.jpg".into() });
    assert_eq!(surface.image_source(0).as_deref(), Some("p0.jpg"));
}

#[test]
fn clear_tags_removes_everything() {
    let mut surface = built(2);
    surface.apply(Command::AddTag { page: 1, tag: PageTag::Prev });
    surface.apply(Command::AddTag { page: 1, tag: PageTag::ExitLeft });
    surface.apply(Command::ClearTags { page: 1 });
    assert!(surface.page(1).unwrap().tags.is_empty());
}

#[test]
fn clones_share_state() {
    let surface = HeadlessSurface::new();
    let mut handle = surface.clone();
    handle.apply(Command::SetVisible { section: Section::Hero, visible: false });
    assert_eq!(surface.visible(Section::Hero), Some(false));
    assert_eq!(surface.visible(Section::Reader), None);
}

#[test]
fn commands_serialize_with_op_tag() {
    let json = serde_json::to_value(Command::AddTag { page: 2, tag: PageTag::ExitLeft }).unwrap();
    assert_eq!(json["op"], "add_tag");
    assert_eq!(json["tag"], "exit-left");
    assert_eq!(json["page"], 2);
}
