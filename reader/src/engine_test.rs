#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Helpers
// =============================================================

fn core_with(n: usize) -> ReaderCore {
    ReaderCore::new(Manifest { cover: None, pages: (0..n).map(|i| format!("page-{i}.jpg")).collect() })
}

/// Start a transition with `start` and run it to completion.
fn settle(core: &mut ReaderCore, start: impl FnOnce(&mut ReaderCore) -> Option<(Transition, Vec<Command>)>) -> Transition {
    let (transition, _) = start(core).unwrap();
    core.finish(&transition);
    transition
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_starts_at_first_page_idle() {
    let core = core_with(3);
    assert_eq!(core.current_page(), Some(0));
    assert!(!core.is_animating());
    assert_eq!(core.total_pages(), 3);
    assert_eq!(core.last_page(), Some(2));
}

#[test]
fn empty_sequence_has_no_cursor() {
    let core = core_with(0);
    assert_eq!(core.current_page(), None);
    assert_eq!(core.last_page(), None);
    assert!(core.is_empty());
    assert_eq!(core.cover(), None);
}

#[test]
fn cover_defaults_to_first_page() {
    let core = core_with(2);
    assert_eq!(core.cover(), Some("page-0.jpg"));

    let core = ReaderCore::new(Manifest { cover: Some("cover.jpg".into()), pages: vec!["a".into()] });
    assert_eq!(core.cover(), Some("cover.jpg"));
}

#[test]
fn manifest_deserializes_with_defaults() {
    let manifest: Manifest = serde_json::from_str(r#"{"pages":["a.jpg","b.jpg"]}"#).unwrap();
    assert_eq!(manifest.cover, None);
    assert_eq!(manifest.pages.len(), 2);

    let empty: Manifest = serde_json::from_str("{}").unwrap();
    assert!(empty.pages.is_empty());
}

// =============================================================
// next / previous
// =============================================================

#[test]
fn next_moves_cursor_and_tags_pages() {
    let mut core = core_with(3);
    let (transition, commands) = core.begin_next().unwrap();

    assert_eq!(core.current_page(), Some(1));
    assert!(core.is_animating());
    assert_eq!(transition.from, 0);
    assert_eq!(transition.to, 1);
    assert_eq!(transition.kind, TransitionKind::Forward);
    assert!(commands.contains(&Command::AddTag { page: 0, tag: PageTag::ExitLeft }));
    assert!(commands.contains(&Command::RemoveTag { page: 0, tag: PageTag::Active }));
    assert!(commands.contains(&Command::AddTag { page: 1, tag: PageTag::Active }));
}

#[test]
fn navigation_rejected_while_animating() {
    let mut core = core_with(3);
    core.begin_next().unwrap();

    assert!(core.begin_next().is_none());
    assert!(core.begin_previous().is_none());
    assert!(core.begin_go_to(2).is_none());
    assert_eq!(core.current_page(), Some(1));
}

#[test]
fn finish_forward_marks_outgoing_prev_and_releases_guard() {
    let mut core = core_with(3);
    let (transition, _) = core.begin_next().unwrap();
    let commands = core.finish(&transition);

    assert!(!core.is_animating());
    assert!(commands.contains(&Command::RemoveTag { page: 0, tag: PageTag::ExitLeft }));
    assert!(commands.contains(&Command::AddTag { page: 0, tag: PageTag::Prev }));
    assert!(matches!(commands.last(), Some(Command::Refresh { .. })));
}

#[test]
fn previous_at_first_page_is_rejected() {
    let mut core = core_with(3);
    assert!(core.begin_previous().is_none());
    assert_eq!(core.current_page(), Some(0));
    assert!(!core.is_animating());
}

#[test]
fn next_at_last_page_is_rejected() {
    let mut core = core_with(2);
    settle(&mut core, ReaderCore::begin_next);
    assert!(core.begin_next().is_none());
    assert_eq!(core.current_page(), Some(1));
}

#[test]
fn previous_restores_incoming_page() {
    let mut core = core_with(3);
    settle(&mut core, ReaderCore::begin_next);
    let (transition, commands) = core.begin_previous().unwrap();

    assert_eq!(core.current_page(), Some(0));
    assert_eq!(transition.kind, TransitionKind::Backward);
    assert!(commands.contains(&Command::AddTag { page: 1, tag: PageTag::ExitRight }));
    assert!(commands.contains(&Command::RemoveTag { page: 0, tag: PageTag::Prev }));
    assert!(commands.contains(&Command::AddTag { page: 0, tag: PageTag::Active }));

    let done = core.finish(&transition);
    assert!(done.contains(&Command::RemoveTag { page: 1, tag: PageTag::ExitRight }));
}

// =============================================================
// go_to
// =============================================================

#[test]
fn go_to_reclassifies_every_page() {
    let mut core = core_with(4);
    let (transition, commands) = core.begin_go_to(2).unwrap();

    assert_eq!(core.current_page(), Some(2));
    assert_eq!(transition.kind, TransitionKind::Jump);
    for page in 0..4 {
        assert!(commands.contains(&Command::ClearTags { page }));
    }
    assert!(commands.contains(&Command::AddTag { page: 0, tag: PageTag::Prev }));
    assert!(commands.contains(&Command::AddTag { page: 1, tag: PageTag::Prev }));
    assert!(!commands.contains(&Command::AddTag { page: 2, tag: PageTag::Prev }));
    assert!(!commands.contains(&Command::AddTag { page: 3, tag: PageTag::Prev }));
    assert!(commands.contains(&Command::AddTag { page: 0, tag: PageTag::ExitLeft }));
    assert_eq!(commands.last(), Some(&Command::AddTag { page: 2, tag: PageTag::Active }));
}

#[test]
fn go_to_backward_exits_right() {
    let mut core = core_with(4);
    settle(&mut core, |c| c.begin_go_to(3));
    let (_, commands) = core.begin_go_to(1).unwrap();
    assert!(commands.contains(&Command::AddTag { page: 3, tag: PageTag::ExitRight }));
}

#[test]
fn go_to_rejects_self_and_out_of_range() {
    let mut core = core_with(3);
    assert!(core.begin_go_to(0).is_none());
    assert!(core.begin_go_to(3).is_none());
    assert!(core.begin_go_to(usize::MAX).is_none());
    assert!(!core.is_animating());
}

#[test]
fn empty_sequence_rejects_all_navigation() {
    let mut core = core_with(0);
    assert!(core.begin_next().is_none());
    assert!(core.begin_previous().is_none());
    assert!(core.begin_go_to(0).is_none());
    assert_eq!(core.current_page(), None);
}

#[test]
fn cursor_stays_in_bounds_for_any_call_sequence() {
    let mut core = core_with(5);
    // Deterministic pseudo-random walk over all navigation kinds.
    let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
    for _ in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        let started = match seed % 4 {
            0 => core.begin_next(),
            1 => core.begin_previous(),
            2 => core.begin_go_to(usize::try_from(seed % 8).unwrap()),
            _ => None,
        };
        if let Some((transition, _)) = started {
            if seed % 3 != 0 {
                core.finish(&transition);
            }
        } else if seed % 5 == 0 && core.is_animating() {
            core.reset();
        }
        let page = core.current_page().unwrap();
        assert!(page < 5, "cursor escaped: {page}");
    }
}

// =============================================================
// reset / stale transitions
// =============================================================

#[test]
fn reset_drops_running_transition() {
    let mut core = core_with(3);
    let (stale, _) = core.begin_next().unwrap();
    core.reset();

    assert_eq!(core.current_page(), Some(0));
    assert!(!core.is_animating());
    assert!(!core.is_current(&stale));
    assert!(core.finish(&stale).is_empty());

    let (fresh, _) = core.begin_next().unwrap();
    assert!(core.is_current(&fresh));
}

// =============================================================
// display_state
// =============================================================

#[test]
fn display_state_tracks_cursor() {
    let mut core = core_with(4);
    let display = core.display_state();
    assert_eq!(display.current_page, 1);
    assert_eq!(display.total_pages, 4);
    assert_eq!(display.progress_percent, 25.0);
    assert!(!display.prev_enabled);
    assert!(display.next_enabled);
    assert_eq!(display.active_thumbnail, Some(0));

    settle(&mut core, |c| c.begin_go_to(3));
    let display = core.display_state();
    assert_eq!(display.current_page, 4);
    assert_eq!(display.progress_percent, 100.0);
    assert!(display.prev_enabled);
    assert!(!display.next_enabled);
    assert_eq!(display.active_thumbnail, Some(3));
}

#[test]
fn display_state_for_empty_sequence_disables_controls() {
    let display = core_with(0).display_state();
    assert_eq!(display.current_page, 0);
    assert_eq!(display.progress_percent, 0.0);
    assert!(!display.prev_enabled);
    assert!(!display.next_enabled);
    assert_eq!(display.active_thumbnail, None);
}

// =============================================================
// preload_plan
// =============================================================

#[test]
fn preload_plan_orders_nearest_first() {
    let core = core_with(20);
    let plan = core.preload_plan(10);
    let pages: Vec<usize> = plan.iter().map(|r| r.page).collect();
    assert_eq!(pages, vec![10, 11, 9, 12, 8, 13, 7, 14, 6, 15, 5]);
    assert_eq!(plan[0].delay, Duration::ZERO);
    assert_eq!(plan[1].delay, Duration::from_millis(30));
    assert_eq!(plan[10].delay, Duration::from_millis(300));
}

#[test]
fn preload_plan_clips_to_bounds_and_keeps_rank_delays() {
    let core = core_with(3);
    let plan = core.preload_plan(0);
    let pages: Vec<usize> = plan.iter().map(|r| r.page).collect();
    assert_eq!(pages, vec![0, 1, 2]);
    // Page 2 is offset +2, the fourth candidate.
    assert_eq!(plan[2].delay, Duration::from_millis(90));
}

#[test]
fn preload_plan_never_exceeds_eleven_pages() {
    let core = core_with(100);
    for center in [0, 1, 5, 50, 98, 99, 150] {
        let plan = core.preload_plan(center);
        assert!(plan.len() <= 11);
        assert!(plan.iter().all(|r| r.page < 100));
    }
    assert!(core_with(0).preload_plan(0).is_empty());
}

#[test]
fn page_views_report_loaded_pages() {
    let core = core_with(3);
    let views = core.page_views(|r| r == "page-1.jpg");
    assert_eq!(views.len(), 3);
    assert!(!views[0].loaded);
    assert!(views[1].loaded);
    assert_eq!(views[2].reference, "page-2.jpg");
}
