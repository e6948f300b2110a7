use super::*;

fn shown(visible: bool) -> Command {
    Command::SetVisible { section: Section::Chrome, visible }
}

#[test]
fn chrome_starts_visible() {
    assert!(ChromeState::new(false).is_visible());
    assert!(ChromeState::new(true).is_visible());
}

#[test]
fn toggle_flips_and_arms_timer_only_when_shown() {
    let mut chrome = ChromeState::new(false);
    assert_eq!(chrome.toggle(), (shown(false), false));
    assert!(!chrome.is_visible());
    assert_eq!(chrome.toggle(), (shown(true), true));
    assert!(chrome.is_visible());
}

#[test]
fn reveal_only_emits_on_change() {
    let mut chrome = ChromeState::new(false);
    assert_eq!(chrome.reveal(), None);
    chrome.toggle();
    assert_eq!(chrome.reveal(), Some(shown(true)));
    assert!(chrome.is_visible());
}

#[test]
fn idle_timeout_hides_on_pointer_devices() {
    let mut chrome = ChromeState::new(false);
    assert_eq!(chrome.idle_timeout(), Some(shown(false)));
    assert!(!chrome.is_visible());
}

#[test]
fn idle_timeout_is_suppressed_on_touch_devices() {
    let mut chrome = ChromeState::new(true);
    assert!(!chrome.auto_hides());
    assert_eq!(chrome.idle_timeout(), None);
    assert!(chrome.is_visible());
}
