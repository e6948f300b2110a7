//! Server-rendered pages.
//!
//! DESIGN
//! ======
//! Every page is an embedded body fragment wrapped in the shared layout.
//! Placeholders are plain `{{NAME}}` markers replaced at render time; the
//! navigation is generated so the current page's item carries the active
//! marker.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;

use crate::state::AppState;

const LAYOUT: &str = include_str!("../../templates/layout.html");

/// Navigation entries in display order.
const NAV: [Page; 6] = [Page::Home, Page::About, Page::Meeting, Page::International, Page::Magazine, Page::Contact];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    About,
    Contact,
    Meeting,
    International,
    Magazine,
    NotFound,
}

impl Page {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::About => "/about",
            Self::Contact => "/contact",
            Self::Meeting => "/meeting",
            Self::International => "/meeting/international",
            Self::Magazine => "/magazine",
            Self::NotFound => "",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::About => "About us",
            Self::Contact => "Contact",
            Self::Meeting => "Meetings",
            Self::International => "International",
            Self::Magazine => "Magazine",
            Self::NotFound => "Page not found",
        }
    }

    fn body(self) -> &'static str {
        match self {
            Self::Home => include_str!("../../templates/home.html"),
            Self::About => include_str!("../../templates/about.html"),
            Self::Contact => include_str!("../../templates/contact.html"),
            Self::Meeting => include_str!("../../templates/meeting.html"),
            Self::International => include_str!("../../templates/international.html"),
            Self::Magazine => include_str!("../../templates/magazine.html"),
            Self::NotFound => include_str!("../../templates/not_found.html"),
        }
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// Render `page` with its own body.
#[must_use]
pub fn render(page: Page) -> String {
    render_with(page, page.body())
}

/// Wrap `content` in the layout with `page` as the active navigation item.
#[must_use]
pub fn render_with(page: Page, content: &str) -> String {
    LAYOUT
        .replace("{{TITLE}}", page.title())
        .replace("{{NAV}}", &nav(page))
        .replace("{{CONTENT}}", content)
}

fn nav(active: Page) -> String {
    NAV.iter()
        .map(|&item| {
            let marker = if item == active { r#" class="active" aria-current="page""# } else { "" };
            format!(r#"      <a href="{}"{marker}>{}</a>"#, item.path(), item.title())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Magazine landing body: cover plus a thumbnail list of every page.
fn magazine_body(cover: Option<&str>, pages: &[String]) -> String {
    let cover_html = cover.map_or_else(
        || r#"<p class="magazine-empty">No issue is available yet.</p>"#.to_owned(),
        |src| format!(r#"<img class="magazine-cover" src="{}" alt="Magazine cover">"#, escape_html(src)),
    );
    let items = pages
        .iter()
        .enumerate()
        .map(|(i, src)| {
            format!(
                r#"    <li><img src="{}" alt="Page {}" loading="lazy"></li>"#,
                escape_html(src),
                i + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Page::Magazine
        .body()
        .replace("{{COVER}}", &cover_html)
        .replace("{{PAGE_COUNT}}", &pages.len().to_string())
        .replace("{{PAGES}}", &items)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// HANDLERS
// =============================================================================

pub async fn home() -> Html<String> {
    Html(render(Page::Home))
}

pub async fn about() -> Html<String> {
    Html(render(Page::About))
}

pub async fn contact() -> Html<String> {
    Html(render(Page::Contact))
}

pub async fn meeting() -> Html<String> {
    Html(render(Page::Meeting))
}

pub async fn international() -> Html<String> {
    Html(render(Page::International))
}

/// `GET /magazine`: landing page for the current issue.
pub async fn magazine(State(state): State<AppState>) -> Html<String> {
    let manifest = &state.magazine;
    let cover = manifest.cover.as_deref().or_else(|| manifest.pages.first().map(String::as_str));
    Html(render_with(Page::Magazine, &magazine_body(cover, &manifest.pages)))
}

pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(render(Page::NotFound)))
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
