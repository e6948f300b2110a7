//! Magazine manifest endpoint.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::state::AppState;

/// Response body of `GET /api/magazine`. `cover` falls back to the first
/// page and is absent only for an empty issue.
#[derive(Debug, Serialize)]
pub struct MagazineResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub pages: Vec<String>,
    pub total: usize,
}

pub async fn manifest(State(state): State<AppState>) -> Json<MagazineResponse> {
    let manifest = &state.magazine;
    let cover = manifest.cover.clone().or_else(|| manifest.pages.first().cloned());
    Json(MagazineResponse { cover, pages: manifest.pages.clone(), total: manifest.pages.len() })
}

#[cfg(test)]
#[path = "magazine_test.rs"]
mod tests;
