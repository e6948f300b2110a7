//! Magazine manifest loading.
//!
//! The manifest is resolved once at startup. A JSON file is used verbatim;
//! an image directory is listed in natural order ("page-2" before
//! "page-10") and each file is referenced under [`PAGES_ROUTE`].

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use reader::Manifest;

use crate::config::MagazineSource;

/// URL prefix the page images of an image directory are served under.
pub const PAGES_ROUTE: &str = "/magazine/pages";

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, thiserror::Error)]
pub enum MagazineError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid manifest {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// Resolve the manifest for `source`.
///
/// # Errors
///
/// Returns [`MagazineError`] when the file or directory cannot be read or
/// the manifest is not valid JSON.
pub fn load(source: &MagazineSource) -> Result<Manifest, MagazineError> {
    match source {
        MagazineSource::ManifestFile(path) => from_manifest_file(path),
        MagazineSource::ImageDir(dir) => from_image_dir(dir),
        MagazineSource::Unconfigured => Ok(Manifest::default()),
    }
}

fn from_manifest_file(path: &Path) -> Result<Manifest, MagazineError> {
    let raw = std::fs::read_to_string(path).map_err(|source| MagazineError::Io { path: path.to_owned(), source })?;
    serde_json::from_str(&raw).map_err(|source| MagazineError::Parse { path: path.to_owned(), source })
}

fn from_image_dir(dir: &Path) -> Result<Manifest, MagazineError> {
    let io_err = |source| MagazineError::Io { path: dir.to_owned(), source };
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_owned());
        }
    }
    names.sort_by(|a, b| natural_cmp(a, b));

    let pages = names.iter().map(|name| format!("{PAGES_ROUTE}/{name}")).collect();
    Ok(Manifest { cover: None, pages })
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Compare names treating runs of ASCII digits as numbers.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let n = take_number(&mut left);
                let m = take_number(&mut right);
                // Longer digit runs (after zero stripping) are larger numbers.
                let order = n.len().cmp(&m.len()).then_with(|| n.cmp(&m));
                if order != Ordering::Equal {
                    return order;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits.trim_start_matches('0').to_owned()
}

#[cfg(test)]
#[path = "magazine_test.rs"]
mod tests;
