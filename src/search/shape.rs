use crate::types::{Image, SearchCategory};

/// Shown wherever an entity has no artwork of its own.
pub const PLACEHOLDER_IMAGE: &str = "assets/placeholder.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Small,
    Medium,
    Large,
}

/// Entity kinds a search response groups its items by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Tracks,
    Artists,
    Albums,
    Playlists,
}

/// Formats a track duration in milliseconds as M:SS with zero-padded seconds.
pub fn format_duration(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{}:{:02}", minutes, seconds)
}

/// Abbreviates a follower count: 2_300_000 becomes "2.3M", 1_500 becomes
/// "1.5K", anything below a thousand is printed as is.
pub fn format_followers(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Picks an image URL by size tier from a largest-first image list,
/// degrading to the placeholder when the list is empty. Never fails.
pub fn image_url(images: &[Image], size: ImageSize) -> &str {
    if images.is_empty() {
        return PLACEHOLDER_IMAGE;
    }
    let index = match size {
        ImageSize::Large => 0,
        ImageSize::Medium => images.len() / 2,
        ImageSize::Small => images.len() - 1,
    };
    &images[index].url
}

/// The per-category display cap.
///
/// An `All` search keeps a balanced overview: tracks are capped tighter
/// than the other kinds. Searching a specific category allows the full
/// page. This is a lookup, so the policy lives in exactly one place.
pub fn result_limit(category: SearchCategory, kind: ResultKind) -> usize {
    match (category, kind) {
        (SearchCategory::All, ResultKind::Tracks) => 8,
        (SearchCategory::All, _) => 6,
        _ => 20,
    }
}
