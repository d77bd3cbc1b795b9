//! Slug derivation for posts and tags. A slug is a URL-safe, per-site-unique
//! string derived from a title; tags get the same treatment so that e.g.
//! `macOS` and `MacOS` resolve to the same tag page.

use uuid::Uuid;

/// Longest slug the platform will generate. Slugs end up in both URLs and
/// file names, so they are kept comfortably short of filesystem limits.
pub const MAX_SLUG_LEN: usize = 140;

/// Derives a slug from free text: lower-cased, non-alphanumeric runs
/// collapsed to `-`, truncated to [`MAX_SLUG_LEN`].
pub fn from_text(text: &str) -> String {
    let mut slug = ::slug::slugify(text);
    if slug.len() > MAX_SLUG_LEN {
        // slugify output is ASCII, so byte truncation is safe
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Produces a replacement slug after an intra-site collision. Appends the
/// number of posts already sharing the title and a short random suffix. This
/// is best-effort uniqueness: the caller retries the persist exactly once
/// with the result.
pub fn disambiguate(slug: &str, shared_titles: usize) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", slug, shared_titles, &suffix[..6])
}

/// Splits a comma-separated tag string into cleaned tag slugs. Empty
/// segments are dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .map(from_text)
        .filter(|tag| !tag.is_empty())
        .collect()
}
