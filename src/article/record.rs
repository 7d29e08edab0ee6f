//! The article record as delivered by the news API.
//!
//! Every field except `source` is nullable on the wire, so almost everything
//! here is an `Option`.  Records are immutable once decoded; a new fetch
//! replaces the whole list rather than merging into it.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Timestamp layout used by `publishedAt`, e.g. `2024-01-05T10:00:00+0000`.
const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// The outlet an article came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A single article, exactly as decoded from one JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Publishing outlet.  Required: a missing `source` fails the decode.
    pub source: Source,

    pub author: Option<String>,

    /// Headline.
    pub title: Option<String>,

    /// Link to the full story.  Doubles as the article's identity when set.
    pub url: Option<String>,

    /// Lead image.  Only displayed as a link; images are never downloaded.
    pub url_to_image: Option<String>,

    pub description: Option<String>,

    /// Raw publication timestamp.  Kept as a string because sorting compares
    /// the raw text; use [`Article::published`] for the parsed value.
    pub published_at: Option<String>,

    pub content: Option<String>,
}

/// UI-side identity of an article, used to keep a selection stable while the
/// displayed list is re-derived.
///
/// The url is the natural key.  Articles without one fall back to their slot
/// in a particular fetched snapshot, which is only meaningful until the next
/// fetch replaces the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArticleKey {
    Url(String),
    Slot { version: u64, index: usize },
}

impl Article {
    /// Identity of this article within snapshot `version`, where it sits at
    /// position `index`.
    pub fn key(&self, version: u64, index: usize) -> ArticleKey {
        match &self.url {
            Some(url) => ArticleKey::Url(url.clone()),
            None => ArticleKey::Slot { version, index },
        }
    }

    /// The publication time, if present and well-formed.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_published_at)
    }
}

/// Parse a `publishedAt` value in the `yyyy-MM-dd'T'HH:mm:ssZ` layout.
///
/// The zone may be a literal `Z` or a numeric offset.  Anything else,
/// including fractional seconds, yields `None`.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix('Z') {
        Some(head) => Cow::Owned(format!("{head}+0000")),
        None => Cow::Borrowed(raw),
    };

    DateTime::parse_from_str(&normalized, PUBLISHED_AT_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
