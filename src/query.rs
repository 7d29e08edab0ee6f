//! Search, date-filter and sort over the fetched article list.
//!
//! [`apply`] is the only entry point.  It is pure: it never touches the
//! network or the UI and always returns the same output for the same input.
//! Bad input never errors; it just filters articles out.

use chrono::{DateTime, Utc};

use crate::article::Article;

/// Which article field the displayed list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    Title,
    Author,
    PublishedAt,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
            Self::PublishedAt => "Published At",
        }
    }

    /// The next key in picker order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Title => Self::Author,
            Self::Author => Self::PublishedAt,
            Self::PublishedAt => Self::Title,
        }
    }

    /// The raw field this key sorts on; absent values compare as `""`.
    fn field(self, article: &Article) -> &str {
        let value = match self {
            Self::Title => &article.title,
            Self::Author => &article.author,
            Self::PublishedAt => &article.published_at,
        };
        value.as_deref().unwrap_or("")
    }
}

/// Inclusive publication window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Everything the user controls about the displayed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    /// Case-insensitive needle for title/description.  Empty disables the
    /// text filter.
    pub search_text: String,
    /// `None` disables the date filter.
    pub date_range: Option<DateRange>,
    pub sort_key: SortKey,
}

/// Derive the list to display from `articles` and `query`.
///
/// Stages run in order: text filter, date filter, stable sort.  The result
/// holds positions in `articles`, in display order, so callers can tell
/// records with identical contents apart.
pub fn apply(articles: &[Article], query: &QueryParameters) -> Vec<usize> {
    let needle = query.search_text.to_lowercase();

    let mut matched: Vec<usize> = (0..articles.len())
        .filter(|&i| needle.is_empty() || matches_text(&articles[i], &needle))
        .collect();

    if let Some(range) = query.date_range {
        if range.start > range.end {
            return Vec::new();
        }
        matched.retain(|&i| {
            articles[i]
                .published()
                .is_some_and(|at| range.start <= at && at <= range.end)
        });
    }

    // `sort_by` is stable, so equal keys keep their input order.
    matched.sort_by(|&a, &b| {
        query
            .sort_key
            .field(&articles[a])
            .cmp(query.sort_key.field(&articles[b]))
    });

    matched
}

/// `needle` must already be lowercased.
fn matches_text(article: &Article, needle: &str) -> bool {
    let contains = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|text| text.to_lowercase().contains(needle))
    };
    contains(&article.title) || contains(&article.description)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
