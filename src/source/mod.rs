//! Article source abstraction.
//!
//! The [`NewsSource`] trait is what the rest of the app fetches through;
//! [`NewsApiSource`] is the concrete NewsAPI client.
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `guardian.rs`).
//! 2. Define a struct and implement [`NewsSource`] for it, converting the
//!    provider's payload into [`Article`] values.
//! 3. Add `mod guardian;` below and re-export your struct.
//! 4. Construct it in `main.rs` in place of (or next to) `NewsApiSource`.
//!
//! Filtering, sorting and the UI are source-agnostic.

mod newsapi;

pub use newsapi::NewsApiSource;

use std::future::Future;

use crate::article::Article;
use crate::error::FetchError;

/// Something that can produce a fresh article list.
///
/// [`fetch_articles`](NewsSource::fetch_articles) is single-shot: each call
/// makes one attempt and resolves exactly once.  It runs on the tokio
/// runtime, so implementations must be `Send + Sync` and return a `Send`
/// future.
pub trait NewsSource: Send + Sync + 'static {
    /// Human-readable label for logs and the status bar.
    fn name(&self) -> &str;

    /// Fetch the current article list, in the order the provider returns it.
    fn fetch_articles(&self) -> impl Future<Output = Result<Vec<Article>, FetchError>> + Send;
}
