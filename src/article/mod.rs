//! Article data as it arrives from the news API.
//!
//! [`Article`] mirrors one JSON article object; [`decode_envelope`] unwraps
//! the envelope around a whole response.  Everything in here is plain
//! data plus decoding; fetching lives in [`crate::source`] and filtering in
//! [`crate::query`].

mod envelope;
mod record;

pub use envelope::{decode_api_failure, decode_envelope};
pub use record::{Article, ArticleKey};

#[cfg(test)]
pub(crate) use record::tests::make_article;
