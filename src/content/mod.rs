//! Text supply for typing sessions.
//!
//! The session engine only talks to [`ContentSource`]; where the words and
//! quotes come from is up to the implementation.

pub mod corpus;
pub mod formatter;
pub mod scripted;

use serde::{Deserialize, Serialize};

pub use corpus::{Corpus, CorpusSource};
pub use formatter::{capitalize_first_letter, format_sentence};
pub use scripted::ScriptedSource;

/// Share of words drawn from the explicit pool when an explicit chunk is requested.
pub const EXPLICIT_RATIO: f64 = 0.4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }

    /// Length of the quote text in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Supplies the next piece of text for a session.
///
/// Every call must return a non-empty result; an exhausted source is a broken
/// collaborator, not something the engine recovers from.
pub trait ContentSource {
    /// `count` words joined by single spaces, first letter capitalized,
    /// terminated with a period.
    fn word_chunk(&mut self, count: usize, explicit: bool) -> String;

    fn quote(&mut self) -> Quote;
}

impl<T: ContentSource + ?Sized> ContentSource for Box<T> {
    fn word_chunk(&mut self, count: usize, explicit: bool) -> String {
        (**self).word_chunk(count, explicit)
    }

    fn quote(&mut self) -> Quote {
        (**self).quote()
    }
}
