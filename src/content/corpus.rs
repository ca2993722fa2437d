use include_dir::{include_dir, Dir};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use super::{format_sentence, ContentSource, Quote, EXPLICIT_RATIO};
use crate::error::{Error, Result};

static CORPUS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/corpus");

#[derive(Deserialize, Clone, Debug)]
struct WordList {
    name: String,
    words: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
struct QuoteList {
    name: String,
    quotes: Vec<Quote>,
}

/// Word pools and quotes the generators draw from.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub normal_words: Vec<String>,
    pub explicit_words: Vec<String>,
    pub quotes: Vec<Quote>,
}

impl Corpus {
    /// Corpora compiled into the binary from `src/corpus`.
    pub fn embedded() -> Result<Self> {
        let normal: WordList = read_corpus_file("normal.json")?;
        let explicit: WordList = read_corpus_file("explicit.json")?;
        let quotes: QuoteList = read_corpus_file("quotes.json")?;

        Self::new(normal, explicit, quotes)
    }

    fn new(normal: WordList, explicit: WordList, quotes: QuoteList) -> Result<Self> {
        if normal.words.is_empty() {
            return Err(Error::EmptyCorpus(normal.name));
        }
        if explicit.words.is_empty() {
            return Err(Error::EmptyCorpus(explicit.name));
        }
        if quotes.quotes.is_empty() {
            return Err(Error::EmptyCorpus(quotes.name));
        }

        Ok(Self {
            normal_words: normal.words,
            explicit_words: explicit.words,
            quotes: quotes.quotes,
        })
    }
}

fn read_corpus_file<T: serde::de::DeserializeOwned>(file_name: &str) -> Result<T> {
    let file = CORPUS_DIR
        .get_file(file_name)
        .ok_or_else(|| Error::MissingCorpus(file_name.to_string()))?;

    Ok(serde_json::from_slice(file.contents())?)
}

/// Random generator over a [`Corpus`].
#[derive(Debug)]
pub struct CorpusSource {
    corpus: Corpus,
    rng: StdRng,
}

impl CorpusSource {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, for reproducible tests.
    pub fn with_seed(corpus: Corpus, seed: u64) -> Self {
        Self {
            corpus,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}

impl ContentSource for CorpusSource {
    fn word_chunk(&mut self, count: usize, explicit: bool) -> String {
        let count = count.max(1);
        let mut words = Vec::with_capacity(count);

        for _ in 0..count {
            let pool = if explicit && self.rng.gen_bool(EXPLICIT_RATIO) {
                &self.corpus.explicit_words
            } else {
                &self.corpus.normal_words
            };
            if let Some(word) = pool.choose(&mut self.rng) {
                words.push(word.clone());
            }
        }

        let chunk = format_sentence(&words);
        debug!("generated {count}-word chunk (explicit: {explicit})");
        chunk
    }

    fn quote(&mut self) -> Quote {
        self.corpus
            .quotes
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }
}
