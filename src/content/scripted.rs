use super::{ContentSource, Quote};

const FALLBACK_CHUNK: &str = "The quick brown fox jumps over the lazy dog.";

/// Replays fixed chunks and quotes in order, cycling when exhausted.
///
/// Backs custom prompts and makes sessions reproducible in tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    chunks: Vec<String>,
    quotes: Vec<Quote>,
    next_chunk: usize,
    next_quote: usize,
    chunk_requests: usize,
    quote_requests: usize,
}

impl ScriptedSource {
    /// Blank chunks and quotes are dropped; an empty script falls back to a
    /// pangram so a segment is never empty.
    pub fn new<S: Into<String>>(chunks: Vec<S>, quotes: Vec<Quote>) -> Self {
        Self {
            chunks: chunks
                .into_iter()
                .map(Into::into)
                .filter(|chunk: &String| !chunk.trim().is_empty())
                .collect(),
            quotes: quotes
                .into_iter()
                .filter(|quote| !quote.text.trim().is_empty())
                .collect(),
            ..Self::default()
        }
    }

    /// A source that always hands out the same prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self::new(vec![prompt.clone()], vec![Quote::new(prompt, "")])
    }

    pub fn chunk_requests(&self) -> usize {
        self.chunk_requests
    }

    pub fn quote_requests(&self) -> usize {
        self.quote_requests
    }
}

impl ContentSource for ScriptedSource {
    fn word_chunk(&mut self, _count: usize, _explicit: bool) -> String {
        self.chunk_requests += 1;
        if self.chunks.is_empty() {
            return FALLBACK_CHUNK.to_string();
        }
        let chunk = self.chunks[self.next_chunk % self.chunks.len()].clone();
        self.next_chunk += 1;
        chunk
    }

    fn quote(&mut self) -> Quote {
        self.quote_requests += 1;
        if self.quotes.is_empty() {
            return Quote::new(FALLBACK_CHUNK, "Anonymous");
        }
        let quote = self.quotes[self.next_quote % self.quotes.len()].clone();
        self.next_quote += 1;
        quote
    }
}
