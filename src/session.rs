//! Per-attempt typing state: the segment being typed, the input buffer,
//! cumulative counters and the timing anchor.
//!
//! Scoring happens once per character position. Backspacing and retyping a
//! position never rescores it, so error counts only ever grow within a segment.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::content::{ContentSource, Quote};

pub const DEFAULT_QUOTE_WINDOW: usize = 3;
pub const MIN_QUOTE_WINDOW: usize = 2;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    #[value(name = "words")]
    #[strum(serialize = "words")]
    WordList,
    #[value(name = "explicit")]
    #[strum(serialize = "explicit")]
    ExplicitWordList,
    #[value(name = "quotes")]
    #[strum(serialize = "quotes")]
    QuoteRotation,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::WordList, Mode::ExplicitWordList, Mode::QuoteRotation];

    pub fn next(self) -> Self {
        match self {
            Mode::WordList => Mode::ExplicitWordList,
            Mode::ExplicitWordList => Mode::QuoteRotation,
            Mode::QuoteRotation => Mode::WordList,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Whether the first segment is the whole test or the head of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Typing the whole segment ends the session.
    Fixed,
    /// Exhausted segments are replaced; only the clock ends the session.
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Each finished chunk stays in `transcript`; the live chunk starts at
    /// char offset `offset`.
    Words { transcript: String, offset: usize },
    Explicit,
    Quotes { window: VecDeque<Quote> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    content: String,
    len: usize,
    kind: SegmentKind,
}

impl Segment {
    fn new(content: String, kind: SegmentKind) -> Self {
        let len = content.chars().count();
        Self { content, len, kind }
    }

    fn quotes(window: VecDeque<Quote>) -> Self {
        let content = join_quotes(&window);
        Self::new(content, SegmentKind::Quotes { window })
    }

    pub fn open<S: ContentSource + ?Sized>(
        mode: Mode,
        word_count: usize,
        quote_window: usize,
        source: &mut S,
    ) -> Self {
        match mode {
            Mode::WordList => {
                let chunk = source.word_chunk(word_count, false);
                Self::new(
                    chunk.clone(),
                    SegmentKind::Words {
                        transcript: chunk,
                        offset: 0,
                    },
                )
            }
            Mode::ExplicitWordList => Self::new(source.word_chunk(word_count, true), SegmentKind::Explicit),
            Mode::QuoteRotation => {
                Self::quotes((0..quote_window).map(|_| source.quote()).collect())
            }
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn mode(&self) -> Mode {
        match self.kind {
            SegmentKind::Words { .. } => Mode::WordList,
            SegmentKind::Explicit => Mode::ExplicitWordList,
            SegmentKind::Quotes { .. } => Mode::QuoteRotation,
        }
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.content.chars().nth(idx)
    }

    pub fn window(&self) -> Option<&VecDeque<Quote>> {
        match &self.kind {
            SegmentKind::Quotes { window } => Some(window),
            _ => None,
        }
    }

    /// The quote currently under the cursor in quote mode.
    pub fn current_quote(&self) -> Option<&Quote> {
        self.window().and_then(|w| w.front())
    }

    /// Everything typed so far in word-list mode plus the live chunk, and the
    /// char offset where the live chunk begins.
    pub fn transcript(&self) -> Option<(&str, usize)> {
        match &self.kind {
            SegmentKind::Words { transcript, offset } => Some((transcript.as_str(), *offset)),
            _ => None,
        }
    }
}

fn join_quotes(window: &VecDeque<Quote>) -> String {
    window
        .iter()
        .map(|q| q.text.as_str())
        .collect::<Vec<&str>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub correct_chars: usize,
    pub error_chars: usize,
    /// Characters of segments (or quotes) already left behind.
    pub total_chars_typed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Word-list chunk exhausted and replaced.
    Advanced,
    /// Leading quote consumed and a new one appended to the window.
    Rotated { completed: Quote },
    /// Fixed target reached, the session is over.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Session finished, or the value did not change.
    Ignored,
    /// Longer than the current segment.
    Rejected,
    Accepted {
        /// Character positions scored by this edit.
        scored: usize,
        transition: Option<Transition>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    phase: Phase,
    target: Target,
    word_count: usize,
    segment: Segment,
    input: String,
    input_len: usize,
    /// Positions below this mark have been scored against the current segment.
    scored_len: usize,
    counters: Counters,
    started_at: Option<Instant>,
}

impl SessionState {
    pub fn new<S: ContentSource + ?Sized>(
        mode: Mode,
        target: Target,
        word_count: usize,
        quote_window: usize,
        source: &mut S,
    ) -> Self {
        let word_count = word_count.max(1);
        let quote_window = if quote_window < MIN_QUOTE_WINDOW {
            warn!("quote window {quote_window} too small, using {MIN_QUOTE_WINDOW}");
            MIN_QUOTE_WINDOW
        } else {
            quote_window
        };

        let segment = Segment::open(mode, word_count, quote_window, source);
        debug!("opened {mode} segment of {} chars", segment.len());

        Self {
            phase: Phase::Idle,
            target,
            word_count,
            segment,
            input: String::new(),
            input_len: 0,
            scored_len: 0,
            counters: Counters::default(),
            started_at: None,
        }
    }

    /// Apply the full updated input value (not a delta).
    pub fn apply_input<S: ContentSource + ?Sized>(
        &mut self,
        new_value: &str,
        now: Instant,
        source: &mut S,
    ) -> InputOutcome {
        if self.phase == Phase::Finished {
            return InputOutcome::Ignored;
        }

        let new_len = new_value.chars().count();
        if new_len > self.segment.len() {
            return InputOutcome::Rejected;
        }
        if new_value == self.input {
            return InputOutcome::Ignored;
        }

        let scored = self.score(new_value, new_len, now);
        self.input = new_value.to_string();
        self.input_len = new_len;

        let transition = self.check_completion(source);
        InputOutcome::Accepted { scored, transition }
    }

    pub fn apply_char<S: ContentSource + ?Sized>(
        &mut self,
        c: char,
        now: Instant,
        source: &mut S,
    ) -> InputOutcome {
        let mut value = String::with_capacity(self.input.len() + c.len_utf8());
        value.push_str(&self.input);
        value.push(c);
        self.apply_input(&value, now, source)
    }

    /// Drop the last typed character. Counters are left alone.
    pub fn apply_backspace(&mut self) -> InputOutcome {
        if self.phase == Phase::Finished || self.input.pop().is_none() {
            return InputOutcome::Ignored;
        }
        self.input_len -= 1;

        InputOutcome::Accepted {
            scored: 0,
            transition: None,
        }
    }

    pub fn finish(&mut self) {
        if self.phase != Phase::Finished {
            self.phase = Phase::Finished;
            info!(
                "session finished: {} chars, {} correct, {} errors",
                self.chars_typed(),
                self.counters.correct_chars,
                self.counters.error_chars
            );
        }
    }

    fn score(&mut self, new_value: &str, new_len: usize, now: Instant) -> usize {
        let from = self.input_len.max(self.scored_len);
        if new_len <= from {
            return 0;
        }

        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.phase = Phase::Running;
            info!("first keystroke scored, {} session running", self.mode());
        }

        for (expected, typed) in self
            .segment
            .content
            .chars()
            .zip(new_value.chars())
            .skip(from)
        {
            if expected == typed {
                self.counters.correct_chars += 1;
            } else {
                self.counters.error_chars += 1;
            }
        }

        self.scored_len = new_len;
        new_len - from
    }

    fn check_completion<S: ContentSource + ?Sized>(&mut self, source: &mut S) -> Option<Transition> {
        match (self.target, self.segment.mode()) {
            (Target::Fixed, _) => self.complete_fixed(),
            (Target::Stream, Mode::WordList) => self.advance_word_list(source),
            (Target::Stream, Mode::ExplicitWordList) => self.swap_explicit(source),
            (Target::Stream, Mode::QuoteRotation) => self.rotate_quote(source),
        }
    }

    fn segment_exhausted(&self) -> bool {
        !self.segment.is_empty() && self.input_len == self.segment.len()
    }

    /// Bank the finished segment and start over on an empty buffer.
    fn consume_segment(&mut self) {
        self.counters.total_chars_typed += self.segment.len();
        self.input.clear();
        self.input_len = 0;
        self.scored_len = 0;
    }

    fn complete_fixed(&mut self) -> Option<Transition> {
        if !self.segment_exhausted() {
            return None;
        }
        self.consume_segment();
        self.finish();
        Some(Transition::Completed)
    }

    /// Word-list mode appends the new chunk to the running transcript.
    fn advance_word_list<S: ContentSource + ?Sized>(&mut self, source: &mut S) -> Option<Transition> {
        if !self.segment_exhausted() {
            return None;
        }
        self.consume_segment();

        let chunk = source.word_chunk(self.word_count, false);
        let kind = match std::mem::replace(&mut self.segment.kind, SegmentKind::Explicit) {
            SegmentKind::Words { mut transcript, .. } => {
                transcript.push(' ');
                let offset = transcript.chars().count();
                transcript.push_str(&chunk);
                SegmentKind::Words { transcript, offset }
            }
            other => other,
        };
        self.segment = Segment::new(chunk, kind);
        debug!("word chunk advanced, {} chars banked", self.counters.total_chars_typed);

        Some(Transition::Advanced)
    }

    /// Explicit mode swaps in a standalone sentence.
    fn swap_explicit<S: ContentSource + ?Sized>(&mut self, source: &mut S) -> Option<Transition> {
        if !self.segment_exhausted() {
            return None;
        }
        self.consume_segment();
        self.segment = Segment::new(source.word_chunk(self.word_count, true), SegmentKind::Explicit);
        debug!("explicit sentence swapped, {} chars banked", self.counters.total_chars_typed);

        Some(Transition::Advanced)
    }

    /// Once the leading quote and its separator are typed, drop it from the
    /// window, append a fresh quote and keep only the overflow in the buffer.
    fn rotate_quote<S: ContentSource + ?Sized>(&mut self, source: &mut S) -> Option<Transition> {
        let first_len = self.segment.current_quote()?.len();
        let consumed = first_len + 1;
        if self.input_len < consumed {
            return None;
        }

        // The running counters were scored against the pre-rotation content;
        // re-derive the leading quote's correct count from the buffer itself.
        let fresh_correct = self
            .input
            .chars()
            .zip(self.segment.content.chars())
            .take(first_len)
            .filter(|(typed, expected)| typed == expected)
            .count();
        let counters = &mut self.counters;
        counters.total_chars_typed += consumed;
        counters.correct_chars =
            counters.correct_chars - counters.correct_chars.min(first_len) + fresh_correct;

        let mut window = match std::mem::replace(&mut self.segment.kind, SegmentKind::Explicit) {
            SegmentKind::Quotes { window } => window,
            _ => VecDeque::new(),
        };
        let completed = window.pop_front().unwrap_or_default();
        window.push_back(source.quote());
        self.segment = Segment::quotes(window);

        self.input = self.input.chars().skip(consumed).collect();
        self.input_len -= consumed;
        self.scored_len = self.scored_len.saturating_sub(consumed);
        debug!(
            "rotated quote by {} ({consumed} chars banked, {} correct)",
            completed.author, fresh_correct
        );

        Some(Transition::Rotated { completed })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn mode(&self) -> Mode {
        self.segment.mode()
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Banked characters plus whatever sits in the buffer.
    pub fn chars_typed(&self) -> usize {
        self.counters.total_chars_typed + self.input_len
    }

    /// Time since the first scored keystroke, zero before it.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }
}
