//! Drives one typing test at a time: owns the content source, the clock, the
//! session state and the sample recorder, and freezes a [`SessionResult`]
//! when the session ends.

use std::time::{Duration, Instant};

use log::{debug, info};
use serde::Serialize;

use crate::content::ContentSource;
use crate::metrics::{compute_accuracy, compute_wpm, std_dev};
use crate::runtime::Clock;
use crate::session::{
    Counters, InputOutcome, Mode, SessionState, Target, Transition, DEFAULT_QUOTE_WINDOW,
};
use crate::time_series::{sample_interval, DataPoint, SampleRecorder, SampleTrigger};

pub const DEFAULT_WORD_COUNT: usize = 25;
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestConfig {
    pub mode: Mode,
    pub word_count: usize,
    pub quote_count: usize,
    /// `None` runs until the first segment is typed out.
    pub time_limit_secs: Option<u64>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            mode: Mode::WordList,
            word_count: DEFAULT_WORD_COUNT,
            quote_count: DEFAULT_QUOTE_WINDOW,
            time_limit_secs: Some(DEFAULT_TIME_LIMIT_SECS),
        }
    }
}

impl TestConfig {
    pub fn target(&self) -> Target {
        match self.time_limit_secs {
            Some(_) => Target::Stream,
            None => Target::Fixed,
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }

    pub fn sample_interval(&self) -> Duration {
        sample_interval(self.time_limit_secs)
    }
}

/// Identifies the timer armed for one session. Ticks carrying an older token
/// are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale token, idle session, or already finished.
    Ignored,
    Sampled { bucket: u64 },
    /// The countdown ran out and the session was finished.
    Expired,
}

/// Read-only view for live rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSnapshot<'a> {
    pub mode: Mode,
    pub segment_content: &'a str,
    pub input: &'a str,
    pub counters: Counters,
    /// Exact seconds left, `None` for untimed runs.
    pub time_left: Option<f64>,
    pub is_finished: bool,
    pub chars_typed: usize,
    pub wpm: u32,
    pub accuracy: u32,
}

impl LiveSnapshot<'_> {
    /// Whole seconds left, rounded up for display.
    pub fn time_left_secs(&self) -> Option<u64> {
        self.time_left.map(|t| t.ceil() as u64)
    }
}

/// Frozen outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResult {
    pub mode: Mode,
    pub word_count: usize,
    pub quote_count: usize,
    pub time_limit_secs: Option<u64>,
    pub final_wpm: u32,
    pub final_accuracy: u32,
    pub errors: usize,
    pub total_chars_typed: usize,
    pub elapsed_secs: f64,
    /// Standard deviation of the sampled WPM values.
    pub consistency: Option<f64>,
    pub series: Vec<DataPoint>,
}

impl SessionResult {
    /// A chart needs at least two points.
    pub fn has_chart_data(&self) -> bool {
        self.series.len() > 1
    }
}

pub struct TestController<S: ContentSource, C: Clock> {
    config: TestConfig,
    source: S,
    clock: C,
    session: SessionState,
    recorder: SampleRecorder,
    generation: u64,
    result: Option<SessionResult>,
    /// The session built by `new` has not been handed out by `start` yet.
    pending_first: bool,
}

impl<S: ContentSource, C: Clock> TestController<S, C> {
    /// Prepares the first session and arms its timer.
    pub fn new(config: TestConfig, mut source: S, clock: C) -> Self {
        let session = open_session(&config, &mut source);
        Self {
            config,
            source,
            clock,
            session,
            recorder: SampleRecorder::new(),
            generation: 0,
            result: None,
            pending_first: true,
        }
    }

    /// Fetch a fresh segment, reset every counter and the series, and arm a
    /// new timer. The first call reuses the segment prepared by `new`. The
    /// session runs from the first scored keystroke.
    pub fn start(&mut self) -> TimerToken {
        if !std::mem::take(&mut self.pending_first) {
            self.session = open_session(&self.config, &mut self.source);
        }
        self.recorder = SampleRecorder::new();
        self.result = None;
        self.generation += 1;
        info!(
            "session prepared: {} mode, {} words, {} quotes, limit {:?}",
            self.config.mode,
            self.config.word_count,
            self.config.quote_count,
            self.config.time_limit_secs
        );
        self.token()
    }

    pub fn restart(&mut self) -> TimerToken {
        debug!("restart requested");
        self.pending_first = false;
        self.start()
    }

    pub fn token(&self) -> TimerToken {
        TimerToken(self.generation)
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn series(&self) -> Vec<DataPoint> {
        self.recorder.series()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn on_mode_change(&mut self, mode: Mode) -> TimerToken {
        self.config.mode = mode;
        self.restart()
    }

    pub fn on_word_count_change(&mut self, word_count: usize) -> TimerToken {
        self.config.word_count = word_count;
        self.restart()
    }

    pub fn on_quote_count_change(&mut self, quote_count: usize) -> TimerToken {
        self.config.quote_count = quote_count;
        self.restart()
    }

    pub fn on_test_time_change(&mut self, time_limit_secs: Option<u64>) -> TimerToken {
        self.config.time_limit_secs = time_limit_secs;
        self.restart()
    }

    /// Periodic sampler and countdown check.
    pub fn on_tick(&mut self, token: TimerToken) -> TickOutcome {
        if token != self.token() || !self.session.is_running() {
            return TickOutcome::Ignored;
        }

        let now = self.clock.now();
        if self.expired(now) {
            self.finish();
            return TickOutcome::Expired;
        }

        match self.sample(SampleTrigger::Tick) {
            Some(bucket) => TickOutcome::Sampled { bucket },
            None => TickOutcome::Ignored,
        }
    }

    pub fn type_char(&mut self, c: char) -> InputOutcome {
        let mut value = self.session.input().to_string();
        value.push(c);
        self.apply_input(&value)
    }

    pub fn backspace(&mut self) -> InputOutcome {
        if self.expire_if_due() {
            return InputOutcome::Ignored;
        }
        self.session.apply_backspace()
    }

    /// Feed the full updated input value.
    pub fn apply_input(&mut self, value: &str) -> InputOutcome {
        if self.expire_if_due() {
            return InputOutcome::Ignored;
        }

        let now = self.clock.now();
        let outcome = self.session.apply_input(value, now, &mut self.source);

        if let InputOutcome::Accepted { scored, transition } = &outcome {
            if *scored > 0 {
                self.sample(SampleTrigger::Keystroke);
            }
            match transition {
                Some(Transition::Rotated { .. }) => {
                    self.sample(SampleTrigger::Rotation);
                }
                Some(Transition::Completed) => self.finish(),
                Some(Transition::Advanced) | None => {}
            }
        }
        outcome
    }

    /// Freeze the result and tear the timer down. Repeated calls are no-ops.
    pub fn finish(&mut self) {
        if self.result.is_some() {
            return;
        }

        self.session.finish();
        self.generation += 1;

        if self.session.started_at().is_some() {
            self.sample(SampleTrigger::Completion);
        }
        self.recorder.seal();

        let result = self.build_result();
        info!(
            "result: {} wpm, {}% accuracy, {} errors over {:.1}s",
            result.final_wpm, result.final_accuracy, result.errors, result.elapsed_secs
        );
        self.result = Some(result);
    }

    pub fn snapshot(&self) -> LiveSnapshot<'_> {
        let elapsed = self.elapsed_secs();
        let time_left = self
            .config
            .time_limit()
            .map(|limit| (limit.as_secs_f64() - elapsed).max(0.0));
        let counters = self.session.counters();

        LiveSnapshot {
            mode: self.session.mode(),
            segment_content: self.session.segment().content(),
            input: self.session.input(),
            counters,
            time_left,
            is_finished: self.session.is_finished(),
            chars_typed: self.session.chars_typed(),
            wpm: compute_wpm(self.session.chars_typed(), elapsed),
            accuracy: compute_accuracy(counters.correct_chars, counters.error_chars),
        }
    }

    fn expired(&self, now: Instant) -> bool {
        match self.config.time_limit() {
            Some(limit) => self.session.is_running() && self.session.elapsed(now) >= limit,
            None => false,
        }
    }

    /// Finishes a timed session whose countdown ran out between ticks.
    fn expire_if_due(&mut self) -> bool {
        if self.expired(self.clock.now()) {
            debug!("countdown ran out before the next tick");
            self.finish();
            return true;
        }
        false
    }

    /// Seconds since the first scored keystroke, capped at the time limit.
    fn elapsed_secs(&self) -> f64 {
        let elapsed = self.session.elapsed(self.clock.now());
        let elapsed = match self.config.time_limit() {
            Some(limit) => elapsed.min(limit),
            None => elapsed,
        };
        elapsed.as_secs_f64()
    }

    fn sample(&mut self, trigger: SampleTrigger) -> Option<u64> {
        let elapsed = self.elapsed_secs();
        let counters = self.session.counters();
        let wpm = compute_wpm(self.session.chars_typed(), elapsed);
        let accuracy = compute_accuracy(counters.correct_chars, counters.error_chars);

        self.recorder
            .record(trigger, elapsed, wpm, accuracy, counters.error_chars)
    }

    fn build_result(&self) -> SessionResult {
        let series = self.recorder.series();
        let wpm_values: Vec<f64> = series.iter().map(|p| p.wpm as f64).collect();
        let snapshot = self.snapshot();

        SessionResult {
            mode: self.config.mode,
            word_count: self.config.word_count,
            quote_count: self.config.quote_count,
            time_limit_secs: self.config.time_limit_secs,
            final_wpm: snapshot.wpm,
            final_accuracy: snapshot.accuracy,
            errors: snapshot.counters.error_chars,
            total_chars_typed: snapshot.chars_typed,
            elapsed_secs: self.elapsed_secs(),
            consistency: std_dev(&wpm_values),
            series,
        }
    }
}

fn open_session<S: ContentSource + ?Sized>(config: &TestConfig, source: &mut S) -> SessionState {
    SessionState::new(
        config.mode,
        config.target(),
        config.word_count,
        config.quote_count,
        source,
    )
}
