mod ui;

use clackr::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    content::{ContentSource, Corpus, CorpusSource, ScriptedSource},
    controller::{TestController, TickOutcome, TimerToken},
    history::{ResultLog, ResultRecord},
    logging::init_logging,
    runtime::{Clock, CrosstermInputSource, FixedTicker, Runner, SystemClock, TypingEvent},
    session::Mode,
    theme::Theme,
};
use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

/// terminal typing trainer with live wpm, rotating quotes and charted results
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing trainer: endless word streams, rotating quotes or a fixed prompt, with live speed and accuracy and a charted summary of every run."
)]
pub struct Cli {
    /// text to type
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// number of words per chunk
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// number of quotes kept in the rotating window
    #[clap(short = 'q', long)]
    number_of_quotes: Option<usize>,

    /// number of seconds to run test
    #[clap(short = 's', long, conflicts_with = "untimed")]
    number_of_secs: Option<u64>,

    /// stop when the text is typed out instead of when the clock runs out
    #[clap(long)]
    untimed: bool,

    /// custom prompt to use (runs untimed)
    #[clap(short = 'p', long, value_parser = non_blank)]
    prompt: Option<String>,

    /// color theme (dark, nord_light, dino, magic_girl, milkshake, modern_ink, rose_pine_dawn, soaring_skies)
    #[clap(short = 't', long)]
    theme: Option<String>,

    /// log more (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn non_blank(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("prompt must contain some text".to_string());
    }
    Ok(s.to_string())
}

impl Cli {
    /// Command line flags win over persisted settings for this run.
    fn apply_to(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(n) = self.number_of_words {
            config.word_count = n.max(1);
        }
        if let Some(n) = self.number_of_quotes {
            config.quote_count = n;
        }
        if let Some(secs) = self.number_of_secs {
            config.time_limit_secs = Some(secs.max(1));
        }
        if self.untimed {
            config.time_limit_secs = None;
        }
        if self.prompt.is_some() {
            // the prompt is the whole target, typed once
            config.mode = Mode::WordList;
            config.time_limit_secs = None;
        }
        if let Some(theme) = &self.theme {
            config.theme = Theme::by_name(theme).name.to_string();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitType {
    Continue,
    Quit,
}

pub struct App<C: Clock = SystemClock> {
    pub controller: TestController<Box<dyn ContentSource>, C>,
    pub config: Config,
    pub theme: Theme,
    pub state: AppState,
    token: TimerToken,
    store: Option<Box<dyn ConfigStore>>,
    results: Option<ResultLog>,
}

impl<C: Clock> App<C> {
    pub fn new(
        config: Config,
        source: Box<dyn ContentSource>,
        clock: C,
        store: Option<Box<dyn ConfigStore>>,
        results: Option<ResultLog>,
    ) -> Self {
        let mut controller = TestController::new(config.test_config(), source, clock);
        let token = controller.start();

        Self {
            theme: config.theme(),
            controller,
            config,
            state: AppState::Typing,
            token,
            store,
            results,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.controller.config().sample_interval()
    }

    pub fn reset(&mut self) {
        self.token = self.controller.restart();
        self.state = AppState::Typing;
    }

    /// Returns true when the screen needs redrawing.
    pub fn on_tick(&mut self) -> bool {
        match self.controller.on_tick(self.token) {
            TickOutcome::Expired => {
                self.show_results();
                true
            }
            TickOutcome::Sampled { .. } => true,
            TickOutcome::Ignored => false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> ExitType {
        if key.kind != KeyEventKind::Press {
            return ExitType::Continue;
        }
        let chord = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ExitType::Quit;
            }
            KeyCode::Esc => return ExitType::Quit,
            KeyCode::Tab => self.reset(),
            _ if chord => {}
            _ => match self.state {
                AppState::Typing => self.on_typing_key(key.code),
                AppState::Results => self.on_results_key(key.code),
            },
        }
        ExitType::Continue
    }

    fn on_typing_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => {
                self.controller.type_char(c);
            }
            KeyCode::Backspace => {
                self.controller.backspace();
            }
            _ => {}
        }
        if self.controller.is_finished() {
            self.show_results();
        }
    }

    fn on_results_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('m') => {
                let mode = self.config.cycle_mode();
                self.token = self.controller.on_mode_change(mode);
                self.settings_changed();
            }
            KeyCode::Char('w') => {
                let n = self.config.cycle_word_count();
                self.token = self.controller.on_word_count_change(n);
                self.settings_changed();
            }
            KeyCode::Char('q') => {
                let n = self.config.cycle_quote_count();
                self.token = self.controller.on_quote_count_change(n);
                self.settings_changed();
            }
            KeyCode::Char('t') => {
                let secs = self.config.cycle_time_limit();
                self.token = self.controller.on_test_time_change(secs);
                self.settings_changed();
            }
            KeyCode::Char('c') => {
                self.theme = self.config.cycle_theme();
                self.persist();
            }
            _ => {}
        }
    }

    fn settings_changed(&mut self) {
        self.state = AppState::Typing;
        self.persist();
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.config) {
                warn!("could not save settings: {e}");
            }
        }
    }

    fn show_results(&mut self) {
        if self.state == AppState::Results {
            return;
        }
        self.state = AppState::Results;

        let (Some(log), Some(result)) = (&self.results, self.controller.result()) else {
            return;
        };
        let record = ResultRecord::from_result(result, chrono::Local::now());
        match log.append(&record) {
            Ok(()) => info!("saved result to {}", log.path().display()),
            Err(e) => warn!("could not save result: {e}"),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        // the TUI still works without a log file
        if let Err(e) = init_logging(cli.verbose, &log_path) {
            eprintln!("logging disabled, {}: {e}", log_path.display());
        }
    }

    let file_store = FileConfigStore::new();
    let mut config = file_store.load();
    cli.apply_to(&mut config);

    // a custom prompt is a one-off and never overwrites saved settings
    let (source, store) = match &cli.prompt {
        Some(prompt) => {
            let source: Box<dyn ContentSource> =
                Box::new(ScriptedSource::from_prompt(prompt.clone()));
            (source, None)
        }
        None => {
            let source: Box<dyn ContentSource> = Box::new(CorpusSource::new(Corpus::embedded()?));
            let store: Box<dyn ConfigStore> = Box::new(file_store);
            (source, Some(store))
        }
    };

    let results = ResultLog::open_default()
        .map_err(|e| warn!("results will not be saved: {e}"))
        .ok();

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, source, SystemClock, store, results);
    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermInputSource::new(),
        FixedTicker::new(app.tick_interval()),
    );
    terminal.draw(|f| ui(app, f))?;

    loop {
        let interval = app.tick_interval();
        if runner.interval() != interval {
            runner.set_ticker(FixedTicker::new(interval));
        }

        let redraw = match runner.step() {
            TypingEvent::Tick => app.on_tick(),
            TypingEvent::Resize => true,
            TypingEvent::Key(key) => match app.on_key(key) {
                ExitType::Quit => break,
                ExitType::Continue => true,
            },
        };

        if redraw {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}

fn ui<C: Clock>(app: &App<C>, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clackr::{
        config::ConfigStore,
        content::Quote,
        runtime::ManualClock,
        session::{Phase, DEFAULT_QUOTE_WINDOW},
    };
    use tempfile::tempdir;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn test_app(config: Config, chunks: Vec<&str>) -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let source = ScriptedSource::new(
            chunks,
            vec![Quote::new("ab.", "A"), Quote::new("cd.", "C"), Quote::new("ef.", "E")],
        );
        let app = App::new(config, Box::new(source), clock.clone(), None, None);
        (app, clock)
    }

    fn untimed() -> Config {
        Config {
            time_limit_secs: None,
            ..Config::default()
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["clackr"]);

        assert_eq!(cli.mode, None);
        assert_eq!(cli.number_of_words, None);
        assert_eq!(cli.number_of_secs, None);
        assert_eq!(cli.prompt, None);
        assert!(!cli.untimed);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "clackr", "-m", "quotes", "-w", "50", "-q", "6", "-s", "15", "-t", "dino", "-vv",
        ]);

        assert_eq!(cli.mode, Some(Mode::QuoteRotation));
        assert_eq!(cli.number_of_words, Some(50));
        assert_eq!(cli.number_of_quotes, Some(6));
        assert_eq!(cli.number_of_secs, Some(15));
        assert_eq!(cli.theme.as_deref(), Some("dino"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_secs_conflicts_with_untimed() {
        let result = Cli::try_parse_from(["clackr", "-s", "30", "--untimed"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["clackr", "-m", "explicit", "-w", "75", "-t", "nope"]);
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert_eq!(config.mode, Mode::ExplicitWordList);
        assert_eq!(config.word_count, 75);
        assert_eq!(config.theme, "dark");
        assert_eq!(config.quote_count, DEFAULT_QUOTE_WINDOW);
    }

    #[test]
    fn test_cli_prompt_runs_untimed() {
        let cli = Cli::parse_from(["clackr", "-p", "hello there"]);
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert_eq!(config.time_limit_secs, None);
    }

    #[test]
    fn test_cli_rejects_blank_prompt() {
        assert!(Cli::try_parse_from(["clackr", "-p", ""]).is_err());
        assert!(Cli::try_parse_from(["clackr", "--prompt", "   "]).is_err());

        let cli = Cli::parse_from(["clackr", "-p", " hi "]);
        assert_eq!(cli.prompt.as_deref(), Some(" hi "));
    }

    #[test]
    fn test_cli_prompt_types_the_prompt_once() {
        let cli = Cli::parse_from(["clackr", "-p", "hi", "-m", "quotes"]);
        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(config.mode, Mode::WordList);

        let (app, _clock) = test_app(config, vec!["hi"]);
        assert_eq!(app.controller.session().segment().content(), "hi");
    }

    #[test]
    fn test_typing_to_results() {
        let (mut app, clock) = test_app(untimed(), vec!["hi"]);

        app.on_key(key('h'));
        clock.advance_millis(500);
        app.on_key(key('i'));

        assert_eq!(app.state, AppState::Results);
        let result = app.controller.result().unwrap();
        assert_eq!(result.total_chars_typed, 2);
        assert_eq!(result.final_accuracy, 100);
    }

    #[test]
    fn test_tick_expiry_shows_results() {
        let config = Config {
            time_limit_secs: Some(15),
            ..Config::default()
        };
        let (mut app, clock) = test_app(config, vec!["Time person year."]);
        assert_eq!(app.tick_interval(), Duration::from_millis(250));

        app.on_key(key('T'));
        clock.advance_millis(15_000);

        assert!(app.on_tick());
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_idle_tick_does_not_redraw() {
        let (mut app, _clock) = test_app(Config::default(), vec!["Time person year."]);
        assert!(!app.on_tick());
    }

    #[test]
    fn test_ctrl_chords_are_not_typed() {
        let (mut app, _clock) = test_app(Config::default(), vec!["Time person year."]);

        let exit = app.on_key(KeyEvent::new(KeyCode::Char('T'), KeyModifiers::ALT));
        assert_eq!(exit, ExitType::Continue);
        assert_eq!(app.controller.session().input(), "");

        let exit = app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(exit, ExitType::Quit);
        assert_eq!(app.on_key(KeyEvent::from(KeyCode::Esc)), ExitType::Quit);
    }

    #[test]
    fn test_backspace_edits_input() {
        let (mut app, _clock) = test_app(Config::default(), vec!["Time person year."]);
        app.on_key(key('T'));
        app.on_key(key('x'));
        app.on_key(KeyEvent::from(KeyCode::Backspace));

        assert_eq!(app.controller.session().input(), "T");
        assert_eq!(app.controller.session().counters().error_chars, 1);
    }

    #[test]
    fn test_tab_restarts() {
        let (mut app, _clock) = test_app(Config::default(), vec!["Time person year."]);
        app.on_key(key('T'));
        app.on_key(KeyEvent::from(KeyCode::Tab));

        assert_eq!(app.controller.session().phase(), Phase::Idle);
        assert_eq!(app.controller.session().input(), "");
    }

    #[test]
    fn test_results_keys_cycle_settings_and_persist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let clock = ManualClock::new();
        let store: Box<dyn ConfigStore> = Box::new(FileConfigStore::with_path(&path));
        let mut app = App::new(
            untimed(),
            Box::new(ScriptedSource::from_prompt("hi")),
            clock,
            Some(store),
            None,
        );
        app.on_key(key('h'));
        app.on_key(key('i'));
        assert_eq!(app.state, AppState::Results);

        app.on_key(key('m'));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.controller.config().mode, Mode::ExplicitWordList);

        app.state = AppState::Results;
        app.on_key(key('w'));
        app.state = AppState::Results;
        app.on_key(key('t'));
        app.state = AppState::Results;
        app.on_key(key('c'));

        let saved = FileConfigStore::with_path(&path).load();
        assert_eq!(saved.mode, Mode::ExplicitWordList);
        assert_eq!(saved.word_count, 50);
        assert_eq!(saved.time_limit_secs, Some(15));
        assert_eq!(saved.theme, "nord_light");
        assert_eq!(app.theme.name, "nord_light");
        assert_eq!(app.controller.config().time_limit_secs, Some(15));
    }

    #[test]
    fn test_finished_session_is_logged() {
        let dir = tempdir().unwrap();
        let log = ResultLog::with_path(dir.path().join("results.csv"));
        let clock = ManualClock::new();
        let mut app = App::new(
            untimed(),
            Box::new(ScriptedSource::from_prompt("ok")),
            clock.clone(),
            None,
            Some(log.clone()),
        );

        app.on_key(key('o'));
        clock.advance_millis(400);
        app.on_key(key('k'));

        let records = log.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chars, 2);
        assert_eq!(records[0].time_limit_secs, None);
    }

    #[test]
    fn test_quote_mode_app() {
        let config = Config {
            mode: Mode::QuoteRotation,
            ..Config::default()
        };
        let (mut app, _clock) = test_app(config, vec![]);
        for c in "ab. ".chars() {
            app.on_key(key(c));
        }

        assert_eq!(app.controller.session().segment().content(), "cd. ef. ab.");
        assert_eq!(app.controller.session().counters().total_chars_typed, 4);
    }
}
