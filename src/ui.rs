pub mod charting;

use clackr::{
    controller::SessionResult,
    runtime::Clock,
    session::{Phase, SessionState},
    theme::Theme,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => {
                if let Some(result) = self.controller.result() {
                    render_results(self, result, area, buf);
                }
            }
        }
    }
}

fn render_typing<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let session = app.controller.session();
    let snapshot = app.controller.snapshot();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default()
        .fg(theme.muted)
        .add_modifier(Modifier::ITALIC);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let spans = prompt_spans(session, theme, max_chars_per_line as usize);
    let prompt_width: usize = spans.iter().map(|s| s.content.width()).sum();

    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2), // live stats
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1), // quote author
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let mut stats = Vec::new();
    if let Some(secs) = snapshot.time_left_secs() {
        stats.push(format!("{secs}s"));
    }
    stats.push(format!("{} chars", snapshot.chars_typed));
    stats.push(format!("{} wpm", snapshot.wpm));
    stats.push(format!("{}% acc", snapshot.accuracy));

    Paragraph::new(Span::styled(stats.join("   "), bold_style.fg(theme.primary)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            // when the prompt is small enough to fit on one line
            // centering the text gives a nice zen feeling
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    if let Some(quote) = session.segment().current_quote() {
        if !quote.author.is_empty() {
            Paragraph::new(Span::styled(format!("~ {}", quote.author), italic_style))
                .alignment(Alignment::Right)
                .render(chunks[3], buf);
        }
    }

    let legend = match session.phase() {
        Phase::Idle => "start typing to begin / (tab) restart / (esc)ape",
        _ => "(tab) restart / (esc)ape",
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[5], buf);
}

/// Typed text coloured by outcome, the caret, then the untyped remainder.
/// Word-list runs lead with the tail of the already finished chunks.
fn prompt_spans<'a>(session: &SessionState, theme: &Theme, width: usize) -> Vec<Span<'a>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let correct_style = bold_style.fg(theme.success);
    let incorrect_style = bold_style.fg(theme.error);
    let pending_style = bold_style.fg(theme.muted);
    let done_style = Style::default()
        .fg(theme.muted)
        .add_modifier(Modifier::DIM);
    let caret_style = bold_style
        .fg(theme.caret)
        .add_modifier(Modifier::UNDERLINED);

    let mut spans = Vec::new();

    if let Some((transcript, offset)) = session.segment().transcript() {
        let done: String = transcript.chars().take(offset).collect();
        let tail = tail_to_width(&done, width / 2);
        if !tail.is_empty() {
            spans.push(Span::styled(tail, done_style));
        }
    }

    let content = session.segment().content();
    let mut expected = content.chars();
    for typed in session.input().chars() {
        let Some(want) = expected.next() else { break };
        spans.push(if typed == want {
            Span::styled(want.to_string(), correct_style)
        } else {
            Span::styled(
                match typed {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                incorrect_style,
            )
        });
    }

    if let Some(caret) = expected.next() {
        spans.push(Span::styled(caret.to_string(), caret_style));
    }
    let rest: String = expected.collect();
    if !rest.is_empty() {
        spans.push(Span::styled(rest, pending_style));
    }

    spans
}

/// The longest suffix of `text` that fits in `width` columns.
fn tail_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut tail: Vec<char> = text
        .chars()
        .rev()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect();
    tail.reverse();
    tail.into_iter().collect()
}

fn render_results<C: Clock>(app: &App<C>, result: &SessionResult, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default()
        .fg(theme.muted)
        .add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // details
            Constraint::Length(1), // padding
            Constraint::Length(2), // settings
            Constraint::Length(1), // legend
        ])
        .split(area);

    if result.has_chart_data() {
        render_chart(result, theme, chunks[0], buf);
    } else {
        let middle = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(50),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(chunks[0]);
        Paragraph::new(Span::styled(
            "Insufficient data to display graph",
            italic_style,
        ))
        .alignment(Alignment::Center)
        .render(middle[1], buf);
    }

    let consistency = result
        .consistency
        .map_or_else(|| "-".to_string(), |sd| format!("{sd:.2}"));
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} errors   {} sd",
            result.final_wpm, result.final_accuracy, result.errors, consistency
        ),
        bold_style.fg(theme.primary),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{:.1}s   {} chars   {}",
            result.elapsed_secs, result.total_chars_typed, result.mode
        ),
        Style::default().fg(theme.text),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let config = &app.config;
    let time = config
        .time_limit_secs
        .map_or_else(|| "untimed".to_string(), |secs| format!("{secs}s"));
    let settings_text = format!(
        "mode: {}   words: {}   quotes: {}   time: {}   theme: {}\n(m) mode (w) words (q) quotes (t) time (c) theme",
        config.mode, config.word_count, config.quote_count, time, theme.name
    );
    Paragraph::new(settings_text)
        .style(italic_style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    Paragraph::new(Span::styled("(r)etry / (tab) restart / (esc)ape", italic_style))
        .render(chunks[5], buf);
}

fn render_chart(result: &SessionResult, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let (overall_duration, y_max) = charting::compute_chart_params(&result.series);

    let wpm = charting::wpm_points(&result.series);
    let accuracy = charting::accuracy_points(&result.series);
    let errors = charting::error_markers(&result.series);

    let datasets = vec![
        Dataset::default()
            .name("wpm")
            .marker(Marker::Braille)
            .style(Style::default().fg(theme.primary))
            .graph_type(GraphType::Line)
            .data(&wpm),
        Dataset::default()
            .name("acc %")
            .marker(Marker::Braille)
            .style(Style::default().fg(theme.success))
            .graph_type(GraphType::Line)
            .data(&accuracy),
        Dataset::default()
            .name("errors")
            .marker(Marker::Dot)
            .style(Style::default().fg(theme.error))
            .graph_type(GraphType::Scatter)
            .data(&errors),
    ];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .style(Style::default().fg(theme.muted))
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm / acc")
                .style(Style::default().fg(theme.muted))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(y_max), bold_style),
                ]),
        )
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clackr::{
        config::Config,
        content::{Quote, ScriptedSource},
        runtime::ManualClock,
        session::Mode,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn app(config: Config, prompt: &str) -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let source = ScriptedSource::new(
            vec![prompt],
            vec![Quote::new("Turn your wounds into wisdom.", "Oprah Winfrey")],
        );
        (
            App::new(config, Box::new(source), clock.clone(), None, None),
            clock,
        )
    }

    fn rendered(app: &App<ManualClock>) -> String {
        let area = Rect::new(0, 0, 100, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    fn type_str(app: &mut App<ManualClock>, clock: &ManualClock, text: &str) {
        for c in text.chars() {
            clock.advance_millis(700);
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_typing_screen_shows_prompt_and_stats() {
        let (app, _clock) = app(Config::default(), "hello world.");
        let text = rendered(&app);

        assert!(text.contains("hello world."));
        assert!(text.contains("30s"));
        assert!(text.contains("100% acc"));
        assert!(text.contains("start typing to begin"));
    }

    #[test]
    fn test_untimed_screen_has_no_countdown() {
        let config = Config {
            time_limit_secs: None,
            ..Config::default()
        };
        let (app, _clock) = app(config, "hello world.");
        let text = rendered(&app);

        assert!(!text.contains("30s"));
        assert!(text.contains("0 chars"));
    }

    #[test]
    fn test_quote_author_shown() {
        let config = Config {
            mode: Mode::QuoteRotation,
            ..Config::default()
        };
        let (app, _clock) = app(config, "unused.");
        assert!(rendered(&app).contains("~ Oprah Winfrey"));
    }

    #[test]
    fn test_results_screen_with_chart() {
        let config = Config {
            time_limit_secs: None,
            ..Config::default()
        };
        let (mut app, clock) = app(config, "hello world.");
        type_str(&mut app, &clock, "hello world.");
        assert_eq!(app.state, AppState::Results);

        let text = rendered(&app);
        assert!(text.contains("wpm"));
        assert!(text.contains("100% acc"));
        assert!(text.contains("seconds"));
        assert!(text.contains("untimed"));
        assert!(text.contains("(r)etry"));
        assert!(!text.contains("Insufficient data"));
    }

    #[test]
    fn test_results_screen_without_enough_points() {
        let config = Config {
            time_limit_secs: None,
            ..Config::default()
        };
        let (mut app, clock) = app(config, "h");
        type_str(&mut app, &clock, "h");

        let text = rendered(&app);
        assert!(text.contains("Insufficient data to display graph"));
        assert!(text.contains("1 chars"));
    }

    #[test]
    fn test_tail_to_width() {
        assert_eq!(tail_to_width("Time person year. ", 6), "year. ");
        assert_eq!(tail_to_width("abc", 10), "abc");
        assert_eq!(tail_to_width("abc", 0), "");
    }

    #[test]
    fn test_prompt_spans_mark_errors() {
        let (mut app, clock) = app(Config::default(), "ab cd.");
        type_str(&mut app, &clock, "a ");

        let spans = prompt_spans(app.controller.session(), &app.theme, 80);
        let texts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["a", "·", " ", "cd."]);
        assert_eq!(spans[1].style.fg, Some(app.theme.error));
    }
}
