//! TUI module using ratatui.
//!
//! One screen: a search input on top, then either the home view (suggested
//! searches) or the current answer, with the error banner above both.
//! Searches run on spawned tasks and report back over a channel so the
//! screen keeps redrawing while a request is in flight.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::client::SearchError;
use crate::content::PointKind;
use crate::controller::{
    DisplayResponse, SearchController, SearchState, SearchTicket, SUGGESTED_QUERIES,
    TRENDING_QUERY,
};
use crate::linkify::Segment;

const TICK: Duration = Duration::from_millis(80);
const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const PLACEHOLDER: &str = "Search the Web, Dive into Research...";
const TAGLINE: &str = "Ask Anything: From Web Searches to Research Analysis";
const DISCLAIMER: &str = "⚠️  LlamaSearch can make mistakes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Home,
    Trending,
}

impl MenuItem {
    fn label(self) -> &'static str {
        match self {
            MenuItem::Home => "🏠 Home",
            MenuItem::Trending => "📈 Trending",
        }
    }
}

const MENU: [MenuItem; 2] = [MenuItem::Home, MenuItem::Trending];

/// What a key press asks the app to do
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Search(Option<String>),
    Reset,
    Quit,
}

type Outcome = (SearchTicket, Result<Value, SearchError>);

struct App {
    controller: SearchController,
    results_tx: mpsc::UnboundedSender<Outcome>,
    results_rx: mpsc::UnboundedReceiver<Outcome>,
    /// Suggested query picked with the arrow keys
    highlighted: Option<usize>,
    menu_index: usize,
    scroll: u16,
    tick: usize,
    quit: bool,
}

/// Run the TUI until the user quits
pub async fn run(controller: SearchController) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    let result = App::new(controller).run(&mut terminal).await;
    ratatui::restore();
    result
}

impl App {
    fn new(controller: SearchController) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            results_tx,
            results_rx,
            highlighted: None,
            menu_index: 0,
            scroll: 0,
            tick: 0,
            quit: false,
        }
    }

    async fn run(mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        while !self.quit {
            while let Ok((ticket, outcome)) = self.results_rx.try_recv() {
                self.controller.complete(ticket, outcome);
            }

            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(command) = self.handle_key(key) {
                            self.dispatch(command);
                        }
                    }
                }
            } else {
                self.tick = self.tick.wrapping_add(1);
            }

            tokio::task::yield_now().await;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return Some(Command::Quit),
            KeyCode::Char('t') if ctrl => return Some(Command::Search(Some(TRENDING_QUERY.to_string()))),
            KeyCode::Char('r') if ctrl => return Some(Command::Reset),
            KeyCode::Esc => {
                self.controller.toggle_menu();
                self.menu_index = 0;
                return None;
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                return None;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                return None;
            }
            _ => {}
        }

        if self.controller.menu_open() {
            return self.handle_menu_key(key);
        }

        // The input is disabled while a search is in flight.
        if self.controller.is_loading() {
            return None;
        }

        match key.code {
            KeyCode::Char(c) if !ctrl => {
                self.controller.query_mut().push(c);
                self.highlighted = None;
                None
            }
            KeyCode::Backspace => {
                self.controller.query_mut().pop();
                None
            }
            KeyCode::Up | KeyCode::Down if self.controller.response().is_none() => {
                self.highlighted = Some(step(self.highlighted, key.code, SUGGESTED_QUERIES.len()));
                None
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::Enter => {
                let typed = !self.controller.query().trim().is_empty();
                let suggestion = self
                    .highlighted
                    .filter(|_| !typed)
                    .and_then(|index| SUGGESTED_QUERIES.get(index))
                    .map(|item| item.query.to_string());
                Some(Command::Search(suggestion))
            }
            _ => None,
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Up | KeyCode::Down => {
                self.menu_index = step(Some(self.menu_index), key.code, MENU.len());
                None
            }
            KeyCode::Enter => match MENU[self.menu_index] {
                MenuItem::Home => Some(Command::Reset),
                MenuItem::Trending => Some(Command::Search(Some(TRENDING_QUERY.to_string()))),
            },
            _ => None,
        }
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::Quit => self.quit = true,
            Command::Reset => {
                self.controller.reset();
                self.highlighted = None;
                self.scroll = 0;
            }
            Command::Search(explicit) => {
                let Some(pending) = self.controller.begin_search(explicit.as_deref()) else {
                    return;
                };
                self.highlighted = None;
                self.scroll = 0;

                let backend = self.controller.backend();
                let results_tx = self.results_tx.clone();
                tokio::spawn(async move {
                    let outcome = backend.search(&pending.query).await;
                    // The receiver only goes away when the app is quitting.
                    let _ = results_tx.send((pending.ticket, outcome));
                });
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [nav, input, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" ✨ LlamaSearch", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled("   Esc menu · ^T trending · ^R home · ^Q quit", Style::default().fg(Color::DarkGray)),
            ])),
            nav,
        );

        self.draw_input(frame, input);

        let body = match self.controller.error() {
            Some(message) => {
                let [banner, rest] =
                    Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(body);
                frame.render_widget(
                    Paragraph::new(message)
                        .style(Style::default().fg(Color::LightRed))
                        .wrap(Wrap { trim: true })
                        .block(Block::bordered().border_style(Style::default().fg(Color::Red))),
                    banner,
                );
                rest
            }
            None => body,
        };

        match self.controller.response() {
            Some(response) => {
                frame.render_widget(
                    Paragraph::new(Text::from(response_lines(response)))
                        .wrap(Wrap { trim: false })
                        .scroll((self.scroll, 0))
                        .block(Block::bordered()),
                    body,
                );
            }
            None => {
                self.draw_home(frame, body);
                frame.render_widget(
                    Paragraph::new(DISCLAIMER).style(Style::default().fg(Color::Yellow)),
                    footer,
                );
            }
        }

        if self.controller.menu_open() {
            self.draw_menu(frame, frame.area());
        }
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let icon = if self.controller.is_loading() {
            SPINNER[self.tick % SPINNER.len()]
        } else {
            "🔍"
        };

        let query = self.controller.query();
        let text = if query.is_empty() {
            Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(query)
        };

        frame.render_widget(
            Paragraph::new(Line::from(text))
                .block(Block::bordered().title(format!(" {} ", icon))),
            area,
        );

        if !self.controller.is_loading() && !self.controller.menu_open() {
            let width = cursor_column(query);
            frame.set_cursor_position((
                area.x + 1 + width.min(area.width.saturating_sub(3)),
                area.y + 1,
            ));
        }
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect) {
        let [hero, list] =
            Layout::vertical([Constraint::Length(5), Constraint::Min(0)]).areas(area);

        let hero_text = match self.controller.state() {
            SearchState::Loading { query } => vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("Searching: {}", query),
                    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                )),
            ],
            _ => vec![
                Line::from(""),
                Line::from(Span::styled(
                    "LlamaSearch",
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(TAGLINE, Style::default().fg(Color::Gray))),
            ],
        };
        frame.render_widget(Paragraph::new(hero_text).centered(), hero);

        let items: Vec<ListItem> = SUGGESTED_QUERIES
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", item.icon)),
                    Span::styled(item.title, Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", item.query), Style::default().fg(Color::Gray)),
                ]))
            })
            .collect();
        let mut state = ListState::default().with_selected(self.highlighted);
        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title(" Popular Searches "))
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol("➜ "),
            list,
            &mut state,
        );
    }

    fn draw_menu(&self, frame: &mut Frame, screen: Rect) {
        let width = 22.min(screen.width);
        let area = Rect {
            x: screen.right().saturating_sub(width),
            y: screen.y + 1,
            width,
            height: (MENU.len() as u16 + 2).min(screen.height.saturating_sub(1)),
        };

        let items: Vec<ListItem> = MENU.iter().map(|item| ListItem::new(item.label())).collect();
        let mut state = ListState::default().with_selected(Some(self.menu_index));
        frame.render_widget(Clear, area);
        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title(" Menu "))
                .highlight_style(Style::default().bg(Color::DarkGray)),
            area,
            &mut state,
        );
    }
}

/// Terminal columns taken by the typed query
fn cursor_column(query: &str) -> u16 {
    u16::try_from(Span::raw(query).width()).unwrap_or(u16::MAX)
}

/// Move a selection up or down, wrapping at both ends
fn step(current: Option<usize>, code: KeyCode, len: usize) -> usize {
    match (current, code) {
        (None, KeyCode::Up) => len - 1,
        (None, _) => 0,
        (Some(index), KeyCode::Up) => (index + len - 1) % len,
        (Some(index), _) => (index + 1) % len,
    }
}

fn spans(segments: &[Segment], base: Style) -> Vec<Span<'static>> {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => Span::styled(text.clone(), base),
            Segment::Link(url) => Span::styled(
                url.clone(),
                base.fg(Color::LightBlue).add_modifier(Modifier::UNDERLINED),
            ),
        })
        .collect()
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Lay out an answer: the echoed query, the summary and the classified points
fn response_lines(response: &DisplayResponse) -> Vec<Line<'static>> {
    let content = &response.formatted_content;
    let text = Style::default().fg(Color::Gray);
    let heading = Style::default()
        .fg(Color::LightCyan)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled("You asked:", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            response.current_query.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("answered {}", response.answered_at()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        section("📖 Summary"),
        Line::from(spans(&content.summary_segments(), text)),
    ];

    if content.points.is_empty() {
        return lines;
    }

    lines.push(Line::from(""));
    lines.push(section("📌 Key Points"));

    for point in content.classified_points() {
        match point.kind {
            PointKind::Heading => {
                lines.push(Line::from(""));
                lines.push(Line::from(spans(&point.segments, heading)));
            }
            PointKind::Reference => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("References", heading)));
                lines.push(Line::from(spans(&point.segments, text)));
            }
            PointKind::Note => {
                let mut note = vec![Span::styled("│ ", Style::default().fg(Color::DarkGray))];
                note.extend(spans(&point.segments, text.add_modifier(Modifier::ITALIC)));
                lines.push(Line::from(note));
            }
            PointKind::Body => {
                let mut body = vec![Span::styled("▌ ", Style::default().fg(Color::Blue))];
                body.extend(spans(&point.segments, text));
                lines.push(Line::from(body));
            }
        }
    }

    lines
}
