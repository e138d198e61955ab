//! TUI (Terminal User Interface) module for the hangman game
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # State Machine
//! - `EnteringSecret` → `Playing` → `RoundOver` → back to `EnteringSecret`
//! - `Playing` can also go straight back to `EnteringSecret` when the round is abandoned

use crate::game_state::{
    Board, GameInterface, GuessReport, Mode, RoundSummary, UserAction, Winner, is_valid_letter,
};
use crate::guesser::GuessOutcome;
use crate::ranking::RankingEntry;
use crate::solver::ALPHABET;
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};

const MAX_SECRET_LEN: usize = 30;
const MAX_HISTORY_DISPLAY: usize = 6;
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiState {
    EnteringSecret,
    Playing,
    RoundOver,
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    mode: Mode,
    state: TuiState,
    board: Option<&'a Board>,
    secret_input: &'a str,
    history: &'a [String],
    ranking: &'a [RankingEntry],
    message: &'a str,
    error_message: &'a str,
    status: &'a str,
}

/// Main TUI interface component.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    mode: Mode,
    state: TuiState,
    board: Option<Board>,
    secret_input: String,
    history: Vec<String>,
    ranking: Vec<RankingEntry>,
    message: String,
    error_message: String,
    status: String,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            mode: Mode::default(),
            state: TuiState::EnteringSecret,
            board: None,
            secret_input: String::new(),
            history: Vec::new(),
            ranking: Vec::new(),
            message: String::new(),
            error_message: String::new(),
            status: "Ready to start".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            mode: self.mode,
            state: self.state,
            board: self.board.as_ref(),
            secret_input: &self.secret_input,
            history: &self.history,
            ranking: &self.ranking,
            message: &self.message,
            error_message: &self.error_message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title + scores
                Constraint::Length(5), // Word
                Constraint::Length(3), // Alphabet
                Constraint::Min(8),    // Info panel
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0], ctx);
        Self::render_word(f, chunks[1], ctx);
        Self::render_alphabet(f, chunks[2], ctx.board);
        Self::render_info(f, chunks[3], ctx);
        Self::render_status(f, chunks[4], ctx.status);
        Self::render_instructions(f, chunks[5], ctx.state, ctx.mode);
    }

    fn render_title(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let scores = ctx.board.map(|b| b.scores).unwrap_or_default();
        let title = Paragraph::new(format!(
            "FORCA - {}   |   AI: {}   Player: {}",
            ctx.mode.label(),
            scores.ai,
            scores.player
        ))
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_word(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let (text, detail) = match (ctx.state, ctx.board) {
            (TuiState::EnteringSecret, _) => {
                let shown: String = if ctx.mode == Mode::Pvp {
                    "*".repeat(ctx.secret_input.chars().count())
                } else {
                    ctx.secret_input.to_string()
                };
                (format!("{shown}_"), "Type the secret word".to_string())
            }
            (_, Some(board)) => {
                let letters: Vec<String> = board.revealed.iter().map(char::to_string).collect();
                let misses = match board.max_misses {
                    Some(max) => format!("{}/{max}", board.misses),
                    None => board.misses.to_string(),
                };
                (
                    letters.join(" "),
                    format!("Attempts: {}   Misses: {misses}", board.attempts),
                )
            }
            (_, None) => (String::new(), String::new()),
        };

        let lines = vec![
            Line::from(Span::styled(text, SUCCESS_STYLE)),
            Line::from(Span::raw(detail)),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title("Word").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_alphabet(f: &mut Frame, area: Rect, board: Option<&Board>) {
        let mut spans = Vec::new();
        for letter in ALPHABET.chars() {
            let style = match board {
                Some(b) if b.used.contains(&letter) && b.revealed.contains(&letter) => {
                    Style::default().fg(Color::Black).bg(Color::Green)
                }
                Some(b) if b.used.contains(&letter) => Style::default().fg(Color::DarkGray),
                _ => Style::default().fg(Color::White),
            };
            spans.push(Span::styled(format!(" {letter} "), style));
        }
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().title("Letters").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_info(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let mut lines = Vec::new();

        if !ctx.history.is_empty() {
            lines.push(Line::from(Span::styled("Recent guesses:", INFO_STYLE)));
            let skip = ctx.history.len().saturating_sub(MAX_HISTORY_DISPLAY);
            for entry in ctx.history.iter().skip(skip) {
                lines.push(Line::from(format!("  {entry}")));
            }
            lines.push(Line::from(""));
        }

        if !ctx.ranking.is_empty() {
            lines.push(Line::from(Span::styled("Ranking:", HEADER_STYLE)));
            for (i, entry) in ctx.ranking.iter().enumerate() {
                lines.push(Line::from(format!(
                    "  {}. {} - {} victories",
                    i + 1,
                    entry.display_name,
                    entry.victories
                )));
            }
            lines.push(Line::from(""));
        }

        if !ctx.message.is_empty() {
            lines.push(Line::from(Span::styled(ctx.message, MESSAGE_STYLE)));
        }
        if !ctx.error_message.is_empty() {
            lines.push(Line::from(Span::styled(ctx.error_message, ERROR_STYLE)));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Information").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, state: TuiState, mode: Mode) {
        let text = match (state, mode) {
            (TuiState::EnteringSecret, _) => {
                "Type the secret word | ENTER: Start | TAB: Switch mode | F2: Ranking | ESC: Quit"
            }
            (TuiState::Playing, Mode::Ai) => "ENTER/SPACE: AI guesses | TAB: New word | ESC: Quit",
            (TuiState::Playing, Mode::Pvp) => "Type a letter to guess | TAB: New word | ESC: Quit",
            (TuiState::RoundOver, _) => "ENTER/N: Next round | ESC: Quit",
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn has_modifier_keys(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
    }

    /// Waits up to `timeout` for one key press and maps it to an action for the current state.
    fn handle_input(&mut self, timeout: Duration) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        let Event::Key(key) = event::read()? else {
            return Ok(None);
        };
        if key.kind != event::KeyEventKind::Press || Self::has_modifier_keys(&key) {
            return Ok(None);
        }
        if let KeyCode::Char(c) = key.code
            && (c == '\u{FFFD}' || c.is_control())
        {
            debug_log!("handle_input() - Ignoring invalid character {:?}", c);
            return Ok(None);
        }

        debug_log!("handle_input() - {:?} in {:?}", key.code, self.state);
        Ok(match self.state {
            TuiState::EnteringSecret => self.handle_secret_input(key),
            TuiState::Playing => self.handle_turn_input(key),
            TuiState::RoundOver => self.handle_round_over_input(key),
        })
    }

    fn handle_secret_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        self.error_message.clear();
        match key.code {
            KeyCode::Char(c)
                if c.is_alphabetic() && self.secret_input.chars().count() < MAX_SECRET_LEN =>
            {
                self.secret_input.push(c);
                None
            }
            KeyCode::Char(c) if !c.is_alphabetic() => {
                self.error_message = format!("Only letters are allowed! ('{c}' is not a letter)");
                None
            }
            KeyCode::Backspace => {
                self.secret_input.pop();
                None
            }
            KeyCode::Enter => Some(UserAction::Secret(std::mem::take(&mut self.secret_input))),
            KeyCode::Tab => Some(UserAction::SwitchMode),
            KeyCode::F(2) => Some(UserAction::ShowRanking),
            KeyCode::Esc => Some(UserAction::Exit),
            _ => None,
        }
    }

    fn handle_turn_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        self.error_message.clear();
        match (key.code, self.mode) {
            (KeyCode::Esc, _) => Some(UserAction::Exit),
            (KeyCode::Tab, _) => Some(UserAction::NewGame),
            (KeyCode::Enter | KeyCode::Char(' '), Mode::Ai) => Some(UserAction::AiTurn),
            (KeyCode::Char(c), Mode::Pvp) if is_valid_letter(c) => Some(UserAction::Letter(c)),
            (KeyCode::Char(c), Mode::Pvp) => {
                self.error_message = format!("'{c}' is not a letter");
                None
            }
            _ => None,
        }
    }

    fn handle_round_over_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Esc => Some(UserAction::Exit),
            KeyCode::Enter | KeyCode::Char('n' | 'N') => {
                self.transition_to_entering_secret();
                None
            }
            _ => None,
        }
    }

    fn transition_to_entering_secret(&mut self) {
        self.state = TuiState::EnteringSecret;
        self.board = self.board.take().map(|b| Board {
            revealed: Vec::new(),
            used: Vec::new(),
            attempts: 0,
            misses: 0,
            ..b
        });
        self.history.clear();
        self.secret_input.clear();
        self.message.clear();
        self.status = "Enter a new secret word".to_string();
    }

    /// Draws and polls until the current state produces an action.
    ///
    /// With a `deadline`, an AI turn is returned once it passes without input.
    fn wait_for_action(&mut self, deadline: Option<Instant>) -> UserAction {
        let poll_step = Duration::from_millis(EVENT_POLL_TIMEOUT_MS);
        loop {
            if self.draw().is_err() {
                info_log!("wait_for_action() - Draw failed, returning Exit");
                return UserAction::Exit;
            }
            let timeout = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return UserAction::AiTurn;
                    }
                    remaining.min(poll_step)
                }
                None => poll_step,
            };
            match self.handle_input(timeout) {
                Ok(Some(action)) => {
                    info_log!("wait_for_action() - Action received: {:?}", action);
                    return action;
                }
                Ok(None) => {}
                Err(e) => {
                    info_log!("wait_for_action() - Input error {}, returning Exit", e);
                    return UserAction::Exit;
                }
            }
        }
    }

    fn describe(report: &GuessReport) -> String {
        let who = if report.by_ai { "AI" } else { "Player" };
        match &report.outcome {
            GuessOutcome::Hit(positions) => {
                format!("{who}: '{}' hit ({} found)", report.letter, positions.len())
            }
            GuessOutcome::Miss => format!("{who}: '{}' miss", report.letter),
            GuessOutcome::AlreadyUsed => format!("'{}' already used", report.letter),
        }
    }
}

impl GameInterface for TuiInterface {
    fn read_secret(&mut self, mode: Mode) -> Option<UserAction> {
        self.mode = mode;
        if self.state == TuiState::Playing {
            self.transition_to_entering_secret();
        }
        if self.state == TuiState::EnteringSecret {
            self.status = format!("{} - enter the secret word", mode.label());
        }
        Some(self.wait_for_action(None))
    }

    fn read_turn(&mut self, board: &Board) -> Option<UserAction> {
        self.board = Some(board.clone());
        self.state = TuiState::Playing;
        Some(self.wait_for_action(None))
    }

    fn read_turn_timeout(&mut self, board: &Board, timeout: Duration) -> Option<UserAction> {
        self.board = Some(board.clone());
        self.state = TuiState::Playing;
        Some(self.wait_for_action(Some(Instant::now() + timeout)))
    }

    fn display_board(&mut self, board: &Board) {
        self.board = Some(board.clone());
        self.state = TuiState::Playing;
        self.history.clear();
        self.ranking.clear();
        self.message.clear();
        self.status = match board.mode {
            Mode::Ai => "Round started - the AI is guessing".to_string(),
            Mode::Pvp => "Round started - guess the letters".to_string(),
        };
        self.draw_or_log();
    }

    fn display_guess(&mut self, report: &GuessReport, board: &Board) {
        self.board = Some(board.clone());
        let line = Self::describe(report);
        self.status.clone_from(&line);
        self.history.push(line);
        self.draw_or_log();
    }

    fn display_invalid_secret(&mut self, secret: &str) {
        self.error_message = format!("'{secret}' is not a valid word. Use letters only.");
        self.draw_or_log();
    }

    fn display_round_over(&mut self, summary: &RoundSummary) {
        self.state = TuiState::RoundOver;
        if let Some(board) = self.board.as_mut() {
            board.scores = summary.scores;
        }
        self.message = match summary.winner {
            Winner::Ai => format!(
                "The AI found '{}' in {} attempts. Words learned: {}",
                summary.secret, summary.attempts, summary.learned_words
            ),
            Winner::Player if summary.mode == Mode::Ai => {
                format!("The AI could not find '{}'. You win!", summary.secret)
            }
            Winner::Player => format!("Solved '{}'. The guesser wins!", summary.secret),
            Winner::SecretKeeper => {
                format!("Out of misses. The word was '{}'.", summary.secret)
            }
        };
        self.status = "Round over".to_string();
        self.draw_or_log();
    }

    fn display_ranking(&mut self, entries: &[RankingEntry]) {
        self.ranking = entries.to_vec();
        self.message = if entries.is_empty() {
            "No victories recorded yet.".to_string()
        } else {
            String::new()
        };
        self.draw_or_log();
    }

    fn display_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.secret_input.clear();
        self.status = format!("Mode: {}", mode.label());
        self.draw_or_log();
    }

    fn display_exit_message(&mut self) {
        self.message = "Exiting...".to_string();
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
