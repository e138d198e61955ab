use crate::game_state::{
    Board, GameInterface, GameSettings, GuessReport, Mode, RoundSummary, UserAction, Winner,
    is_valid_letter,
};
use crate::guesser::GuessOutcome;
use crate::ranking::{PlayerIdentity, RankingEntry};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Hangman against a learning letter-guessing AI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Who guesses the word
    #[arg(short, long, value_enum, default_value_t = Mode::Ai)]
    pub mode: Mode,

    /// Full-screen terminal interface instead of line prompts
    #[arg(long)]
    pub tui: bool,

    /// Player name used for the victory ranking
    #[arg(short, long)]
    pub player: Option<String>,

    /// Learning state file (defaults to the user data directory)
    #[arg(long = "data-file")]
    pub data_file: Option<PathBuf>,

    /// Ranking file (defaults to the user data directory)
    #[arg(long = "ranking-file")]
    pub ranking_file: Option<PathBuf>,

    /// Let the AI guess on its own every MS milliseconds
    #[arg(long = "auto-delay-ms", value_name = "MS")]
    pub auto_delay_ms: Option<u64>,

    /// End the round after this many wrong letters
    #[arg(long = "max-misses")]
    pub max_misses: Option<usize>,

    /// Number of ranking entries to show
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Write logs to this file instead of stderr
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            mode: self.mode,
            player: self.player.as_deref().and_then(PlayerIdentity::from_name),
            max_misses: self.max_misses,
            turn_delay: self.auto_delay_ms.map(Duration::from_millis),
            ranking_limit: self.top,
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// UI Input/Output functions

/// Interprets a line typed while no round is running.
#[must_use]
pub fn parse_secret_input(input: &str) -> UserAction {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "exit" => UserAction::Exit,
        "mode" => UserAction::SwitchMode,
        "ranking" => UserAction::ShowRanking,
        _ => UserAction::Secret(trimmed.to_string()),
    }
}

/// Interprets a line typed during a round. `None` for anything unusable.
#[must_use]
pub fn parse_turn_input(input: &str, mode: Mode) -> Option<UserAction> {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "exit" => return Some(UserAction::Exit),
        "next" => return Some(UserAction::NewGame),
        "" if mode == Mode::Ai => return Some(UserAction::AiTurn),
        _ => {}
    }
    if mode == Mode::Ai {
        return None;
    }
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if is_valid_letter(letter) => Some(UserAction::Letter(letter)),
        _ => None,
    }
}

/// Forwards lines from `reader` on a background thread until input ends or the receiver is dropped.
fn spawn_line_reader<R: BufRead + Send + 'static>(reader: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn spaced(letters: &[char]) -> String {
    letters
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_board(board: &Board) {
    println!("\nWord: {}", spaced(&board.revealed));
    let misses = match board.max_misses {
        Some(max) => format!("{}/{max}", board.misses),
        None => board.misses.to_string(),
    };
    println!("Attempts: {} | Misses: {misses}", board.attempts);
    if !board.used.is_empty() {
        println!("Used letters: {}", spaced(&board.used));
    }
}

pub fn display_guess(report: &GuessReport, board: &Board) {
    let who = if report.by_ai { "AI" } else { "Player" };
    match &report.outcome {
        GuessOutcome::Hit(positions) => {
            println!("{who} guessed '{}': hit ({} found)", report.letter, positions.len());
        }
        GuessOutcome::Miss => println!("{who} guessed '{}': miss", report.letter),
        GuessOutcome::AlreadyUsed => {
            println!("Letter '{}' was already used, try another.", report.letter);
        }
    }
    display_board(board);
}

pub fn display_round_over(summary: &RoundSummary) {
    let verdict = match (summary.winner, summary.mode) {
        (Winner::Ai, _) => "The AI wins!",
        (Winner::Player, Mode::Ai) => "The AI gave up. You win!",
        (Winner::Player, Mode::Pvp) => "Word solved. The guesser wins!",
        (Winner::SecretKeeper, _) => "Out of misses. The word keeper wins!",
    };
    println!("\n{verdict} The word was '{}'.", summary.secret);
    println!("Total attempts: {}", summary.attempts);
    println!(
        "Score - AI: {} | Player: {}",
        summary.scores.ai, summary.scores.player
    );
    if summary.winner == Winner::Ai {
        println!("Words learned: {}", summary.learned_words);
        for (pos, letter, count) in &summary.common_letters {
            println!("  Position {}: '{letter}' ({count} times)", pos + 1);
        }
    }
}

pub fn display_ranking(entries: &[RankingEntry]) {
    println!("Ranking:");
    if entries.is_empty() {
        println!("  No victories recorded yet.");
    }
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "  {}. {} - {} victories",
            i + 1,
            entry.display_name,
            entry.victories
        );
    }
}

/// CLI implementation of the `GameInterface` trait over any `BufRead`.
///
/// Lines are read on a background thread so automatic AI turns can keep
/// listening for commands while they wait.
pub struct CliInterface {
    lines: Receiver<String>,
}

impl CliInterface {
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            lines: spawn_line_reader(reader),
        }
    }

    /// Next line, `None` once input has ended.
    fn read_input(&mut self) -> Option<String> {
        self.lines.recv().ok()
    }

    fn turn_action(line: &str, mode: Mode) -> Option<UserAction> {
        let action = parse_turn_input(line, mode);
        if action.is_none() {
            println!("Invalid input. Please enter a single letter.");
        }
        action
    }
}

impl GameInterface for CliInterface {
    fn read_secret(&mut self, mode: Mode) -> Option<UserAction> {
        println!(
            "\n[{}] Enter the secret word (or 'mode', 'ranking', 'exit'):",
            mode.label()
        );
        Some(self.read_input().map_or(UserAction::Exit, |line| parse_secret_input(&line)))
    }

    fn read_turn(&mut self, board: &Board) -> Option<UserAction> {
        match board.mode {
            Mode::Ai => println!("Press ENTER for the AI's next guess ('next' new word, 'exit' quit):"),
            Mode::Pvp => println!("Guess a letter ('next' new word, 'exit' quit):"),
        }
        let Some(line) = self.read_input() else {
            return Some(UserAction::Exit);
        };
        Self::turn_action(&line, board.mode)
    }

    fn read_turn_timeout(&mut self, board: &Board, timeout: Duration) -> Option<UserAction> {
        match self.lines.recv_timeout(timeout) {
            Ok(line) => Self::turn_action(&line, board.mode),
            Err(RecvTimeoutError::Timeout) => Some(UserAction::AiTurn),
            Err(RecvTimeoutError::Disconnected) => Some(UserAction::Exit),
        }
    }

    fn display_board(&mut self, board: &Board) {
        display_board(board);
    }

    fn display_guess(&mut self, report: &GuessReport, board: &Board) {
        display_guess(report, board);
    }

    fn display_invalid_secret(&mut self, secret: &str) {
        println!("'{secret}' is not a valid word. Use letters only (accents allowed).");
    }

    fn display_round_over(&mut self, summary: &RoundSummary) {
        display_round_over(summary);
    }

    fn display_ranking(&mut self, entries: &[RankingEntry]) {
        display_ranking(entries);
    }

    fn display_mode(&mut self, mode: Mode) {
        println!("Mode: {}", mode.label());
    }

    fn display_exit_message(&mut self) {
        println!("Exiting.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    /// Input that never produces a line within a test's lifetime.
    struct Silent;

    impl Read for Silent {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            thread::sleep(Duration::from_secs(60));
            Ok(0)
        }
    }

    fn ai_board() -> Board {
        Board {
            mode: Mode::Ai,
            revealed: vec!['_', '_'],
            used: Vec::new(),
            attempts: 0,
            misses: 0,
            max_misses: None,
            scores: crate::game_state::Scoreboard::default(),
        }
    }

    #[test]
    fn test_parse_cli_defaults() {
        let cli = Cli::try_parse_from(["forca-ai"]).unwrap();
        assert_eq!(cli.mode, Mode::Ai);
        assert!(!cli.tui);
        assert_eq!(cli.top, 10);
        let settings = cli.settings();
        assert!(settings.player.is_none());
        assert!(settings.turn_delay.is_none());
        assert!(settings.max_misses.is_none());
    }

    #[test]
    fn test_parse_cli_all_options() {
        let cli = Cli::try_parse_from([
            "forca-ai",
            "--mode",
            "pvp",
            "--tui",
            "--player",
            "Ana",
            "--data-file",
            "/tmp/learn.json",
            "--ranking-file",
            "/tmp/rank.json",
            "--auto-delay-ms",
            "250",
            "--max-misses",
            "6",
            "--top",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.mode, Mode::Pvp);
        assert!(cli.tui);
        assert_eq!(cli.data_file, Some(PathBuf::from("/tmp/learn.json")));
        let settings = cli.settings();
        assert_eq!(settings.player.unwrap().id, "ana");
        assert_eq!(settings.turn_delay, Some(Duration::from_millis(250)));
        assert_eq!(settings.max_misses, Some(6));
        assert_eq!(settings.ranking_limit, 3);
    }

    #[test]
    fn test_parse_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["forca-ai", "--mode", "solo"]).is_err());
    }

    #[test]
    fn test_parse_secret_input() {
        assert_eq!(parse_secret_input("EXIT\n"), UserAction::Exit);
        assert_eq!(parse_secret_input("mode"), UserAction::SwitchMode);
        assert_eq!(parse_secret_input(" Ranking "), UserAction::ShowRanking);
        assert_eq!(
            parse_secret_input("  Coração \n"),
            UserAction::Secret("Coração".to_string())
        );
        assert_eq!(parse_secret_input("\n"), UserAction::Secret(String::new()));
    }

    #[test]
    fn test_parse_turn_input_ai() {
        assert_eq!(parse_turn_input("\n", Mode::Ai), Some(UserAction::AiTurn));
        assert_eq!(parse_turn_input("next", Mode::Ai), Some(UserAction::NewGame));
        assert_eq!(parse_turn_input("exit", Mode::Ai), Some(UserAction::Exit));
        assert_eq!(parse_turn_input("a", Mode::Ai), None);
    }

    #[test]
    fn test_parse_turn_input_pvp() {
        assert_eq!(parse_turn_input("a\n", Mode::Pvp), Some(UserAction::Letter('a')));
        assert_eq!(parse_turn_input("Ç", Mode::Pvp), Some(UserAction::Letter('Ç')));
        assert_eq!(parse_turn_input("", Mode::Pvp), None);
        assert_eq!(parse_turn_input("ab", Mode::Pvp), None);
        assert_eq!(parse_turn_input("7", Mode::Pvp), None);
    }

    #[test]
    fn test_cli_interface_eof_is_exit() {
        let mut ui = CliInterface::new(Cursor::new(""));
        assert_eq!(ui.read_secret(Mode::Ai), Some(UserAction::Exit));
        let board = Board {
            mode: Mode::Pvp,
            revealed: vec!['_'],
            used: Vec::new(),
            attempts: 0,
            misses: 0,
            max_misses: None,
            scores: crate::game_state::Scoreboard::default(),
        };
        assert_eq!(ui.read_turn(&board), Some(UserAction::Exit));
    }

    #[test]
    fn test_cli_interface_reads_lines_in_order() {
        let mut ui = CliInterface::new(Cursor::new("gato\n\nexit\n"));
        assert_eq!(
            ui.read_secret(Mode::Ai),
            Some(UserAction::Secret("gato".to_string()))
        );
        assert_eq!(
            ui.read_secret(Mode::Ai),
            Some(UserAction::Secret(String::new()))
        );
        assert_eq!(ui.read_secret(Mode::Ai), Some(UserAction::Exit));
    }

    #[test]
    fn test_timed_turn_reads_commands() {
        let mut ui = CliInterface::new(Cursor::new("exit\n"));
        assert_eq!(
            ui.read_turn_timeout(&ai_board(), Duration::from_secs(5)),
            Some(UserAction::Exit)
        );
        let mut ui = CliInterface::new(Cursor::new("next\n"));
        assert_eq!(
            ui.read_turn_timeout(&ai_board(), Duration::from_secs(5)),
            Some(UserAction::NewGame)
        );
    }

    #[test]
    fn test_timed_turn_plays_ai_when_idle() {
        let mut ui = CliInterface::new(BufReader::new(Silent));
        assert_eq!(
            ui.read_turn_timeout(&ai_board(), Duration::from_millis(20)),
            Some(UserAction::AiTurn)
        );
    }

    #[test]
    fn test_timed_turn_end_of_input_is_exit() {
        let mut ui = CliInterface::new(Cursor::new(""));
        assert_eq!(
            ui.read_turn_timeout(&ai_board(), Duration::from_secs(5)),
            Some(UserAction::Exit)
        );
    }

    #[test]
    fn test_spaced() {
        assert_eq!(spaced(&['_', 'a', '_']), "_ a _");
        assert_eq!(spaced(&[]), "");
    }
}
