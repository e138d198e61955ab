use crate::guesser::{GuessOutcome, Guesser};
use crate::normalize::{normalize_letter, normalize_word};
use crate::ranking::{PlayerIdentity, RankingEntry, RankingStore};
use crate::store::LearningStore;
use crate::{debug_log, info_log};
use std::time::Duration;

/// Who guesses the secret word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// The AI guesses a word typed by the player.
    #[default]
    Ai,
    /// One player types the word, another guesses it.
    Pvp,
}

impl Mode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ai => Self::Pvp,
            Self::Pvp => Self::Ai,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ai => "Player vs AI",
            Self::Pvp => "Player vs Player",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    Secret(String),
    AiTurn,
    Letter(char),
    SwitchMode,
    ShowRanking,
    NewGame,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    Ai,
    /// The human: solved the word in PvP, or kept it safe from the AI.
    Player,
    /// Player one in PvP, when the word was not solved.
    SecretKeeper,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub ai: u32,
    pub player: u32,
}

/// Snapshot of the round handed to the interface for drawing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub mode: Mode,
    pub revealed: Vec<char>,
    pub used: Vec<char>,
    pub attempts: usize,
    pub misses: usize,
    pub max_misses: Option<usize>,
    pub scores: Scoreboard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessReport {
    pub by_ai: bool,
    pub letter: char,
    pub outcome: GuessOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub mode: Mode,
    pub winner: Winner,
    pub secret: String,
    pub attempts: usize,
    pub scores: Scoreboard,
    pub learned_words: usize,
    /// (position, letter, count) of the most learned letter per position of the secret.
    pub common_letters: Vec<(usize, char, u32)>,
}

#[derive(Clone, Debug, Default)]
pub struct GameSettings {
    pub mode: Mode,
    pub player: Option<PlayerIdentity>,
    pub max_misses: Option<usize>,
    /// Take AI turns automatically after this delay instead of waiting for input.
    pub turn_delay: Option<Duration>,
    pub ranking_limit: usize,
}

/// Input and output surface of the game, implemented by the CLI and the TUI.
pub trait GameInterface {
    fn read_secret(&mut self, mode: Mode) -> Option<UserAction>;
    fn read_turn(&mut self, board: &Board) -> Option<UserAction>;
    /// Like `read_turn`, but answers `AiTurn` once `timeout` passes without input.
    fn read_turn_timeout(&mut self, board: &Board, timeout: Duration) -> Option<UserAction>;
    fn display_board(&mut self, board: &Board);
    fn display_guess(&mut self, report: &GuessReport, board: &Board);
    fn display_invalid_secret(&mut self, secret: &str);
    fn display_round_over(&mut self, summary: &RoundSummary);
    fn display_ranking(&mut self, entries: &[RankingEntry]);
    fn display_mode(&mut self, mode: Mode);
    fn display_exit_message(&mut self);
}

/// A secret must be non-empty and spell only `a..=z` once accents are folded.
#[must_use]
pub fn is_valid_secret(secret: &str) -> bool {
    let normalized = normalize_word(secret.trim());
    !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_lowercase())
}

#[must_use]
pub fn is_valid_letter(letter: char) -> bool {
    letter
        .to_lowercase()
        .next()
        .is_some_and(|c| normalize_letter(c).is_ascii_lowercase())
}

enum RoundEnd {
    Finished(Winner),
    Abandoned,
    Exit,
}

fn snapshot<S: LearningStore>(
    guesser: &Guesser<S>,
    mode: Mode,
    settings: &GameSettings,
    scores: Scoreboard,
) -> Board {
    Board {
        mode,
        revealed: guesser.revealed().to_vec(),
        used: guesser.used_letters().iter().copied().collect(),
        attempts: guesser.attempts(),
        misses: guesser.misses(),
        max_misses: settings.max_misses,
        scores,
    }
}

/// Runs rounds until the interface asks to exit. Returns the final scores.
pub fn game_loop<S, I>(
    guesser: &mut Guesser<S>,
    ranking: &mut dyn RankingStore,
    settings: &GameSettings,
    interface: &mut I,
) -> Scoreboard
where
    S: LearningStore,
    I: GameInterface + ?Sized,
{
    let mut mode = settings.mode;
    let mut scores = Scoreboard::default();

    loop {
        let secret = match interface.read_secret(mode) {
            Some(UserAction::Secret(secret)) => secret.trim().to_string(),
            Some(UserAction::Exit) => {
                interface.display_exit_message();
                break;
            }
            Some(UserAction::SwitchMode) => {
                mode = mode.toggled();
                info_log!("Mode switched to {:?}", mode);
                interface.display_mode(mode);
                continue;
            }
            Some(UserAction::ShowRanking) => {
                show_ranking(ranking, settings.ranking_limit, interface);
                continue;
            }
            Some(_) | None => continue,
        };

        if !is_valid_secret(&secret) || !guesser.start(&secret) {
            interface.display_invalid_secret(&secret);
            continue;
        }
        info_log!(
            "Round started: mode={:?}, {} letters",
            mode,
            guesser.revealed().len()
        );
        interface.display_board(&snapshot(guesser, mode, settings, scores));

        match play_round(guesser, mode, settings, scores, interface) {
            RoundEnd::Finished(winner) => {
                settle(guesser, ranking, settings, &mut scores, winner, &secret);
                let summary = summarize(guesser, mode, winner, &secret, scores);
                interface.display_round_over(&summary);
            }
            RoundEnd::Abandoned => {
                debug_log!("game_loop() - round abandoned");
            }
            RoundEnd::Exit => {
                interface.display_exit_message();
                break;
            }
        }
    }

    scores
}

fn play_round<S, I>(
    guesser: &mut Guesser<S>,
    mode: Mode,
    settings: &GameSettings,
    scores: Scoreboard,
    interface: &mut I,
) -> RoundEnd
where
    S: LearningStore,
    I: GameInterface + ?Sized,
{
    loop {
        let board = snapshot(guesser, mode, settings, scores);
        let action = match (mode, settings.turn_delay) {
            (Mode::Ai, Some(delay)) => interface.read_turn_timeout(&board, delay),
            _ => interface.read_turn(&board),
        };

        let report = match action {
            Some(UserAction::Exit) => return RoundEnd::Exit,
            Some(UserAction::NewGame) => return RoundEnd::Abandoned,
            Some(UserAction::AiTurn) if mode == Mode::Ai => {
                let Some(letter) = guesser.guess_next_letter() else {
                    info_log!("AI ran out of letters");
                    return RoundEnd::Finished(Winner::Player);
                };
                GuessReport {
                    by_ai: true,
                    letter,
                    outcome: guesser.reveal(letter),
                }
            }
            Some(UserAction::Letter(letter)) if mode == Mode::Pvp && is_valid_letter(letter) => {
                let outcome = guesser.try_letter(letter);
                GuessReport {
                    by_ai: false,
                    letter: normalize_letter(letter.to_lowercase().next().unwrap_or(letter)),
                    outcome,
                }
            }
            _ => continue,
        };
        debug_log!("play_round() - {:?}", report);
        interface.display_guess(&report, &snapshot(guesser, mode, settings, scores));

        if guesser.is_complete() {
            return RoundEnd::Finished(match mode {
                Mode::Ai => Winner::Ai,
                Mode::Pvp => Winner::Player,
            });
        }
        if settings.max_misses.is_some_and(|max| guesser.misses() >= max) {
            return RoundEnd::Finished(match mode {
                Mode::Ai => Winner::Player,
                Mode::Pvp => Winner::SecretKeeper,
            });
        }
    }
}

fn settle<S: LearningStore>(
    guesser: &mut Guesser<S>,
    ranking: &mut dyn RankingStore,
    settings: &GameSettings,
    scores: &mut Scoreboard,
    winner: Winner,
    secret: &str,
) {
    info_log!("Round over: {:?} wins", winner);
    match winner {
        Winner::Ai => {
            scores.ai += 1;
            guesser.record_completed_word(secret);
        }
        Winner::Player => {
            scores.player += 1;
            if let Some(player) = &settings.player {
                match ranking.record_victory(player) {
                    Ok(total) => {
                        info_log!("{} now has {} victories", player.display_name, total);
                    }
                    Err(e) => log::warn!("Could not record victory: {e}"),
                }
            }
        }
        Winner::SecretKeeper => {}
    }
}

fn summarize<S: LearningStore>(
    guesser: &Guesser<S>,
    mode: Mode,
    winner: Winner,
    secret: &str,
    scores: Scoreboard,
) -> RoundSummary {
    let learning = guesser.learning();
    let common_letters = (0..guesser.revealed().len())
        .filter_map(|pos| learning.most_common(pos).map(|(c, n)| (pos, c, n)))
        .collect();
    RoundSummary {
        mode,
        winner,
        secret: secret.to_string(),
        attempts: guesser.attempts(),
        scores,
        learned_words: learning.words.len(),
        common_letters,
    }
}

fn show_ranking<I: GameInterface + ?Sized>(
    ranking: &dyn RankingStore,
    limit: usize,
    interface: &mut I,
) {
    match ranking.top(limit) {
        Ok(entries) => interface.display_ranking(&entries),
        Err(e) => {
            log::warn!("Could not read ranking: {e}");
            interface.display_ranking(&[]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::MemoryRanking;
    use crate::store::MemoryStore;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        actions: VecDeque<UserAction>,
        guesses: Vec<GuessReport>,
        rounds: Vec<RoundSummary>,
        invalid: Vec<String>,
        modes: Vec<Mode>,
        rankings: Vec<Vec<RankingEntry>>,
        exited: bool,
    }

    impl Scripted {
        fn new(actions: Vec<UserAction>) -> Self {
            Self {
                actions: actions.into(),
                ..Self::default()
            }
        }

        fn next(&mut self) -> Option<UserAction> {
            Some(self.actions.pop_front().unwrap_or(UserAction::Exit))
        }
    }

    impl GameInterface for Scripted {
        fn read_secret(&mut self, _mode: Mode) -> Option<UserAction> {
            self.next()
        }
        fn read_turn(&mut self, _board: &Board) -> Option<UserAction> {
            self.next()
        }
        fn read_turn_timeout(&mut self, _board: &Board, _timeout: Duration) -> Option<UserAction> {
            Some(self.actions.pop_front().unwrap_or(UserAction::AiTurn))
        }
        fn display_board(&mut self, board: &Board) {
            assert!(board.revealed.iter().all(|&c| c == '_'));
        }
        fn display_guess(&mut self, report: &GuessReport, _board: &Board) {
            self.guesses.push(report.clone());
        }
        fn display_invalid_secret(&mut self, secret: &str) {
            self.invalid.push(secret.to_string());
        }
        fn display_round_over(&mut self, summary: &RoundSummary) {
            self.rounds.push(summary.clone());
        }
        fn display_ranking(&mut self, entries: &[RankingEntry]) {
            self.rankings.push(entries.to_vec());
        }
        fn display_mode(&mut self, mode: Mode) {
            self.modes.push(mode);
        }
        fn display_exit_message(&mut self) {
            self.exited = true;
        }
    }

    fn secret(s: &str) -> UserAction {
        UserAction::Secret(s.to_string())
    }

    fn settings(mode: Mode) -> GameSettings {
        GameSettings {
            mode,
            player: PlayerIdentity::from_name("Ana"),
            ranking_limit: 10,
            ..GameSettings::default()
        }
    }

    #[test]
    fn test_secret_validation() {
        assert!(is_valid_secret("casa"));
        assert!(is_valid_secret(" Coração "));
        assert!(!is_valid_secret(""));
        assert!(!is_valid_secret("   "));
        assert!(!is_valid_secret("guarda-chuva"));
        assert!(!is_valid_secret("abc1"));
        assert!(!is_valid_secret("straße"));
    }

    #[test]
    fn test_letter_validation() {
        assert!(is_valid_letter('a'));
        assert!(is_valid_letter('Ç'));
        assert!(!is_valid_letter('1'));
        assert!(!is_valid_letter('ß'));
    }

    #[test]
    fn test_immediate_exit() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![UserAction::Exit]);
        let scores = game_loop(&mut guesser, &mut ranking, &settings(Mode::Ai), &mut ui);
        assert_eq!(scores, Scoreboard::default());
        assert!(ui.exited);
    }

    #[test]
    fn test_ai_round_wins_and_learns() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut actions = vec![secret("gato")];
        actions.extend(std::iter::repeat_n(UserAction::AiTurn, 26));
        let mut ui = Scripted::new(actions);

        let scores = game_loop(&mut guesser, &mut ranking, &settings(Mode::Ai), &mut ui);

        assert_eq!(scores.ai, 1);
        assert_eq!(ui.rounds.len(), 1);
        assert_eq!(ui.rounds[0].winner, Winner::Ai);
        assert_eq!(ui.rounds[0].learned_words, 1);
        assert!(ui.guesses.iter().all(|g| g.by_ai));
        assert_eq!(guesser.learning().count(0, 'g'), 1);
        assert_eq!(guesser.store().saves, 1);
    }

    #[test]
    fn test_ai_round_with_auto_turns() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![secret("banana")]);
        let mut cfg = settings(Mode::Ai);
        cfg.turn_delay = Some(Duration::ZERO);

        let scores = game_loop(&mut guesser, &mut ranking, &cfg, &mut ui);
        assert_eq!(scores.ai, 1);
        assert!(ui.guesses.len() <= 26);
    }

    #[test]
    fn test_auto_turns_still_listen_for_exit() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![secret("banana"), UserAction::AiTurn, UserAction::Exit]);
        let mut cfg = settings(Mode::Ai);
        cfg.turn_delay = Some(Duration::from_secs(3600));

        let scores = game_loop(&mut guesser, &mut ranking, &cfg, &mut ui);
        assert_eq!(scores, Scoreboard::default());
        assert_eq!(ui.guesses.len(), 1);
        assert!(ui.rounds.is_empty());
        assert!(ui.exited);
    }

    #[test]
    fn test_auto_turns_new_game_abandons_round() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![secret("gato"), UserAction::NewGame]);
        let mut cfg = settings(Mode::Ai);
        cfg.turn_delay = Some(Duration::ZERO);

        game_loop(&mut guesser, &mut ranking, &cfg, &mut ui);
        assert!(ui.guesses.is_empty());
        assert!(ui.rounds.is_empty());
    }

    #[test]
    fn test_victories_accumulate_across_rounds() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![
            secret("oi"),
            UserAction::Letter('o'),
            UserAction::Letter('i'),
            secret("lua"),
            UserAction::Letter('l'),
            UserAction::Letter('u'),
            UserAction::Letter('a'),
        ]);

        let scores = game_loop(&mut guesser, &mut ranking, &settings(Mode::Pvp), &mut ui);
        assert_eq!(scores.player, 2);
        assert_eq!(ranking.top(10).unwrap()[0].victories, 2);
    }

    #[test]
    fn test_ai_loses_on_miss_limit() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut actions = vec![secret("xyz")];
        actions.extend(std::iter::repeat_n(UserAction::AiTurn, 26));
        let mut ui = Scripted::new(actions);
        let mut cfg = settings(Mode::Ai);
        cfg.max_misses = Some(1);

        let scores = game_loop(&mut guesser, &mut ranking, &cfg, &mut ui);
        assert_eq!(scores.player, 1);
        assert_eq!(ui.rounds[0].winner, Winner::Player);
        assert_eq!(ranking.top(10).unwrap()[0].victories, 1);
        assert!(guesser.learning().words.is_empty());
    }

    #[test]
    fn test_pvp_round() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![
            secret("casa"),
            UserAction::AiTurn,
            UserAction::Letter('a'),
            UserAction::Letter('A'),
            UserAction::Letter('1'),
            UserAction::Letter('z'),
            UserAction::Letter('ç'),
            UserAction::Letter('s'),
        ]);

        let scores = game_loop(&mut guesser, &mut ranking, &settings(Mode::Pvp), &mut ui);
        assert_eq!(scores.player, 1);
        let outcomes: Vec<&GuessOutcome> = ui.guesses.iter().map(|g| &g.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                &GuessOutcome::Hit(vec![1, 3]),
                &GuessOutcome::AlreadyUsed,
                &GuessOutcome::Miss,
                &GuessOutcome::Hit(vec![0]),
                &GuessOutcome::Hit(vec![2]),
            ]
        );
        assert_eq!(ui.guesses[3].letter, 'c');
        assert_eq!(ranking.top(1).unwrap()[0].display_name, "Ana");
        assert!(guesser.learning().words.is_empty());
    }

    #[test]
    fn test_pvp_miss_limit_goes_to_keeper() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![
            secret("casa"),
            UserAction::Letter('x'),
            UserAction::Letter('y'),
        ]);
        let mut cfg = settings(Mode::Pvp);
        cfg.max_misses = Some(2);

        let scores = game_loop(&mut guesser, &mut ranking, &cfg, &mut ui);
        assert_eq!(scores, Scoreboard::default());
        assert_eq!(ui.rounds[0].winner, Winner::SecretKeeper);
        assert!(ranking.top(10).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_secret_mode_switch_and_ranking() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![
            secret(""),
            secret("r2d2"),
            UserAction::SwitchMode,
            UserAction::ShowRanking,
            secret("ok"),
            UserAction::NewGame,
        ]);

        game_loop(&mut guesser, &mut ranking, &settings(Mode::Ai), &mut ui);
        assert_eq!(ui.invalid, vec![String::new(), "r2d2".to_string()]);
        assert_eq!(ui.modes, vec![Mode::Pvp]);
        assert_eq!(ui.rankings, vec![Vec::new()]);
        assert!(ui.rounds.is_empty());
        assert!(ui.exited);
    }

    #[test]
    fn test_no_player_no_ranking() {
        let mut guesser = Guesser::new(MemoryStore::new());
        let mut ranking = MemoryRanking::new();
        let mut ui = Scripted::new(vec![secret("oi"), UserAction::Letter('o'), UserAction::Letter('i')]);
        let cfg = GameSettings {
            mode: Mode::Pvp,
            ..GameSettings::default()
        };
        let scores = game_loop(&mut guesser, &mut ranking, &cfg, &mut ui);
        assert_eq!(scores.player, 1);
        assert!(ranking.top(10).unwrap().is_empty());
    }
}
