use forca_ai::cli::{CliInterface, parse_cli};
use forca_ai::game_state::{GameInterface, game_loop};
use forca_ai::guesser::Guesser;
use forca_ai::logging::init_logging;
use forca_ai::ranking::{JsonRankingStore, MemoryRanking, RankingStore, default_ranking_path};
use forca_ai::store::{JsonFileStore, LearningStore, MemoryStore, app_data_dir, default_learning_path};
use forca_ai::tui::TuiInterface;
use std::io::{self, BufReader};
use std::process::ExitCode;

const TUI_LOG_FILE: &str = "forca.log";

fn main() -> ExitCode {
    let cli = parse_cli();

    let log_file = cli.log_file.clone().or_else(|| {
        if cli.tui {
            app_data_dir().map(|dir| dir.join(TUI_LOG_FILE))
        } else {
            None
        }
    });
    if let Err(e) = init_logging(log_file.as_deref()) {
        eprintln!("Failed to set up logging: {e}");
    }

    let settings = cli.settings();

    let learning_store: Box<dyn LearningStore> =
        match cli.data_file.clone().or_else(default_learning_path) {
            Some(path) => {
                log::info!("Learning state at {}", path.display());
                Box::new(JsonFileStore::new(path))
            }
            None => {
                log::warn!("No data directory available, learning will not be saved");
                Box::new(MemoryStore::new())
            }
        };
    let mut ranking: Box<dyn RankingStore> =
        match cli.ranking_file.clone().or_else(default_ranking_path) {
            Some(path) => Box::new(JsonRankingStore::new(path)),
            None => Box::new(MemoryRanking::new()),
        };

    let mut guesser = Guesser::new(learning_store);

    let mut interface: Box<dyn GameInterface> = if cli.tui {
        match TuiInterface::new() {
            Ok(tui) => Box::new(tui),
            Err(e) => {
                eprintln!("Failed to start the terminal interface: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("=== Forca: hangman against a learning AI ===");
        Box::new(CliInterface::new(BufReader::new(io::stdin())))
    };

    let scores = game_loop(&mut guesser, ranking.as_mut(), &settings, interface.as_mut());
    drop(interface);

    log::info!("Final score - AI: {}, player: {}", scores.ai, scores.player);
    ExitCode::SUCCESS
}
