use crate::learning::LearningState;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const APP_DIR: &str = "forca-ai";
const LEARNING_FILE: &str = "learning.json";

/// Load/save collaborator for the guesser's learning state.
pub trait LearningStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&mut self) -> io::Result<Option<LearningState>>;
    fn save(&mut self, state: &LearningState) -> io::Result<()>;
}

impl<S: LearningStore + ?Sized> LearningStore for Box<S> {
    fn load(&mut self) -> io::Result<Option<LearningState>> {
        (**self).load()
    }

    fn save(&mut self, state: &LearningState) -> io::Result<()> {
        (**self).save(state)
    }
}

/// Per-user application directory, `None` when the platform has no data dir.
#[must_use]
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR))
}

#[must_use]
pub fn default_learning_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(LEARNING_FILE))
}

/// Reads a JSON document, `Ok(None)` if the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(value))
}

/// Writes `value` as JSON to a temp file next to `path`, then renames it over `path`.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer(&mut writer, value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Learning state kept as a single JSON record on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LearningStore for JsonFileStore {
    fn load(&mut self) -> io::Result<Option<LearningState>> {
        read_json(&self.path)
    }

    fn save(&mut self, state: &LearningState) -> io::Result<()> {
        write_json_atomic(&self.path, state)
    }
}

/// In-memory store, used in tests and when no data directory is available.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub state: Option<LearningState>,
    /// When set, every `save` fails with `io::ErrorKind::Other`.
    pub fail_writes: bool,
    pub saves: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state(state: LearningState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl LearningStore for MemoryStore {
    fn load(&mut self) -> io::Result<Option<LearningState>> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &LearningState) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("storage unavailable"));
        }
        self.state = Some(state.clone());
        self.saves += 1;
        Ok(())
    }
}
