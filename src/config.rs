use std::path::{Path, PathBuf};

use crate::bosses::{default_bosses, load_bosses, Boss};
use crate::logging::default_log_dir;
use crate::rng::{seed_from_time, Rng};
use crate::state::{default_team_file, AppState};

/// Everything the app needs to start, resolved from the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerConfig {
    pub team_file: PathBuf,
    pub bosses: Vec<Boss>,
    pub seed: u64,
    pub muted: bool,
    pub log_dir: PathBuf,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            team_file: PathBuf::from(default_team_file()),
            bosses: default_bosses(),
            seed: seed_from_time(),
            muted: false,
            log_dir: default_log_dir(),
        }
    }
}

impl TowerConfig {
    /// Fills unset options with defaults; a boss file replaces the built-in roster.
    pub async fn resolve(
        team_file: Option<PathBuf>,
        bosses_file: Option<&Path>,
        seed: Option<u64>,
        muted: bool,
        log_dir: Option<PathBuf>,
    ) -> Result<Self, String> {
        let defaults = Self::default();
        let bosses = match bosses_file {
            Some(path) => load_bosses(path).await?,
            None => defaults.bosses,
        };
        Ok(Self {
            team_file: team_file.unwrap_or(defaults.team_file),
            bosses,
            seed: seed.unwrap_or(defaults.seed),
            muted,
            log_dir: log_dir.unwrap_or(defaults.log_dir),
        })
    }

    pub fn initial_state(&self) -> AppState {
        let mut state = AppState::new(
            self.team_file.to_string_lossy().into_owned(),
            self.bosses.clone(),
            Rng::new(self.seed),
        );
        state.muted = self.muted;
        state
    }
}
