//! Engine settings and the string options that change them.

use std::time::Duration;

use crate::errors::{ChessError, ChessResult};
use crate::search::pruner::{Difficulty, SearchTreePruner};
use crate::search::threading::available_cores;

/// Worker thread count, `1..=available_cores()`.
pub const CORES_OPTION: &str = "core#";
/// Preset name, see [`Difficulty`].
pub const DIFFICULTY_OPTION: &str = "Difficulty";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    // --- Search ---
    pub cores: usize,
    pub difficulty: Difficulty,
    /// Moves this many pawns worse than the best are never played.
    pub acceptable_distance: f64,

    // --- Opening book ---
    pub book_enabled: bool,
    pub book_min_latency: Duration,
    pub book_pruner: SearchTreePruner,

    /// Fixed RNG seed for reproducible move choice.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cores: available_cores(),
            difficulty: Difficulty::default(),
            acceptable_distance: 0.3,
            book_enabled: true,
            book_min_latency: Duration::from_millis(600),
            book_pruner: SearchTreePruner::quick(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn pruner(&self) -> SearchTreePruner {
        self.difficulty.pruner()
    }

    /// Applies one named option. On error the config is unchanged.
    pub fn apply_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        let invalid = || ChessError::InvalidOptionValue {
            name: name.to_owned(),
            value: value.to_owned(),
        };
        if name.eq_ignore_ascii_case(CORES_OPTION) {
            let cores = value.trim().parse::<usize>().map_err(|_| invalid())?;
            if !(1..=available_cores()).contains(&cores) {
                return Err(invalid());
            }
            self.cores = cores;
            return Ok(());
        }
        if name.eq_ignore_ascii_case(DIFFICULTY_OPTION) {
            self.difficulty = value.parse::<Difficulty>().map_err(|_| invalid())?;
            return Ok(());
        }
        Err(ChessError::UnknownOption(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_update_the_config() {
        let mut config = EngineConfig::default();
        config.apply_option("Difficulty", "Expert").expect("difficulty");
        assert_eq!(config.difficulty, Difficulty::Expert);
        assert_eq!(config.pruner(), Difficulty::Expert.pruner());
        config.apply_option("core#", "1").expect("one core is always available");
        assert_eq!(config.cores, 1);
    }

    #[test]
    fn bad_options_leave_the_config_alone() {
        let mut config = EngineConfig::default();
        let before = config.clone();
        let too_many = (available_cores() + 1).to_string();
        for (name, value) in [
            ("core#", "0"),
            ("core#", too_many.as_str()),
            ("core#", "four"),
            ("Difficulty", "impossible"),
        ] {
            assert_eq!(
                config.apply_option(name, value),
                Err(ChessError::InvalidOptionValue {
                    name: name.to_owned(),
                    value: value.to_owned(),
                })
            );
        }
        assert_eq!(
            config.apply_option("Hash", "64"),
            Err(ChessError::UnknownOption("Hash".to_owned()))
        );
        assert_eq!(config, before);
    }
}
