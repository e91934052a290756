use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::trivia::round::DEFAULT_ROUND_DURATION;

pub const TOKEN_VAR: &str = "TELOXIDE_TOKEN";
pub const QUESTIONS_VAR: &str = "TRIVIA_QUESTIONS";
pub const SCORES_VAR: &str = "TRIVIA_SCORES";
pub const ROUND_SECONDS_VAR: &str = "TRIVIA_ROUND_SECONDS";

const DEFAULT_QUESTIONS_PATH: &str = "trivia.txt";
const DEFAULT_SCORES_PATH: &str = "scores.txt";

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub questions_path: PathBuf,
    /// `None` keeps scores in memory only.
    pub scores_path: Option<PathBuf>,
    pub round_duration: Duration,
}

impl Config {
    /// Reads the bot token and the `TRIVIA_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing { name: TOKEN_VAR })?;

        let questions_path = lookup(QUESTIONS_VAR)
            .unwrap_or_else(|| DEFAULT_QUESTIONS_PATH.to_string())
            .into();

        let scores_path = match lookup(SCORES_VAR) {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(path.into()),
            None => Some(DEFAULT_SCORES_PATH.into()),
        };

        let round_duration = match lookup(ROUND_SECONDS_VAR) {
            None => DEFAULT_ROUND_DURATION,
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidRoundDuration {
                        name: ROUND_SECONDS_VAR,
                        value,
                    })
                }
            },
        };

        Ok(Self {
            token,
            questions_path,
            scores_path,
            round_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let mut vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vars.entry(TOKEN_VAR.to_string())
            .or_insert_with(|| "123:abc".to_string());
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.token, "123:abc");
        assert_eq!(cfg.questions_path, PathBuf::from("trivia.txt"));
        assert_eq!(cfg.scores_path, Some(PathBuf::from("scores.txt")));
        assert_eq!(cfg.round_duration, Duration::from_secs(180));
    }

    #[test]
    fn token_is_required() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: TOKEN_VAR }));

        let err = config(&[(TOKEN_VAR, " ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            (QUESTIONS_VAR, "/data/q.txt"),
            (SCORES_VAR, "/data/s.txt"),
            (ROUND_SECONDS_VAR, " 60 "),
        ])
        .unwrap();
        assert_eq!(cfg.questions_path, PathBuf::from("/data/q.txt"));
        assert_eq!(cfg.scores_path, Some(PathBuf::from("/data/s.txt")));
        assert_eq!(cfg.round_duration, Duration::from_secs(60));
    }

    #[test]
    fn empty_scores_path_disables_persistence() {
        let cfg = config(&[(SCORES_VAR, "")]).unwrap();
        assert_eq!(cfg.scores_path, None);
    }

    #[test]
    fn bad_round_duration_is_rejected() {
        for value in ["0", "-5", "soon"] {
            let err = config(&[(ROUND_SECONDS_VAR, value)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidRoundDuration { .. }));
        }
    }
}
