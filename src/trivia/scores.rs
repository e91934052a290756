use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{ChatError, TriviaError};
use crate::trivia::UserId;

pub const SCORE_DELIMITER: char = ':';
pub const NUM_RANKINGS_TO_SHOW: usize = 10;
const LEADERBOARD_SPACING: usize = 8;

/// Resolves user ids to something a human recognises.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user: UserId) -> Result<String, ChatError>;
}

/// Points per user, mirrored to a flat file after every change when a path
/// is configured.
#[derive(Debug, Default)]
pub struct ScoreLedger {
    scores: HashMap<UserId, u64>,
    path: Option<PathBuf>,
}

impl ScoreLedger {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A missing file is an empty ledger. Lines that don't parse are skipped.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TriviaError> {
        let path = path.into();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No score file at {}, starting fresh", path.display());
                String::new()
            }
            Err(source) => return Err(TriviaError::Io { path, source }),
        };

        let mut scores = HashMap::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((user, score)) => {
                    scores.insert(user, score);
                }
                None => log::warn!(
                    "Skipping malformed score line {} in {}: {:?}",
                    number + 1,
                    path.display(),
                    line
                ),
            }
        }

        log::info!("Loaded {} scores from {}", scores.len(), path.display());
        Ok(Self {
            scores,
            path: Some(path),
        })
    }

    pub fn get(&self, user: UserId) -> u64 {
        self.scores.get(&user).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Adds a point and returns the new total. The file is rewritten before
    /// this returns; if that fails the point still counts in memory.
    pub fn increment(&mut self, user: UserId) -> u64 {
        let score = self.scores.entry(user).or_insert(0);
        *score = score.saturating_add(1);
        let score = *score;

        if let Err(err) = self.save() {
            log::error!("Failed to persist scores: {}", err);
        }
        score
    }

    pub fn entries(&self) -> Vec<(UserId, u64)> {
        self.scores.iter().map(|(user, score)| (*user, *score)).collect()
    }

    fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut entries = self.entries();
        entries.sort();
        let contents: String = entries
            .iter()
            .map(|(user, score)| format!("{}{}{}\n", user, SCORE_DELIMITER, score))
            .collect();

        let tmp = tmp_path(path);
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)
    }
}

fn parse_line(line: &str) -> Option<(UserId, u64)> {
    let (user, score) = line.split_once(SCORE_DELIMITER)?;
    let user = user.trim().parse().ok()?;
    let score = score.trim().parse().ok()?;
    Some((UserId(user), score))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Looks up every name and orders by score, highest first. Users whose name
/// can't be resolved are left out.
pub async fn rank(
    entries: Vec<(UserId, u64)>,
    directory: &dyn UserDirectory,
) -> Vec<(String, u64)> {
    let mut ranking = Vec::with_capacity(entries.len());
    for (user, score) in entries {
        match directory.display_name(user).await {
            Ok(name) => ranking.push((name, score)),
            Err(err) => log::warn!("Failed to get user {}: {}", user, err),
        }
    }
    ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranking
}

/// Top players as aligned `name    score` rows.
pub fn format_ranking(ranking: &[(String, u64)]) -> String {
    let shown = &ranking[..ranking.len().min(NUM_RANKINGS_TO_SHOW)];
    let longest = shown
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    let mut rows = String::new();
    for (name, score) in shown {
        let padding = longest + LEADERBOARD_SPACING - name.chars().count();
        rows.push_str(&format!("{}{}{}\n", name, " ".repeat(padding), score));
    }
    rows
}
