//! Pruning of low-value records.
//!
//! Pruning bounds the growth of history from high-frequency commands that
//! carry little information, and drops commands that are pure noise.
//!
//! # Classification
//!
//! | Table | Effect |
//! |-------|--------|
//! | Exclude | Dropped unconditionally |
//! | Limit | Only the `per_command_limit` most recent occurrences per entry are kept |
//! | Neither | Always kept, regardless of frequency |
//!
//! Entries match on a word boundary: `ls` matches `ls` and `ls -la`, never
//! `lsof`. Exclusion wins over limiting, and an excluded record is never
//! charged against a limit quota.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::types::Record;

/// Default number of most-recent occurrences kept per limited command.
pub const DEFAULT_PER_COMMAND_LIMIT: usize = 30;

/// Environment variable overriding [`DEFAULT_PER_COMMAND_LIMIT`].
pub const PRUNE_LIMIT_ENV: &str = "HISTRIONIC_PRUNE_LIMIT";

/// Commands that are dropped outright: editor launches, job control and the like.
pub const DEFAULT_EXCLUDE: &[&str] = &[
    "bg", "code", "emacs", "emc", "fg", "locate", "mate", "md5", "open",
];

/// Common, repetitive commands capped at the per-command limit.
pub const DEFAULT_LIMIT: &[&str] = &[
    "cat",
    "cd",
    "cp",
    "diff",
    "echo",
    "egrep",
    "find",
    "git add",
    "git commit",
    "grep",
    "head",
    "hg add",
    "hg resolve",
    "l",
    "less",
    "ls",
    "lt",
    "man",
    "mkdir",
    "mv",
    "pbpaste",
    "peg",
    "ping",
    "port",
    "ps",
    "python",
    "rm",
    "rsync",
    "scp",
    "ssh",
    "svn add",
    "tail",
    "telnet",
    "touch",
    "wc",
    "wget",
    "which",
    "whois",
    "xattr",
];

/// Classification tables and quota for pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneConfig {
    /// Prefixes of commands that are always dropped.
    pub exclude: Vec<String>,

    /// Prefixes of commands that are capped at `per_command_limit`.
    pub limit: Vec<String>,

    /// Most-recent occurrences kept per limit entry.
    /// Default: 30.
    pub per_command_limit: usize,
}

impl Default for PruneConfig {
    fn default() -> Self {
        PruneConfig {
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
            limit: DEFAULT_LIMIT.iter().map(|s| s.to_string()).collect(),
            per_command_limit: DEFAULT_PER_COMMAND_LIMIT,
        }
    }
}

impl PruneConfig {
    /// The default tables, with the quota taken from `HISTRIONIC_PRUNE_LIMIT`
    /// when it is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = PruneConfig::default();
        if let Ok(raw) = std::env::var(PRUNE_LIMIT_ENV) {
            config.per_command_limit = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidLimit(raw.clone()))?;
        }
        Ok(config)
    }

    /// Sets the per-command quota.
    pub fn with_per_command_limit(mut self, limit: usize) -> Self {
        self.per_command_limit = limit;
        self
    }

    /// Checks that no command can match two limit entries.
    ///
    /// Two entries overlap exactly when one matches the other on a word
    /// boundary (`git` and `git add`). Rejecting that keeps the entries
    /// mutually exclusive, so table order never decides which quota a
    /// command is charged to.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, first) in self.limit.iter().enumerate() {
            for second in &self.limit[i + 1..] {
                if has_command_prefix(first, second) || has_command_prefix(second, first) {
                    return Err(ConfigError::OverlappingLimitPrefixes {
                        first: first.clone(),
                        second: second.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Returns true if `command` is `prefix` or starts with `prefix` followed by a space.
pub fn has_command_prefix(command: &str, prefix: &str) -> bool {
    match command.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(' '),
        None => false,
    }
}

/// Applies a validated [`PruneConfig`] to record sets.
#[derive(Debug, Clone)]
pub struct Pruner {
    config: PruneConfig,
}

impl Default for Pruner {
    /// The built-in tables, which are known not to overlap.
    fn default() -> Self {
        Pruner {
            config: PruneConfig::default(),
        }
    }
}

impl Pruner {
    pub fn new(config: PruneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Pruner { config })
    }

    pub fn config(&self) -> &PruneConfig {
        &self.config
    }

    pub fn is_excluded(&self, command: &str) -> bool {
        self.config
            .exclude
            .iter()
            .any(|prefix| has_command_prefix(command, prefix))
    }

    /// The limit entry matching `command`, if any.
    pub fn limit_entry(&self, command: &str) -> Option<&str> {
        self.config
            .limit
            .iter()
            .find(|prefix| has_command_prefix(command, prefix))
            .map(String::as_str)
    }

    /// Drops excluded records and caps limited ones.
    ///
    /// `records` must be ascending by time; the result is too. Walking from
    /// newest to oldest means the records that survive a quota are the most
    /// recent ones.
    pub fn prune(&self, records: &[Record]) -> Vec<Record> {
        let mut kept: Vec<Record> = Vec::with_capacity(records.len());
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for record in records.iter().rev() {
            if self.is_excluded(&record.command) {
                continue;
            }
            if let Some(entry) = self.limit_entry(&record.command) {
                let count = counts.entry(entry).or_insert(0);
                *count += 1;
                if *count > self.config.per_command_limit {
                    continue;
                }
            }
            kept.push(record.clone());
        }

        kept.reverse();
        kept
    }
}
