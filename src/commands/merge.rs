//! Merging session files into one canonical history file.

use std::path::PathBuf;

use crate::error::Result;
use crate::history::{MergeSummary, Merger, Pruner};

/// Options for [`merge`].
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub output: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub coalesce: bool,
    pub prune: Option<Pruner>,
}

/// Runs one lock-protected merge cycle.
pub fn merge(options: &MergeOptions) -> Result<MergeSummary> {
    Merger::new()
        .with_coalesce(options.coalesce)
        .with_pruner(options.prune.clone())
        .merge(&options.output, &options.inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{append_record, read_records};
    use crate::test_utils::{commands, record_at};
    use tempfile::tempdir;

    #[test]
    fn merges_with_coalescing() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        append_record(&a, &record_at(1, "make")).unwrap();
        append_record(&b, &record_at(2, "ls")).unwrap();
        append_record(&b, &record_at(3, "make")).unwrap();
        let output = dir.path().join("history.json");

        let summary = merge(&MergeOptions {
            output: output.clone(),
            inputs: vec![a, b],
            coalesce: true,
            prune: None,
        })
        .unwrap();

        assert_eq!(summary.read, 3);
        assert_eq!(summary.written, 2);
        assert_eq!(commands(&read_records(&output).unwrap()), vec!["ls", "make"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn merges_into_redirected_stdout_alias() {
        use std::os::fd::AsRawFd;

        let dir = tempdir().unwrap();
        let input = dir.path().join("s.json");
        append_record(&input, &record_at(2, "ls")).unwrap();
        append_record(&input, &record_at(1, "make")).unwrap();

        let redirected = dir.path().join("merged.json");
        let handle = std::fs::File::create(&redirected).unwrap();
        let alias = PathBuf::from(format!("/dev/fd/{}", handle.as_raw_fd()));

        merge(&MergeOptions {
            output: alias,
            inputs: vec![input],
            coalesce: false,
            prune: None,
        })
        .unwrap();

        assert_eq!(commands(&read_records(&redirected).unwrap()), vec!["make", "ls"]);
        assert!(!dir.path().join("merged.json.lock").exists());
    }
}
