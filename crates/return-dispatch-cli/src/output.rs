//! Result emission.
//!
//! The run id is printed to stdout. Inside GitHub Actions, `GITHUB_OUTPUT`
//! names a file that step outputs are appended to as `key=value` lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Step outputs of a resolved dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutputs {
    pub run_id: u64,
    pub run_url: String,
}

impl RunOutputs {
    fn lines(&self) -> String {
        format!("run_id={}\nrun_url={}\n", self.run_id, self.run_url)
    }
}

/// Append the outputs to the file at `path`, creating it if needed.
pub fn append_step_outputs(path: &Path, outputs: &RunOutputs) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open step output file {}", path.display()))?;
    file.write_all(outputs.lines().as_bytes())
        .with_context(|| format!("Failed to write step output file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_outputs_are_appended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "earlier=1\n").unwrap();

        let outputs = RunOutputs {
            run_id: 102,
            run_url: "https://github.com/octo/hello/actions/runs/102".to_string(),
        };
        append_step_outputs(&path, &outputs).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "earlier=1\nrun_id=102\nrun_url=https://github.com/octo/hello/actions/runs/102\n"
        );
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new_output");

        append_step_outputs(
            &path,
            &RunOutputs {
                run_id: 1,
                run_url: String::new(),
            },
        )
        .unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().starts_with("run_id=1\n"));
    }
}
