use super::StepExecutor;
use crate::parser::types::Step;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// Runs each step's `run` command through the platform shell
#[derive(Debug, Default)]
pub struct ShellStepExecutor {
    /// Working directory for step commands, the current one if unset
    pub working_dir: Option<PathBuf>,
}

impl ShellStepExecutor {
    pub fn new(working_dir: Option<PathBuf>) -> Self {
        Self { working_dir }
    }

    fn command(script: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", script]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", script]);
            cmd
        }
    }
}

impl StepExecutor for ShellStepExecutor {
    fn execute(&mut self, step: &Step) -> Result<()> {
        let Some(script) = step.run.as_deref() else {
            log::debug!("Step '{}' has no command", step.name());
            return Ok(());
        };

        let mut cmd = Self::command(script);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        log::info!("Running step '{}': {}", step.name(), script);
        let output = cmd
            .output()
            .with_context(|| format!("Failed to spawn command for step '{}'", step.name()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{}", stdout.trim_end());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "Command `{}` exited with {}: {}",
                script,
                output.status,
                stderr.trim()
            );
        }

        Ok(())
    }
}
