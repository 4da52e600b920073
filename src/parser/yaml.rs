use super::types::{Step, Steps, TestCase};
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::Path;

/// Parse a YAML test case file into a TestCase
pub fn parse_test_file(path: &Path) -> Result<TestCase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    parse_yaml_content(&content, path)
}

/// Parse YAML content into a TestCase
pub fn parse_yaml_content(content: &str, source_path: &Path) -> Result<TestCase> {
    let root: Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML in {}", source_path.display()))?;

    let map = root
        .as_mapping()
        .ok_or_else(|| anyhow::anyhow!("Test case must be a YAML mapping"))?;

    let name = match map.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_)) => anyhow::bail!("Test case name must not be empty"),
        Some(other) => anyhow::bail!("Test case name must be a string, got: {:?}", other),
        None => anyhow::bail!("Test case has no `name`"),
    };

    let steps = match map.get("steps") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .enumerate()
            .map(|(i, v)| parse_step_value(v).with_context(|| format!("Invalid step #{}", i + 1)))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => anyhow::bail!("`steps` must be a list"),
    };

    Ok(TestCase {
        name,
        steps: Steps(steps),
    })
}

/// Parse one step: either a bare name or a `{ name, run }` mapping
pub fn parse_step_value(value: &Value) -> Result<Step> {
    match value {
        Value::String(s) => {
            let name = s.trim();
            if name.is_empty() {
                anyhow::bail!("Step name must not be empty");
            }
            Ok(Step::new(name))
        }
        Value::Mapping(_) => {
            let step: Step = serde_yaml::from_value(value.clone())?;
            if step.name.trim().is_empty() {
                anyhow::bail!("Step name must not be empty");
            }
            Ok(step)
        }
        other => anyhow::bail!("Unsupported step format: {:?}", other),
    }
}
