use serde::{Deserialize, Serialize};

/// A named test scenario made of ordered steps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,

    #[serde(default)]
    pub steps: Steps,
}

impl TestCase {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            steps: Steps(steps),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &Steps {
        &self.steps
    }
}

/// A single step of a test case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub name: String,

    /// Shell command run by the shell executor. Steps without one always pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

impl Step {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            run: None,
        }
    }

    pub fn with_command(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            run: Some(command.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered step list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Steps(pub Vec<Step>);

impl Steps {
    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|s| s.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Steps {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
