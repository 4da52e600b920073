pub mod types;
pub mod yaml;

pub use types::{Step, Steps, TestCase};
