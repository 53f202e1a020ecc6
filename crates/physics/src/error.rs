use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("action has {got} components, arm has {expected} joints")]
    InvalidActionShape { expected: usize, got: usize },
    #[error("{what} has {got} joints, arm has {expected}")]
    JointCount {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("obstacle table row {row} has {got} entries, expected {expected}")]
    TableShape { row: usize, expected: usize, got: usize },
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
