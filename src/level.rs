use serde::{Deserialize, Serialize};

/// A level change the host should perform. The simulation never loads levels itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelRequest {
    Open(String),
    /// Reopen the current level from scratch.
    Reload,
}

impl std::fmt::Display for LevelRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelRequest::Open(name) => write!(f, "open {}", name),
            LevelRequest::Reload => write!(f, "reload"),
        }
    }
}
