//! Correlation types for directory switch tracking
//!
//! Every switch attempt gets its own id so that the classify, migrate and
//! commit events it emits can be grouped together in the logs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single directory switch attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(String);

impl AttemptId {
    /// Generate a new AttemptId using UUIDv7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_ids_are_unique() {
        let a = AttemptId::new();
        let b = AttemptId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_attempt_ids_sort_by_creation() {
        let a = AttemptId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = AttemptId::new();
        assert!(a.as_str() < b.as_str());
    }

    #[test]
    fn test_serialization() {
        let id = AttemptId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: AttemptId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
