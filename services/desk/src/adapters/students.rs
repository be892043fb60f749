//! services/desk/src/adapters/students.rs
//!
//! Read-only student directory adapter. The directory is owned elsewhere;
//! this adapter only resolves ids to display records for search and
//! presentation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use coachdesk_core::domain::StudentInfo;
use coachdesk_core::ports::{PortError, PortResult, StudentDirectory};

/// A `StudentDirectory` backed by a fixed in-memory map, optionally
/// seeded from a JSON file of the shape `{ "<student_id>": { ... } }`.
pub struct StaticDirectory {
    students: HashMap<String, StudentInfo>,
}

impl StaticDirectory {
    pub fn new(students: HashMap<String, StudentInfo>) -> Self {
        Self { students }
    }

    /// An empty directory; every lookup resolves to `None`.
    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    pub fn from_json_file(path: &Path) -> PortResult<Self> {
        let data = std::fs::read(path).map_err(|e| {
            PortError::Unexpected(format!("failed to read student seed {}: {e}", path.display()))
        })?;
        let students: HashMap<String, StudentInfo> =
            serde_json::from_slice(&data).map_err(|e| {
                PortError::Unexpected(format!(
                    "failed to parse student seed {}: {e}",
                    path.display()
                ))
            })?;
        Ok(Self::new(students))
    }
}

#[async_trait]
impl StudentDirectory for StaticDirectory {
    async fn student_info(&self, student_id: &str) -> PortResult<Option<StudentInfo>> {
        Ok(self.students.get(student_id).cloned())
    }
}
