//! Shared query parameter types for API handlers.

use serde::Deserialize;

fn default_true() -> bool {
    true
}

/// Query flags selecting which child collections `GET /projects/{id}`
/// loads. All default to `true`.
#[derive(Debug, Deserialize)]
pub struct ProjectLoadParams {
    #[serde(default = "default_true")]
    pub positions: bool,
    #[serde(default = "default_true")]
    pub members: bool,
    #[serde(default = "default_true")]
    pub applicants: bool,
}
