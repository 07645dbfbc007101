//! Response bodies of the backend draft endpoints.

use invitra_core::Draft;
use serde::Deserialize;

/// Status value the backend uses for an accepted request.
pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

#[derive(Debug, Deserialize)]
pub struct LoadResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Draft>,
}

impl LoadResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}
