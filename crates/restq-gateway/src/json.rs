//! JSON response types for the HTTP gateway.

use restq_core::SchemaInfo;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Number of registered entities.
    pub entities: usize,
}

/// Registered entity names.
#[derive(Debug, Serialize)]
pub struct EntitiesResponse {
    /// Entity names, sorted.
    pub entities: Vec<String>,
}

/// Schema of one entity.
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    /// Success flag.
    pub success: bool,
    /// Schema summary.
    pub schema: SchemaInfo,
}

impl From<SchemaInfo> for SchemaResponse {
    fn from(schema: SchemaInfo) -> Self {
        Self {
            success: true,
            schema,
        }
    }
}
