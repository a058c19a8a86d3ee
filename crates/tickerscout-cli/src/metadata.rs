use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request identifier (UUID v4) for end-to-end request tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Run metadata attached to every command response.
///
/// Field order is fixed to keep deterministic JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub request_id: RequestId,
    pub elapsed_ms: u64,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RunMetadata {
    pub fn new(elapsed_ms: u64, count: usize) -> Self {
        Self {
            request_id: RequestId::new_v4(),
            elapsed_ms,
            count,
            warnings: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// A per-source failure surfaced in the response body.
///
/// Source failures degrade the run (exit code 3) but never abort it;
/// whatever the other sources produced is still returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceError {
    pub source: String,
    pub message: String,
}

/// Complete command response: metadata, payload, per-source errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub meta: RunMetadata,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SourceError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_uuid_v4() {
        let request_id = RequestId::new_v4();
        assert_eq!(request_id.0.get_version_num(), 4);
    }

    #[test]
    fn empty_warnings_and_errors_are_omitted() {
        let response = Response {
            meta: RunMetadata::new(12, 0),
            data: Value::Null,
            errors: Vec::new(),
        };

        let rendered = serde_json::to_string(&response).expect("serializes");
        assert!(!rendered.contains("warnings"));
        assert!(!rendered.contains("errors"));
    }

    #[test]
    fn warnings_appear_once_pushed() {
        let mut meta = RunMetadata::new(5, 3);
        meta.push_warning("partial data");

        let rendered = serde_json::to_string(&meta).expect("serializes");
        assert!(rendered.contains("\"warnings\":[\"partial data\"]"));
        assert!(rendered.contains("\"count\":3"));
    }
}
