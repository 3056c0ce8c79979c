use serde::{Deserialize, Serialize};

/// Per-request progress feed for the browser front end (SSE).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    Started { request_id: String, topic: String, requested: usize },
    Progress { request_id: String, done: usize, requested: usize },
    Finished { request_id: String, produced: usize, duplicates_skipped: u64 },
    Failed { request_id: String, error: String },
}

impl GenerationEvent {
    pub fn request_id(&self) -> &str {
        match self {
            GenerationEvent::Started { request_id, .. }
            | GenerationEvent::Progress { request_id, .. }
            | GenerationEvent::Finished { request_id, .. }
            | GenerationEvent::Failed { request_id, .. } => request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let evt = GenerationEvent::Finished {
            request_id: "req-1".into(),
            produced: 3,
            duplicates_skipped: 1,
        };
        let json = serde_json::to_string(&evt).unwrap();
        assert!(json.contains(r#""type":"finished""#));
        assert!(json.contains(r#""request_id":"req-1""#));
    }
}
