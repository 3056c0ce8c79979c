use std::path::PathBuf;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{sse::{Event, Sse}, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::StreamExt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::{
    config::RunCfg,
    events::GenerationEvent,
    generator::BatchGenerator,
    links::share_url,
    templates::{TemplateSet, HEADLINE_TOKEN, HERO_VISUAL_TOKEN, TAGLINE_TOKEN, TOPIC_TOKEN},
};

#[derive(Clone)]
pub struct AppState {
    cfg: RunCfg,
    template_path: PathBuf,
    events_tx: broadcast::Sender<GenerationEvent>,
}

pub async fn serve(bind: String, cfg: RunCfg, template_path: PathBuf) -> Result<()> {
    // Seed the template file with the builtin table on first run, then make
    // sure whatever is there actually loads.
    if tokio::fs::metadata(&template_path).await.is_err() {
        let yaml = serde_yaml::to_string(&TemplateSet::builtin())?;
        tokio::fs::write(&template_path, yaml)
            .await
            .context(format!("failed to write {}", template_path.display()))?;
        tracing::info!(path = %template_path.display(), "wrote builtin template table");
    }
    TemplateSet::load(Some(&template_path))
        .await
        .context("template table validation failed")?;

    let (tx, _rx) = broadcast::channel::<GenerationEvent>(256);

    let state = AppState { cfg, template_path, events_tx: tx };

    let app = Router::new()
        .route("/api/templates", get(get_templates).put(put_templates))
        .route("/api/templates/validate", post(validate_templates))
        .route("/api/generate", post(generate))
        .route("/api/generate/{id}/events", get(generation_events))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("briefgen API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_templates(State(st): State<AppState>) -> Result<Json<TemplateSet>, ApiErr> {
    let txt = tokio::fs::read_to_string(&st.template_path).await.map_err(ApiErr::from)?;
    let set: TemplateSet = serde_yaml::from_str(&txt).map_err(ApiErr::from)?;
    Ok(Json(set))
}

async fn put_templates(
    State(st): State<AppState>,
    Json(set): Json<TemplateSet>,
) -> Result<impl IntoResponse, ApiErr> {
    if let Err(e) = set.validate() {
        return Err(ApiErr::bad_request(e.to_string()));
    }
    let out = serde_yaml::to_string(&set).map_err(ApiErr::from)?;
    tokio::fs::write(&st.template_path, out).await.map_err(ApiErr::from)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct ValidationError {
    field: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
    warnings: Vec<String>,
}

async fn validate_templates(Json(set): Json<TemplateSet>) -> Json<ValidationResult> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (name, list) in set.categories() {
        if list.is_empty() {
            errors.push(ValidationError {
                field: format!("templates.{name}"),
                message: "At least one fragment is required".to_string(),
                suggestion: None,
            });
            continue;
        }
        for (i, fragment) in list.iter().enumerate() {
            if fragment.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("templates.{name}[{i}]"),
                    message: "Fragment cannot be blank".to_string(),
                    suggestion: None,
                });
            }
        }
    }

    // Token coverage is advisory: a fragment without {topic} still renders,
    // it just ignores the topic.
    for (name, list) in &set.categories()[..3] {
        for (i, fragment) in list.iter().enumerate() {
            if !fragment.contains(TOPIC_TOKEN) {
                warnings.push(format!("templates.{name}[{i}] does not mention {TOPIC_TOKEN}"));
            }
        }
    }
    for (i, bp) in set.blueprints.iter().enumerate() {
        for token in [HEADLINE_TOKEN, TAGLINE_TOKEN, HERO_VISUAL_TOKEN] {
            if !bp.contains(token) {
                warnings.push(format!("templates.blueprints[{i}] does not use {token}"));
            }
        }
    }

    Json(ValidationResult { valid: errors.is_empty(), errors, warnings })
}

#[derive(Deserialize)]
struct GenerateReq {
    topic: String,
    #[serde(default = "default_count")]
    count: usize,
    seed: Option<u64>,
    /// Client-chosen id. A front end that wants the event feed subscribes to
    /// `/api/generate/{id}/events` with its own id first, then posts it here;
    /// the broadcast channel only delivers to subscribers that already exist.
    request_id: Option<String>,
}

fn default_count() -> usize {
    3
}

#[derive(Serialize)]
struct BriefItem {
    index: usize,
    text: String,
    share_url: String,
}

#[derive(Serialize)]
struct GenerateResp {
    request_id: String,
    topic: String,
    requested: usize,
    briefs: Vec<BriefItem>,
    duplicates_skipped: u64,
}

async fn generate(
    State(st): State<AppState>,
    Json(req): Json<GenerateReq>,
) -> Result<Json<GenerateResp>, ApiErr> {
    let topic = req.topic.trim().to_string();
    if topic.is_empty() {
        return Err(ApiErr::bad_request("Topic is required"));
    }
    let count = req.count.clamp(1, st.cfg.api.max_count.max(1));

    let request_id = match req.request_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => format!("req-{}", Uuid::new_v4()),
    };
    let _ = st.events_tx.send(GenerationEvent::Started {
        request_id: request_id.clone(),
        topic: topic.clone(),
        requested: count,
    });

    // Fixed cosmetic wait so the front end's progress state shows; no cancel
    // path, matching the UI contract.
    if st.cfg.api.delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(st.cfg.api.delay_ms)).await;
    }

    let templates = match TemplateSet::load(Some(&st.template_path)).await {
        Ok(t) => t,
        Err(e) => {
            let _ = st.events_tx.send(GenerationEvent::Failed {
                request_id: request_id.clone(),
                error: e.to_string(),
            });
            return Err(ApiErr::internal(e));
        }
    };

    let seed = req
        .seed
        .or(st.cfg.generator.seed)
        .unwrap_or_else(|| rand::rng().random());
    let mut generator = BatchGenerator::new(templates, seed)
        .with_limits(st.cfg.generator.prefix_len, st.cfg.generator.attempt_factor);
    let batch = generator.generate_many(&topic, count);

    let _ = st.events_tx.send(GenerationEvent::Progress {
        request_id: request_id.clone(),
        done: batch.prompts.len(),
        requested: count,
    });
    let _ = st.events_tx.send(GenerationEvent::Finished {
        request_id: request_id.clone(),
        produced: batch.prompts.len(),
        duplicates_skipped: batch.duplicates_skipped,
    });

    let briefs = batch
        .prompts
        .into_iter()
        .enumerate()
        .map(|(i, text)| BriefItem { index: i + 1, share_url: share_url(&text), text })
        .collect();

    Ok(Json(GenerateResp {
        request_id,
        topic,
        requested: count,
        briefs,
        duplicates_skipped: batch.duplicates_skipped,
    }))
}

async fn generation_events(
    State(st): State<AppState>,
    Path(request_id): Path<String>,
) -> Sse<impl futures_util::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let rx = st.events_tx.subscribe();

    let stream = BroadcastStream::new(rx)
        .filter_map(|msg| async move { msg.ok() })
        .filter(move |evt: &GenerationEvent| {
            futures_util::future::ready(evt.request_id() == request_id)
        })
        .map(|evt| {
            let json = serde_json::to_string(&evt).unwrap_or_default();
            Ok(Event::default().event("message").data(json))
        });

    Sse::new(stream)
}

#[derive(Debug)]
struct ApiErr {
    status: StatusCode,
    code: String,
    message: String,
    suggestion: Option<String>,
}

impl ApiErr {
    fn internal(e: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal_error".to_string(),
            message: format!("Internal error: {}", e),
            suggestion: None,
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_input".to_string(),
            message: message.into(),
            suggestion: None,
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for ApiErr {
    fn from(e: E) -> Self {
        Self::internal(e.into())
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            code: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            suggestion: Option<String>,
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code,
                suggestion: self.suggestion,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state(delay_ms: u64) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.yaml");
        let yaml = serde_yaml::to_string(&TemplateSet::builtin()).unwrap();
        tokio::fs::write(&path, yaml).await.unwrap();
        let mut cfg = RunCfg::default();
        cfg.api.delay_ms = delay_ms;
        let (tx, _rx) = broadcast::channel(256);
        (AppState { cfg, template_path: path, events_tx: tx }, dir)
    }

    #[tokio::test]
    async fn pre_subscribed_client_receives_its_events() {
        let (st, _dir) = test_state(0).await;
        // The front end subscribes with its own id before posting, so the
        // subscriber exists when the handler broadcasts.
        let mut rx = st.events_tx.subscribe();

        let resp = generate(
            State(st.clone()),
            Json(GenerateReq {
                topic: "coffee shops".into(),
                count: 2,
                seed: Some(7),
                request_id: Some("req-front-end".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(resp.0.request_id, "req-front-end");
        assert_eq!(resp.0.briefs.len(), 2);

        let started = rx.recv().await.unwrap();
        assert!(matches!(&started, GenerationEvent::Started { requested: 2, .. }));
        assert_eq!(started.request_id(), "req-front-end");
        let progress = rx.recv().await.unwrap();
        assert!(matches!(&progress, GenerationEvent::Progress { done: 2, .. }));
        let finished = rx.recv().await.unwrap();
        assert!(matches!(&finished, GenerationEvent::Finished { produced: 2, .. }));
        assert_eq!(finished.request_id(), "req-front-end");
    }

    #[tokio::test]
    async fn missing_request_id_gets_a_server_assigned_one() {
        let (st, _dir) = test_state(0).await;
        let resp = generate(
            State(st),
            Json(GenerateReq {
                topic: "retail".into(),
                count: 1,
                seed: Some(1),
                request_id: None,
            }),
        )
        .await
        .unwrap();
        assert!(resp.0.request_id.starts_with("req-"));
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_before_any_event() {
        let (st, _dir) = test_state(0).await;
        let mut rx = st.events_tx.subscribe();
        let res = generate(
            State(st.clone()),
            Json(GenerateReq {
                topic: "   ".into(),
                count: 1,
                seed: None,
                request_id: Some("req-x".into()),
            }),
        )
        .await;
        assert!(res.is_err());
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    }
}
