//! Serve command
//!
//! Usage: healthlog serve [--listen <ADDR>]
//!
//! Accepts the provider's inbound-message webhook on the configured route,
//! by GET query string or form POST, and answers with a one-message XML
//! envelope.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Form, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Args;
use healthlog_core::model::UserId;
use healthlog_core::ops::SystemClock;
use healthlog_core_types::{RequestContext, TraceId};
use healthlog_engine::Orchestrator;
use healthlog_store::SqliteLogStore;
use quick_xml::escape::escape;
use serde::Deserialize;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides server.listen)
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Log used when a message arrives without a sender
    pub fallback_user: UserId,
}

/// Inbound webhook fields; the provider sends many more, which are ignored
#[derive(Debug, Default, Deserialize)]
pub struct InboundSms {
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
}

/// Execute serve command
pub fn execute(config_path: Option<&Path>, args: ServeArgs) -> anyhow::Result<()> {
    let config = super::bootstrap(config_path)?;

    let store = Arc::new(SqliteLogStore::open(&config.store.db_path).with_context(|| {
        format!("open log store at {}", config.store.db_path.display())
    })?);
    let clock = Arc::new(SystemClock::from_offset_minutes(
        config.clock.utc_offset_minutes,
    )?);
    let state = AppState {
        orchestrator: Arc::new(Orchestrator::new(store, clock)),
        fallback_user: UserId::new(config.reminder.recipient.expose().as_str()),
    };
    let app = router(state, &config.server.route);

    let listen = match args.listen {
        Some(addr) => addr,
        None => config.server.listen_addr()?,
    };

    let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(listen)
            .await
            .context("bind server listener failed")?;
        tracing::info!(%listen, route = %config.server.route, "healthlog listening");
        axum::serve(listener, app)
            .await
            .context("server terminated with error")
    })
}

pub fn router(state: AppState, route: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(route, get(inbound_get).post(inbound_post))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status":"ok"}))
}

async fn inbound_get(State(state): State<AppState>, Query(sms): Query<InboundSms>) -> Response {
    handle_inbound(state, sms).await
}

async fn inbound_post(State(state): State<AppState>, Form(sms): Form<InboundSms>) -> Response {
    handle_inbound(state, sms).await
}

async fn handle_inbound(state: AppState, sms: InboundSms) -> Response {
    let Some(body) = sms.body else {
        tracing::debug!("inbound request without a body");
        return message_envelope("").into_response();
    };

    let user = sms
        .from
        .filter(|from| !from.trim().is_empty())
        .map(UserId::new)
        .unwrap_or(state.fallback_user);
    let mut ctx = RequestContext::new();
    if let Some(sid) = sms.message_sid {
        ctx = ctx.with_trace_id(TraceId::from_string(sid));
    }

    // Store calls block
    let orchestrator = state.orchestrator;
    let handled =
        tokio::task::spawn_blocking(move || orchestrator.handle_message(&ctx, &user, &body).reply())
            .await;

    match handled {
        Ok(reply) => message_envelope(&reply).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "message handler panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, message_envelope("")).into_response()
        }
    }
}

/// XML reply envelope holding exactly one message
fn message_envelope(text: &str) -> impl IntoResponse {
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape(text)
    );
    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use healthlog_core::ops::{FixedClock, LogStore};
    use tower::ServiceExt;

    fn app() -> (Router, Arc<SqliteLogStore>) {
        let store = Arc::new(SqliteLogStore::open_in_memory().unwrap());
        let now = healthlog_core::model::parse_entry_date("2024-05-17")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let state = AppState {
            orchestrator: Arc::new(Orchestrator::new(store.clone(), Arc::new(FixedClock(now)))),
            fallback_user: UserId::new("+15550100"),
        };
        (router(state, "/sms"), store)
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn envelope(message: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
            message
        )
    }

    #[tokio::test]
    async fn test_envelope_escapes_markup() {
        let response = message_envelope(r#"Med to remove "A&B" <x> 'y'"#).into_response();

        assert_eq!(
            body_text(response).await,
            envelope("Med to remove &quot;A&amp;B&quot; &lt;x&gt; &apos;y&apos;")
        );
    }

    #[tokio::test]
    async fn test_post_form_records_entry_for_sender() {
        let (app, store) = app();

        let response = app
            .oneshot(
                Request::post("/sms")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("Body=7+4+4+8+6&From=%2B15550123"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );
        assert_eq!(body_text(response).await, envelope("Response recorded!"));

        let sender = UserId::new("+15550123");
        assert_eq!(store.recent_entries(&sender, 5).unwrap().len(), 1);
        assert!(store
            .recent_entries(&UserId::new("+15550100"), 5)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_query_without_sender_uses_fallback() {
        let (app, store) = app();

        let response = app
            .oneshot(
                Request::get("/sms?Body=1%202%203%204%205")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_text(response).await, envelope("Response recorded!"));
        assert_eq!(
            store
                .recent_entries(&UserId::new("+15550100"), 5)
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_rejection_reply_is_escaped() {
        let (app, _) = app();

        let response = app
            .oneshot(
                Request::get("/sms?Body=1%202%203%204%205%20-Gone(1)")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            body_text(response).await,
            envelope(
                "Med to remove &quot;Gone(1)&quot; not found; see your meds by replying &quot;see-meds&quot;"
            )
        );
    }

    #[tokio::test]
    async fn test_missing_body_gets_empty_message() {
        let (app, store) = app();

        let response = app
            .oneshot(Request::get("/sms?From=%2B15550100").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, envelope(""));
        assert!(store
            .recent_entries(&UserId::new("+15550100"), 5)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }
}
