//! The e-signature provider webhook endpoint.
//!
//! Providers deliver events at-least-once, unordered, and in several payload shapes (JSON
//! bodies, form bodies with an embedded JSON `payload` field, flat form key/values, and
//! fields nested under `data`). This module flattens all of those into a single
//! [`WebhookEvent`] and hands it to the reconciliation engine.
//!
//! The route always answers 200 once past the optional shared-secret check. A non-2xx
//! answer would make the provider retry a delivery we have already classified, so every
//! internal failure is logged and acknowledged instead.
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use contract_engine::{
    db_types::{ReconciliationOutcome, WebhookEvent},
    traits::{ContractSigningDatabase, SignatureGateway},
    ContractFlowApi,
};
use log::*;
use serde_json::{Map, Value};

use crate::{config::WebhookAuthConfig, data_objects::JsonResponse, errors::ServerError, route};

route!(contract_webhook => Post "/webhook" impl ContractSigningDatabase, SignatureGateway);
pub async fn contract_webhook<B, G>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ContractFlowApi<B, G>>,
    auth: web::Data<WebhookAuthConfig>,
) -> Result<HttpResponse, ServerError>
where
    B: ContractSigningDatabase,
    G: SignatureGateway,
{
    trace!("🪝️ Received webhook request: {}", req.uri());
    check_shared_secret(&req, auth.as_ref())?;
    // Webhook responses must always be in the 200 range, otherwise the provider will retry
    let payload = match parse_webhook_body(&req, &body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("🪝️ Could not parse webhook body. {e}");
            return Ok(HttpResponse::Ok().json(JsonResponse::failure("Could not parse webhook body")));
        },
    };
    let event = normalize_event(&payload);
    let result = match api.process_webhook_event(event).await {
        ReconciliationOutcome::Updated(contract) => {
            info!("🪝️ Contract #{} reconciled to status {}", contract.id, contract.status);
            JsonResponse::success("ok")
        },
        ReconciliationOutcome::NoMatch => JsonResponse::success("ignored"),
    };
    Ok(HttpResponse::Ok().json(result))
}

/// 401 only when a shared secret is configured and the delivery does not carry it.
fn check_shared_secret(req: &HttpRequest, auth: &WebhookAuthConfig) -> Result<(), ServerError> {
    if !auth.is_enabled() {
        return Ok(());
    }
    let presented = req.headers().get(auth.header_name.trim()).and_then(|v| v.to_str().ok());
    if presented == Some(auth.secret.reveal().as_str()) {
        Ok(())
    } else {
        warn!("🪝️ Webhook delivery failed the shared-secret check");
        Err(ServerError::Unauthenticated("invalid webhook credentials".to_string()))
    }
}

/// Accepts a JSON body, a form body with a JSON `payload` field, or a flat form body.
fn parse_webhook_body(req: &HttpRequest, body: &[u8]) -> Result<Value, String> {
    let content_type = req
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    if content_type.contains("x-www-form-urlencoded") {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_bytes(body).map_err(|e| format!("invalid form body: {e}"))?;
        if let Some((_, payload)) = pairs.iter().find(|(k, _)| k == "payload") {
            return serde_json::from_str(payload).map_err(|e| format!("invalid payload field: {e}"));
        }
        let map = pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect::<Map<_, _>>();
        Ok(Value::Object(map))
    } else {
        serde_json::from_slice(body).map_err(|e| format!("invalid json body: {e}"))
    }
}

/// Flattens a provider payload into the engine's event model with ordered field probes,
/// each consulted at the top level and then under `data`.
pub fn normalize_event(payload: &Value) -> WebhookEvent {
    WebhookEvent {
        envelope_id: probe(payload, &["submission_id", "envelope_id", "id"]),
        participant_email: probe(payload, &["email", "submitter_email", "signer_email"]),
        participant_role: probe(payload, &["role", "submitter_role", "signer_role"]),
        status: probe(payload, &["status"]),
        event_type: probe(payload, &["event_type", "type"]),
        signed_file_url: probe(payload, &["combined_document_url", "signed_file_url"]),
        signed_at: probe(payload, &["completed_at"]).and_then(|ts| parse_timestamp(&ts)),
    }
}

fn probe(payload: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .flat_map(|key| [payload.get(*key), payload.get("data").and_then(|d| d.get(*key))])
        .flatten()
        .find_map(scalar_as_string)
}

fn scalar_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| debug!("🪝️ Could not parse webhook timestamp '{ts}'. {e}"))
        .ok()
}
