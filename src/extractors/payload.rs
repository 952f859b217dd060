//! Extract a write body as a JSON object, from either a JSON or a form-encoded request.

use crate::error::AppError;
use crate::service::BodyFormat;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde_json::{Map, Value};

#[derive(Clone, Debug)]
pub struct Payload {
    pub body: Map<String, Value>,
    pub format: BodyFormat,
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_ascii_lowercase().starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(pairs): Form<Vec<(String, String)>> = Form::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Payload {
                body: pairs_to_map(pairs),
                format: BodyFormat::Form,
            });
        }

        let Json(value): Json<Value> = Json::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        match value {
            Value::Object(body) => Ok(Payload {
                body,
                format: BodyFormat::Json,
            }),
            _ => Err(AppError::BadRequest("body must be a JSON object".into())),
        }
    }
}

/// Repeated keys become arrays, in order of appearance.
fn pairs_to_map(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        match map.get_mut(&k) {
            Some(Value::Array(items)) => items.push(Value::String(v)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(v)]);
            }
            None => {
                map.insert(k, Value::String(v));
            }
        }
    }
    map
}
