//! Uniform response envelope.
//!
//! `{"code": 0, "msg": "", ...}` on success, `{"code": 1, "msg": ..}` for a warning and
//! `{"code": -1, "msg": ..}` for an error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub const CODE_SUCCESS: i32 = 0;
pub const CODE_WARNING: i32 = 1;
pub const CODE_ERROR: i32 = -1;

#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse {
    Success {
        msg: String,
        extra: Map<String, Value>,
    },
    Warning {
        msg: String,
    },
    Error {
        msg: String,
    },
}

impl ApiResponse {
    pub fn success() -> Self {
        ApiResponse::success_msg("")
    }

    pub fn success_msg(msg: impl Into<String>) -> Self {
        ApiResponse::Success {
            msg: msg.into(),
            extra: Map::new(),
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        ApiResponse::Warning { msg: msg.into() }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        ApiResponse::Error { msg: msg.into() }
    }

    /// Adds a payload field to a success envelope. Other envelopes carry no payload.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        if let ApiResponse::Success { extra, .. } = &mut self {
            let value = serde_json::to_value(value).unwrap_or_else(|err| {
                error!("Could not serialize response field {}! Error: {}", key, err);
                Value::Null
            });
            extra.insert(key.to_owned(), value);
        }
        self
    }

    pub fn code(&self) -> i32 {
        match self {
            ApiResponse::Success { .. } => CODE_SUCCESS,
            ApiResponse::Warning { .. } => CODE_WARNING,
            ApiResponse::Error { .. } => CODE_ERROR,
        }
    }

    pub fn msg(&self) -> &str {
        match self {
            ApiResponse::Success { msg, .. }
            | ApiResponse::Warning { msg }
            | ApiResponse::Error { msg } => msg,
        }
    }
}

impl Serialize for ApiResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = match self {
            ApiResponse::Success { extra, .. } => Some(extra),
            _ => None,
        };
        let mut map = serializer.serialize_map(Some(2 + extra.map_or(0, Map::len)))?;
        map.serialize_entry("code", &self.code())?;
        map.serialize_entry("msg", self.msg())?;
        for (key, value) in extra.into_iter().flatten() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if let ApiResponse::Warning { msg } = &self {
            info!("Request answered with warning: {}", msg);
        }
        (StatusCode::OK, Json(self)).into_response()
    }
}
