//! JSON envelope shared by every `/api/v1` response.
//!
//! Successful calls carry `data`; failures carry `errors` with a single
//! code/message pair. Both carry `meta` so clients can correlate logs.

use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub meta: ApiMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// UUID v7, so ids sort by arrival.
    pub request_id: String,
    pub timestamp: String,
    pub response_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl ApiMeta {
    fn stamp(request_id: String, elapsed_ms: u64) -> Self {
        Self {
            request_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            response_time_ms: elapsed_ms,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, request_id: String, response_time_ms: u64) -> Self {
        Self {
            data: Some(data),
            meta: ApiMeta::stamp(request_id, response_time_ms),
            errors: Vec::new(),
        }
    }

    /// Wrap `data` with a fresh request id and the time since `start`.
    pub fn timed(data: T, start: Instant) -> Self {
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        Self::success(data, Uuid::now_v7().to_string(), elapsed)
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            data: None,
            meta: ApiMeta::stamp(Uuid::now_v7().to_string(), 0),
            errors: vec![ApiErrorDetail {
                code,
                message: message.into(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_errors() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2], "req-1".into(), 3)).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["meta"]["request_id"], "req-1");
        assert_eq!(json["meta"]["response_time_ms"], 3);
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn failure_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::failure("TASK_NOT_FOUND", "task 4 not found")).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["errors"][0]["code"], "TASK_NOT_FOUND");
        assert_eq!(json["errors"][0]["message"], "task 4 not found");
        assert_eq!(json["meta"]["request_id"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn timed_ids_are_unique() {
        let start = Instant::now();
        let a = ApiResponse::timed("x", start);
        let b = ApiResponse::timed("x", start);
        assert_ne!(a.meta.request_id, b.meta.request_id);
    }
}
