//! Wire types shared by the proxy, the client and the upload session.
//!
//! The webhook is opaque: its success body is kept as raw
//! [`serde_json::Value`] inside [`UploadEnvelope`] and only interpreted on
//! the client side by [`SubmissionResult::from_envelope`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success body of `POST /api/upload-document`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Some webhooks answer with a bare job id next to (not inside) `data`.
    #[serde(rename = "jobId", default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl UploadEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            job_id: None,
        }
    }
}

/// `{ "error": "..." }` body returned on every failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a successful submission resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SubmissionResult {
    /// The webhook finished synchronously; this is the document link.
    Link { web_view_link: String },
    /// The webhook accepted the file for asynchronous processing.
    Job { job_id: String },
}

impl SubmissionResult {
    /// Interpret a proxy success envelope.
    ///
    /// A `webViewLink` in `data` wins over any job id. Job ids are accepted
    /// from `data.jobId` or from a top-level `jobId`. Empty strings count as
    /// absent.
    pub fn from_envelope(envelope: &UploadEnvelope) -> Option<Self> {
        let data = envelope.data.as_ref();

        if let Some(link) = data.and_then(|d| non_empty_str(d, "webViewLink")) {
            return Some(SubmissionResult::Link {
                web_view_link: link.to_string(),
            });
        }

        data.and_then(|d| non_empty_str(d, "jobId"))
            .map(str::to_string)
            .or_else(|| envelope.job_id.clone().filter(|id| !id.is_empty()))
            .map(|job_id| SubmissionResult::Job { job_id })
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Status reported by `GET /api/check-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Completed,
    Failed,
    /// Anything that is not terminal, including unknown status strings.
    #[default]
    #[serde(other)]
    Pending,
}

/// Result payload attached to a completed status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultData {
    #[serde(rename = "webViewLink", default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

/// Body of `GET /api/check-status?jobId=<id>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: PollStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultData>,
}

impl StatusResponse {
    /// The result link, if this status carries a non-empty one.
    pub fn link(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.web_view_link.as_deref())
            .filter(|l| !l.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(v: Value) -> UploadEnvelope {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn link_in_data_is_a_sync_result() {
        let env = envelope(json!({ "success": true, "data": { "webViewLink": "X" } }));
        assert_eq!(
            SubmissionResult::from_envelope(&env),
            Some(SubmissionResult::Link {
                web_view_link: "X".into()
            })
        );
    }

    #[test]
    fn job_id_in_data_or_top_level() {
        let nested = envelope(json!({ "success": true, "data": { "jobId": "J" } }));
        let top = envelope(json!({ "jobId": "J" }));
        let expected = Some(SubmissionResult::Job {
            job_id: "J".into(),
        });
        assert_eq!(SubmissionResult::from_envelope(&nested), expected);
        assert_eq!(SubmissionResult::from_envelope(&top), expected);
    }

    #[test]
    fn link_wins_over_job_id() {
        let env = envelope(json!({ "data": { "webViewLink": "X", "jobId": "J" } }));
        assert!(matches!(
            SubmissionResult::from_envelope(&env),
            Some(SubmissionResult::Link { .. })
        ));
    }

    #[test]
    fn empty_or_unrelated_data_is_not_a_result() {
        assert_eq!(
            SubmissionResult::from_envelope(&envelope(json!({ "success": true, "data": {} }))),
            None
        );
        assert_eq!(
            SubmissionResult::from_envelope(&envelope(
                json!({ "success": true, "data": { "webViewLink": "" } })
            )),
            None
        );
        assert_eq!(
            SubmissionResult::from_envelope(&envelope(json!({ "success": true, "data": [1, 2] }))),
            None
        );
    }

    #[test]
    fn unknown_status_is_pending() {
        let s: StatusResponse = serde_json::from_value(json!({ "status": "queued" })).unwrap();
        assert_eq!(s.status, PollStatus::Pending);
        let missing: StatusResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.status, PollStatus::Pending);
    }

    #[test]
    fn completed_status_exposes_link() {
        let s: StatusResponse = serde_json::from_value(json!({
            "status": "completed",
            "data": { "webViewLink": "https://docs.example/d/1" }
        }))
        .unwrap();
        assert_eq!(s.status, PollStatus::Completed);
        assert_eq!(s.link(), Some("https://docs.example/d/1"));

        let no_link: StatusResponse =
            serde_json::from_value(json!({ "status": "completed", "data": {} })).unwrap();
        assert_eq!(no_link.link(), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let s = StatusResponse {
            status: PollStatus::Failed,
            data: None,
        };
        assert_eq!(serde_json::to_value(&s).unwrap(), json!({ "status": "failed" }));
    }
}
