//! The single seam between range objects and the remote spreadsheet service.
//!
//! Authentication, transport, and retry all live behind [`RemoteGateway`]; range
//! types only build requests and interpret replies.

use serde::Serialize;
use serde_json::Value as JsonValue;
use sheetlink_common::{CellValue, GatewayError};

use crate::options::{DateTimeRenderOption, MajorDimension, ValueInputOption, ValueRenderOption};
use crate::wire::{GridRange, NamedRangeData, ProtectedRangeData, ValueRange};

/// One entry of a batch-update call, serialized as `{ "<requestName>": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    AddNamedRange {
        named_range: NamedRangeData,
    },
    UpdateNamedRange {
        named_range: NamedRangeData,
        fields: String,
    },
    DeleteNamedRange {
        named_range_id: String,
    },
    AddProtectedRange {
        protected_range: ProtectedRangeData,
    },
    UpdateProtectedRange {
        protected_range: ProtectedRangeData,
        fields: String,
    },
    DeleteProtectedRange {
        protected_range_id: i64,
    },
    RepeatCell {
        range: GridRange,
        cell: JsonValue,
        fields: String,
    },
}

impl Request {
    /// Envelope key, as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Request::AddNamedRange { .. } => "addNamedRange",
            Request::UpdateNamedRange { .. } => "updateNamedRange",
            Request::DeleteNamedRange { .. } => "deleteNamedRange",
            Request::AddProtectedRange { .. } => "addProtectedRange",
            Request::UpdateProtectedRange { .. } => "updateProtectedRange",
            Request::DeleteProtectedRange { .. } => "deleteProtectedRange",
            Request::RepeatCell { .. } => "repeatCell",
        }
    }
}

/// Remote spreadsheet service.
///
/// Each call is one blocking round trip that either fully succeeds or fails;
/// implementations own timeouts, cancellation, and retries.
pub trait RemoteGateway {
    /// Apply `requests` to a spreadsheet. Returns the raw batch reply
    /// (`{"replies": [...]}`), one reply per request in order.
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[Request],
    ) -> Result<JsonValue, GatewayError>;

    /// Read the value matrix of an A1 range (`Sheet1!A1:B7`).
    fn values_get(
        &self,
        spreadsheet_id: &str,
        range: &str,
        major_dimension: MajorDimension,
        value_render_option: ValueRenderOption,
        date_time_render_option: DateTimeRenderOption,
    ) -> Result<Vec<Vec<CellValue>>, GatewayError>;

    /// Overwrite the values of an A1 range.
    fn values_update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: &ValueRange,
        value_input_option: ValueInputOption,
        include_values_in_response: bool,
    ) -> Result<JsonValue, GatewayError>;
}

impl<G: RemoteGateway + ?Sized> RemoteGateway for &G {
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[Request],
    ) -> Result<JsonValue, GatewayError> {
        (**self).batch_update(spreadsheet_id, requests)
    }

    fn values_get(
        &self,
        spreadsheet_id: &str,
        range: &str,
        major_dimension: MajorDimension,
        value_render_option: ValueRenderOption,
        date_time_render_option: DateTimeRenderOption,
    ) -> Result<Vec<Vec<CellValue>>, GatewayError> {
        (**self).values_get(
            spreadsheet_id,
            range,
            major_dimension,
            value_render_option,
            date_time_render_option,
        )
    }

    fn values_update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: &ValueRange,
        value_input_option: ValueInputOption,
        include_values_in_response: bool,
    ) -> Result<JsonValue, GatewayError> {
        (**self).values_update(
            spreadsheet_id,
            range,
            body,
            value_input_option,
            include_values_in_response,
        )
    }
}

/// Send a single request and return its reply.
pub(crate) fn send_one<G: RemoteGateway + ?Sized>(
    gateway: &G,
    spreadsheet_id: &str,
    request: Request,
) -> Result<JsonValue, GatewayError> {
    #[cfg(feature = "tracing")]
    tracing::debug!(spreadsheet_id, request = request.name(), "batch_update");

    let response = gateway.batch_update(spreadsheet_id, std::slice::from_ref(&request))?;

    #[cfg(feature = "tracing")]
    tracing::trace!(spreadsheet_id, request = request.name(), ?response, "batch_update reply");

    Ok(response)
}

/// Pull `replies[0].<pointer>` out of a batch reply.
pub(crate) fn first_reply<'a>(
    response: &'a JsonValue,
    pointer: &str,
) -> Result<&'a JsonValue, GatewayError> {
    response
        .pointer(&format!("/replies/0{pointer}"))
        .ok_or_else(|| GatewayError::MalformedResponse(format!("missing replies[0]{pointer}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_use_named_envelopes() {
        let req = Request::DeleteNamedRange {
            named_range_id: "abc".into(),
        };
        assert_eq!(req.name(), "deleteNamedRange");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"deleteNamedRange": {"namedRangeId": "abc"}})
        );

        let req = Request::DeleteProtectedRange {
            protected_range_id: 9,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"deleteProtectedRange": {"protectedRangeId": 9}})
        );
    }

    #[test]
    fn repeat_cell_envelope() {
        let req = Request::RepeatCell {
            range: GridRange::unbounded(1),
            cell: json!({"userEnteredFormat": {"textFormat": {"bold": true}}}),
            fields: "userEnteredFormat".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"repeatCell": {
                "range": {"sheetId": 1},
                "cell": {"userEnteredFormat": {"textFormat": {"bold": true}}},
                "fields": "userEnteredFormat"
            }})
        );
    }

    #[test]
    fn first_reply_reports_missing_paths() {
        let reply = json!({"replies": [{"addNamedRange": {"namedRange": {"namedRangeId": "x"}}}]});
        assert_eq!(
            first_reply(&reply, "/addNamedRange/namedRange/namedRangeId").unwrap(),
            &json!("x")
        );
        let err = first_reply(&json!({"replies": []}), "/addNamedRange").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }
}
