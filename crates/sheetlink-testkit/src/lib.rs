//! Test doubles for code that talks to a [`RemoteGateway`].
//!
//! [`RecordingGateway`] keeps every call it receives and answers from scripted
//! replies. Unscripted batch calls get a plausible reply: adds are assigned
//! sequential ids (`nr-1`, `nr-2`, ... for named ranges; 1, 2, ... for
//! protected ranges) and everything else answers `{}`.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::{Value as JsonValue, json};
use sheetlink::{
    CellValue, DateTimeRenderOption, GatewayError, MajorDimension, Matrix, RemoteGateway,
    Request, SheetRef, ValueInputOption, ValueRange, ValueRenderOption,
};

pub const SPREADSHEET_ID: &str = "spreadsheet-1";

/// One call received by a [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BatchUpdate {
        spreadsheet_id: String,
        requests: Vec<Request>,
    },
    ValuesGet {
        spreadsheet_id: String,
        range: String,
        major_dimension: MajorDimension,
        value_render_option: ValueRenderOption,
        date_time_render_option: DateTimeRenderOption,
    },
    ValuesUpdate {
        spreadsheet_id: String,
        range: String,
        body: ValueRange,
        value_input_option: ValueInputOption,
        include_values_in_response: bool,
    },
}

#[derive(Default)]
struct Script {
    batch: VecDeque<Result<JsonValue, GatewayError>>,
    values_get: VecDeque<Result<Matrix, GatewayError>>,
    values_update: VecDeque<Result<JsonValue, GatewayError>>,
    next_named_id: u64,
    next_protected_id: i64,
}

#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<Call>>,
    script: Mutex<Script>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next batch call with `reply`.
    pub fn push_batch_reply(&self, reply: JsonValue) {
        self.script.lock().batch.push_back(Ok(reply));
    }

    pub fn fail_next_batch(&self, err: GatewayError) {
        self.script.lock().batch.push_back(Err(err));
    }

    /// Answer the next values read with `values`.
    pub fn push_values(&self, values: Matrix) {
        self.script.lock().values_get.push_back(Ok(values));
    }

    pub fn fail_next_values_get(&self, err: GatewayError) {
        self.script.lock().values_get.push_back(Err(err));
    }

    pub fn fail_next_values_update(&self, err: GatewayError) {
        self.script.lock().values_update.push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Every batch request received, flattened in order.
    pub fn requests(&self) -> Vec<Request> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::BatchUpdate { requests, .. } => Some(requests.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn request_names(&self) -> Vec<&'static str> {
        self.requests().iter().map(Request::name).collect()
    }

    /// The most recent batch request, as it would go over the wire.
    pub fn last_request_json(&self) -> Option<JsonValue> {
        self.requests()
            .last()
            .and_then(|request| serde_json::to_value(request).ok())
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn auto_reply(&self, requests: &[Request]) -> JsonValue {
        let mut script = self.script.lock();
        let replies: Vec<JsonValue> = requests
            .iter()
            .map(|request| match request {
                Request::AddNamedRange { named_range } => {
                    script.next_named_id += 1;
                    let mut named_range = serde_json::to_value(named_range).unwrap_or_default();
                    named_range["namedRangeId"] = json!(format!("nr-{}", script.next_named_id));
                    json!({"addNamedRange": {"namedRange": named_range}})
                }
                Request::AddProtectedRange { protected_range } => {
                    script.next_protected_id += 1;
                    let mut protected_range =
                        serde_json::to_value(protected_range).unwrap_or_default();
                    protected_range["protectedRangeId"] = json!(script.next_protected_id);
                    json!({"addProtectedRange": {"protectedRange": protected_range}})
                }
                _ => json!({}),
            })
            .collect();
        json!({ "spreadsheetId": SPREADSHEET_ID, "replies": replies })
    }
}

impl RemoteGateway for RecordingGateway {
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[Request],
    ) -> Result<JsonValue, GatewayError> {
        self.calls.lock().push(Call::BatchUpdate {
            spreadsheet_id: spreadsheet_id.to_string(),
            requests: requests.to_vec(),
        });
        let scripted = self.script.lock().batch.pop_front();
        match scripted {
            Some(reply) => reply,
            None => Ok(self.auto_reply(requests)),
        }
    }

    fn values_get(
        &self,
        spreadsheet_id: &str,
        range: &str,
        major_dimension: MajorDimension,
        value_render_option: ValueRenderOption,
        date_time_render_option: DateTimeRenderOption,
    ) -> Result<Matrix, GatewayError> {
        self.calls.lock().push(Call::ValuesGet {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            major_dimension,
            value_render_option,
            date_time_render_option,
        });
        self.script
            .lock()
            .values_get
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn values_update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: &ValueRange,
        value_input_option: ValueInputOption,
        include_values_in_response: bool,
    ) -> Result<JsonValue, GatewayError> {
        self.calls.lock().push(Call::ValuesUpdate {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            body: body.clone(),
            value_input_option,
            include_values_in_response,
        });
        let scripted = self.script.lock().values_update.pop_front();
        scripted.unwrap_or_else(|| {
            let cells: usize = body.values.iter().map(Vec::len).sum();
            Ok(json!({
                "spreadsheetId": spreadsheet_id,
                "updatedRange": range,
                "updatedCells": cells,
            }))
        })
    }
}

/// A sheet on [`SPREADSHEET_ID`].
pub fn sheet(sheet_id: i64, title: &str) -> SheetRef {
    SheetRef::new(SPREADSHEET_ID, sheet_id, title)
}

/// Build a row-major matrix from literals.
pub fn matrix<T, R>(rows: impl IntoIterator<Item = R>) -> Matrix
where
    R: IntoIterator<Item = T>,
    T: Into<CellValue>,
{
    rows.into_iter()
        .map(|row| row.into_iter().map(Into::into).collect())
        .collect()
}
