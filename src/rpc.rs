//! Wire messages for the `attendance.AttendanceService` gRPC service and
//! conversions to and from the core types. The client and server stubs are
//! generated by `build.rs`.

use probe_table_lib::{ProbeStep, RawSlot};

use crate::processor::BatchOutcome;
use crate::query::{CheckedEntry, DynamicFilter};
use crate::record::{FieldValue, RawRow, Record, SlotSummary};

include!(concat!(env!("OUT_DIR"), "/attendance.AttendanceService.rs"));

pub use attendance_service_client::AttendanceServiceClient;
pub use attendance_service_server::{AttendanceService, AttendanceServiceServer};

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StatusReply {
    #[prost(uint64, tag = "1")]
    pub capacity: u64,
    #[prost(uint64, tag = "2")]
    pub occupied: u64,
    #[prost(double, tag = "3")]
    pub load_factor: f64,
    #[prost(bool, tag = "4")]
    pub strict_capacity: bool,
}

/// One uploaded row. Every field travels as optional text and is parsed
/// server side.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RawRowMsg {
    #[prost(string, optional, tag = "1")]
    pub id: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub department: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub attendance: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub total_days: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RecordMsg {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub department: String,
    #[prost(uint32, tag = "4")]
    pub attendance: u32,
    #[prost(uint32, tag = "5")]
    pub total_days: u32,
    #[prost(double, tag = "6")]
    pub attendance_percentage: f64,
    #[prost(uint64, tag = "7")]
    pub hash_index: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RowSkipMsg {
    #[prost(uint64, tag = "1")]
    pub row: u64,
    #[prost(string, tag = "2")]
    pub reason: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UploadReply {
    #[prost(uint64, tag = "1")]
    pub count: u64,
    #[prost(message, repeated, tag = "2")]
    pub records: Vec<RecordMsg>,
    #[prost(message, repeated, tag = "3")]
    pub skipped: Vec<RowSkipMsg>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RecordList {
    #[prost(message, repeated, tag = "1")]
    pub records: Vec<RecordMsg>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SlotSummaryMsg {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(double, tag = "3")]
    pub attendance_percentage: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SlotMsg {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(message, optional, tag = "2")]
    pub summary: Option<SlotSummaryMsg>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HashViewReply {
    #[prost(message, repeated, tag = "1")]
    pub slots: Vec<SlotMsg>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct IdQuery {
    #[prost(int64, tag = "1")]
    pub id: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProbeStepMsg {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(message, optional, tag = "2")]
    pub slot: Option<RecordMsg>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct IdSearchReply {
    #[prost(bool, tag = "1")]
    pub found: bool,
    #[prost(message, repeated, tag = "2")]
    pub trace: Vec<ProbeStepMsg>,
    #[prost(message, optional, tag = "3")]
    pub record: Option<RecordMsg>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct NameQuery {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CheckedMsg {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct NameSearchReply {
    #[prost(bool, tag = "1")]
    pub found: bool,
    #[prost(message, repeated, tag = "2")]
    pub trace: Vec<CheckedMsg>,
    #[prost(message, repeated, tag = "3")]
    pub records: Vec<RecordMsg>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DynamicQuery {
    #[prost(string, optional, tag = "1")]
    pub id: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub department: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SortRequest {
    #[prost(string, tag = "1")]
    pub order: String,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct ThresholdRequest {
    #[prost(double, tag = "1")]
    pub percent: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ReportReply {
    #[prost(string, tag = "1")]
    pub filename: String,
    #[prost(string, tag = "2")]
    pub content_type: String,
    #[prost(bytes = "vec", tag = "3")]
    pub content: Vec<u8>,
}

// --- Conversions ---

impl From<Record> for RecordMsg {
    fn from(r: Record) -> Self {
        RecordMsg {
            id: r.id,
            name: r.name,
            department: r.department,
            attendance: r.attendance,
            total_days: r.total_days,
            attendance_percentage: r.attendance_percentage,
            hash_index: r.hash_index as u64,
        }
    }
}

impl From<RecordMsg> for Record {
    fn from(m: RecordMsg) -> Self {
        Record {
            id: m.id,
            name: m.name,
            department: m.department,
            attendance: m.attendance,
            total_days: m.total_days,
            attendance_percentage: m.attendance_percentage,
            hash_index: m.hash_index as usize,
        }
    }
}

pub fn record_list(records: Vec<Record>) -> RecordList {
    RecordList {
        records: records.into_iter().map(RecordMsg::from).collect(),
    }
}

impl From<RawRowMsg> for RawRow {
    fn from(m: RawRowMsg) -> Self {
        RawRow {
            id: m.id.map(FieldValue::Text),
            name: m.name.map(FieldValue::Text),
            department: m.department.map(FieldValue::Text),
            attendance: m.attendance.map(FieldValue::Text),
            total_days: m.total_days.map(FieldValue::Text),
        }
    }
}

impl From<&RawRow> for RawRowMsg {
    fn from(row: &RawRow) -> Self {
        let text = |v: &Option<FieldValue>| match v {
            None | Some(FieldValue::Null) => None,
            Some(other) => Some(other.as_text()),
        };
        // Integer columns travel as their integer view so the server parses
        // them exactly as a local upload would.
        let integer = |v: &Option<FieldValue>| match v {
            None | Some(FieldValue::Null) => None,
            Some(other) => Some(
                other
                    .as_integer()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| other.as_text()),
            ),
        };
        RawRowMsg {
            id: integer(&row.id),
            name: text(&row.name),
            department: text(&row.department),
            attendance: integer(&row.attendance),
            total_days: integer(&row.total_days),
        }
    }
}

impl From<BatchOutcome> for UploadReply {
    fn from(outcome: BatchOutcome) -> Self {
        UploadReply {
            count: outcome.processed.len() as u64,
            records: outcome.processed.into_iter().map(RecordMsg::from).collect(),
            skipped: outcome
                .skipped
                .into_iter()
                .map(|s| RowSkipMsg {
                    row: s.row as u64,
                    reason: s.reason.to_string(),
                })
                .collect(),
        }
    }
}

impl From<RawSlot<SlotSummary>> for SlotMsg {
    fn from(slot: RawSlot<SlotSummary>) -> Self {
        SlotMsg {
            index: slot.index as u64,
            summary: slot.summary.map(|s| SlotSummaryMsg {
                id: s.id,
                name: s.name,
                attendance_percentage: s.attendance_percentage,
            }),
        }
    }
}

impl From<ProbeStep<Record>> for ProbeStepMsg {
    fn from(step: ProbeStep<Record>) -> Self {
        ProbeStepMsg {
            index: step.index as u64,
            slot: step.slot.map(RecordMsg::from),
        }
    }
}

impl From<CheckedEntry> for CheckedMsg {
    fn from(entry: CheckedEntry) -> Self {
        CheckedMsg {
            id: entry.id,
            name: entry.name,
        }
    }
}

impl From<DynamicQuery> for DynamicFilter {
    fn from(q: DynamicQuery) -> Self {
        DynamicFilter {
            id: q.id,
            name: q.name,
            department: q.department,
        }
    }
}
