use std::sync::Arc;

use probe_table_lib::{Lookup, OverflowPolicy};
use tokio::sync::Mutex;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

use crate::book::AttendanceBook;
use crate::query::{self, DynamicFilter, SortOrder};
use crate::record::RawRow;
use crate::report::ThresholdReport;
use crate::rpc::{
    record_list, AttendanceService, CheckedMsg, DynamicQuery, Empty, HashViewReply, IdQuery,
    IdSearchReply, NameQuery, NameSearchReply, ProbeStepMsg, RawRowMsg, RecordList, RecordMsg,
    ReportReply, SlotMsg, SortRequest, StatusReply, ThresholdRequest, UploadReply,
};

/// gRPC front of an `AttendanceBook`. Every call takes the one lock for
/// its whole duration, reads included.
#[derive(Debug, Clone)]
pub struct AttendanceServer {
    book: Arc<Mutex<AttendanceBook>>,
}

impl AttendanceServer {
    pub fn new(book: AttendanceBook) -> Self {
        Self {
            book: Arc::new(Mutex::new(book)),
        }
    }

    pub fn book(&self) -> Arc<Mutex<AttendanceBook>> {
        Arc::clone(&self.book)
    }
}

#[tonic::async_trait]
impl AttendanceService for AttendanceServer {
    async fn service_status(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<StatusReply>, Status> {
        let book = self.book.lock().await;
        let table = book.table();
        Ok(Response::new(StatusReply {
            capacity: table.capacity() as u64,
            occupied: table.len() as u64,
            load_factor: table.load_factor(),
            strict_capacity: table.policy() == OverflowPolicy::Strict,
        }))
    }

    async fn upload_rows(
        &self,
        request: Request<tonic::Streaming<RawRowMsg>>,
    ) -> Result<Response<UploadReply>, Status> {
        let mut stream = request.into_inner();
        let mut rows = Vec::new();
        while let Some(msg) = stream.message().await? {
            rows.push(RawRow::from(msg));
        }
        info!("Received upload of {} rows", rows.len());

        let mut book = self.book.lock().await;
        let outcome = book.ingest(rows)?;
        Ok(Response::new(UploadReply::from(outcome)))
    }

    async fn view_all(&self, _request: Request<Empty>) -> Result<Response<RecordList>, Status> {
        let book = self.book.lock().await;
        Ok(Response::new(record_list(book.table().snapshot())))
    }

    async fn hash_view(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<HashViewReply>, Status> {
        let book = self.book.lock().await;
        let slots = book
            .table()
            .raw_slots()
            .into_iter()
            .map(SlotMsg::from)
            .collect();
        Ok(Response::new(HashViewReply { slots }))
    }

    async fn search_by_id(
        &self,
        request: Request<IdQuery>,
    ) -> Result<Response<IdSearchReply>, Status> {
        let id = request.into_inner().id;
        let result = {
            let book = self.book.lock().await;
            query::search_by_id(book.table(), id)
        };
        debug!("search_by_id({}) visited {} slots", id, result.trace().len());

        let found = matches!(result, Lookup::Found { .. });
        let (record, trace) = result.into_parts();
        Ok(Response::new(IdSearchReply {
            found,
            trace: trace.into_iter().map(ProbeStepMsg::from).collect(),
            record: record.map(RecordMsg::from),
        }))
    }

    async fn search_by_name(
        &self,
        request: Request<NameQuery>,
    ) -> Result<Response<NameSearchReply>, Status> {
        let name = request.into_inner().name;
        let result = {
            let book = self.book.lock().await;
            query::search_by_name(book.table(), &name)
        };
        debug!("search_by_name({:?}) matched {}", name, result.matches.len());

        Ok(Response::new(NameSearchReply {
            found: !result.matches.is_empty(),
            trace: result.checked.into_iter().map(CheckedMsg::from).collect(),
            records: result.matches.into_iter().map(RecordMsg::from).collect(),
        }))
    }

    async fn dynamic_search(
        &self,
        request: Request<DynamicQuery>,
    ) -> Result<Response<RecordList>, Status> {
        let filter: DynamicFilter = request.into_inner().into();
        let book = self.book.lock().await;
        Ok(Response::new(record_list(query::dynamic_search(book.table(), &filter))))
    }

    async fn sort_by_percentage(
        &self,
        request: Request<SortRequest>,
    ) -> Result<Response<RecordList>, Status> {
        // Validated before the table is touched.
        let order: SortOrder = request.into_inner().order.parse()?;
        let book = self.book.lock().await;
        Ok(Response::new(record_list(query::sort_by_percentage(book.table(), order))))
    }

    async fn filter_above(
        &self,
        request: Request<ThresholdRequest>,
    ) -> Result<Response<RecordList>, Status> {
        let percent = request.into_inner().percent;
        let book = self.book.lock().await;
        Ok(Response::new(record_list(query::filter_above_threshold(book.table(), percent))))
    }

    async fn threshold_report(
        &self,
        request: Request<ThresholdRequest>,
    ) -> Result<Response<ReportReply>, Status> {
        let percent = request.into_inner().percent;
        let report = {
            let book = self.book.lock().await;
            ThresholdReport::build(book.table(), percent)
        };
        info!("Built report '{}' with {} rows", report.filename(), report.rows.len());

        Ok(Response::new(ReportReply {
            filename: report.filename(),
            content_type: "text/csv".to_string(),
            content: report.to_csv()?,
        }))
    }
}
