//! # Attendance Service Tests
//!
//! Runs the gRPC service in-process on an ephemeral port and drives it
//! through the generated client:
//! - Streaming upload with skipped rows
//! - Id lookup traces, name search, dynamic filters
//! - Sorting, threshold filtering and the CSV report
//! - Persistence across a restart

use std::net::SocketAddr;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};
use tonic::{Code, Request};

use attendance::config::ServiceConfig;
use attendance::rpc::{
    AttendanceServiceClient, AttendanceServiceServer, DynamicQuery, Empty, IdQuery, NameQuery,
    RawRowMsg, SortRequest, ThresholdRequest,
};
use attendance::server::AttendanceServer;
use attendance::AttendanceBook;

fn row(id: &str, name: &str, dept: &str, attendance: &str, total: &str) -> RawRowMsg {
    RawRowMsg {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        department: Some(dept.to_string()),
        attendance: Some(attendance.to_string()),
        total_days: Some(total.to_string()),
    }
}

fn config_in(dir: &TempDir, capacity: usize) -> ServiceConfig {
    ServiceConfig {
        table_capacity: capacity,
        db_path: dir.path().join("database.json"),
        ..ServiceConfig::default()
    }
}

async fn spawn_server(book: AttendanceBook) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = AttendanceServiceServer::new(AttendanceServer::new(book));
    tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> AttendanceServiceClient<Channel> {
    AttendanceServiceClient::connect(format!("http://{}", addr))
        .await
        .unwrap()
}

async fn upload(client: &mut AttendanceServiceClient<Channel>, rows: Vec<RawRowMsg>) -> u64 {
    client
        .upload_rows(Request::new(tokio_stream::iter(rows)))
        .await
        .unwrap()
        .into_inner()
        .count
}

#[tokio::test]
async fn test_upload_skips_bad_rows() {
    let dir = TempDir::new().unwrap();
    let book = AttendanceBook::open(&config_in(&dir, 5)).unwrap();
    let mut client = connect(spawn_server(book).await).await;

    let reply = client
        .upload_rows(Request::new(tokio_stream::iter(vec![
            row("2", "Ann", "CSE", "9", "10"),
            row("two", "Bad", "CSE", "1", "1"),
            row("7", " Bo ", "ECE", "3", "4"),
        ])))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(reply.count, 2);
    assert_eq!(reply.skipped.len(), 1);
    assert_eq!(reply.skipped[0].row, 1);
    assert_eq!(reply.records[1].name, "Bo");
    assert_eq!(reply.records[1].attendance_percentage, 75.0);
    assert_eq!(reply.records[1].hash_index, 2);
}

#[tokio::test]
async fn test_probe_trace_over_collisions() {
    let book = AttendanceBook::in_memory(5, Default::default()).unwrap();
    let mut client = connect(spawn_server(book).await).await;
    upload(
        &mut client,
        vec![
            row("2", "A", "X", "0", "0"),
            row("7", "B", "X", "0", "0"),
            row("12", "C", "X", "0", "0"),
        ],
    )
    .await;

    let found = client
        .search_by_id(Request::new(IdQuery { id: 12 }))
        .await
        .unwrap()
        .into_inner();
    assert!(found.found);
    let visited: Vec<u64> = found.trace.iter().map(|s| s.index).collect();
    assert_eq!(visited, vec![2, 3, 4]);
    assert_eq!(found.record.unwrap().name, "C");

    let missing = client
        .search_by_id(Request::new(IdQuery { id: 17 }))
        .await
        .unwrap()
        .into_inner();
    assert!(!missing.found);
    assert!(missing.record.is_none());
    assert_eq!(missing.trace.len(), 4);
    assert!(missing.trace[3].slot.is_none());

    let layout = client.hash_view(Request::new(Empty {})).await.unwrap().into_inner();
    assert_eq!(layout.slots.len(), 5);
    assert!(layout.slots[0].summary.is_none());
    assert_eq!(layout.slots[3].summary.as_ref().map(|s| s.id), Some(7));
}

#[tokio::test]
async fn test_queries_over_snapshot() {
    let book = AttendanceBook::in_memory(20, Default::default()).unwrap();
    let mut client = connect(spawn_server(book).await).await;
    upload(
        &mut client,
        vec![
            row("1", "Go Lin", "CSE", "1", "2"),
            row("2", "Ann", "CSE", "5", "10"),
            row("3", "Gordon", "ECE", "3", "10"),
        ],
    )
    .await;

    let by_name = client
        .search_by_name(Request::new(NameQuery { name: "go".to_string() }))
        .await
        .unwrap()
        .into_inner();
    assert!(by_name.found);
    assert_eq!(by_name.trace.len(), 3);
    assert_eq!(by_name.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);

    let filtered = client
        .dynamic_search(Request::new(DynamicQuery {
            id: None,
            name: Some("go".to_string()),
            department: Some("cse".to_string()),
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(filtered.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);

    let sorted = client
        .sort_by_percentage(Request::new(SortRequest { order: "asc".to_string() }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(sorted.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 1, 2]);

    let above = client
        .filter_above(Request::new(ThresholdRequest { percent: 50.0 }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(above.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

    let report = client
        .threshold_report(Request::new(ThresholdRequest { percent: 50.0 }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(report.filename, "employees_50_percent.csv");
    let text = String::from_utf8(report.content).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[tokio::test]
async fn test_invalid_sort_order_is_rejected() {
    let book = AttendanceBook::in_memory(5, Default::default()).unwrap();
    let mut client = connect(spawn_server(book).await).await;

    let err = client
        .sort_by_percentage(Request::new(SortRequest { order: "sideways".to_string() }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, 5);

    {
        let book = AttendanceBook::open(&config).unwrap();
        let mut client = connect(spawn_server(book).await).await;
        upload(
            &mut client,
            vec![row("2", "A", "X", "1", "1"), row("7", "B", "X", "1", "2")],
        )
        .await;
        upload(&mut client, vec![row("7", "B2", "X", "2", "2")]).await;
    }

    let book = AttendanceBook::open(&config).unwrap();
    let mut client = connect(spawn_server(book).await).await;
    let all = client.view_all(Request::new(Empty {})).await.unwrap().into_inner();
    assert_eq!(all.records.len(), 2);
    assert_eq!(all.records[1].name, "B2");
    assert_eq!(all.records[1].attendance_percentage, 100.0);

    let status = client.service_status(Request::new(Empty {})).await.unwrap().into_inner();
    assert_eq!(status.capacity, 5);
    assert_eq!(status.occupied, 2);
}
