use std::path::PathBuf;

use anyhow::Result;
use tonic::transport::Channel;
use tonic::Request;

use attendance::rpc::{
    AttendanceServiceClient, DynamicQuery, Empty, IdQuery, NameQuery, RecordMsg, SortRequest,
    ThresholdRequest,
};

async fn connect(addr: &str) -> Result<AttendanceServiceClient<Channel>> {
    Ok(AttendanceServiceClient::connect(format!("http://{}", addr)).await?)
}

fn print_records(records: &[RecordMsg]) {
    println!(
        "{:>8}  {:<30}  {:<20}  {:>6}  {:>6}  {:>7}  {:>5}",
        "ID", "Name", "Department", "Att.", "Days", "%", "Hash"
    );
    for r in records {
        println!(
            "{:>8}  {:<30}  {:<20}  {:>6}  {:>6}  {:>7.1}  {:>5}",
            r.id, r.name, r.department, r.attendance, r.total_days, r.attendance_percentage, r.hash_index
        );
    }
    println!("({} records)", records.len());
}

pub async fn view_all(addr: &str) -> Result<()> {
    let mut client = connect(addr).await?;
    let reply = client.view_all(Request::new(Empty {})).await?.into_inner();
    print_records(&reply.records);
    Ok(())
}

pub async fn hash_view(addr: &str) -> Result<()> {
    let mut client = connect(addr).await?;
    let status = client.service_status(Request::new(Empty {})).await?.into_inner();
    let reply = client.hash_view(Request::new(Empty {})).await?.into_inner();

    println!(
        "Table: {} of {} slots used ({:.2}% load{})",
        status.occupied,
        status.capacity,
        status.load_factor * 100.0,
        if status.strict_capacity { ", strict" } else { "" }
    );
    for slot in reply.slots {
        match slot.summary {
            Some(s) => println!("[{:>3}] id={} name={} pct={}", slot.index, s.id, s.name, s.attendance_percentage),
            None => println!("[{:>3}] -", slot.index),
        }
    }
    Ok(())
}

pub async fn find_id(addr: &str, id: i64) -> Result<()> {
    let mut client = connect(addr).await?;
    let reply = client.search_by_id(Request::new(IdQuery { id })).await?.into_inner();

    println!("Probe trace for id {}:", id);
    for step in &reply.trace {
        match &step.slot {
            Some(r) => println!("  slot {} -> id {} ({})", step.index, r.id, r.name),
            None => println!("  slot {} -> empty", step.index),
        }
    }
    match reply.record {
        Some(record) => print_records(&[record]),
        None => println!("Id {} not found", id),
    }
    Ok(())
}

pub async fn find_name(addr: &str, name: &str) -> Result<()> {
    let mut client = connect(addr).await?;
    let reply = client
        .search_by_name(Request::new(NameQuery { name: name.to_string() }))
        .await?
        .into_inner();

    println!("Checked {} records:", reply.trace.len());
    for checked in &reply.trace {
        println!("  id {} ({})", checked.id, checked.name);
    }
    if reply.found {
        print_records(&reply.records);
    } else {
        println!("No names contain '{}'", name);
    }
    Ok(())
}

pub async fn dynamic_search(
    addr: &str,
    id: Option<String>,
    name: Option<String>,
    department: Option<String>,
) -> Result<()> {
    let mut client = connect(addr).await?;
    let reply = client
        .dynamic_search(Request::new(DynamicQuery { id, name, department }))
        .await?
        .into_inner();
    print_records(&reply.records);
    Ok(())
}

pub async fn sort(addr: &str, order: &str) -> Result<()> {
    let mut client = connect(addr).await?;
    let reply = client
        .sort_by_percentage(Request::new(SortRequest { order: order.to_string() }))
        .await?
        .into_inner();
    print_records(&reply.records);
    Ok(())
}

pub async fn above(addr: &str, percent: f64) -> Result<()> {
    let mut client = connect(addr).await?;
    let reply = client
        .filter_above(Request::new(ThresholdRequest { percent }))
        .await?
        .into_inner();
    print_records(&reply.records);
    Ok(())
}

pub async fn report(addr: &str, percent: f64, out: Option<PathBuf>) -> Result<()> {
    let mut client = connect(addr).await?;
    let reply = client
        .threshold_report(Request::new(ThresholdRequest { percent }))
        .await?
        .into_inner();

    let path = out.unwrap_or_else(|| PathBuf::from(&reply.filename));
    tokio::fs::write(&path, &reply.content).await?;
    println!("Wrote {} ({} bytes) to {:?}", reply.content_type, reply.content.len(), path);
    Ok(())
}
