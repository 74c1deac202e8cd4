use tonic_build::manual::{Builder, Method, Service};

const PROST_CODEC: &str = "tonic::codec::ProstCodec";

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::rpc::{}", input))
        .output_type(format!("crate::rpc::{}", output))
        .codec_path(PROST_CODEC)
        .build()
}

fn main() {
    let upload = Method::builder()
        .name("upload_rows")
        .route_name("UploadRows")
        .input_type("crate::rpc::RawRowMsg")
        .output_type("crate::rpc::UploadReply")
        .codec_path(PROST_CODEC)
        .client_streaming()
        .build();

    let service = Service::builder()
        .name("AttendanceService")
        .package("attendance")
        .method(unary("service_status", "ServiceStatus", "Empty", "StatusReply"))
        .method(upload)
        .method(unary("view_all", "ViewAll", "Empty", "RecordList"))
        .method(unary("hash_view", "HashView", "Empty", "HashViewReply"))
        .method(unary("search_by_id", "SearchById", "IdQuery", "IdSearchReply"))
        .method(unary("search_by_name", "SearchByName", "NameQuery", "NameSearchReply"))
        .method(unary("dynamic_search", "DynamicSearch", "DynamicQuery", "RecordList"))
        .method(unary("sort_by_percentage", "SortByPercentage", "SortRequest", "RecordList"))
        .method(unary("filter_above", "FilterAbove", "ThresholdRequest", "RecordList"))
        .method(unary("threshold_report", "ThresholdReport", "ThresholdRequest", "ReportReply"))
        .build();

    Builder::new().compile(&[service]);
    println!("cargo:rerun-if-changed=build.rs");
}
