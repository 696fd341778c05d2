//! End-to-end tests: log file on disk through parsing, aggregation and rendering

use logpulse::config::OutputFormat;
use logpulse::output::write_results;
use logpulse::parser::LogParser;
use logpulse::stats::MetricKind;
use logpulse::{analyze, AggregatedBucket, ParseStats};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_log(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", lines.join("\n")).unwrap();
    file.flush().unwrap();
    file
}

fn run(lines: &[&str], period: Duration) -> (Vec<AggregatedBucket>, ParseStats) {
    let file = write_log(lines);
    let reader = LogParser::open(file.path()).unwrap();
    analyze(reader, period).unwrap()
}

fn render(format: OutputFormat, buckets: &[AggregatedBucket]) -> String {
    let mut buf = Vec::new();
    write_results(format, buckets, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

const POSTGRES_1: &str = r#"{"timestamp":1446249499322,"stream":{"upstreams":{"postgresql_backends":{"peers":[{"server":"10.0.0.2:15432","connect_time":1,"first_byte_time":2,"response_time":2},{"server":"10.0.0.2:15433","connect_time":1,"first_byte_time":5,"response_time":5}]}}}}"#;
const POSTGRES_2: &str = r#"{"timestamp":1446249504427,"stream":{"upstreams":{"postgresql_backends":{"peers":[{"server":"10.0.0.2:15432","connect_time":1,"first_byte_time":2,"response_time":2},{"server":"10.0.0.2:15434","connect_time":1,"first_byte_time":21,"response_time":21}]}}}}"#;

#[test]
fn test_grouped_pipeline() {
    let (buckets, stats) = run(&[POSTGRES_1, POSTGRES_2], Duration::from_secs(300));

    assert_eq!(stats.parsed, 2);
    assert_eq!(buckets.len(), 1);

    let pool = &buckets[0].pool_stats["postgresql_backends"];
    assert_eq!(pool.get(MetricKind::ConnectTime).unwrap().count, 4);
    assert_eq!(pool.get(MetricKind::FirstByteTime).unwrap().max, 21);
    assert!(pool.get(MetricKind::ResponseTime).is_some());

    let output = render(OutputFormat::Grouped, &buckets);
    assert!(output.contains("NGINX Plus Upstream Timing Analysis"));
    assert!(output.contains("Upstream Pool: postgresql_backends"));
    assert!(output.contains("Connect Time:"));
    assert!(output.contains("First Byte Time:"));
    assert!(output.contains("Response Time:"));
}

#[test]
fn test_csv_pipeline() {
    let line = r#"{"timestamp":1446249499322,"stream":{"upstreams":{"test_pool":{"peers":[{"server":"server1:8080","connect_time":5,"response_time":10}]}}}}"#;
    let (buckets, _) = run(&[line], Duration::from_secs(600));

    let output = render(OutputFormat::Csv, &buckets);
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("pool_name,bucket_start,bucket_end,metric_type"));
    assert!(lines[1].starts_with("test_pool,2015-10-30T23:50:00Z,2015-10-31T00:00:00Z,connect_time,5,5"));
    assert!(lines[2].contains(",response_time,10,10,"));
}

#[test]
fn test_multiple_pools_and_buckets() {
    let a = r#"{"timestamp":1446249499322,"stream":{"upstreams":{"pool_a":{"peers":[{"server":"server1","connect_time":1}]}}}}"#;
    let b = r#"{"timestamp":1446249799322,"stream":{"upstreams":{"pool_b":{"peers":[{"server":"server2","connect_time":2}]}}}}"#;
    let (buckets, _) = run(&[a, b], Duration::from_secs(300));

    assert_eq!(buckets.len(), 2);
    assert!(buckets[0].pool_stats.contains_key("pool_a"));
    assert!(buckets[1].pool_stats.contains_key("pool_b"));

    let output = render(OutputFormat::Grouped, &buckets);
    assert!(output.contains("pool_a"));
    assert!(output.contains("pool_b"));
}

#[test]
fn test_parse_errors_are_counted_not_fatal() {
    let lines = [
        r#"{"timestamp":1446249499322,"stream":{"upstreams":{"valid_pool":{"peers":[{"server":"server1","connect_time":1}]}}}}"#,
        "invalid json line",
        r#"{"stream":{"upstreams":{"invalid_pool":{"peers":[{"server":"server2","connect_time":2}]}}}}"#,
        "",
        r#"{"timestamp":1446249500000,"stream":{"upstreams":{"valid_pool":{"peers":[{"server":"server3","response_time":5}]}}}}"#,
    ];
    let (buckets, stats) = run(&lines, Duration::from_secs(300));

    assert_eq!(stats.parsed, 2);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(buckets.len(), 1);
    assert!(!buckets[0].pool_stats.contains_key("invalid_pool"));
    assert!(render(OutputFormat::Grouped, &buckets).contains("valid_pool"));
}

#[test]
fn test_invalid_utf8_line_does_not_abort_run() {
    let valid_a = r#"{"timestamp":1000,"stream":{"upstreams":{"api":{"peers":[{"response_time":2}]}}}}"#;
    let valid_b = r#"{"timestamp":2000,"stream":{"upstreams":{"api":{"peers":[{"response_time":4}]}}}}"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(valid_a.as_bytes()).unwrap();
    file.write_all(b"\n{\"timestamp\":1500,\"request\":\"/caf\xe9\"}\n").unwrap();
    file.write_all(valid_b.as_bytes()).unwrap();
    file.flush().unwrap();

    let reader = LogParser::open(file.path()).unwrap();
    let (buckets, stats) = analyze(reader, Duration::from_secs(5)).unwrap();

    assert_eq!(stats.parsed, 2);
    assert_eq!(stats.errors, 1);
    let rt = buckets[0].pool_stats["api"]
        .get(MetricKind::ResponseTime)
        .copied()
        .unwrap();
    assert_eq!((rt.min, rt.max, rt.count), (2, 4, 2));
}

#[test]
fn test_no_upstream_data() {
    let lines = [
        r#"{"timestamp":1446249499322,"other_data":{"key":"value"}}"#,
        r#"{"timestamp":1446249500000,"stream":{"upstreams":{}}}"#,
    ];
    let (buckets, stats) = run(&lines, Duration::from_secs(300));

    assert_eq!(stats.parsed, 0);
    assert_eq!(stats.skipped, 2);
    assert!(buckets.is_empty());
    assert!(render(OutputFormat::Grouped, &buckets).contains("No upstream timing data found"));
}

#[test]
fn test_fractional_response_times_round_half_even() {
    let lines: Vec<String> = [2.4, 2.5, 3.5, 4.5, 5.5, 6.0]
        .iter()
        .enumerate()
        .map(|(i, rt)| {
            format!(
                r#"{{"timestamp":{},"stream":{{"upstreams":{{"api-backend":{{"peers":[{{"server":"s1","response_time":{}}}]}}}}}}}}"#,
                1446249495000i64 + i as i64 * 100,
                rt
            )
        })
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let (buckets, stats) = run(&refs, Duration::from_secs(5));

    // 2.4 -> 2, 2.5 -> 2, 3.5 -> 4, 4.5 -> 4, 5.5 -> 6, 6.0 -> 6
    assert_eq!(stats.parsed, 6);
    let rt = buckets[0].pool_stats["api-backend"]
        .get(MetricKind::ResponseTime)
        .copied()
        .unwrap();
    assert_eq!((rt.min, rt.max, rt.count), (2, 6, 6));
    assert_eq!(rt.mean, 4.0);
}

#[test]
fn test_json_pipeline() {
    let (buckets, _) = run(&[POSTGRES_1], Duration::from_secs(300));
    let output = render(OutputFormat::Json, &buckets);

    let doc: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(doc[0]["bucket_start_ms"], 1446249300000i64);
    assert_eq!(doc[0]["pools"]["postgresql_backends"]["connect_time"]["count"], 2);
}

#[test]
fn test_missing_log_file() {
    let err = LogParser::open(std::path::Path::new("/nonexistent/access.log")).unwrap_err();
    assert!(err.to_string().contains("Log file not found"));
}
