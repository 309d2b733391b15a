//! Workflow tests for the CLI commands.
//!
//! Drives [`App`] against a wiremock MobSF and inspects both the files it
//! writes and the text it prints.

use std::path::Path;

use clap::Parser;
use mobsf_cli::cli::{Cli, Command};
use mobsf_cli::{App, AppError, MobsfClient, OutputFormat, Thresholds};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HASH: &str = "3a552566097a8de588b8184b059b0158";

fn scan_json(cvss: f64, security: u32, trackers: u32) -> serde_json::Value {
    serde_json::json!({
        "title": "Static Analysis",
        "version": "v4.0.0",
        "file_name": "diva.apk",
        "app_name": "DivaApplication",
        "app_type": "apk",
        "package_name": "jakhar.aseem.diva",
        "size": "1MB",
        "md5": HASH,
        "sha1": "82ab8b2193b3cfb1c737e3a786be363a",
        "sha256": "5cefc51fce9bd760b92ab2340477f4dda84b4ae0c5d04a8c9493e4fe34fab7c5",
        "average_cvss": cvss,
        "security_score": security,
        "trackers": { "detected_trackers": trackers, "total_trackers": 407 },
    })
}

/// Mount upload, scan and both report endpoints.
async fn mount_mobsf(server: &MockServer, cvss: f64, security: u32, trackers: u32) {
    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "analyzer": "static_analyzer",
            "status": "success",
            "hash": HASH,
            "scan_type": "apk",
            "file_name": "diva.apk",
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/scan"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(scan_json(cvss, security, trackers)),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/download_pdf"))
        .and(body_string_contains(format!("hash={HASH}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 report".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/report_json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"md5":"3a55"}"#))
        .mount(server)
        .await;
}

fn write_apk(dir: &Path) -> std::path::PathBuf {
    let apk = dir.join("diva.apk");
    std::fs::write(&apk, b"PK fake apk").unwrap();
    apk
}

fn output_of(app: App<MobsfClient, Vec<u8>>) -> String {
    String::from_utf8(app.into_output()).unwrap()
}

#[tokio::test]
async fn test_ci_passes_within_thresholds() {
    let mock_server = MockServer::start().await;
    mount_mobsf(&mock_server, 3.5, 75, 0).await;

    let dir = tempfile::tempdir().unwrap();
    let apk = write_apk(dir.path());
    let reports = dir.path().join("reports");
    std::fs::create_dir(&reports).unwrap();

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let mut app = App::new(client, Vec::new());

    let scan = app
        .ci(&apk, false, &reports, &Thresholds::default())
        .await
        .unwrap();
    assert_eq!(scan.security_score, 75);

    assert_eq!(
        std::fs::read(reports.join("report_diva.apk.pdf")).unwrap(),
        b"%PDF-1.4 report"
    );
    assert_eq!(
        std::fs::read_to_string(reports.join("report_diva.apk.json")).unwrap(),
        r#"{"md5":"3a55"}"#
    );

    let output = output_of(app);
    assert!(output.contains("CVSS score: 3.5/3.9. OK"));
    assert!(output.contains("Security score: 75/71. OK"));
    assert!(output.contains("Trackers score: 0/0. OK"));
}

#[tokio::test]
async fn test_ci_fails_on_security_but_keeps_reports() {
    let mock_server = MockServer::start().await;
    mount_mobsf(&mock_server, 3.5, 75, 0).await;

    let dir = tempfile::tempdir().unwrap();
    let apk = write_apk(dir.path());

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let mut app = App::new(client, Vec::new());
    let thresholds = Thresholds {
        min_security: 80,
        ..Thresholds::default()
    };

    let err = app
        .ci(&apk, false, dir.path(), &thresholds)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Threshold(_)));
    let message = err.to_string();
    assert!(message.contains("75"));
    assert!(message.contains("80"));

    assert!(dir.path().join("report_diva.apk.pdf").exists());
    assert!(dir.path().join("report_diva.apk.json").exists());
}

#[tokio::test]
async fn test_ci_fails_on_trackers() {
    let mock_server = MockServer::start().await;
    mount_mobsf(&mock_server, 1.0, 90, 3).await;

    let dir = tempfile::tempdir().unwrap();
    let apk = write_apk(dir.path());

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let mut app = App::new(client, Vec::new());

    let err = app
        .ci(&apk, false, dir.path(), &Thresholds::default())
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Trackers score [3] is too high"));
}

#[tokio::test]
async fn test_ci_stops_before_reports_when_upload_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let mut app = App::new(client, Vec::new());

    let err = app
        .ci(
            &dir.path().join("missing.apk"),
            false,
            dir.path(),
            &Thresholds::default(),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("IoError: File not found"));
    assert!(!dir.path().join("report_missing.apk.pdf").exists());
}

#[tokio::test]
async fn test_upload_command_prints_scan_hint() {
    let mock_server = MockServer::start().await;
    mount_mobsf(&mock_server, 3.5, 75, 0).await;

    let dir = tempfile::tempdir().unwrap();
    let apk = write_apk(dir.path());

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let mut app = App::new(client, Vec::new());
    app.execute(Command::Upload { file_path: apk }).await.unwrap();

    let output = output_of(app);
    assert!(output.contains("Analyzer:"));
    assert!(output.contains(&format!("Start scan command: mobsf-cli scan apk diva.apk {HASH}")));
}

#[tokio::test]
async fn test_play_json_output_has_no_progress_lines() {
    let mock_server = MockServer::start().await;
    mount_mobsf(&mock_server, 3.5, 75, 0).await;

    let dir = tempfile::tempdir().unwrap();
    let apk = write_apk(dir.path());

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let mut app = App::new(client, Vec::new()).with_format(OutputFormat::Json);
    let (upload, scan) = app.play(&apk, false).await.unwrap();

    assert_eq!(upload.hash, scan.md5);
    let output = output_of(app);
    assert!(!output.contains("Uploading"));
    assert!(output.contains("\"security_score\": 75"));
}

#[tokio::test]
async fn test_report_json_print_writes_raw_text() {
    let mock_server = MockServer::start().await;
    mount_mobsf(&mock_server, 3.5, 75, 0).await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let mut app = App::new(client, Vec::new());

    let cli = Cli::parse_from(["mobsf-cli", "report", "json", HASH, "-p"]);
    app.execute(cli.command).await.unwrap();

    assert_eq!(output_of(app), "{\"md5\":\"3a55\"}\n");
}

#[tokio::test]
async fn test_service_error_propagates_through_app() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/delete_scan"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({ "error": "Invalid hash" })),
        )
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let mut app = App::new(client, Vec::new());

    let err = app.delete_scan("nope").await.unwrap_err();
    assert_eq!(err.to_string(), "InvalidResponse(404): Invalid hash");
}
