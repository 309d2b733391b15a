//! Client operation tests
//!
//! Uses wiremock to mock the MobSF API and check what each operation sends
//! and how it decodes the answer.

use mobsf_cli::{MobsfClient, ScanService};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HASH: &str = "3a552566097a8de588b8184b059b0158";

fn scan_json() -> serde_json::Value {
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
        "average_cvss": 3.5,
        "security_score": 75,
        "trackers": { "detected_trackers": 0, "total_trackers": 407 },
        "permissions": {},
    })
}

#[tokio::test]
async fn test_upload_sends_multipart_file() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let apk = dir.path().join("diva.apk");
    std::fs::write(&apk, b"PK\x03\x04 fake apk").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .and(header("Authorization", "test-key"))
        .and(body_string_contains("name=\"file\"; filename=\"diva.apk\""))
        .and(body_string_contains("fake apk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "analyzer": "static_analyzer",
            "status": "success",
            "hash": HASH,
            "scan_type": "apk",
            "file_name": "diva.apk",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let upload = client.upload(&apk).await.unwrap();

    assert_eq!(upload.hash, HASH);
    assert_eq!(upload.scan_type, "apk");
    assert_eq!(upload.file_name, "diva.apk");
}

#[tokio::test]
async fn test_list_scans_accepts_upper_case_keys() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/scans"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{
                "ANALYZER": "static_analyzer",
                "SCAN_TYPE": "apk",
                "FILE_NAME": "diva.apk",
                "APP_NAME": "DivaApplication",
                "PACKAGE_NAME": "jakhar.aseem.diva",
                "VERSION_NAME": "1.0",
                "MD5": HASH,
                "TIMESTAMP": "2024-03-01T12:30:00.123Z",
            }],
            "count": 1,
            "num_pages": 1,
        })))
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let scans = client.list_scans().await.unwrap();

    assert_eq!(scans.count, 1);
    let entry = &scans.entries[0];
    assert_eq!(entry.md5, HASH);
    assert_eq!(entry.package_name, "jakhar.aseem.diva");
    assert!(entry.timestamp.is_some());
}

#[tokio::test]
async fn test_list_scans_lower_case_keys_and_bad_timestamp() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/scans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{
                "analyzer": "static_analyzer",
                "scan_type": "ipa",
                "file_name": "app.ipa",
                "app_name": "App",
                "md5": "abc",
                "timestamp": "yesterday",
            }],
        })))
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let scans = client.list_scans().await.unwrap();

    assert_eq!(scans.count, 1);
    assert_eq!(scans.num_pages, 1);
    assert_eq!(scans.entries[0].scan_type, "ipa");
    assert_eq!(scans.entries[0].package_name, "");
    assert!(scans.entries[0].timestamp.is_none());
}

#[tokio::test]
async fn test_scan_sends_form_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/scan"))
        .and(header("Authorization", "test-key"))
        .and(body_string_contains("scan_type=apk"))
        .and(body_string_contains("file_name=diva.apk"))
        .and(body_string_contains(format!("hash={HASH}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let scan = client.scan("apk", "diva.apk", HASH, false).await.unwrap();

    assert_eq!(scan.security_score, 75);
    assert_eq!(scan.average_cvss, 3.5);
    assert_eq!(scan.detected_trackers(), Some(0));
}

#[tokio::test]
async fn test_scan_without_rescan_omits_flag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/scan"))
        .and(body_string_contains("re_scan"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    client.scan("apk", "diva.apk", HASH, false).await.unwrap();
}

#[tokio::test]
async fn test_rescan_sends_flag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/scan"))
        .and(body_string_contains("re_scan=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    client.scan("apk", "diva.apk", HASH, true).await.unwrap();
}

#[tokio::test]
async fn test_delete_scan() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/delete_scan"))
        .and(body_string_contains(format!("hash={HASH}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "deleted": "yes" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let deleted = client.delete_scan(HASH).await.unwrap();

    assert_eq!(deleted.deleted_hash, "yes");
}

#[tokio::test]
async fn test_download_pdf_writes_whole_body() {
    let mock_server = MockServer::start().await;
    let mut pdf = b"%PDF-1.4\n".to_vec();
    pdf.extend(std::iter::repeat(b'x').take(3 * mobsf_cli::REPORT_CHUNK_SIZE + 17));

    Mock::given(method("POST"))
        .and(path("/api/v1/download_pdf"))
        .and(body_string_contains(format!("hash={HASH}")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(pdf.clone()),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("report.pdf");

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    client.download_pdf_report(HASH, &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), pdf);
}

#[tokio::test]
async fn test_write_json_report_returns_and_saves_text() {
    let mock_server = MockServer::start().await;
    let body = r#"{"md5":"3a552566097a8de588b8184b059b0158","security_score":75}"#;

    Mock::given(method("POST"))
        .and(path("/api/v1/report_json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("report.json");

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let text = client.write_json_report(HASH, &dest).await.unwrap();

    assert_eq!(text, body);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), body);
}

#[tokio::test]
async fn test_fetch_json_report() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/report_json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_json()))
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let text = client.fetch_json_report(HASH).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(parsed["md5"], HASH);
}

#[tokio::test]
async fn test_view_source_sends_type_and_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/view_source"))
        .and(body_string_contains("type=apk"))
        .and(body_string_contains("file=jakhar%2Faseem%2Fdiva%2FMainActivity.java"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "MainActivity.java",
            "file": "jakhar/aseem/diva/MainActivity.java",
            "type": "java",
            "data": "package jakhar.aseem.diva;",
            "version": "v4.0.0",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let source = client
        .view_source("apk", "jakhar/aseem/diva/MainActivity.java", HASH)
        .await
        .unwrap();

    assert_eq!(source.file_type, "java");
    assert_eq!(source.source_text, "package jakhar.aseem.diva;");
}

#[tokio::test]
async fn test_server_with_path_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mobsf/api/v1/delete_scan"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "deleted": "yes" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = format!("{}/mobsf/", mock_server.uri());
    let client = MobsfClient::new("test-key", &server).unwrap();
    client.delete_scan(HASH).await.unwrap();
}

#[tokio::test]
async fn test_service_trait_delegates_to_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/scans"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "content": [] })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MobsfClient::new("test-key", &mock_server.uri()).unwrap();
    let service: &dyn ScanService = &client;
    let scans = service.list_scans().await.unwrap();

    assert!(scans.is_empty());
    assert_eq!(scans.count, 0);
}
