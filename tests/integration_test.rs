use kit_compat::api::{handle_request, ApiState};
use kit_compat::{
    analyze_text, resolve, AxleType, BikeQuery, BikeSpec, GeometryClient, GeometrySource,
    HtmlRenderer, KitName, StaticTable, VerdictSource, VerdictStatus,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Geometry endpoint stub answering every request with the same body.
async fn spawn_geometry_stub(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let mut buf = vec![0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });
    format!("http://{}/api/compat", addr)
}

/// Geometry endpoint stub that accepts connections and never answers.
async fn spawn_stalled_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(stream);
            });
        }
    });
    format!("http://{}/api/compat", addr)
}

fn body_of(response: &str) -> serde_json::Value {
    let body = response.split("\r\n\r\n").nth(1).unwrap_or_default();
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_geometry_drives_the_verdict() {
    let url = spawn_geometry_stub(
        "200 OK",
        r#"{"wheel_axle_front":"QR","fork_spacing_mm":100,"down_tube_length_mm":280,"seat_tube_length_mm":260}"#,
    )
    .await;
    let client = GeometryClient::new(url, Duration::from_secs(5)).unwrap();

    // The table lists the Domane with all three kits; the short frame only fits Cosmopolit.
    let mut renderer = HtmlRenderer::new();
    let table = StaticTable::reference();
    let verdict = analyze_text("Trek Domane SL 2023", Some(&client), table, &mut renderer)
        .await
        .unwrap();

    assert_eq!(verdict.source(), VerdictSource::RuleEngine);
    assert_eq!(verdict.kits(), &[KitName::Cosmopolit]);
    assert_eq!(verdict.recommendation_ref(), Some("kit-cosmopolit"));
    assert!(renderer.html().contains("result-compatible"));
    assert!(renderer.html().contains("analyse de la géométrie"));
}

#[tokio::test]
async fn test_service_error_falls_back_to_table() {
    let url = spawn_geometry_stub("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let client = GeometryClient::new(url, Duration::from_secs(5)).unwrap();

    let mut renderer = HtmlRenderer::new();
    let table = StaticTable::reference();
    let verdict = analyze_text("trek madone", Some(&client), table, &mut renderer)
        .await
        .unwrap();

    assert_eq!(verdict.status(), VerdictStatus::Incompatible);
    assert_eq!(verdict.source(), VerdictSource::StaticTable);
    assert!(renderer.html().contains("Vélo non compatible"));
}

#[tokio::test]
async fn test_unreachable_service_falls_back_to_table() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = format!("http://{}/api/compat", addr);
    let client = GeometryClient::new(url, Duration::from_secs(2)).unwrap();

    let mut renderer = HtmlRenderer::new();
    let verdict = analyze_text("Giant TCR", Some(&client), StaticTable::reference(), &mut renderer)
        .await
        .unwrap();
    assert_eq!(verdict.status(), VerdictStatus::Unknown);
    assert!(renderer.html().contains("Contacter notre équipe"));
}

#[tokio::test]
async fn test_stalled_service_times_out_to_table() {
    let url = spawn_stalled_stub().await;
    let client = GeometryClient::new(url, Duration::from_secs(1)).unwrap();

    let started = Instant::now();
    let mut renderer = HtmlRenderer::new();
    let table = StaticTable::reference();
    let verdict = analyze_text("Trek Madone", Some(&client), table, &mut renderer)
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(verdict.status(), VerdictStatus::Incompatible);
    assert_eq!(verdict.source(), VerdictSource::StaticTable);
    assert!(renderer.html().contains("Vélo non compatible"));
}

#[tokio::test]
async fn test_non_json_body_falls_back_to_table() {
    let url = spawn_geometry_stub("200 OK", "<html>maintenance</html>").await;
    let client = GeometryClient::new(url, Duration::from_secs(5)).unwrap();

    let mut renderer = HtmlRenderer::new();
    let table = StaticTable::reference();
    let verdict = analyze_text("Trek Domane", Some(&client), table, &mut renderer)
        .await
        .unwrap();

    assert_eq!(verdict.source(), VerdictSource::StaticTable);
    assert_eq!(verdict.kits(), &[KitName::Cosmopolit, KitName::Urban, KitName::Explorer]);
}

#[tokio::test]
async fn test_api_with_geometry_source() {
    let url =
        spawn_geometry_stub("200 OK", r#"{"wheel_axle_front":"Thru-axle","fork_spacing_mm":100}"#)
            .await;
    let client: Arc<dyn GeometrySource> =
        Arc::new(GeometryClient::new(url, Duration::from_secs(5)).unwrap());
    let state = ApiState::new(Some(client));

    let response = handle_request(
        &state,
        "GET /api/compat?brand=Specialized&model=Tarmac HTTP/1.1\r\nHost: localhost\r\n\r\n",
    )
    .await;
    let body = body_of(&response);
    assert_eq!(body["status"], "incompatible");
    assert_eq!(body["source"], "rule_engine");
    assert!(body["recommendation_url"].is_null());
}

#[tokio::test]
async fn test_api_with_remote_verdict() {
    let url = spawn_geometry_stub(
        "200 OK",
        r#"{"status":"compatible","kits":["Explorer","Urban"],"recommendation_url":"/products/kit-urban","notes":"Compatible bike"}"#,
    )
    .await;
    let client: Arc<dyn GeometrySource> =
        Arc::new(GeometryClient::new(url, Duration::from_secs(5)).unwrap());
    let state = ApiState::new(Some(client));

    let response = handle_request(
        &state,
        "GET /api/compat?brand=Giant&model=TCR HTTP/1.1\r\nHost: localhost\r\n\r\n",
    )
    .await;
    let body = body_of(&response);
    assert_eq!(body["status"], "compatible");
    assert_eq!(body["kits"], serde_json::json!(["Urban", "Explorer"]));
    assert_eq!(body["recommendation_url"], "/products/kit-urban");
    assert_eq!(body["source"], "remote_service");
}

#[test]
fn test_reference_scenarios() {
    let verdict = resolve(&BikeQuery::new("trek", "domane"), None);
    assert_eq!(verdict.status(), VerdictStatus::Compatible);
    assert_eq!(verdict.kits(), &[KitName::Cosmopolit, KitName::Urban, KitName::Explorer]);
    assert_eq!(verdict.recommendation_ref(), Some("kit-cosmopolit"));
    assert_eq!(verdict.source(), VerdictSource::StaticTable);

    let verdict = resolve(&BikeQuery::new("trek", "madone"), None);
    assert_eq!(verdict.status(), VerdictStatus::Incompatible);
    assert!(verdict.recommendation_ref().is_none());

    let verdict = resolve(&BikeQuery::new("giant", "tcr"), None);
    assert_eq!(verdict.status(), VerdictStatus::Unknown);

    let spec = BikeSpec::new(AxleType::ThruAxle, Some(100.0));
    assert_eq!(resolve(&BikeQuery::default(), Some(&spec)).status(), VerdictStatus::Incompatible);

    let spec = BikeSpec::new(AxleType::QuickRelease, Some(100.0)).with_down_tube(320.0);
    let verdict = resolve(&BikeQuery::default(), Some(&spec));
    assert_eq!(verdict.kits(), &[KitName::Cosmopolit, KitName::Urban, KitName::Explorer]);

    assert_eq!(BikeQuery::parse("Specialized"), BikeQuery::new("Specialized", ""));
}
