mod support;

use std::collections::BTreeMap;
use std::sync::Arc;

use mcpm_core::mcp::{McpConfig, McpServer};
use mcpm_core::probe::{
    COMMAND_NOT_AVAILABLE, FALLBACK_PORTS, NO_PORT_REACHABLE, Prober, SystemResolver,
    probe_ports,
};
use mcpm_core::status::{ServerStatus, StatusBoard, ping_all};

use support::{FakeResolver, RecordingConnector};

#[tokio::test]
async fn empty_candidate_list_is_unreachable() {
    let connector = RecordingConnector::with_open(&[]);

    let result = probe_ports(&connector, &[]).await;

    assert!(!result.reachable);
    assert_eq!(result.error.as_deref(), Some(NO_PORT_REACHABLE));
    assert!(connector.attempts().is_empty());
}

#[tokio::test]
async fn first_open_port_stops_the_probe() {
    let connector = RecordingConnector::with_open(&[7001, 7002]);

    let result = probe_ports(&connector, &[7001, 7002, 7003]).await;

    assert!(result.reachable);
    assert_eq!(result.port, Some(7001));
    assert!(result.error.is_none());
    assert_eq!(connector.attempts(), vec![7001]);
}

#[tokio::test]
async fn ports_are_tried_in_order_until_success() {
    let connector = RecordingConnector::with_open(&[7003]).timing_out(&[7002]);

    let result = probe_ports(&connector, &[7001, 7002, 7003, 7004]).await;

    assert_eq!(result.port, Some(7003));
    assert_eq!(connector.attempts(), vec![7001, 7002, 7003]);
}

#[tokio::test]
async fn exhaustion_reports_last_diagnostic() {
    let connector = RecordingConnector::with_open(&[]).timing_out(&[7002]);

    let timed_out_last = probe_ports(&connector, &[7001, 7002]).await;
    assert!(!timed_out_last.reachable);
    assert!(timed_out_last.port.is_none());
    assert_eq!(
        timed_out_last.error.as_deref(),
        Some("Connection to port 7002 timed out")
    );

    let refused_last = probe_ports(&connector, &[7002, 7001]).await;
    assert_eq!(
        refused_last.error.as_deref(),
        Some("connect ECONNREFUSED 127.0.0.1:7001")
    );
}

#[tokio::test]
async fn unavailable_command_skips_network() {
    let prober = Prober::with_parts(
        FakeResolver::unavailable(),
        RecordingConnector::with_open(&[8080]),
    );

    let result = prober.probe(&McpServer::new("node")).await;

    assert!(!result.reachable);
    assert_eq!(result.error.as_deref(), Some(COMMAND_NOT_AVAILABLE));
    assert_eq!(prober.resolver().calls(), 1);
    assert!(prober.connector().attempts().is_empty());
}

#[tokio::test]
async fn nonexistent_binary_makes_no_socket_attempts() {
    let prober = Prober::with_parts(SystemResolver, RecordingConnector::with_open(&[8080]));

    let result = prober
        .probe(&McpServer::new("nonexistent-binary-xyz"))
        .await;

    assert!(!result.reachable);
    assert_eq!(result.error.as_deref(), Some("Command not available"));
    assert!(prober.connector().attempts().is_empty());
}

#[tokio::test]
async fn probe_uses_fallback_ports_in_order() {
    let prober = Prober::with_parts(
        FakeResolver::available(),
        RecordingConnector::with_open(&[]),
    );

    let result = prober.probe(&McpServer::new("node")).await;

    assert!(!result.reachable);
    assert_eq!(prober.connector().attempts(), FALLBACK_PORTS.to_vec());
}

#[tokio::test]
async fn probe_prefers_env_over_args() {
    let prober = Prober::with_parts(
        FakeResolver::available(),
        RecordingConnector::with_open(&[9100]),
    );
    let server = McpServer::new("node")
        .with_args(["--port", "9100"])
        .with_env("MCP_PORT", "9000");

    let result = prober.probe(&server).await;

    assert_eq!(result.port, Some(9100));
    assert_eq!(prober.connector().attempts(), vec![9000, 9100]);
}

#[tokio::test]
async fn ping_all_probes_every_server() {
    let prober = Arc::new(Prober::with_parts(
        FakeResolver::available(),
        RecordingConnector::with_open(&[5101]),
    ));

    let mut config = McpConfig::new();
    config.mcp_servers.insert(
        "online".to_string(),
        McpServer::new("node").with_args(["--port=5101"]),
    );
    config.mcp_servers.insert(
        "offline".to_string(),
        McpServer::new("node").with_env("PORT", "5102"),
    );

    let results = ping_all(Arc::clone(&prober), &config).await;

    assert_eq!(results.len(), 2);
    assert!(results["online"].reachable);
    assert!(!results["offline"].reachable);
    assert_eq!(prober.resolver().calls(), 2);

    let mut board = StatusBoard::new();
    board.sync_ids(config.ids());
    board.begin_check_all();
    board.finish_all(results);
    assert_eq!(board.status("online"), ServerStatus::Online);
    assert_eq!(board.status("offline"), ServerStatus::Offline);
}

#[tokio::test]
async fn ping_all_on_empty_config() {
    let prober = Arc::new(Prober::with_parts(
        FakeResolver::available(),
        RecordingConnector::with_open(&[]),
    ));

    let results = ping_all(prober, &McpConfig::new()).await;

    assert_eq!(results, BTreeMap::new());
}
