//! Monitor pipeline against a mocked dashboard and a recording notifier.

use macro_pulse::engine::monitor::run_monitor;
use macro_pulse::notify::DisabledNotifier;
use macro_pulse::risk::Regime;
use macro_pulse::storage;
use macro_pulse::types::MonitorState;

use crate::mocks::*;

#[tokio::test]
async fn test_first_run_saves_state_without_tier1_alerts() {
    let path = temp_path("monitor_first");
    let source = dashboard_returning(calm_snapshot(), 1);
    let notifier = RecordingNotifier::new();

    let report = run_monitor(&source, &notifier, &path, kst_time(2025, 4, 1, 9))
        .await
        .unwrap();

    assert_eq!(report.risk_score, Some(0.0));
    assert_eq!(report.regime, Some(Regime::RiskOn));
    assert!(report.alerts.is_empty());
    assert!(notifier.messages().is_empty());

    let saved = storage::load_state(&path).unwrap().unwrap();
    assert_eq!(saved.regime, Some(Regime::RiskOn));
    assert_eq!(saved.crypto_fg_label.as_deref(), Some("Neutral"));
    assert_eq!(saved.stock_fg_value, Some(52.0));
    assert_eq!(saved.indicators.t10y2y, Some(2.0));
    assert!(saved.timestamp.is_some());

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_label_change_alerts_once() {
    let path = temp_path("monitor_label");
    let notifier = RecordingNotifier::new();

    run_monitor(&dashboard_returning(calm_snapshot(), 1), &notifier, &path, kst_time(2025, 4, 1, 9))
        .await
        .unwrap();

    let fearful = snapshot(
        Some(2.0),
        Some(2.8),
        Some(56.0),
        Some(3.4),
        Some((38.0, "fear")),
        Some((52.0, "Neutral")),
    );
    let source = dashboard_returning(fearful, 2);

    let report = run_monitor(&source, &notifier, &path, kst_time(2025, 4, 1, 10))
        .await
        .unwrap();
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.delivered, 1);
    let sent = notifier.messages();
    assert!(sent[0].contains("Crypto Fear &amp; Greed changed"));
    assert!(sent[0].contains("🟡 Neutral → 🟠 Fear"));
    assert!(sent[0].contains("2025-04-01 10:00 KST"));

    // Same label again: nothing new.
    let report = run_monitor(&source, &notifier, &path, kst_time(2025, 4, 1, 11))
        .await
        .unwrap();
    assert!(report.alerts.is_empty());
    assert_eq!(notifier.messages().len(), 1);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_stress_run_fires_regime_and_crossings_then_stays_quiet() {
    let path = temp_path("monitor_stress");
    let notifier = RecordingNotifier::new();

    run_monitor(&dashboard_returning(calm_snapshot(), 1), &notifier, &path, kst_time(2025, 4, 1, 9))
        .await
        .unwrap();

    let stressed = snapshot(
        Some(-0.5),
        Some(7.5),
        Some(46.0),
        Some(5.8),
        Some((50.0, "Neutral")),
        Some((52.0, "Neutral")),
    );
    let source = dashboard_returning(stressed, 2);

    let report = run_monitor(&source, &notifier, &path, kst_time(2025, 4, 2, 9))
        .await
        .unwrap();
    assert_eq!(report.regime, Some(Regime::Crisis));

    let sent = notifier.messages();
    assert_eq!(sent.len(), 5);
    assert!(sent[0].contains("Macro risk regime escalated"));
    assert!(sent[0].contains("🟢 Risk-On → 🔴 Crisis"));
    assert!(sent[1].contains("T10Y2Y yield curve inverted"));
    assert!(sent[2].contains("HY OAS entered the danger zone"));
    assert!(sent[3].contains("ISM PMI in contraction"));
    assert!(sent[4].contains("Unemployment rising"));

    let report = run_monitor(&source, &notifier, &path, kst_time(2025, 4, 3, 9))
        .await
        .unwrap();
    assert!(report.alerts.is_empty());
    assert_eq!(notifier.messages().len(), 5);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_divergence_alert_on_widening_gap() {
    let path = temp_path("monitor_divergence");
    let notifier = RecordingNotifier::new();

    run_monitor(&dashboard_returning(calm_snapshot(), 1), &notifier, &path, kst_time(2025, 4, 1, 9))
        .await
        .unwrap();

    let split = snapshot(
        Some(2.0),
        Some(2.8),
        Some(56.0),
        Some(3.4),
        Some((50.0, "Neutral")),
        Some((15.0, "Neutral")),
    );
    let report = run_monitor(&dashboard_returning(split, 1), &notifier, &path, kst_time(2025, 4, 2, 9))
        .await
        .unwrap();

    assert_eq!(report.alerts.len(), 1);
    assert!(report.alerts[0].contains("Sentiment divergence"));
    assert!(report.alerts[0].contains("Gap: 35 points"));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_failed_delivery_still_saves_state() {
    let path = temp_path("monitor_delivery");
    let previous = MonitorState {
        crypto_fg_label: Some("Greed".into()),
        stock_fg_label: Some("Neutral".into()),
        ..Default::default()
    };
    storage::save_state(&previous, &path).unwrap();

    let notifier = RecordingNotifier::failing();
    let report = run_monitor(&dashboard_returning(calm_snapshot(), 1), &notifier, &path, kst_time(2025, 4, 1, 9))
        .await
        .unwrap();

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.delivered, 0);

    let saved = storage::load_state(&path).unwrap().unwrap();
    assert_eq!(saved.crypto_fg_label.as_deref(), Some("Neutral"));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_fetch_failure_leaves_state_untouched() {
    let path = temp_path("monitor_fetch_error");
    let mut source = MockDashboard::new();
    source
        .expect_fetch_snapshot()
        .times(1)
        .returning(|| Err(anyhow::anyhow!("connection refused")));

    let notifier = RecordingNotifier::new();
    let result = run_monitor(&source, &notifier, &path, kst_time(2025, 4, 1, 9)).await;

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to fetch dashboard data"));
    assert!(notifier.messages().is_empty());
    assert!(storage::load_state(&path).unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_state_file_is_read_and_rewritten() {
    let path = temp_path("monitor_legacy");
    std::fs::write(
        &path,
        r#"{
  "crypto_fg_label": "Fear",
  "stock_fg_label": "Neutral",
  "indicators": {"t10y2y": 0.35, "hyOas": 3.1, "ismPmi": 51.0, "unrate": 4.1},
  "timestamp": "2025-05-01T08:00:00.123456"
}"#,
    )
    .unwrap();

    let notifier = RecordingNotifier::new();
    let report = run_monitor(&dashboard_returning(calm_snapshot(), 1), &notifier, &path, kst_time(2025, 5, 2, 9))
        .await
        .unwrap();

    assert_eq!(report.alerts.len(), 1);
    assert!(report.alerts[0].contains("🟠 Fear → 🟡 Neutral"));

    let saved = storage::load_state(&path).unwrap().unwrap();
    assert_eq!(saved.regime, Some(Regime::RiskOn));
    assert!(std::fs::read_to_string(&path).unwrap().contains("\"regime\""));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_disabled_notifier_reports_nothing_delivered() {
    let path = temp_path("monitor_disabled");
    let previous = MonitorState {
        crypto_fg_label: Some("Greed".into()),
        ..Default::default()
    };
    storage::save_state(&previous, &path).unwrap();

    let report = run_monitor(
        &dashboard_returning(calm_snapshot(), 1),
        &DisabledNotifier,
        &path,
        kst_time(2025, 4, 1, 9),
    )
    .await
    .unwrap();

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.delivered, 0);

    let _ = std::fs::remove_file(&path);
}
