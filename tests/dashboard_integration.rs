//! Integration tests for derived metrics and page rendering.

mod common;

use gridwatch::grid::alerts::AlertBoard;
use gridwatch::grid::metrics::{self, DeviceState, RiskLevel, Severity, Thresholds};
use gridwatch::grid::upload::UploadStatus;
use gridwatch::grid::{Dataset, ingest, ingest_path};
use gridwatch::view::{PageContext, PageView, Route, build_page};

fn load(rows: &[String]) -> Dataset {
    ingest(common::csv(rows).as_bytes()).expect("valid csv")
}

fn page(route: Route, dataset: &Dataset) -> PageView {
    let thresholds = Thresholds::default();
    let board = AlertBoard::default();
    let upload = UploadStatus::Idle;
    build_page(
        route,
        &PageContext {
            dataset,
            thresholds: &thresholds,
            board: &board,
            upload: &upload,
        },
    )
}

#[test]
fn two_stable_rows_average_to_nominal_stability() {
    let dataset = load(&[
        common::row([1.0, -1.0, -1.0, -1.0], 0.1, "stable"),
        common::row([1.0, -1.0, -1.0, -1.0], 0.2, "stable"),
    ]);
    let data = dataset.populated().expect("two rows");
    let m = metrics::overview_metrics(data, &Thresholds::default());

    assert!((m.avg_stability.value - 0.15).abs() < 1e-12);
    assert_eq!(m.avg_stability.severity, Severity::Nominal);
    assert_eq!(m.outage_minutes.value, 0);
    assert_eq!(m.outage_minutes.severity, Severity::Nominal);
}

#[test]
fn three_unstable_rows_mean_fifteen_minutes_and_three_alerts() {
    let dataset = load(&[
        common::row([1.0, -1.0, -1.0, -1.0], 0.03, "unstable"),
        common::row([1.0, -1.0, -1.0, -1.0], -0.01, "stable"),
        common::row([1.0, -1.0, -1.0, -1.0], 0.04, "unstable"),
        common::row([1.0, -1.0, -1.0, -1.0], 0.05, "unstable"),
    ]);
    let data = dataset.populated().expect("four rows");
    let m = metrics::overview_metrics(data, &Thresholds::default());
    assert_eq!(m.outage_minutes.value, 15);
    assert_eq!(m.outage_minutes.severity, Severity::Critical);

    let PageView::Alerts { alerts, notice } = page(Route::Alerts, &dataset) else {
        panic!("expected alerts page");
    };
    assert_eq!(alerts.len(), 3);
    assert_eq!(notice, None);
    let indices: Vec<usize> = alerts.iter().map(|a| a.index).collect();
    assert_eq!(indices, [0, 1, 2]);
    assert_eq!(
        alerts[0].message,
        "Unstable condition detected: Stab=0.0300 at τ1=2.00, τ2=3.00"
    );
}

#[test]
fn empty_dataset_shows_upload_prompt_everywhere() {
    let dataset = Dataset::empty();
    assert!(dataset.populated().is_none());

    for route in [Route::Overview, Route::Devices, Route::Analytics, Route::Alerts] {
        match page(route, &dataset) {
            PageView::NoData { route: r, message } => {
                assert_eq!(r, route);
                assert_eq!(Some(message), route.no_data_message());
            }
            other => panic!("{route:?} rendered {other:?}"),
        }
    }
    assert!(matches!(page(Route::Data, &dataset), PageView::Data { rows_loaded: 0, .. }));
}

#[test]
fn idle_generator_is_offline_with_zero_load() {
    let dataset = load(&[
        common::row([0.0, -1.0, -1.0, -1.0], 0.01, "stable"),
        common::row([0.0, -3.0, -1.0, -1.0], 0.01, "stable"),
        common::row([0.0, -1.0, -1.0, -1.0], 0.01, "unstable"),
    ]);
    let data = dataset.populated().expect("three rows");
    let devices = metrics::device_statuses(data, &Thresholds::default());
    assert_eq!(devices[0].id, "g1");
    assert_eq!(devices[0].state, DeviceState::Offline);
    assert_eq!(devices[0].load_mw, 0.0);

    let PageView::Devices { devices } = page(Route::Devices, &dataset) else {
        panic!("expected devices page");
    };
    assert_eq!(devices[0].label, "0.0 MW");
    assert_eq!(devices[0].ratio, 0.0);
    assert_eq!(devices[1].state, DeviceState::Online);
}

#[test]
fn tau_spread_is_zero_for_identical_values() {
    let line = "1.5,1.5,1.5,1.5,1,-1,-1,-1,0.5,0.5,0.5,0.5,0.01,stable";
    let doc = format!("{}\n{line}\n{line}\n{line}\n", common::header());
    let dataset = ingest(doc.as_bytes()).expect("valid csv");
    let m = metrics::overview_metrics(
        dataset.populated().expect("rows"),
        &Thresholds::default(),
    );
    assert_eq!(m.tau_std_dev.value, 0.0);

    let varied = load(&[common::row([1.0, -1.0, -1.0, -1.0], 0.01, "stable")]);
    let m = metrics::overview_metrics(varied.populated().expect("rows"), &Thresholds::default());
    // τ values 2, 3, 4, 5
    assert!((m.tau_std_dev.value - 1.25_f64.sqrt()).abs() < 1e-12);
}

#[test]
fn sample_fixture_metrics() {
    let dataset = ingest_path(&common::sample_path()).expect("fixture should ingest");
    let data = dataset.populated().expect("rows");
    let thresholds = Thresholds::default();

    let m = metrics::overview_metrics(data, &thresholds);
    assert!((m.avg_stability.value - 0.019025).abs() < 1e-9);
    assert_eq!(m.avg_stability.severity, Severity::Critical);
    assert!(m.tau_std_dev.value >= 0.0);
    assert_eq!(m.outage_minutes.value, 20);

    let [sector_1, sector_4] = metrics::risk_predictions(data);
    assert_eq!(sector_1.risk, RiskLevel::Medium);
    assert_eq!(sector_4.risk, RiskLevel::High);

    assert_eq!(metrics::alerts(data).len(), common::SAMPLE_UNSTABLE);
}

#[test]
fn metrics_are_idempotent() {
    let dataset = ingest_path(&common::sample_path()).expect("fixture should ingest");
    let data = dataset.populated().expect("rows");
    let thresholds = Thresholds::default();

    assert_eq!(
        metrics::overview_metrics(data, &thresholds),
        metrics::overview_metrics(data, &thresholds)
    );
    assert_eq!(
        metrics::device_statuses(data, &thresholds),
        metrics::device_statuses(data, &thresholds)
    );
    for route in Route::ALL {
        assert_eq!(page(route, &dataset), page(route, &dataset));
    }
}
