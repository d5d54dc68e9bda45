//! Routes and page models shared by the text report, the TUI and the API.

use std::fmt;

use serde::Serialize;

use crate::grid::alerts::AlertBoard;
use crate::grid::dataset::{Dataset, Populated};
use crate::grid::metrics::{
    self, DeviceState, OverviewMetrics, RiskPrediction, Severity, Thresholds, fixed,
};
use crate::grid::upload::{IDLE_PROMPT, PARSING_LABEL, UploadStatus};

/// Full scale of the device load gauge (MW).
pub const DEVICE_GAUGE_MAX_MW: f64 = 150.0;

/// Device load above this (MW) is drawn as over capacity.
pub const DEVICE_OVERLOAD_MW: f64 = 100.0;

/// Notice shown on the alerts page when nothing is unstable.
pub const ALL_CLEAR: &str = "No current alerts. System is stable.";

/// Navigation targets of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Overview,
    Devices,
    Analytics,
    Alerts,
    Data,
}

impl Route {
    /// All routes in navigation order.
    pub const ALL: [Route; 5] = [
        Route::Overview,
        Route::Devices,
        Route::Analytics,
        Route::Alerts,
        Route::Data,
    ];

    /// URL path of the route.
    pub fn path(self) -> &'static str {
        match self {
            Self::Overview => "/",
            Self::Devices => "/devices",
            Self::Analytics => "/analytics",
            Self::Alerts => "/alerts",
            Self::Data => "/data",
        }
    }

    /// Navigation label.
    pub fn title(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Devices => "Devices",
            Self::Analytics => "Analytics",
            Self::Alerts => "Alerts",
            Self::Data => "Data Analysis",
        }
    }

    /// Page heading.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Overview => "Grid Overview",
            Self::Devices => "Devices Status",
            Self::Analytics => "Predictive Analytics",
            Self::Alerts => "System Alerts",
            Self::Data => "Grid Stability Data Upload",
        }
    }

    /// Resolves a path (`/devices`) or a bare name (`devices`, `overview`).
    pub fn from_path(path: &str) -> Option<Self> {
        let name = path.trim().trim_start_matches('/');
        match name {
            "" | "overview" => Some(Self::Overview),
            "devices" => Some(Self::Devices),
            "analytics" => Some(Self::Analytics),
            "alerts" => Some(Self::Alerts),
            "data" => Some(Self::Data),
            _ => None,
        }
    }

    /// Position in [`Route::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }

    /// Next route, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous route, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Message shown instead of the page when no dataset is loaded.
    ///
    /// `None` for the data page, which never needs a dataset.
    pub fn no_data_message(self) -> Option<&'static str> {
        match self {
            Self::Overview => {
                Some("Upload data in \"Data Analysis\" section to see overview metrics.")
            }
            Self::Devices => Some("Upload data in \"Data Analysis\" section to see device status."),
            Self::Analytics => Some("Upload data in \"Data Analysis\" section to see analytics."),
            Self::Alerts => Some("Upload data in \"Data Analysis\" section to see alerts."),
            Self::Data => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One headline card of the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    /// Formatted value.
    pub value: String,
    pub severity: Severity,
    pub variant: &'static str,
}

impl MetricCard {
    fn new(title: &'static str, value: String, severity: Severity) -> Self {
        Self {
            title,
            value,
            severity,
            variant: severity.variant(),
        }
    }
}

/// Builds the four overview cards.
pub fn overview_cards(m: &OverviewMetrics) -> [MetricCard; 4] {
    [
        MetricCard::new(
            "Avg Voltage Stability",
            fixed(m.avg_stability.value, 4),
            m.avg_stability.severity,
        ),
        MetricCard::new(
            "Freq Deviation (std dev τ)",
            fixed(m.tau_std_dev.value, 4),
            m.tau_std_dev.severity,
        ),
        MetricCard::new(
            "Current Load (approx MW)",
            fixed(m.current_load.value, 2),
            m.current_load.severity,
        ),
        MetricCard::new(
            "Outage Duration (min)",
            m.outage_minutes.value.to_string(),
            m.outage_minutes.severity,
        ),
    ]
}

/// One device row with its load gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceGauge {
    pub id: String,
    pub name: String,
    pub state: DeviceState,
    pub variant: &'static str,
    pub load_mw: f64,
    /// e.g. `"87.5 MW"`.
    pub label: String,
    /// `load_mw / DEVICE_GAUGE_MAX_MW`, clamped to `[0, 1]`.
    pub ratio: f64,
    /// Load above [`DEVICE_OVERLOAD_MW`].
    pub over_capacity: bool,
}

/// One alert line with its acknowledgment mark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertLine {
    pub index: usize,
    pub message: String,
    pub acknowledged: bool,
}

/// Everything a page needs to render.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub dataset: &'a Dataset,
    pub thresholds: &'a Thresholds,
    pub board: &'a AlertBoard,
    pub upload: &'a UploadStatus,
}

/// A rendered page model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    /// No dataset loaded; nothing was computed.
    NoData { route: Route, message: &'static str },
    Overview { cards: [MetricCard; 4] },
    Devices { devices: Vec<DeviceGauge> },
    Analytics { predictions: [RiskPrediction; 2] },
    Alerts {
        alerts: Vec<AlertLine>,
        /// Set when the dataset has no unstable readings.
        notice: Option<&'static str>,
    },
    Data {
        upload: UploadStatus,
        /// Prompt or progress text, if any applies to the current state.
        hint: Option<&'static str>,
        rows_loaded: usize,
    },
}

/// Builds the page model for `route`.
///
/// For every route but [`Route::Data`], an empty dataset yields
/// [`PageView::NoData`] without invoking any metric function.
pub fn build_page(route: Route, ctx: &PageContext<'_>) -> PageView {
    if route == Route::Data {
        return data_page(ctx);
    }
    match ctx.dataset.populated() {
        Some(data) => populated_page(route, data, ctx),
        None => PageView::NoData {
            route,
            message: route.no_data_message().unwrap_or_default(),
        },
    }
}

fn data_page(ctx: &PageContext<'_>) -> PageView {
    let hint = match ctx.upload {
        UploadStatus::Idle => Some(IDLE_PROMPT),
        UploadStatus::Parsing { .. } => Some(PARSING_LABEL),
        _ => None,
    };
    PageView::Data {
        upload: ctx.upload.clone(),
        hint,
        rows_loaded: ctx.dataset.len(),
    }
}

fn populated_page(route: Route, data: Populated<'_>, ctx: &PageContext<'_>) -> PageView {
    match route {
        Route::Overview => PageView::Overview {
            cards: overview_cards(&metrics::overview_metrics(data, ctx.thresholds)),
        },
        Route::Devices => PageView::Devices {
            devices: metrics::device_statuses(data, ctx.thresholds)
                .into_iter()
                .map(|d| DeviceGauge {
                    label: format!("{} MW", fixed(d.load_mw, 1)),
                    ratio: (d.load_mw / DEVICE_GAUGE_MAX_MW).clamp(0.0, 1.0),
                    over_capacity: d.load_mw > DEVICE_OVERLOAD_MW,
                    variant: d.state.variant(),
                    id: d.id,
                    name: d.name,
                    state: d.state,
                    load_mw: d.load_mw,
                })
                .collect(),
        },
        Route::Analytics => PageView::Analytics {
            predictions: metrics::risk_predictions(data),
        },
        Route::Alerts => {
            let alerts: Vec<AlertLine> = metrics::alerts(data)
                .iter()
                .map(|a| AlertLine {
                    index: a.index,
                    message: a.message(),
                    acknowledged: ctx.board.is_acknowledged(a.index),
                })
                .collect();
            let notice = alerts.is_empty().then_some(ALL_CLEAR);
            PageView::Alerts { alerts, notice }
        }
        Route::Data => data_page(ctx),
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData { message, .. } => write!(f, "{message}"),
            Self::Overview { cards } => {
                writeln!(f, "--- {} ---", Route::Overview.heading())?;
                for card in cards {
                    writeln!(f, "{:<28} {:>12}  [{}]", card.title, card.value, card.variant)?;
                }
                Ok(())
            }
            Self::Devices { devices } => {
                writeln!(f, "--- {} ---", Route::Devices.heading())?;
                for d in devices {
                    writeln!(
                        f,
                        "{:<10} {:<8} {:>10}{}",
                        d.name,
                        format!("{:?}", d.state),
                        d.label,
                        if d.over_capacity { "  (over capacity)" } else { "" }
                    )?;
                }
                Ok(())
            }
            Self::Analytics { predictions } => {
                writeln!(f, "--- {} ---", Route::Analytics.heading())?;
                writeln!(
                    f,
                    "{:<10} {:<8} {:<36} Recommended Action",
                    "Area", "Risk", "Forecast"
                )?;
                for p in predictions {
                    writeln!(
                        f,
                        "{:<10} {:<8} {:<36} {}",
                        p.area,
                        format!("{:?}", p.risk),
                        p.forecast,
                        p.action
                    )?;
                }
                Ok(())
            }
            Self::Alerts { alerts, notice } => {
                writeln!(f, "--- {} ---", Route::Alerts.heading())?;
                if let Some(notice) = notice {
                    writeln!(f, "{notice}")?;
                }
                for a in alerts {
                    let mark = if a.acknowledged { "[ack]" } else { "[!]" };
                    writeln!(f, "{mark:<6}{}", a.message)?;
                }
                Ok(())
            }
            Self::Data {
                upload,
                hint,
                rows_loaded,
            } => {
                writeln!(f, "--- {} ---", Route::Data.heading())?;
                if let Some(name) = upload.file_name() {
                    writeln!(f, "File: {name}")?;
                }
                if let UploadStatus::Failed { message, .. } = upload {
                    writeln!(f, "{message}")?;
                }
                if let Some(hint) = hint {
                    writeln!(f, "{hint}")?;
                }
                writeln!(f, "Readings loaded: {rows_loaded}")
            }
        }
    }
}
