//! Derived metrics for the dashboard views.
//!
//! Every function here is pure: it reads a [`Populated`] view and returns a
//! fresh value. Nothing is cached; callers recompute on every access.

use serde::{Deserialize, Serialize};

use super::dataset::Populated;
use super::reading::{PARTICIPANTS, Stability};

/// Three-level display classification of a computed metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Nominal,
    Elevated,
    Critical,
}

impl Severity {
    /// Display variant name (`success` / `warning` / `danger`).
    pub fn variant(self) -> &'static str {
        match self {
            Self::Nominal => "success",
            Self::Elevated => "warning",
            Self::Critical => "danger",
        }
    }
}

/// Threshold parameters for severity and status classification.
///
/// The defaults are the dashboard's reference thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Average stability strictly above this is nominal, otherwise critical.
    pub avg_stability_min: f64,
    /// τ standard deviation strictly below this is nominal, otherwise elevated.
    pub tau_std_dev_max: f64,
    /// Total absolute load strictly below this is nominal, otherwise elevated.
    pub load_max: f64,
    /// Outage minutes attributed to each unstable reading.
    pub outage_minutes_per_event: u64,
    /// Average device load strictly above this puts a device in warning.
    pub device_warning_load: f64,
    /// Multiplier from average |p| to displayed megawatts.
    pub device_load_scale: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            avg_stability_min: 0.05,
            tau_std_dev_max: 2.0,
            load_max: 500.0,
            outage_minutes_per_event: 5,
            device_warning_load: 2.0,
            device_load_scale: 50.0,
        }
    }
}

/// A computed value with its severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Indicator<T> {
    pub value: T,
    pub severity: Severity,
}

/// Headline metrics of the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMetrics {
    /// Mean `stab` across all readings.
    pub avg_stability: Indicator<f64>,
    /// Population standard deviation of every τ value.
    pub tau_std_dev: Indicator<f64>,
    /// Σ |p1|+|p2|+|p3|+|p4| over all readings.
    pub current_load: Indicator<f64>,
    /// Minutes attributed to unstable readings.
    pub outage_minutes: Indicator<u64>,
}

/// Computes the overview metrics.
pub fn overview_metrics(data: Populated<'_>, thresholds: &Thresholds) -> OverviewMetrics {
    let rows = data.rows();
    let n = rows.len() as f64;

    let avg_stability = rows.iter().map(|r| r.stab).sum::<f64>() / n;
    let tau_std_dev = population_std_dev(rows.iter().flat_map(|r| r.tau));
    let current_load: f64 = rows.iter().map(|r| r.total_abs_power()).sum();
    let outage_minutes =
        data.count(Stability::Unstable) as u64 * thresholds.outage_minutes_per_event;

    OverviewMetrics {
        avg_stability: Indicator {
            value: avg_stability,
            severity: if avg_stability > thresholds.avg_stability_min {
                Severity::Nominal
            } else {
                Severity::Critical
            },
        },
        tau_std_dev: Indicator {
            value: tau_std_dev,
            severity: if tau_std_dev < thresholds.tau_std_dev_max {
                Severity::Nominal
            } else {
                Severity::Elevated
            },
        },
        current_load: Indicator {
            value: current_load,
            severity: if current_load < thresholds.load_max {
                Severity::Nominal
            } else {
                Severity::Elevated
            },
        },
        outage_minutes: Indicator {
            value: outage_minutes,
            severity: if outage_minutes == 0 {
                Severity::Nominal
            } else {
                Severity::Critical
            },
        },
    }
}

/// Population standard deviation (divides by N) using Welford's update.
///
/// Returns 0 for an empty input. Identical values give exactly 0.
fn population_std_dev(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut count = 0u64;
    let mut mean = 0.0_f64;
    let mut m2 = 0.0_f64;
    for x in values {
        count += 1;
        let delta = x - mean;
        mean += delta / count as f64;
        m2 += delta * (x - mean);
    }
    if count == 0 {
        return 0.0;
    }
    (m2 / count as f64).max(0.0).sqrt()
}

/// Operational state of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceState {
    Online,
    Warning,
    Offline,
}

impl DeviceState {
    /// Display variant name.
    pub fn variant(self) -> &'static str {
        match self {
            Self::Online => "success",
            Self::Warning => "warning",
            Self::Offline => "danger",
        }
    }
}

/// Status of one generator derived from its power column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    /// Short identifier, `g1`..`g4`.
    pub id: String,
    /// Display name, `Device G1`..`Device G4`.
    pub name: String,
    pub state: DeviceState,
    /// Mean |p_i| over all readings.
    pub avg_load: f64,
    /// Displayed load in MW (`avg_load × device_load_scale`).
    pub load_mw: f64,
}

/// Computes the status of each of the four generators.
pub fn device_statuses(data: Populated<'_>, thresholds: &Thresholds) -> Vec<DeviceStatus> {
    let rows = data.rows();
    let n = rows.len() as f64;

    (0..PARTICIPANTS)
        .map(|i| {
            let avg_load = rows.iter().map(|r| r.p[i].abs()).sum::<f64>() / n;
            let state = if avg_load == 0.0 {
                DeviceState::Offline
            } else if avg_load > thresholds.device_warning_load {
                DeviceState::Warning
            } else {
                DeviceState::Online
            };
            DeviceStatus {
                id: format!("g{}", i + 1),
                name: format!("Device G{}", i + 1),
                state,
                avg_load,
                load_mw: avg_load * thresholds.device_load_scale,
            }
        })
        .collect()
}

/// Risk classification of a grid sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Display variant name.
    pub fn variant(self) -> &'static str {
        match self {
            Self::Low => "success",
            Self::Medium => "warning",
            Self::High => "danger",
        }
    }
}

/// One row of the predictive analytics table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskPrediction {
    pub area: &'static str,
    pub risk: RiskLevel,
    pub forecast: &'static str,
    pub action: &'static str,
}

/// Fixed two-sector heuristic comparing stable and unstable reading counts.
pub fn risk_predictions(data: Populated<'_>) -> [RiskPrediction; 2] {
    let stable = data.count(Stability::Stable);
    let unstable = data.count(Stability::Unstable);

    let sector_1 = if stable > unstable {
        RiskPrediction {
            area: "Sector 1",
            risk: RiskLevel::Low,
            forecast: "Stable voltage and frequency",
            action: "Monitor",
        }
    } else {
        RiskPrediction {
            area: "Sector 1",
            risk: RiskLevel::Medium,
            forecast: "Possible instability detected",
            action: "Investigate",
        }
    };

    let sector_4 = if unstable > stable {
        RiskPrediction {
            area: "Sector 4",
            risk: RiskLevel::High,
            forecast: "Potential overload in next 2 hours",
            action: "Prepare load shedding",
        }
    } else {
        RiskPrediction {
            area: "Sector 4",
            risk: RiskLevel::Medium,
            forecast: "Normal operation expected",
            action: "Monitor",
        }
    };

    [sector_1, sector_4]
}

/// An unstable reading surfaced on the alerts page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertEntry {
    /// Position within the filtered alert list (not within the dataset).
    pub index: usize,
    pub stab: f64,
    pub tau1: f64,
    pub tau2: f64,
}

impl AlertEntry {
    /// Human-readable alert text; values are rounded for display only.
    pub fn message(&self) -> String {
        format!(
            "Unstable condition detected: Stab={} at τ1={}, τ2={}",
            fixed(self.stab, 4),
            fixed(self.tau1, 2),
            fixed(self.tau2, 2)
        )
    }
}

/// Formats `value` with `digits` decimals, rounding exact ties away from zero.
///
/// `format!("{:.2}", 1.125)` rounds the tie to even and gives `1.12`; this
/// gives `1.13`. Values that are not exact ties format identically.
pub fn fixed(value: f64, digits: usize) -> String {
    // Decimal places kept past `digits` to inspect the exact expansion.
    const GUARD: usize = 25;

    let rounded = format!("{value:.digits$}");
    if !value.is_finite() {
        return rounded;
    }
    let wide = format!("{:.*}", digits + GUARD, value.abs());
    let (head, tail) = wide.split_at(wide.len() - GUARD);
    let is_tie = tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0');
    if !is_tie {
        return rounded;
    }

    let mut chars: Vec<char> = head.trim_end_matches('.').chars().collect();
    let mut carry = true;
    for c in chars.iter_mut().rev() {
        if !carry {
            break;
        }
        match *c {
            '.' => {}
            '9' => *c = '0',
            d => {
                *c = char::from_digit(d.to_digit(10).unwrap_or(0) + 1, 10).unwrap_or(d);
                carry = false;
            }
        }
    }
    if carry {
        chars.insert(0, '1');
    }
    if value.is_sign_negative() {
        chars.insert(0, '-');
    }
    chars.into_iter().collect()
}

/// Lists the unstable readings in file order.
pub fn alerts(data: Populated<'_>) -> Vec<AlertEntry> {
    data.rows()
        .iter()
        .filter(|r| r.is_unstable())
        .enumerate()
        .map(|(index, r)| AlertEntry {
            index,
            stab: r.stab,
            tau1: r.tau[0],
            tau2: r.tau[1],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::dataset::Dataset;
    use crate::grid::reading::GridReading;

    fn reading(tau: [f64; 4], p: [f64; 4], stab: f64, stabf: Stability) -> GridReading {
        GridReading {
            tau,
            p,
            g: [0.5; 4],
            stab,
            stabf,
        }
    }

    #[test]
    fn std_dev_of_identical_values_is_zero() {
        assert_eq!(population_std_dev([0.1; 12]), 0.0);
        assert_eq!(population_std_dev([7.3; 5]), 0.0);
    }

    #[test]
    fn std_dev_divides_by_n() {
        // values 2,4,4,4,5,5,7,9: mean 5, population variance 4
        let sd = population_std_dev([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[test]
    fn overview_thresholds_are_strict() {
        let ds = Dataset::new(vec![reading(
            [1.0; 4],
            [125.0, -125.0, 125.0, -125.0],
            0.05,
            Stability::Stable,
        )]);
        let m = overview_metrics(ds.populated().expect("rows"), &Thresholds::default());
        // 0.05 is not > 0.05
        assert_eq!(m.avg_stability.severity, Severity::Critical);
        // 500 is not < 500
        assert_eq!(m.current_load.value, 500.0);
        assert_eq!(m.current_load.severity, Severity::Elevated);
        assert_eq!(m.tau_std_dev.severity, Severity::Nominal);
        assert_eq!(m.outage_minutes.value, 0);
        assert_eq!(m.outage_minutes.severity, Severity::Nominal);
    }

    #[test]
    fn wide_tau_spread_is_elevated() {
        let ds = Dataset::new(vec![reading(
            [0.5, 9.5, 0.5, 9.5],
            [1.0, -1.0, 0.0, 0.0],
            0.1,
            Stability::Stable,
        )]);
        let m = overview_metrics(ds.populated().expect("rows"), &Thresholds::default());
        assert!((m.tau_std_dev.value - 4.5).abs() < 1e-12);
        assert_eq!(m.tau_std_dev.severity, Severity::Elevated);
    }

    #[test]
    fn device_state_boundaries() {
        let ds = Dataset::new(vec![
            reading([1.0; 4], [0.0, 2.0, -3.0, 1.0], 0.1, Stability::Stable),
            reading([1.0; 4], [0.0, -2.0, -1.0, 1.0], 0.1, Stability::Stable),
        ]);
        let devices = device_statuses(ds.populated().expect("rows"), &Thresholds::default());
        let states: Vec<DeviceState> = devices.iter().map(|d| d.state).collect();
        assert_eq!(
            states,
            vec![
                DeviceState::Offline,
                DeviceState::Online,
                DeviceState::Online,
                DeviceState::Online
            ]
        );
        assert_eq!(devices[1].load_mw, 100.0);
        assert_eq!(devices[0].name, "Device G1");
        assert_eq!(devices[3].id, "g4");
    }

    #[test]
    fn heavy_device_is_warning() {
        let ds = Dataset::new(vec![reading(
            [1.0; 4],
            [2.01, 0.5, 0.5, 0.5],
            0.1,
            Stability::Stable,
        )]);
        let devices = device_statuses(ds.populated().expect("rows"), &Thresholds::default());
        assert_eq!(devices[0].state, DeviceState::Warning);
    }

    #[test]
    fn risk_on_tie_is_medium_for_both_sectors() {
        let ds = Dataset::new(vec![
            reading([1.0; 4], [1.0; 4], 0.1, Stability::Stable),
            reading([1.0; 4], [1.0; 4], 0.1, Stability::Unstable),
        ]);
        let [s1, s4] = risk_predictions(ds.populated().expect("rows"));
        assert_eq!(s1.risk, RiskLevel::Medium);
        assert_eq!(s1.action, "Investigate");
        assert_eq!(s4.risk, RiskLevel::Medium);
        assert_eq!(s4.forecast, "Normal operation expected");
    }

    #[test]
    fn risk_when_mostly_stable() {
        let ds = Dataset::new(vec![
            reading([1.0; 4], [1.0; 4], 0.1, Stability::Stable),
            reading([1.0; 4], [1.0; 4], 0.1, Stability::Stable),
            reading([1.0; 4], [1.0; 4], 0.1, Stability::Unstable),
        ]);
        let [s1, s4] = risk_predictions(ds.populated().expect("rows"));
        assert_eq!(s1.risk, RiskLevel::Low);
        assert_eq!(s1.forecast, "Stable voltage and frequency");
        assert_eq!(s4.risk, RiskLevel::Medium);
        assert_eq!(s4.action, "Monitor");
    }

    #[test]
    fn risk_when_mostly_unstable() {
        let ds = Dataset::new(vec![
            reading([1.0; 4], [1.0; 4], 0.1, Stability::Unstable),
            reading([1.0; 4], [1.0; 4], 0.1, Stability::Unstable),
            reading([1.0; 4], [1.0; 4], 0.1, Stability::Stable),
        ]);
        let [s1, s4] = risk_predictions(ds.populated().expect("rows"));
        assert_eq!(s1.risk, RiskLevel::Medium);
        assert_eq!(s4.risk, RiskLevel::High);
        assert_eq!(s4.action, "Prepare load shedding");
    }

    #[test]
    fn alerts_index_within_filtered_list() {
        let ds = Dataset::new(vec![
            reading([1.0, 2.0, 3.0, 4.0], [1.0; 4], 0.1, Stability::Stable),
            reading([1.234, 5.678, 3.0, 4.0], [1.0; 4], 0.05347, Stability::Unstable),
            reading([9.0, 8.0, 3.0, 4.0], [1.0; 4], 0.2, Stability::Unstable),
        ]);
        let list = alerts(ds.populated().expect("rows"));
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].index, 0);
        assert_eq!(list[1].index, 1);
        assert_eq!(list[0].tau1, 1.234);
        assert_eq!(
            list[0].message(),
            "Unstable condition detected: Stab=0.0535 at τ1=1.23, τ2=5.68"
        );
    }

    #[test]
    fn custom_thresholds_shift_classification() {
        let ds = Dataset::new(vec![reading([1.0; 4], [1.0; 4], 0.1, Stability::Unstable)]);
        let thresholds = Thresholds {
            avg_stability_min: 0.2,
            outage_minutes_per_event: 10,
            ..Thresholds::default()
        };
        let m = overview_metrics(ds.populated().expect("rows"), &thresholds);
        assert_eq!(m.avg_stability.severity, Severity::Critical);
        assert_eq!(m.outage_minutes.value, 10);
    }

    #[test]
    fn fixed_rounds_exact_ties_up() {
        assert_eq!(fixed(1.125, 2), "1.13");
        assert_eq!(fixed(0.25, 1), "0.3");
        assert_eq!(fixed(2.5, 0), "3");
        assert_eq!(fixed(-1.125, 2), "-1.13");
        assert_eq!(fixed(9.75, 1), "9.8");
        assert_eq!(fixed(99.5, 0), "100");
    }

    #[test]
    fn fixed_matches_std_formatting_off_ties() {
        // 1.005 is stored slightly below the tie
        assert_eq!(fixed(1.005, 2), "1.00");
        assert_eq!(fixed(0.0553, 4), "0.0553");
        assert_eq!(fixed(87.46, 1), "87.5");
        assert_eq!(fixed(-0.017442, 4), "-0.0174");
        assert_eq!(fixed(f64::NAN, 2), "NaN");
    }

    #[test]
    fn alert_message_rounds_ties_up() {
        let entry = AlertEntry {
            index: 0,
            stab: 0.03125,
            tau1: 1.125,
            tau2: 2.5,
        };
        assert_eq!(
            entry.message(),
            "Unstable condition detected: Stab=0.0313 at τ1=1.13, τ2=2.50"
        );
    }
}
