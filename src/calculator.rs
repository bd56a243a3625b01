//! Extraction throughput calculator logic

use std::fmt;

use tracing::{debug, warn};

use crate::models::{Bounded, DerivedMetrics, ResourceType, Setup, SetupId};

/// Shortest cycle time the engine will run with, in seconds
pub const MIN_CYCLE_TIME: f64 = 0.1;

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Calculate the derived metrics for one setup
///
/// The cycle time is clamped in place before use, so the stored setup keeps the
/// clamped value for every later calculation.
pub fn compute(setup: &mut Setup) -> DerivedMetrics {
    // Also catches NaN
    if !(setup.cycle_time >= MIN_CYCLE_TIME) {
        warn!(cycle_time = setup.cycle_time, "clamping cycle time to {MIN_CYCLE_TIME}s");
        setup.cycle_time = MIN_CYCLE_TIME;
    }

    let target_m3 = target_volume_m3(setup);
    let residue_fraction = setup.residue_percentage / 100.0;

    let total_yield_per_cycle = setup.yield_per_cycle * f64::from(setup.num_modules);
    let effective_yield_per_cycle = total_yield_per_cycle * (1.0 - residue_fraction);

    let cycles_per_minute = SECONDS_PER_MINUTE / setup.cycle_time;
    let yield_per_minute = effective_yield_per_cycle * cycles_per_minute;

    // No effective yield means residue eats everything and the target is never reached.
    // A quotient too large for f64 can never be reached either.
    let total_cycles = if effective_yield_per_cycle > 0.0 {
        finite_or_unbounded((target_m3 / effective_yield_per_cycle).ceil() + 0.0)
    } else {
        Bounded::Unbounded
    };
    if total_cycles.is_unbounded() {
        debug!(effective_yield_per_cycle, target_m3, "target is unreachable");
    }

    let cycle_time = setup.cycle_time;
    let total_seconds = total_cycles
        .finite()
        .map_or(Bounded::Unbounded, |cycles| finite_or_unbounded(cycles * cycle_time));

    let residue_per_cycle = total_yield_per_cycle * residue_fraction;
    let total_residue = total_cycles
        .finite()
        .map_or(Bounded::Unbounded, |cycles| finite_or_unbounded(residue_per_cycle * cycles));

    let metrics = DerivedMetrics {
        total_yield_per_cycle,
        effective_yield_per_cycle,
        yield_per_minute,
        total_cycles,
        total_seconds,
        total_residue,
    };
    debug!(?setup, ?metrics, "computed");
    metrics
}

fn finite_or_unbounded(value: f64) -> Bounded<f64> {
    if value.is_finite() {
        Bounded::Finite(value)
    } else {
        Bounded::Unbounded
    }
}

/// Target quantity converted to m³. Gas targets are unit counts scaled by the unit size.
pub fn target_volume_m3(setup: &Setup) -> f64 {
    match setup.resource_type {
        ResourceType::Gas => setup.target_volume * setup.unit_size,
        ResourceType::Ore | ResourceType::Ice => setup.target_volume,
    }
}

/// Unit the target quantity is entered in
pub const fn target_unit_label(resource_type: ResourceType) -> &'static str {
    match resource_type {
        ResourceType::Gas => "units",
        ResourceType::Ore | ResourceType::Ice => "m³",
    }
}

/// Pick the setup with the strictly greater positive yield per minute, if any
pub fn compare(first_yield_per_minute: f64, second_yield_per_minute: f64) -> Option<SetupId> {
    if first_yield_per_minute > second_yield_per_minute && first_yield_per_minute > 0.0 {
        Some(SetupId::First)
    } else if second_yield_per_minute > first_yield_per_minute && second_yield_per_minute > 0.0 {
        Some(SetupId::Second)
    } else {
        None
    }
}

/// Format a duration as `HH:MM:SS`, prefixed with `<days>d ` when it spans a day or more
pub fn format_time(total_seconds: Bounded<f64>) -> String {
    let Some(seconds) = total_seconds.finite() else {
        return "∞".to_string();
    };

    let seconds = seconds.max(0.0);
    let days = (seconds / 86_400.0).floor();
    let within_day = (seconds % 86_400.0) as u64;
    let hours = within_day / 3_600;
    let minutes = (within_day % 3_600) / 60;
    let secs = within_day % 60;

    if days > 0.0 {
        format!("{days:.0}d {hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    }
}

fn format_volume(volume: Bounded<f64>) -> String {
    match volume {
        Bounded::Finite(value) => format!("{value:.2} m³"),
        Bounded::Unbounded => "∞".to_string(),
    }
}

fn format_cycles(cycles: Bounded<f64>) -> String {
    match cycles {
        Bounded::Finite(value) => format!("{value:.0}"),
        Bounded::Unbounded => "∞".to_string(),
    }
}

/// The six output strings shown for one setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMetrics {
    pub total_yield_per_cycle: String,
    pub effective_yield_per_cycle: String,
    pub yield_per_minute: String,
    pub total_cycles: String,
    pub total_time: String,
    pub total_residue: String,
}

impl From<&DerivedMetrics> for FormattedMetrics {
    fn from(metrics: &DerivedMetrics) -> Self {
        Self {
            total_yield_per_cycle: format_volume(Bounded::Finite(metrics.total_yield_per_cycle)),
            effective_yield_per_cycle: format_volume(Bounded::Finite(
                metrics.effective_yield_per_cycle,
            )),
            yield_per_minute: format!("{:.2} m³/min", metrics.yield_per_minute),
            total_cycles: format_cycles(metrics.total_cycles),
            total_time: format_time(metrics.total_seconds),
            total_residue: format_volume(metrics.total_residue),
        }
    }
}

impl fmt::Display for FormattedMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Total yield/cycle:     {}", self.total_yield_per_cycle)?;
        writeln!(f, "  Effective yield/cycle: {}", self.effective_yield_per_cycle)?;
        writeln!(f, "  Yield/minute:          {}", self.yield_per_minute)?;
        writeln!(f, "  Total cycles:          {}", self.total_cycles)?;
        writeln!(f, "  Total time:            {}", self.total_time)?;
        write!(f, "  Total residue:         {}", self.total_residue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(residue_percentage: f64) -> Setup {
        Setup {
            residue_percentage,
            ..Setup::default()
        }
    }

    #[test]
    fn defaults_produce_expected_metrics() {
        let metrics = compute(&mut Setup::default());
        assert_eq!(metrics.total_yield_per_cycle, 100.0);
        assert_eq!(metrics.effective_yield_per_cycle, 100.0);
        assert_eq!(metrics.yield_per_minute, 100.0);
        assert_eq!(metrics.total_cycles, Bounded::Finite(100.0));
        assert_eq!(metrics.total_seconds, Bounded::Finite(6_000.0));
        assert_eq!(metrics.total_residue, Bounded::Finite(0.0));
    }

    #[test]
    fn no_residue_means_effective_equals_total() {
        for modules in [0, 1, 3, 17] {
            let mut s = Setup {
                num_modules: modules,
                yield_per_cycle: 37.5,
                ..Setup::default()
            };
            let metrics = compute(&mut s);
            assert_eq!(metrics.effective_yield_per_cycle, metrics.total_yield_per_cycle);
        }
    }

    #[test]
    fn half_residue_halves_yield_and_accumulates_waste() {
        let metrics = compute(&mut setup(50.0));
        assert_eq!(metrics.effective_yield_per_cycle, 50.0);
        assert_eq!(metrics.yield_per_minute, 50.0);
        assert_eq!(metrics.total_cycles, Bounded::Finite(200.0));
        assert_eq!(metrics.total_seconds, Bounded::Finite(12_000.0));
        assert_eq!(metrics.total_residue, Bounded::Finite(10_000.0));
    }

    #[test]
    fn full_residue_is_unbounded() {
        let metrics = compute(&mut setup(100.0));
        assert_eq!(metrics.effective_yield_per_cycle, 0.0);
        assert!(metrics.total_cycles.is_unbounded());
        assert!(metrics.total_seconds.is_unbounded());
        assert!(metrics.total_residue.is_unbounded());
    }

    #[test]
    fn zero_yield_is_unbounded() {
        let mut s = Setup {
            yield_per_cycle: 0.0,
            ..Setup::default()
        };
        assert!(compute(&mut s).total_cycles.is_unbounded());

        let mut s = Setup {
            num_modules: 0,
            ..Setup::default()
        };
        assert!(compute(&mut s).total_cycles.is_unbounded());
    }

    #[test]
    fn near_zero_yield_is_unbounded() {
        // Subnormal yield: the quotient overflows f64
        let mut s = Setup {
            yield_per_cycle: 1e-320,
            ..Setup::default()
        };
        let metrics = compute(&mut s);
        assert!(metrics.effective_yield_per_cycle > 0.0);
        assert!(metrics.total_cycles.is_unbounded());
        assert!(metrics.total_seconds.is_unbounded());
        assert!(metrics.total_residue.is_unbounded());
        assert_eq!(FormattedMetrics::from(&metrics).total_cycles, "∞");
    }

    #[test]
    fn small_yield_keeps_exact_cycle_count() {
        let mut s = Setup {
            yield_per_cycle: 1e-300,
            ..Setup::default()
        };
        let metrics = compute(&mut s);
        let expected = (10_000.0_f64 / 1e-300).ceil();
        assert!(expected > u64::MAX as f64);
        assert_eq!(metrics.total_cycles, Bounded::Finite(expected));
        assert_eq!(metrics.total_seconds, Bounded::Finite(expected * 60.0));
    }

    #[test]
    fn huge_target_keeps_exact_cycle_time() {
        let mut s = Setup {
            target_volume: 1e23,
            ..Setup::default()
        };
        let metrics = compute(&mut s);
        let cycles = metrics.total_cycles.finite().unwrap();
        assert_eq!(cycles, (1e23_f64 / 100.0).ceil());
        let seconds = metrics.total_seconds.finite().unwrap();
        assert!((seconds - 6e22).abs() / 6e22 < 1e-12);
        assert!(format_time(metrics.total_seconds).starts_with("694444444444444"));
    }

    #[test]
    fn seconds_overflow_is_unbounded() {
        let mut s = Setup {
            yield_per_cycle: 1e-300,
            cycle_time: 1e10,
            ..Setup::default()
        };
        let metrics = compute(&mut s);
        assert!(metrics.total_cycles.finite().is_some());
        assert!(metrics.total_seconds.is_unbounded());
    }

    #[test]
    fn residue_over_hundred_is_unbounded() {
        let metrics = compute(&mut setup(150.0));
        assert_eq!(metrics.effective_yield_per_cycle, -50.0);
        assert!(metrics.total_cycles.is_unbounded());
        assert!(metrics.total_seconds.is_unbounded());
        assert!(metrics.total_residue.is_unbounded());
    }

    #[test]
    fn negative_target_is_not_flattened_to_zero() {
        let mut s = Setup {
            target_volume: -500.0,
            ..Setup::default()
        };
        let metrics = compute(&mut s);
        assert_eq!(metrics.total_cycles, Bounded::Finite(-5.0));
        assert_eq!(metrics.total_seconds, Bounded::Finite(-300.0));
    }

    #[test]
    fn fractional_negative_cycles_render_as_zero() {
        let mut s = Setup {
            target_volume: -40.0,
            ..Setup::default()
        };
        let metrics = compute(&mut s);
        assert_eq!(metrics.total_cycles.finite().map(f64::to_bits), Some(0.0_f64.to_bits()));
        assert_eq!(FormattedMetrics::from(&metrics).total_cycles, "0");
    }

    #[test]
    fn tiny_positive_target_needs_one_cycle() {
        let mut s = Setup {
            target_volume: 0.001,
            ..Setup::default()
        };
        assert_eq!(compute(&mut s).total_cycles, Bounded::Finite(1.0));
    }

    #[test]
    fn partial_cycles_round_up() {
        let mut s = Setup {
            target_volume: 10_001.0,
            ..Setup::default()
        };
        assert_eq!(compute(&mut s).total_cycles, Bounded::Finite(101.0));
    }

    #[test]
    fn gas_target_is_scaled_by_unit_size() {
        let mut s = Setup {
            resource_type: ResourceType::Gas,
            target_volume: 500.0,
            unit_size: 2.0,
            yield_per_cycle: 100.0,
            num_modules: 1,
            cycle_time: 60.0,
            residue_percentage: 0.0,
            ..Setup::default()
        };
        assert_eq!(target_volume_m3(&s), 1_000.0);
        assert_eq!(compute(&mut s).total_cycles, Bounded::Finite(10.0));
    }

    #[test]
    fn unit_size_is_ignored_for_ore_and_ice() {
        for resource_type in [ResourceType::Ore, ResourceType::Ice] {
            let mut s = Setup {
                resource_type,
                unit_size: 5.0,
                ..Setup::default()
            };
            assert_eq!(compute(&mut s).total_cycles, Bounded::Finite(100.0));
        }
    }

    #[test]
    fn zero_cycle_time_behaves_like_minimum() {
        let mut zero = Setup {
            cycle_time: 0.0,
            ..Setup::default()
        };
        let mut minimum = Setup {
            cycle_time: MIN_CYCLE_TIME,
            ..Setup::default()
        };
        assert_eq!(compute(&mut zero), compute(&mut minimum));
    }

    #[test]
    fn clamped_cycle_time_persists_on_setup() {
        let mut s = Setup {
            cycle_time: -5.0,
            ..Setup::default()
        };
        compute(&mut s);
        assert_eq!(s.cycle_time, MIN_CYCLE_TIME);
    }

    #[test]
    fn compute_is_idempotent() {
        let mut s = Setup {
            yield_per_cycle: 123.456,
            num_modules: 3,
            cycle_time: 47.3,
            residue_percentage: 12.5,
            target_volume: 98_765.4,
            ..Setup::default()
        };
        let first = compute(&mut s);
        let second = compute(&mut s);
        assert_eq!(first.yield_per_minute.to_bits(), second.yield_per_minute.to_bits());
        assert_eq!(
            first.effective_yield_per_cycle.to_bits(),
            second.effective_yield_per_cycle.to_bits()
        );
        assert_eq!(first, second);
    }

    #[test]
    fn higher_positive_rate_wins() {
        assert_eq!(compare(50.0, 30.0), Some(SetupId::First));
        assert_eq!(compare(30.0, 50.0), Some(SetupId::Second));
    }

    #[test]
    fn ties_and_non_positive_rates_have_no_winner() {
        assert_eq!(compare(50.0, 50.0), None);
        assert_eq!(compare(0.0, 0.0), None);
        assert_eq!(compare(0.0, -1.0), None);
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(Bounded::Finite(90_000.0)), "1d 01:00:00");
        assert_eq!(format_time(Bounded::Finite(3_661.0)), "01:01:01");
        assert_eq!(format_time(Bounded::Finite(0.0)), "00:00:00");
        assert_eq!(format_time(Bounded::Finite(59.9)), "00:00:59");
        assert_eq!(format_time(Bounded::Unbounded), "∞");
    }

    #[test]
    fn formatted_metrics_use_two_decimals_and_infinity() {
        let formatted = FormattedMetrics::from(&compute(&mut setup(25.0)));
        assert_eq!(formatted.total_yield_per_cycle, "100.00 m³");
        assert_eq!(formatted.effective_yield_per_cycle, "75.00 m³");
        assert_eq!(formatted.yield_per_minute, "75.00 m³/min");
        assert_eq!(formatted.total_cycles, "134");
        assert_eq!(formatted.total_time, "02:14:00");
        assert_eq!(formatted.total_residue, "3350.00 m³");

        let formatted = FormattedMetrics::from(&compute(&mut setup(100.0)));
        assert_eq!(formatted.total_cycles, "∞");
        assert_eq!(formatted.total_time, "∞");
        assert_eq!(formatted.total_residue, "∞");
    }

    #[test]
    fn target_unit_labels() {
        assert_eq!(target_unit_label(ResourceType::Gas), "units");
        assert_eq!(target_unit_label(ResourceType::Ice), "m³");
    }
}
