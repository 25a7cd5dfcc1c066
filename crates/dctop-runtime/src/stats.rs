//! Pure arithmetic turning raw counters into percentages and
//! human-readable quantities.
//!
//! Nothing here touches the runtime or the terminal; every function is a
//! total function over its inputs, with "undefined" cases expressed as
//! `None` rather than division by zero.

use crate::record::{CpuCounters, MemoryCounters};

/// Bytes in one gibibyte.
const GIB: f64 = (1_u64 << 30) as f64;

/// CPU usage of a container across two samples, as a percentage of the
/// host's CPU time over the same interval.
///
/// Returns `None` when the host counters did not advance (first sample,
/// or no elapsed ticks); callers render a neutral placeholder instead.
#[must_use]
pub fn cpu_usage_percent(cur: &CpuCounters, prev: &CpuCounters) -> Option<f64> {
    let system_delta = cur.system_usage - prev.system_usage;
    if system_delta <= 0 {
        return None;
    }
    let container_delta = (cur.container_usage - prev.container_usage) as f64;
    Some(100.0 * container_delta / system_delta as f64)
}

/// Memory usage as a percentage of the limit, `None` when no limit is set.
#[must_use]
pub fn memory_usage_percent(mem: &MemoryCounters) -> Option<f64> {
    if mem.limit <= 0 {
        return None;
    }
    Some(100.0 * mem.usage as f64 / mem.limit as f64)
}

/// Per-second rate of a cumulative counter across two samples.
///
/// Returns `None` when no time elapsed between the samples.
#[must_use]
pub fn counter_rate(cur: i64, prev: i64, elapsed_secs: f64) -> Option<f64> {
    if elapsed_secs <= 0.0 {
        return None;
    }
    Some((cur - prev) as f64 / elapsed_secs)
}

/// Scales a byte rate into the largest fitting unit at factors of 1024.
#[must_use]
pub fn scale_byte_rate(rate: f64) -> (f64, &'static str) {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB_RATE: f64 = 1024.0 * 1024.0 * 1024.0;
    if rate > GIB_RATE {
        (rate / GIB_RATE, "GB/s")
    } else if rate > MIB {
        (rate / MIB, "MB/s")
    } else if rate > KIB {
        (rate / KIB, "KB/s")
    } else {
        (rate, "Bytes/s")
    }
}

/// Formats a byte value in gibibytes with two decimals, e.g. `0.50GB`.
#[must_use]
pub fn format_gib(value: i64, unit: &str) -> String {
    format!("{:.2}{unit}", value as f64 / GIB)
}

/// Right-pads `text` with spaces to at least `min_len` characters.
#[must_use]
pub fn pad_label(text: &str, min_len: usize) -> String {
    let mut text = text.to_owned();
    while text.len() < min_len {
        text.push(' ');
    }
    text
}

/// The padded `used/quota` label shown in memory cells and inspect bars.
#[must_use]
pub fn resource_label(usage: i64, limit: i64, unit: &str) -> String {
    pad_label(
        &format!("{}/{}", format_gib(usage, unit), format_gib(limit, unit)),
        17,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_percent_matches_reference_figures() {
        let cur = CpuCounters {
            container_usage: 200,
            system_usage: 2000,
        };
        let prev = CpuCounters {
            container_usage: 100,
            system_usage: 1000,
        };
        let pct = cpu_usage_percent(&cur, &prev).expect("defined");
        assert!((pct - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cpu_percent_is_undefined_without_elapsed_ticks() {
        let sample = CpuCounters {
            container_usage: 100,
            system_usage: 1000,
        };
        assert!(cpu_usage_percent(&sample, &sample).is_none());
    }

    #[test]
    fn memory_percent_at_half_limit_is_fifty() {
        let mem = MemoryCounters {
            usage: 512 * (1 << 20),
            limit: 1 << 30,
        };
        let pct = memory_usage_percent(&mem).expect("defined");
        assert!((pct - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn memory_percent_is_undefined_without_limit() {
        let mem = MemoryCounters { usage: 10, limit: 0 };
        assert!(memory_usage_percent(&mem).is_none());
    }

    #[test]
    fn byte_rates_scale_at_1024_boundaries() {
        assert_eq!(scale_byte_rate(512.0).1, "Bytes/s");
        assert_eq!(scale_byte_rate(2048.0).1, "KB/s");
        assert_eq!(scale_byte_rate(3.0 * 1024.0 * 1024.0).1, "MB/s");
        assert_eq!(scale_byte_rate(2.0 * 1024.0 * 1024.0 * 1024.0).1, "GB/s");
        let (value, _) = scale_byte_rate(2048.0);
        assert!((value - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn counter_rate_requires_elapsed_time() {
        assert!(counter_rate(10, 5, 0.0).is_none());
        let rate = counter_rate(10, 5, 2.5).expect("defined");
        assert!((rate - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn resource_label_is_padded_for_column_alignment() {
        let label = resource_label(1 << 29, 1 << 30, "GB");
        assert!(label.starts_with("0.50GB/1.00GB"));
        assert!(label.len() >= 17);
    }
}
