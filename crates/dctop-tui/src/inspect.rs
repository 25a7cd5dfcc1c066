//! The inspect screen: identity, quota bars, ports, mounts, and
//! per-interface network rates for one container.
//!
//! Everything here is pure line construction; scrolling and painting
//! belong to the draw task.

use dctop_runtime::record::{ContainerRecord, NetworkCounters};
use dctop_runtime::stats::{counter_rate, pad_label, resource_label, scale_byte_rate};

use crate::style::{Style, role};
use crate::styler::{BoxedStyler, HORIZONTAL_LINE, RuneRepeater, Text, ValuesBar};

/// Space reserved for bar labels; whatever remains becomes the bar.
const BAR_MARGIN: usize = 25;

/// Upper bound on bar width so huge terminals keep readable bars.
const MAX_BAR_LEN: usize = 40;

/// Metric name padding on network counter lines.
const METRIC_PAD: usize = 30;

fn line(text: impl AsRef<str>) -> BoxedStyler {
    Box::new(Text::new(text.as_ref(), Style::new()))
}

fn rule() -> BoxedStyler {
    Box::new(RuneRepeater::new(HORIZONTAL_LINE, role::INSPECT_RULE))
}

fn bar_len(width: usize) -> usize {
    width.saturating_sub(BAR_MARGIN).min(MAX_BAR_LEN)
}

/// Builds every line of the inspect screen for one container.
///
/// The returned lines are unscrolled; the caller applies the cyclic
/// viewport before painting.
#[must_use]
pub fn build_inspect_lines(record: &ContainerRecord, width: usize) -> Vec<BoxedStyler> {
    let mut lines: Vec<BoxedStyler> = vec![
        line(format!("Name: {}", record.name())),
        line(format!("ID: {}", record.id())),
        line(format!("Image: {}", record.image())),
        line(format!("State: {}", record.state())),
        line(format!(
            "Restarts: {}",
            record.inspect_info().restart_count
        )),
        rule(),
    ];

    match record.cached_stats() {
        Some(stats) => {
            let info = record.inspect_info();

            // CPU across the last interval, against the quota when one
            // is set and against the host's interval otherwise.
            let cpu_delta = (stats.cpu.container_usage - stats.precpu.container_usage).max(0);
            let system_delta = (stats.cpu.system_usage - stats.precpu.system_usage).max(0);
            let (cpu_limit, cpu_overlay) = if info.cpu_quota_nanos > 0 {
                (info.cpu_quota_nanos, "")
            } else {
                (system_delta, " Quota isn't set")
            };
            lines.push(Box::new(ValuesBar::new(
                &pad_label("CPU:", 8),
                0.0,
                cpu_limit as f64,
                cpu_delta as f64,
                bar_len(width),
                cpu_overlay,
            )));

            let (memory_limit, memory_overlay) = if info.memory_quota_bytes > 0 {
                (info.memory_quota_bytes, "")
            } else {
                (stats.memory.limit, " Quota isn't set")
            };
            let memory_label = format!(
                "Memory: {}",
                resource_label(stats.memory.usage, memory_limit, "GB")
            );
            lines.push(Box::new(ValuesBar::new(
                &memory_label,
                0.0,
                memory_limit as f64,
                stats.memory.usage as f64,
                bar_len(width),
                memory_overlay,
            )));
            lines.push(rule());

            push_port_lines(&mut lines, record);
            lines.push(rule());
            push_mount_lines(&mut lines, record);
            lines.push(rule());
            push_network_lines(&mut lines, record);
        }
        None => {
            lines.push(line("No resource sample received yet"));
        }
    }

    lines
}

fn push_port_lines(lines: &mut Vec<BoxedStyler>, record: &ContainerRecord) {
    lines.push(line("Ports:"));
    let mut ports = record.inspect_info().ports.clone();
    ports.sort_by(|a, b| a.container_port.cmp(&b.container_port));
    for port in ports {
        lines.push(line(format!(
            "  {} : {}",
            port.container_port, port.host_port
        )));
    }
}

fn push_mount_lines(lines: &mut Vec<BoxedStyler>, record: &ContainerRecord) {
    lines.push(line("Mounts:"));
    let mut mounts = record.inspect_info().mounts.clone();
    mounts.sort_by(|a, b| a.destination.cmp(&b.destination));
    for mount in mounts {
        lines.push(line(format!("  {} {}", mount.kind, mount.name)));
        lines.push(line(format!(
            "    {} : {}",
            mount.source, mount.destination
        )));
        lines.push(line(format!(
            "    mode {}, driver {}, {}",
            if mount.mode.is_empty() { "-" } else { &mount.mode },
            if mount.driver.is_empty() { "-" } else { &mount.driver },
            if mount.read_write { "rw" } else { "ro" },
        )));
    }
}

fn push_network_lines(lines: &mut Vec<BoxedStyler>, record: &ContainerRecord) {
    lines.push(line("Network Usage:"));
    let Some(stats) = record.cached_stats() else {
        return;
    };
    for (interface, counters) in &stats.network {
        lines.push(line(format!("  {interface}")));
        let previous = stats.prenetwork.get(interface);
        for (name, value) in counters.metrics() {
            let label = pad_label(&format!("    {name}: {value}"), METRIC_PAD);
            lines.push(line(format!(
                "{label}{}",
                format_metric_rate(name, value, previous, counters)
            )));
        }
    }
}

/// The per-second rate suffix for one counter line; `-` when no earlier
/// sample exists or no time elapsed.
fn format_metric_rate(
    name: &str,
    value: i64,
    previous: Option<&NetworkCounters>,
    current: &NetworkCounters,
) -> String {
    let rate = previous.and_then(|prev| {
        let elapsed =
            (current.sampled_at - prev.sampled_at).num_milliseconds() as f64 / 1000.0;
        let (_, prev_value) = prev
            .metrics()
            .into_iter()
            .find(|(prev_name, _)| *prev_name == name)?;
        counter_rate(value, prev_value, elapsed)
    });
    match rate {
        Some(rate) if name.ends_with("bytes") => {
            let (scaled, unit) = scale_byte_rate(rate);
            format!("{scaled:.3} {unit}")
        }
        Some(rate) => format!("{rate:.3}/s"),
        None => "-".to_owned(),
    }
}
