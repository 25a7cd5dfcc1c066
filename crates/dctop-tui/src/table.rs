//! Table layout: column geometry, header and row stylers, and the
//! concurrent row builder.

use dctop_common::types::SortKey;
use dctop_runtime::collection::ContainerCollection;
use dctop_runtime::record::ContainerRecord;
use dctop_runtime::stats::{cpu_usage_percent, memory_usage_percent, pad_label, resource_label};
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::TuiError;
use crate::style::Style;
use crate::styler::{BoxedStyler, RowLayout, StrikeThrough, Text, ValuesBar};

/// Fractions of the content width given to each column, in display
/// order: id, state, name, image, memory, cpu.
const COLUMN_FRACTIONS: [f64; 6] = [0.04, 0.04, 0.12, 0.24, 0.28, 0.28];

/// Column headings, in display order.
const COLUMN_TITLES: [&str; 6] = ["ID", "State", "Name", "Image", "Memory", "CPU"];

/// Sort key selected by clicking each column header.
const COLUMN_SORT_KEYS: [SortKey; 6] = [
    SortKey::None,
    SortKey::State,
    SortKey::Name,
    SortKey::Image,
    SortKey::Memory,
    SortKey::Cpu,
];

/// Absolute column widths for a given content width, each rounded up so
/// narrow windows never collapse a column to nothing prematurely.
#[must_use]
pub fn cell_widths(total: usize) -> [usize; 6] {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    COLUMN_FRACTIONS.map(|fraction| (fraction * total as f64).ceil() as usize)
}

/// Maps a content-relative x position on the header line to the sort key
/// of the column under it. Separator cells and positions past the last
/// column map to nothing.
#[must_use]
pub fn sort_key_at(x: usize, total: usize) -> Option<SortKey> {
    let widths = cell_widths(total);
    let mut cum = 0;
    for (width, key) in widths.into_iter().zip(COLUMN_SORT_KEYS) {
        if x < cum {
            // A separator cell.
            return None;
        }
        if x < cum + width {
            return Some(key);
        }
        cum += width + 1;
    }
    None
}

/// The header row.
#[must_use]
pub fn build_header(total: usize) -> BoxedStyler {
    let widths = cell_widths(total);
    let cells: Vec<BoxedStyler> = COLUMN_TITLES
        .iter()
        .zip(widths)
        .map(|(title, width)| {
            Box::new(Text::fixed(title, width, Style::new().bold())) as BoxedStyler
        })
        .collect();
    Box::new(RowLayout::new(cells, widths.to_vec()))
}

/// One container's table row.
///
/// Fails with [`TuiError::MissingStats`] when the record has never
/// received a stats sample; the draw task falls back to the row's last
/// good frame or its identity columns.
pub fn build_row(total: usize, record: &ContainerRecord) -> Result<BoxedStyler, TuiError> {
    let stats = record
        .cached_stats()
        .ok_or_else(|| TuiError::MissingStats {
            id: record.id().clone(),
        })?;
    let widths = cell_widths(total);

    let memory_label = resource_label(stats.memory.usage, stats.memory.limit, "GB");
    let memory_bar = ValuesBar::percentage(
        &memory_label,
        memory_usage_percent(&stats.memory),
        widths[4].saturating_sub(memory_label.chars().count()),
    );

    let cpu_percent = cpu_usage_percent(&stats.cpu, &stats.precpu);
    let cpu_label = pad_label(
        &cpu_percent.map_or_else(|| "-".to_owned(), |pct| format!("{pct:.2}%")),
        8,
    );
    let cpu_bar = ValuesBar::percentage(
        &cpu_label,
        cpu_percent,
        widths[5].saturating_sub(cpu_label.chars().count()),
    );

    let cells: Vec<BoxedStyler> = vec![
        Box::new(Text::fixed(record.id().short(), widths[0], Style::new())),
        Box::new(Text::fixed(record.state(), widths[1], Style::new())),
        Box::new(Text::fixed(record.name(), widths[2], Style::new())),
        Box::new(Text::fixed(record.image(), widths[3], Style::new())),
        Box::new(memory_bar),
        Box::new(cpu_bar),
    ];
    let row: BoxedStyler = Box::new(RowLayout::new(cells, widths.to_vec()));
    if record.is_deleted() {
        Ok(Box::new(StrikeThrough::new(row)))
    } else {
        Ok(row)
    }
}

/// A stats-free row showing only the identity columns; the last-resort
/// rendering for a row that failed and has no cached frame.
#[must_use]
pub fn build_identity_row(total: usize, record: &ContainerRecord) -> BoxedStyler {
    let widths = cell_widths(total);
    let cells: Vec<BoxedStyler> = vec![
        Box::new(Text::fixed(record.id().short(), widths[0], Style::new())),
        Box::new(Text::fixed(record.state(), widths[1], Style::new())),
        Box::new(Text::fixed(record.name(), widths[2], Style::new())),
        Box::new(Text::fixed(record.image(), widths[3], Style::new())),
        Box::new(Text::fixed("", widths[4], Style::new())),
        Box::new(Text::fixed("", widths[5], Style::new())),
    ];
    Box::new(StrikeThrough::new(Box::new(RowLayout::new(
        cells,
        widths.to_vec(),
    ))))
}

/// Outcome of building one row.
pub enum RowBuild {
    /// The row rendered normally.
    Ready(BoxedStyler),
    /// The row could not be built; the record is kept so a fallback can
    /// still identify the container.
    Failed(ContainerRecord),
}

/// The header plus one build outcome per record, in collection order.
pub struct TableBuild {
    /// Header styler.
    pub header: BoxedStyler,
    /// Row outcomes, index-aligned with the collection's records.
    pub rows: Vec<RowBuild>,
}

/// Builds all rows concurrently, one task per record.
///
/// Each task owns a clone of its record and reports back with the row's
/// index; the collector writes every result into a distinct slot of the
/// output, so no two tasks ever touch the same element. Results land in
/// collection order regardless of completion order.
pub async fn build_table(total: usize, containers: &ContainerCollection) -> TableBuild {
    let mut tasks = JoinSet::new();
    for (index, record) in containers.records().iter().enumerate() {
        let record = record.clone();
        tasks.spawn(async move {
            let outcome = match build_row(total, &record) {
                Ok(row) => RowBuild::Ready(row),
                Err(err) => {
                    warn!(id = %record.id(), error = %err, "failed to build table row");
                    RowBuild::Failed(record)
                }
            };
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<RowBuild>> = Vec::new();
    slots.resize_with(containers.len(), || None);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(err) => warn!(error = %err, "row build task panicked"),
        }
    }

    let rows = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            // A slot is only empty if its task panicked.
            slot.unwrap_or_else(|| {
                RowBuild::Failed(
                    containers
                        .get(index)
                        .cloned()
                        .unwrap_or_else(|| placeholder_record(index)),
                )
            })
        })
        .collect();

    TableBuild {
        header: build_header(total),
        rows,
    }
}

fn placeholder_record(index: usize) -> ContainerRecord {
    use dctop_common::types::ContainerId;
    use dctop_runtime::record::InspectInfo;

    ContainerRecord::new(
        ContainerId::new(format!("unknown-{index}")),
        "?",
        "?",
        "?",
        None,
        InspectInfo::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dctop_common::types::ContainerId;
    use dctop_runtime::record::{
        CachedStats, CpuCounters, InspectInfo, MemoryCounters, StatsSample,
    };

    use crate::styler::{VERTICAL_LINE, render_line};

    fn record_with_stats() -> ContainerRecord {
        let mut stats = CachedStats::from_first_sample(StatsSample {
            cpu: CpuCounters {
                container_usage: 100,
                system_usage: 1000,
            },
            memory: MemoryCounters {
                usage: 1 << 29,
                limit: 1 << 30,
            },
            network: std::collections::BTreeMap::new(),
        });
        stats.advance(StatsSample {
            cpu: CpuCounters {
                container_usage: 200,
                system_usage: 2000,
            },
            memory: MemoryCounters {
                usage: 1 << 29,
                limit: 1 << 30,
            },
            network: std::collections::BTreeMap::new(),
        });
        ContainerRecord::new(
            ContainerId::new("ab12cd34ef56".repeat(5) + "abcd"),
            "web-1",
            "nginx:latest",
            "running",
            Some(stats),
            InspectInfo::default(),
        )
    }

    #[test]
    fn widths_round_up_per_column() {
        let widths = cell_widths(100);
        assert_eq!(widths, [4, 4, 12, 24, 28, 28]);
        // A width that does not divide evenly rounds every column up.
        let widths = cell_widths(78);
        assert_eq!(widths, [4, 4, 10, 19, 22, 22]);
    }

    #[test]
    fn header_contains_titles_and_separators() {
        let mut header = build_header(100);
        let line: String = render_line(header.as_mut(), 100)
            .iter()
            .map(|cell| if cell.is_empty() { ' ' } else { cell.ch })
            .collect();
        assert!(line.starts_with("ID  "));
        assert!(line.contains(VERTICAL_LINE));
        assert!(line.contains("Name"));
        assert!(line.contains("CPU"));
    }

    #[test]
    fn sort_keys_follow_column_geometry() {
        // Content width 100: id [0,4), sep 4, state [5,9), sep 9,
        // name [10,22), sep 22, image [23,47).
        assert_eq!(sort_key_at(0, 100), Some(SortKey::None));
        assert_eq!(sort_key_at(4, 100), None);
        assert_eq!(sort_key_at(5, 100), Some(SortKey::State));
        assert_eq!(sort_key_at(10, 100), Some(SortKey::Name));
        assert_eq!(sort_key_at(23, 100), Some(SortKey::Image));
        assert_eq!(sort_key_at(48, 100), Some(SortKey::Memory));
        assert_eq!(sort_key_at(77, 100), Some(SortKey::Cpu));
        assert_eq!(sort_key_at(500, 100), None);
    }

    #[test]
    fn row_shows_identity_and_cpu_percentage() {
        let record = record_with_stats();
        let mut row = build_row(120, &record).expect("row");
        let line: String = render_line(row.as_mut(), 120)
            .iter()
            .map(|cell| if cell.is_empty() { ' ' } else { cell.ch })
            .collect();
        assert!(line.starts_with("ab12"));
        assert!(line.contains("web-1"));
        assert!(line.contains("nginx:latest"));
        assert!(line.contains("10.00%"));
        assert!(line.contains("0.50GB/1.00GB"));
    }

    #[test]
    fn row_without_stats_is_an_error() {
        let record = ContainerRecord::new(
            ContainerId::new("deadbeef"),
            "n",
            "i",
            "exited",
            None,
            InspectInfo::default(),
        );
        assert!(matches!(
            build_row(100, &record),
            Err(TuiError::MissingStats { .. })
        ));
    }

    #[test]
    fn deleted_rows_are_struck_through() {
        let mut record = record_with_stats();
        record.mark_deleted();
        let mut row = build_row(120, &record).expect("row");
        let cells = render_line(row.as_mut(), 10);
        assert_eq!(cells[1].ch, '-');
        assert_eq!(cells[3].ch, '-');
    }

    #[tokio::test]
    async fn build_table_keeps_collection_order() {
        let with_stats = record_with_stats();
        let without_stats = ContainerRecord::new(
            ContainerId::new("feedface"),
            "n",
            "i",
            "exited",
            None,
            InspectInfo::default(),
        );
        let collection =
            ContainerCollection::new(vec![with_stats.clone(), without_stats, with_stats]);
        let build = build_table(100, &collection).await;
        assert_eq!(build.rows.len(), 3);
        assert!(matches!(build.rows[0], RowBuild::Ready(_)));
        assert!(
            matches!(&build.rows[1], RowBuild::Failed(record) if record.id().as_str() == "feedface")
        );
        assert!(matches!(build.rows[2], RowBuild::Ready(_)));
    }
}
