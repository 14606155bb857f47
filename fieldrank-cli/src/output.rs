//! Output formatting: terminal table and JSON.
use std::collections::HashMap;

use fieldrank_core::{InputRecord, RankResult, RankingConfig, RankingOutcome, RawValue};
use serde::Serialize;

use crate::error::{CliError, Result};
use crate::input::FieldSummary;
use crate::sink::WriteReport;

#[derive(Serialize)]
struct JsonRankedRecord<'a> {
    rank: usize,
    id: &'a str,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    records: Vec<JsonRankedRecord<'a>>,
    total_records: usize,
    ranked: usize,
    groups: usize,
    skipped_no_value: usize,
    skipped_zero: usize,
    config: &'a RankingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    write: Option<&'a WriteReport>,
}

/// Compact text form of a cell for display.
pub fn display_value(value: &RawValue) -> String {
    match value {
        RawValue::Null => String::new(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Number(n) => n.to_string(),
        RawValue::Text(s) | RawValue::Object(s) => s.clone(),
        RawValue::List(values) => values.iter().map(display_value).collect::<Vec<_>>().join(", "),
    }
}

/// Ranked rows with the source record's value and group, for display.
fn rows<'a>(results: &'a [RankResult], records: &'a [InputRecord]) -> Vec<JsonRankedRecord<'a>> {
    // Duplicate IDs display the first record's cells.
    let mut by_id: HashMap<&str, &InputRecord> = HashMap::with_capacity(records.len());
    for record in records {
        by_id.entry(record.record_id.as_str()).or_insert(record);
    }

    results
        .iter()
        .map(|r| {
            let record = by_id.get(r.record_id.as_str());
            JsonRankedRecord {
                rank: r.rank,
                id: &r.record_id,
                value: record.map(|rec| display_value(&rec.source_value)).unwrap_or_default(),
                group: record
                    .and_then(|rec| rec.group_value.as_ref())
                    .map(display_value),
            }
        })
        .collect()
}

/// One-line summary matching the grouped/ungrouped distinction.
pub fn summary_line(outcome: &RankingOutcome, grouped: bool, write: Option<&WriteReport>) -> String {
    let count = write.map(|w| w.succeeded).unwrap_or(outcome.results.len());
    let verb = if write.is_some() { "updated" } else { "ranked" };
    let mut line = if grouped {
        format!("{count} records {verb} across {} groups", outcome.group_count)
    } else {
        format!("{count} records {verb}")
    };
    if let Some(w) = write.filter(|w| w.is_partial()) {
        line.push_str(&format!(", {} records failed to write", w.failed));
    }
    line
}

/// Print results as a formatted terminal table.
pub fn print_table(
    outcome: &RankingOutcome,
    records: &[InputRecord],
    config: &RankingConfig,
    write: Option<&WriteReport>,
) {
    let rows = rows(&outcome.results, records);
    let grouped = config.grouping_enabled;

    let id_width = rows.iter().map(|r| r.id.len()).max().unwrap_or(2).max(2);
    let value_width = rows.iter().map(|r| r.value.len()).max().unwrap_or(5).max(5);

    // Header
    if grouped {
        let group_width = rows
            .iter()
            .map(|r| r.group.as_deref().map_or(0, str::len))
            .max()
            .unwrap_or(5)
            .max(5);
        println!("Rank | {:<id_width$} | {:>value_width$} | Group", "ID", "Value");
        println!("-----|-{}-|-{}-|-{}", "-".repeat(id_width), "-".repeat(value_width), "-".repeat(group_width));
        for r in &rows {
            println!(
                "{:>4} | {:<id_width$} | {:>value_width$} | {}",
                r.rank,
                r.id,
                r.value,
                r.group.as_deref().unwrap_or("(none)"),
            );
        }
    } else {
        println!("Rank | {:<id_width$} | {:>value_width$}", "ID", "Value");
        println!("-----|-{}-|-{}", "-".repeat(id_width), "-".repeat(value_width));
        for r in &rows {
            println!("{:>4} | {:<id_width$} | {:>value_width$}", r.rank, r.id, r.value);
        }
    }

    println!("\n{}", summary_line(outcome, grouped, write));
    println!(
        "Ranking: {} / {} / {}",
        config.sort_direction, config.ranking_method, config.zero_value_handling,
    );
    if outcome.excluded.total() > 0 {
        println!(
            "Skipped: {} without a numeric value, {} zero",
            outcome.excluded.no_value, outcome.excluded.zero_skipped,
        );
    }
}

/// Results as pretty JSON.
pub fn render_json(
    outcome: &RankingOutcome,
    records: &[InputRecord],
    config: &RankingConfig,
    write: Option<&WriteReport>,
) -> Result<String> {
    let output = JsonOutput {
        records: rows(&outcome.results, records),
        total_records: records.len(),
        ranked: outcome.results.len(),
        groups: outcome.group_count,
        skipped_no_value: outcome.excluded.no_value,
        skipped_zero: outcome.excluded.zero_skipped,
        config,
        write,
    };
    serde_json::to_string_pretty(&output).map_err(CliError::Serialize)
}

/// Print the field inventory as a table.
pub fn print_fields_table(summaries: &[FieldSummary], record_count: usize) {
    let name_width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(5).max(5);

    println!("{:<name_width$} | Filled | Numeric | Rankable", "Field");
    println!("{}-|--------|---------|---------", "-".repeat(name_width));
    for s in summaries {
        println!(
            "{:<name_width$} | {:>6} | {:>7} | {}",
            s.name,
            s.filled,
            s.numeric,
            if s.is_numeric() { "yes" } else { "no" },
        );
    }
    println!("\n{} fields across {} records", summaries.len(), record_count);
}

pub fn render_fields_json(summaries: &[FieldSummary]) -> Result<String> {
    serde_json::to_string_pretty(summaries).map_err(CliError::Serialize)
}
