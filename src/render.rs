use std::fmt::Write;

use crate::aggregate::{RecordFilter, WeekSelection};
use crate::models::{Totals, WeeklyRecord};
use crate::weeks::WeekValidation;

/// Thousands separators and at most three decimals without trailing zeros,
/// e.g. `47,000` or `7,692.31`.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (digits, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(fixed.len() + digits.len() / 3 + 1);
    if value < 0.0 && (digits != "0" || !fraction.is_empty()) {
        grouped.push('-');
    }
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

fn format_int(value: i64) -> String {
    format_number(value as f64)
}

pub fn render_table(records: &[WeeklyRecord], totals: &Totals) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "| Week | Material | Target | Volume | Hours Needed | MOD | Available Hours | Excess Hours | Excess/Person |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|---|---|---|");

    if records.is_empty() {
        let _ = writeln!(output, "| - | No records match the current filters. | | | | | | | |");
    }

    for record in records {
        let flag = if record.is_high_excess() { " HIGH" } else { "" };
        let _ = writeln!(
            output,
            "| {} | {} | {:.1} | {} | {} | {} | {} | {} | {:.2}h{} |",
            record.week_number,
            record.material_type,
            record.productivity_target,
            format_int(record.production_volume),
            format_number(record.hours_need),
            format_int(record.mod_count),
            format_number(record.hours_person_available),
            format_number(record.excess_person_hours),
            record.excess_hours_per_person,
            flag
        );
    }

    let _ = writeln!(
        output,
        "| **Total** | | | {} | {} | {} | {} | {} | |",
        format_int(totals.production_volume),
        format_number(totals.hours_need),
        format_int(totals.mod_count),
        format_number(totals.hours_person_available),
        format_number(totals.excess_person_hours)
    );

    output
}

pub fn render_summary_cards(totals: &Totals) -> String {
    let cards = [
        ("Total Volume", format_int(totals.production_volume)),
        ("Total Hours", format_number(totals.hours_need)),
        ("Total MOD", format_int(totals.mod_count)),
        ("Excess Hours", format_number(totals.excess_person_hours)),
    ];

    let mut output = String::new();
    for (title, value) in cards {
        let _ = writeln!(output, "- {title}: {value}");
    }
    output
}

/// Full dashboard: heading, filter summary, table and (when anything
/// matched) the summary cards.
pub fn render_dashboard(
    filter: &RecordFilter,
    weeks: &[i64],
    total_records: usize,
    filtered: &[WeeklyRecord],
    totals: &Totals,
) -> String {
    let mut output = String::new();
    let week_label = match filter.week {
        WeekSelection::All => "all weeks".to_string(),
        WeekSelection::Week(week) => format!("week {week}"),
    };

    let _ = writeln!(output, "# Weekly MOD Report");
    let _ = writeln!(
        output,
        "Showing {} of {} records for {}",
        filtered.len(),
        total_records,
        week_label
    );
    if weeks.is_empty() {
        let _ = writeln!(output, "Weeks: none");
    } else {
        let _ = writeln!(output, "Weeks: {}", join_weeks(weeks));
    }
    if !filter.search.is_empty() {
        let _ = writeln!(output, "Search: \"{}\"", filter.search);
    }
    let _ = writeln!(output);
    output.push_str(&render_table(filtered, totals));

    if !filtered.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Summary");
        output.push_str(&render_summary_cards(totals));
    }

    output
}

fn join_weeks(weeks: &[i64]) -> String {
    let listed: Vec<String> = weeks.iter().map(i64::to_string).collect();
    listed.join(", ")
}

pub fn render_weeks(weeks: &WeekValidation) -> String {
    let mut output = String::new();
    if weeks.existing_weeks().is_empty() {
        let _ = writeln!(output, "No weeks recorded yet.");
    } else {
        let _ = writeln!(output, "Recorded weeks: {}", join_weeks(weeks.existing_weeks()));
    }
    let _ = writeln!(output, "Next available week: {}", weeks.next_available_week());
    output
}
