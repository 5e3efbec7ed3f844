//! Box-drawn result table.
//!
//! Column widths are measured in terminal cells, so the check marks and
//! dashes in the Result column line up with ASCII text.

use std::time::Duration;

use storecheck_domain::{CaseOutcome, ResultRow, TestResults};
use unicode_width::UnicodeWidthStr;

/// Title centered above the table.
pub const REPORT_TITLE: &str = "API Test Results";

const HEADERS: [&str; 5] = ["Method", "Endpoint", "User", "Expected", "Result"];

/// Border pieces of one horizontal rule: left, fill, junction, right.
struct Rule {
    left: char,
    fill: char,
    junction: char,
    right: char,
}

const TOP: Rule = Rule {
    left: '╒',
    fill: '═',
    junction: '╤',
    right: '╕',
};
const HEADER_SEPARATOR: Rule = Rule {
    left: '╞',
    fill: '═',
    junction: '╪',
    right: '╡',
};
const ROW_SEPARATOR: Rule = Rule {
    left: '├',
    fill: '─',
    junction: '┼',
    right: '┤',
};
const BOTTOM: Rule = Rule {
    left: '╘',
    fill: '═',
    junction: '╧',
    right: '╛',
};

/// Text of the Result column for `outcome`.
#[must_use]
pub fn result_cell(outcome: &CaseOutcome) -> String {
    match outcome {
        CaseOutcome::Passed { .. } => "✔".to_string(),
        CaseOutcome::Failed {
            status: Some(status),
            ..
        } => format!("✖ ({status})"),
        CaseOutcome::Failed { status: None, .. } => "✖ (error)".to_string(),
        CaseOutcome::Skipped { .. } => "– skipped".to_string(),
    }
}

/// One-line totals shown under the table.
#[must_use]
pub fn summary_line(results: &TestResults, elapsed: Duration) -> String {
    format!(
        "{} passed, {} failed, {} skipped of {} in {:.2}s",
        results.passed,
        results.failed,
        results.skipped,
        results.total,
        elapsed.as_secs_f64()
    )
}

/// Renders title, table and summary line.
#[must_use]
pub fn render_report(results: &TestResults, elapsed: Duration) -> String {
    let rows: Vec<[String; 5]> = results.rows.iter().map(cells).collect();

    let mut widths = HEADERS.map(UnicodeWidthStr::width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let total_width = widths.iter().map(|w| w + 3).sum::<usize>() + 1;
    let mut out = String::new();
    out.push_str(&centered(REPORT_TITLE, total_width));
    out.push('\n');

    push_rule(&mut out, &TOP, &widths);
    push_cells(&mut out, &HEADERS.map(ToString::to_string), &widths);
    push_rule(&mut out, &HEADER_SEPARATOR, &widths);
    for (index, row) in rows.iter().enumerate() {
        if index > 0 {
            push_rule(&mut out, &ROW_SEPARATOR, &widths);
        }
        push_cells(&mut out, row, &widths);
    }
    push_rule(&mut out, &BOTTOM, &widths);

    out.push_str(&summary_line(results, elapsed));
    out.push('\n');
    out
}

fn cells(row: &ResultRow) -> [String; 5] {
    [
        row.method.to_string(),
        row.path.clone(),
        row.role.to_string(),
        row.expected.description(),
        result_cell(&row.outcome),
    ]
}

fn centered(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width()) / 2;
    format!("{}{text}", " ".repeat(padding))
}

fn push_rule(out: &mut String, rule: &Rule, widths: &[usize; 5]) {
    out.push(rule.left);
    for (index, width) in widths.iter().enumerate() {
        if index > 0 {
            out.push(rule.junction);
        }
        out.extend(std::iter::repeat_n(rule.fill, width + 2));
    }
    out.push(rule.right);
    out.push('\n');
}

fn push_cells(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    out.push('│');
    for (cell, width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(width.saturating_sub(cell.width()) + 1));
        out.push('│');
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use storecheck_domain::{HttpMethod, Role, StatusExpectation};

    fn sample() -> TestResults {
        let rows = vec![
            ResultRow::from_status(
                HttpMethod::Get,
                "/api/categories",
                Role::Customer,
                StatusExpectation::exact(200),
                200,
            ),
            ResultRow::from_status(
                HttpMethod::Post,
                "/api/shipments/o2",
                Role::Admin,
                StatusExpectation::created(),
                500,
            ),
            ResultRow::transport_failure(
                HttpMethod::Get,
                "/api/orders",
                Role::Customer,
                StatusExpectation::exact(200),
                "connection refused",
            ),
        ];
        TestResults::new(rows, 1234)
    }

    #[test]
    fn test_result_cells() {
        let results = sample();
        let cells: Vec<String> = results.rows.iter().map(|r| result_cell(&r.outcome)).collect();
        assert_eq!(cells, vec!["✔", "✖ (500)", "✖ (error)"]);
        assert_eq!(
            result_cell(&CaseOutcome::Skipped {
                reason: "wishlistItemId was never captured".to_string()
            }),
            "– skipped"
        );
    }

    #[test]
    fn test_table_lines_have_equal_width() {
        let rendered = render_report(&sample(), Duration::from_millis(1234));
        let lines: Vec<&str> = rendered.lines().collect();

        // title, top, header, header rule, 3 rows with 2 separators, bottom, summary
        assert_eq!(lines.len(), 11);
        let table = &lines[1..lines.len() - 1];
        let width = table[0].width();
        assert!(table.iter().all(|line| line.width() == width));
        assert!(lines[0].trim_start().starts_with(REPORT_TITLE));
        assert!(lines[2].contains("Method") && lines[2].contains("Result"));
        assert!(rendered.contains("│ POST   │ /api/shipments/o2 │ ADMIN    │ 200,201  │ ✖ (500)   │"));
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(&sample(), Duration::from_millis(1500)),
            "1 passed, 2 failed, 0 skipped of 3 in 1.50s"
        );
    }
}
