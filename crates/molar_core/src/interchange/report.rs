//! Plain-text calculation report.
//!
//! The layout is for people, not parsers: fixed headings, masses to four
//! decimals, left-aligned columns padded by character count.

use crate::model::accumulator::format_quantity;
use crate::repo::element_repo::RepoResult;
use crate::service::calculator_service::MassComputation;
use log::info;
use std::fmt::Write as _;
use std::path::Path;

/// Name printed when the accumulator has none.
pub const UNNAMED_COMPOUND: &str = "Неизвестное соединение";

/// `chrono` format of the timestamp line.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const RULE_WIDTH: usize = 50;

/// Inputs for one rendered report.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub compound_name: Option<&'a str>,
    pub formula: &'a str,
    pub computation: &'a MassComputation,
    /// Already formatted with [`REPORT_TIMESTAMP_FORMAT`].
    pub calculated_at: &'a str,
}

pub fn render_report(input: &ReportInput<'_>) -> String {
    let heavy_rule = "=".repeat(RULE_WIDTH);
    let light_rule = "-".repeat(RULE_WIDTH);
    let name = input
        .compound_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNNAMED_COMPOUND);

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "РЕЗУЛЬТАТЫ РАСЧЕТА МОЛЯРНОЙ МАССЫ");
    let _ = writeln!(out, "{heavy_rule}");
    let _ = writeln!(out, "Дата расчета: {}", input.calculated_at);
    let _ = writeln!(out, "Соединение: {name}");
    let _ = writeln!(out, "Формула: {}", input.formula);
    let _ = writeln!(
        out,
        "Молярная масса: {:.4} г/моль\n",
        input.computation.total_mass
    );
    let _ = writeln!(out, "ДЕТАЛИ РАСЧЕТА:");
    let _ = writeln!(out, "{light_rule}");
    let _ = writeln!(
        out,
        "{:<15} {:<10} {:<10} {:<12} {:<12}",
        "Элемент", "Символ", "Кол-во", "Ат. масса", "Вклад"
    );
    let _ = writeln!(out, "{light_rule}");
    for item in &input.computation.breakdown {
        let _ = writeln!(
            out,
            "{:<15} {:<10} {:<10} {:<12} {:<12}",
            item.name,
            item.symbol,
            format_quantity(item.quantity),
            format!("{:.4}", item.atomic_mass),
            format!("{:.4}", item.contribution),
        );
    }
    out
}

/// Renders and writes the report to `path`, replacing any existing file.
pub fn write_report(path: impl AsRef<Path>, input: &ReportInput<'_>) -> RepoResult<()> {
    std::fs::write(path.as_ref(), render_report(input))?;
    info!(
        "event=report_export module=interchange status=ok rows={}",
        input.computation.breakdown.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_report, ReportInput, UNNAMED_COMPOUND};
    use crate::service::calculator_service::{Contribution, MassComputation};

    fn water() -> MassComputation {
        MassComputation {
            total_mass: 18.015,
            breakdown: vec![
                Contribution {
                    symbol: "H".to_string(),
                    quantity: 2.0,
                    contribution: 2.016,
                    atomic_mass: 1.008,
                    name: "Водород".to_string(),
                },
                Contribution {
                    symbol: "O".to_string(),
                    quantity: 1.0,
                    contribution: 15.999,
                    atomic_mass: 15.999,
                    name: "Кислород".to_string(),
                },
            ],
        }
    }

    #[test]
    fn report_has_fixed_layout() {
        let computation = water();
        let text = render_report(&ReportInput {
            compound_name: Some("Вода"),
            formula: "H₍2.0₎ + O",
            computation: &computation,
            calculated_at: "2024-05-01 12:00:00",
        });
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "РЕЗУЛЬТАТЫ РАСЧЕТА МОЛЯРНОЙ МАССЫ");
        assert_eq!(lines[1], "=".repeat(50));
        assert_eq!(lines[2], "Дата расчета: 2024-05-01 12:00:00");
        assert_eq!(lines[3], "Соединение: Вода");
        assert_eq!(lines[4], "Формула: H₍2.0₎ + O");
        assert_eq!(lines[5], "Молярная масса: 18.0150 г/моль");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "ДЕТАЛИ РАСЧЕТА:");
        assert_eq!(
            lines[9],
            "Элемент         Символ     Кол-во     Ат. масса    Вклад       "
        );
        assert_eq!(
            lines[11],
            "Водород         H          2.0        1.0080       2.0160      "
        );
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn missing_name_uses_placeholder() {
        let computation = water();
        let text = render_report(&ReportInput {
            compound_name: None,
            formula: "H₍2.0₎ + O",
            computation: &computation,
            calculated_at: "2024-05-01 12:00:00",
        });
        assert!(text.contains(&format!("Соединение: {UNNAMED_COMPOUND}")));
    }
}
