use std::path::Path;

use crate::audit::evaluation::AuditReport;
use crate::error::Result;

/// Write one row per (meal type, pattern) to a CSV file.
pub fn write_audit_csv(report: &AuditReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "meal_type",
        "pattern_id",
        "target_pct",
        "realized_pct",
        "deviation_pct",
    ])?;

    for share in &report.shares {
        wtr.write_record([
            share.meal_type.to_string(),
            share.pattern_id.clone(),
            format!("{:.2}", share.target_pct),
            format!("{:.2}", share.realized_pct),
            format!("{:+.2}", share.deviation()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print the audit summary to stdout.
pub fn print_audit(report: &AuditReport) {
    println!("\n=== Distribution audit ({} runs) ===\n", report.runs.len());

    let width = report
        .shares
        .iter()
        .map(|s| s.pattern_id.len())
        .max()
        .unwrap_or(10);

    for share in &report.shares {
        println!(
            "{:<10} {:<width$}  target {:>6.2}%  realized {:>6.2}%  ({:+.2})",
            share.meal_type.as_str(),
            share.pattern_id,
            share.target_pct,
            share.realized_pct,
            share.deviation(),
            width = width
        );
    }

    println!();
    println!("Average max ingredient usage: {:.2}", report.avg_max_usage());
    println!(
        "Runs over the repetition cap: {}/{}",
        report.runs_over_bound(),
        report.runs.len()
    );
    if let Some(worst) = report.worst_deviation() {
        println!(
            "Largest gap: {} {} ({:+.2} pp)",
            worst.meal_type,
            worst.pattern_id,
            worst.deviation()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::evaluation::{PatternShare, RunMetrics};
    use crate::models::MealType;

    #[test]
    fn test_csv_rows() {
        let report = AuditReport {
            runs: vec![RunMetrics {
                seed: 1,
                total_meals: 7,
                warnings: 0,
                max_ingredient_usage: 2,
                bound_exceeded: false,
            }],
            shares: vec![PatternShare {
                meal_type: MealType::new("Lunch").unwrap(),
                pattern_id: "lunch-1".to_string(),
                target_pct: 60.0,
                realized_pct: 57.142857,
            }],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.csv");
        write_audit_csv(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "meal_type,pattern_id,target_pct,realized_pct,deviation_pct");
        assert_eq!(lines[1], "Lunch,lunch-1,60.00,57.14,-2.86");
    }
}
