use crate::compute::SimulationResult;
use crate::validation::Violation;
use std::fmt::Write;

/// One numbered line per violation, in the order they were reported.
pub fn format_violations(violations: &[Violation]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Model rejected with {} violation(s):", violations.len());
    for (i, v) in violations.iter().enumerate() {
        let _ = write!(out, "{:>3}. [{}] {}", i + 1, v.kind, v.message);
        if let Some(id) = &v.offending_id {
            let _ = write!(out, " (at '{}')", id);
        }
        let _ = writeln!(out);
    }
    out
}

/// Stock values as a fixed-width table, one row per printed grid point.
/// `every` thins the rows; the final point is always printed.
pub fn format_series_table(result: &SimulationResult, every: usize) -> String {
    let every = every.max(1);
    let ids: Vec<&str> = result.stocks.keys().map(String::as_str).collect();
    let width = ids.iter().map(|id| id.len()).max().unwrap_or(0).max(12);

    let mut out = String::new();
    let _ = write!(out, "{:>10}", "time");
    for id in &ids {
        let _ = write!(out, "  {:>width$}", id, width = width);
    }
    let _ = writeln!(out);

    let last = result.time.len().saturating_sub(1);
    for (i, t) in result.time.iter().enumerate() {
        if i % every != 0 && i != last {
            continue;
        }
        let _ = write!(out, "{:>10.3}", t);
        for id in &ids {
            let _ = write!(out, "  {:>width$.3}", result.stocks[*id][i], width = width);
        }
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::RunMetadata;
    use crate::model::{TimeConfig, TimeUnit};
    use crate::validation::ViolationKind;
    use std::collections::BTreeMap;

    #[test]
    fn test_violations_are_numbered() {
        let violations = vec![
            Violation::new(ViolationKind::UnknownReference, "equation references unknown 'x'").at("revenue"),
            Violation::new(ViolationKind::DependencyCycle, "a -> b -> a"),
        ];
        let out = format_violations(&violations);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Model rejected with 2 violation(s):");
        assert_eq!(lines[1], "  1. [unknown_reference] equation references unknown 'x' (at 'revenue')");
        assert_eq!(lines[2], "  2. [dependency_cycle] a -> b -> a");
    }

    #[test]
    fn test_table_keeps_last_row() {
        let result = SimulationResult {
            time: vec![0.0, 1.0, 2.0, 3.0],
            stocks: BTreeMap::from([("cash_reserves".to_string(), vec![1.0, 2.0, 3.0, 4.0])]),
            flows: BTreeMap::new(),
            auxiliaries: BTreeMap::new(),
            metadata: RunMetadata {
                model_name: "m".into(),
                parameters: BTreeMap::new(),
                time_config: TimeConfig::new(0.0, 3.0, 1.0, TimeUnit::Months),
            },
        };
        let out = format_series_table(&result, 2);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("cash_reserves"));
        assert!(lines[1].trim_start().starts_with("0.000"));
        assert!(lines[2].trim_start().starts_with("2.000"));
        assert!(lines[3].trim_start().starts_with("3.000"));
    }
}
