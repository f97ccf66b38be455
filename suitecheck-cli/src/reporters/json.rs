//! JSON reporter
//!
//! Outputs the report (or the part a subcommand produced) as pretty-printed
//! JSON. Field names follow the report model; the health fields sit at the
//! top level next to `timestamp` and `coverage`.

use anyhow::Result;

use super::ReportView;

/// Render a view as JSON
pub fn render(view: ReportView<'_>) -> Result<String> {
    let json = match view {
        ReportView::Full(report) => serde_json::to_string_pretty(report)?,
        ReportView::Coverage(coverage) => serde_json::to_string_pretty(coverage)?,
        ReportView::Health(health) => serde_json::to_string_pretty(health)?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Report;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_flat_health_fields() {
        let report = test_report();
        let json_str = render(ReportView::Full(&report)).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["overall_health"], "degraded");
        assert_eq!(parsed["component_health"]["test_structure"], "degraded");
        assert_eq!(parsed["coverage"]["requirements"][0]["id"], "1.1");
        assert_eq!(
            parsed["coverage"]["properties"][0]["evidence"][0]["test_function_name"],
            "TestApplyIdempotent"
        );
    }

    #[test]
    fn test_json_report_reloads() {
        let report = test_report();
        let json_str = render(ReportView::Full(&report)).unwrap();
        let back: Report = serde_json::from_str(&json_str).expect("report deserializes");
        assert_eq!(back.coverage.requirements.len(), 2);
        assert_eq!(back.health.issues, report.health.issues);
        assert_eq!(back.timestamp, report.timestamp);
    }

    #[test]
    fn test_json_coverage_only() {
        let report = test_report();
        let json_str = render(ReportView::Coverage(&report.coverage)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.get("overall_health").is_none());
        assert_eq!(parsed["missing_coverage"].as_array().unwrap().len(), 1);
    }
}
