//! Report rendering
//!
//! Pure string builders over a finished run's results and summary. The
//! renderers consume engine output only; they never re-query the engine.

use std::str::FromStr;

use crate::results::BatchReport;
use crate::types::{ConvoyError, ConvoyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for ReportFormat {
    type Err = ConvoyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(ConvoyError::Config(format!(
                "unknown report format '{other}' (expected text, json, or markdown)"
            ))),
        }
    }
}

pub fn render(report: &BatchReport, format: ReportFormat) -> ConvoyResult<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => render_json(report),
        ReportFormat::Markdown => Ok(render_markdown(report)),
    }
}

pub fn render_text(report: &BatchReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    let rule = "=".repeat(70);

    out.push_str(&rule);
    out.push_str("\nEXECUTION SUMMARY\n");
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("Total Commands: {}\n", summary.total_commands));
    out.push_str(&format!("Executed: {}\n", summary.executed));
    out.push_str(&format!("Successful: {}\n", summary.successful));
    out.push_str(&format!("Failed: {}\n", summary.failed));
    out.push_str(&format!("Success Rate: {:.1}%\n", summary.success_rate()));
    out.push_str(&format!(
        "Total Duration: {:.1}ms\n",
        summary.total_duration.as_secs_f64() * 1000.0
    ));
    out.push_str(&rule);
    out.push('\n');

    if summary.failed > 0 {
        out.push_str("\nFailed commands:\n");
        for result in report.results.iter().filter(|r| !r.success) {
            out.push_str(&format!(
                "  - {} (exit code {})\n",
                result.name, result.exit_code
            ));
            if let Some(detail) = &result.error_detail {
                out.push_str(&format!("    Error: {detail}\n"));
            }
            let stderr = result.stderr.trim();
            if !stderr.is_empty() {
                let snippet: String = stderr.chars().take(100).collect();
                out.push_str(&format!("    Stderr: {snippet}\n"));
            }
        }
    }

    out
}

pub fn render_json(report: &BatchReport) -> ConvoyResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_markdown(report: &BatchReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str("# Batch Execution Report\n\n");
    out.push_str("## Summary\n\n");
    out.push_str("| Metric | Value |\n|---|---|\n");
    out.push_str(&format!("| Total commands | {} |\n", summary.total_commands));
    out.push_str(&format!("| Executed | {} |\n", summary.executed));
    out.push_str(&format!("| Successful | {} |\n", summary.successful));
    out.push_str(&format!("| Failed | {} |\n", summary.failed));
    out.push_str(&format!(
        "| Success rate | {:.1}% |\n",
        summary.success_rate()
    ));
    out.push_str(&format!(
        "| Total duration | {:.1}ms |\n",
        summary.total_duration.as_secs_f64() * 1000.0
    ));

    out.push_str("\n## Commands\n\n");
    out.push_str("| Command | Status | Exit Code | Attempts | Duration |\n");
    out.push_str("|---|---|---|---|---|\n");
    for result in &report.results {
        let status = if result.success { "ok" } else { "failed" };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {:.1}ms |\n",
            result.name,
            status,
            result.exit_code,
            result.attempts,
            result.duration.as_secs_f64() * 1000.0
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{BatchSummary, ExecutionResult};
    use chrono::Utc;
    use std::time::Duration;

    fn sample_report() -> BatchReport {
        let results = vec![
            ExecutionResult {
                name: "build".to_string(),
                command: "make build".to_string(),
                success: true,
                exit_code: 0,
                attempts: 1,
                duration: Duration::from_millis(120),
                stdout: "done\n".to_string(),
                stderr: String::new(),
                error_detail: None,
                timestamp: Utc::now(),
            },
            ExecutionResult {
                name: "test".to_string(),
                command: "make test".to_string(),
                success: false,
                exit_code: 2,
                attempts: 3,
                duration: Duration::from_millis(480),
                stdout: String::new(),
                stderr: "assertion failed\n".to_string(),
                error_detail: Some("exited with code 2".to_string()),
                timestamp: Utc::now(),
            },
        ];
        let summary = BatchSummary::from_results(2, &results, Duration::from_millis(600));
        BatchReport { summary, results }
    }

    #[test]
    fn format_parses_known_names() {
        assert_eq!("text".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn text_report_lists_failures() {
        let text = render_text(&sample_report());
        assert!(text.contains("EXECUTION SUMMARY"));
        assert!(text.contains("Total Commands: 2"));
        assert!(text.contains("Failed commands:"));
        assert!(text.contains("test (exit code 2)"));
        assert!(text.contains("assertion failed"));
    }

    #[test]
    fn json_report_has_summary_and_results() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["executed"], 2);
        assert_eq!(value["results"][1]["exit_code"], 2);
        assert_eq!(value["results"][1]["attempts"], 3);
    }

    #[test]
    fn markdown_report_tabulates_commands() {
        let md = render_markdown(&sample_report());
        assert!(md.starts_with("# Batch Execution Report"));
        assert!(md.contains("| build | ok | 0 | 1 |"));
        assert!(md.contains("| test | failed | 2 | 3 |"));
    }
}
