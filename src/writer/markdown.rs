//! Markdown summary (test_report.md)

use crate::report::ReportArtifact;

/// Render the Markdown summary of a report.
pub fn render_markdown(artifact: &ReportArtifact) -> String {
    let counts = &artifact.counts;
    let mut output = String::from("# Test Report\n\n");

    output.push_str("| Metric | Value |\n|---|---|\n");
    output.push_str(&format!("| Passed | {} |\n", counts.passed));
    output.push_str(&format!("| Failed | {} |\n", counts.failed));
    output.push_str(&format!("| Errored | {} |\n", counts.errored));
    output.push_str(&format!("| Skipped | {} |\n", counts.skipped));
    output.push_str(&format!(
        "| Overall coverage | {} |\n",
        format_percent(artifact.coverage.overall)
    ));
    output.push_str(&format!(
        "| Gate | {} |\n",
        if artifact.gate.ok { "PASS" } else { "FAIL" }
    ));
    output.push_str(&format!("\n**Details**: {}\n", escape_cell(&artifact.gate.details)));

    if !artifact.coverage.files.is_empty() {
        output.push_str("\n## Per-file coverage\n\n");
        output.push_str("| File | Coverage | Missing |\n|---|---|---|\n");
        for file in &artifact.coverage.files {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&file.path),
                format_percent(file.percent),
                escape_cell(&file.missing.join(", "))
            ));
        }
    }

    output.push_str(&format!(
        "\n_Generated {} ({} v{})_\n",
        artifact.timestamp.to_rfc3339(),
        artifact.schema_id,
        artifact.schema_version
    ));

    output
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "n/a".to_string(),
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
