use crate::aggregate::summary::RunSummary;

// ============================================================================
// Console reporter: run summary for the terminal / CI log
// ============================================================================

/// Format a run summary for terminal output.
///
/// Produces output like:
/// ```text
/// 共测试接口用例12条，失败2条，失败的用例如下:
///
/// ✗ Login  /login  [User API]
///     timeout
///     500 error
///
/// Reports:
///   https://www.apifox.cn/link/project/1/api-test/test-report/2
///
/// Skipped:
///   ci-suite-3: failed to spawn `apifox` ...
///
/// === ✗ Results: 12 cases, 2 failed ===
/// ```
pub fn format_console_report(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&summary.headline());

    if !summary.failures.is_empty() {
        out.push('\n');
        for (case_name, record) in summary.failures.iter() {
            out.push_str(&format!(
                "\u{2717} {}  {}  [{}]\n",
                case_name, record.endpoint_path, record.suite_name
            ));
            for message in record.messages() {
                out.push_str(&format!("    {}\n", message));
            }
        }
    }

    if !summary.report_urls.is_empty() {
        out.push_str("\nReports:\n");
        for url in &summary.report_urls {
            out.push_str(&format!("  {}\n", url));
        }
    }

    if !summary.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for skipped in &summary.skipped {
            out.push_str(&format!("  {}: {}\n", skipped.suite, skipped.reason));
        }
    }

    let marker = if summary.is_success() { "\u{2713}" } else { "\u{2717}" };
    out.push_str(&format!(
        "\n=== {} Results: {} cases, {} failed ===\n",
        marker, summary.total_cases, summary.total_failures
    ));

    out
}
