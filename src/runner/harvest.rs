use std::sync::OnceLock;

use regex::Regex;

/// Hosted report links printed by the Apifox CLI, e.g.
/// `https://www.apifox.cn/link/project/123/api-test/test-report/456`.
pub const REPORT_URL_PATTERN: &str =
    r"https://www\.apifox\.cn/link/project/\d+/api-test/test-report/\d+";

fn report_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(REPORT_URL_PATTERN).expect("report url regex"))
}

/// All report links in `text`, in order of appearance.
pub fn harvest_report_urls(text: &str) -> Vec<String> {
    report_url_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
