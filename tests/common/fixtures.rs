use std::path::{Path, PathBuf};

use serde_json::{Value, json};

/// An Apifox-shaped JSON report.
///
/// `steps` are `(id, name, path)`, `failures` are `(step_ref, message)`.
pub fn report(
    suite: &str,
    total: u64,
    failed: u64,
    steps: &[(&str, &str, &str)],
    failures: &[(&str, &str)],
) -> Value {
    let steps: Vec<Value> = steps
        .iter()
        .map(|(id, name, path)| {
            json!({
                "id": id,
                "name": name,
                "metaInfo": { "httpApiPath": path, "httpApiMethod": "get" },
            })
        })
        .collect();
    let failures: Vec<Value> = failures
        .iter()
        .map(|(step_ref, message)| {
            json!({
                "error": { "message": message, "test": "assert" },
                "cursor": { "ref": step_ref },
            })
        })
        .collect();
    json!({
        "collection": {
            "name": suite,
            "testReportInfoUrlPath": format!("https://app.apifox.com/report/{}", suite),
        },
        "result": {
            "stats": { "requests": { "total": total, "failed": failed } },
            "steps": steps,
            "failures": failures,
        },
    })
}

/// Scenario B from the parser tests: two steps, three failures, one orphan.
pub fn login_report() -> Value {
    report(
        "User API",
        5,
        2,
        &[("s1", "Login", "/login"), ("s2", "Logout", "/logout")],
        &[("s1", "timeout"), ("s1", "500 error"), ("s3", "orphan")],
    )
}

pub fn write_report(dir: &Path, stem: &str, report: &Value) -> PathBuf {
    let path = dir.join(format!("{}.json", stem));
    std::fs::write(&path, serde_json::to_string_pretty(report).unwrap()).unwrap();
    path
}
