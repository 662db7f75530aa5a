mod common;

use apifox_ci::aggregate::aggregator::{Aggregator, deliver};
use apifox_ci::aggregate::summary::{RunSummary, SUCCESS_SUFFIX, aggregate};
use apifox_ci::cli::commands::run_suites;
use apifox_ci::report::parser::parse;
use apifox_ci::report::report_model::FailureMap;
use apifox_ci::trace::logger::TraceLogger;
use common::fixtures::{login_report, report, write_report};
use common::recording::{FakeRunner, RecordingNotifier};
use serde_json::json;

fn suites(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn checkout_report(message: &str) -> serde_json::Value {
    report("Shop", 1, 1, &[("c1", "Checkout", "/checkout")], &[("c1", message)])
}

// ============================================================================
// 1. Folding parsed reports
// ============================================================================

#[test]
fn single_passing_report_summary() {
    let doc = json!({
        "collection": { "name": "Smoke", "testReportInfoUrlPath": "https://r/smoke" },
        "result": { "stats": { "requests": { "total": 10, "failed": 0 } } },
    });
    let summary = aggregate([parse(&doc).unwrap()]);
    assert_eq!(summary.total_cases, 10);
    assert_eq!(summary.total_failures, 0);
    assert!(summary.failures.is_empty());
    assert_eq!(summary.report_urls, vec!["https://r/smoke"]);
    assert!(summary.headline().ends_with(SUCCESS_SUFFIX));
    assert_eq!(summary.headline(), "共测试接口用例10条，全部成功！\n");
}

#[test]
fn failing_headline_counts_failures() {
    let summary = aggregate([parse(&login_report()).unwrap()]);
    assert_eq!(summary.headline(), "共测试接口用例5条，失败2条，失败的用例如下:\n");
    assert!(!summary.is_success());
}

#[test]
fn duplicate_case_across_documents_accumulates() {
    let summary = aggregate([
        parse(&checkout_report("card declined")).unwrap(),
        parse(&checkout_report("stock empty")).unwrap(),
    ]);
    assert_eq!(summary.total_cases, 2);
    assert_eq!(summary.total_failures, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(
        summary.failures.get("Checkout").unwrap().error_text,
        "card declined\nstock empty"
    );
}

#[test]
fn totals_sum_and_urls_concatenate_in_order() {
    let first = report("A", 3, 1, &[("x", "One", "/1")], &[("x", "bad")]);
    let second = report("B", 7, 0, &[], &[]);
    let third = report("C", 2, 2, &[("y", "Two", "/2")], &[("y", "worse")]);
    let summary = aggregate([&first, &second, &third].map(|d| parse(d).unwrap()));

    assert_eq!(summary.total_cases, 12);
    assert_eq!(summary.total_failures, 3);
    assert_eq!(
        summary.report_urls,
        vec![
            "https://app.apifox.com/report/A",
            "https://app.apifox.com/report/B",
            "https://app.apifox.com/report/C",
        ]
    );
    let names: Vec<&str> = summary.failures.case_names().collect();
    assert_eq!(names, vec!["One", "Two"]);
}

#[test]
fn merge_keeps_first_suite_and_path() {
    let mut left = FailureMap::new();
    left.record("Checkout", "Shop", "/checkout", "a");
    let mut right = FailureMap::new();
    right.record("Checkout", "Shop v2", "/v2/checkout", "b");
    right.record("Refund", "Shop v2", "/refund", "c");
    left.merge(right);

    let checkout = left.get("Checkout").unwrap();
    assert_eq!(checkout.suite_name, "Shop");
    assert_eq!(checkout.endpoint_path, "/checkout");
    assert_eq!(checkout.messages().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(left.len(), 2);
}

#[test]
fn empty_fold_is_success() {
    let summary = aggregate(Vec::new());
    assert_eq!(summary, RunSummary::new());
    assert_eq!(summary.headline(), "共测试接口用例0条，全部成功！\n");
}

// ============================================================================
// 2. Aggregator over a runner
// ============================================================================

#[test]
fn aggregator_runs_suites_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_report(dir.path(), "a", &checkout_report("first"));
    let b = write_report(dir.path(), "b", &checkout_report("second"));

    let runner = FakeRunner::new().report("suite-a", a).report("suite-b", b);
    let mut aggregator = Aggregator::new(runner);
    let summary = aggregator.run_all(&suites(&["suite-b", "suite-a"]));

    assert_eq!(aggregator.runner().invoked, vec!["suite-b", "suite-a"]);
    assert_eq!(
        summary.failures.get("Checkout").unwrap().error_text,
        "second\nfirst"
    );
}

#[test]
fn failed_invocation_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let ok = write_report(dir.path(), "ok", &login_report());

    let runner = FakeRunner::new().failing("broken").report("good", ok);
    let summary = Aggregator::new(runner).run_all(&suites(&["broken", "good"]));

    assert_eq!(summary.total_cases, 5);
    assert_eq!(summary.total_failures, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].suite, "broken");
}

#[test]
fn unusable_reports_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "]]").unwrap();
    let no_stats = write_report(dir.path(), "no-stats", &json!({ "result": {} }));
    let good = write_report(dir.path(), "good", &report("G", 4, 0, &[], &[]));

    let runner = FakeRunner::new()
        .report("missing", dir.path().join("never-written.json"))
        .report("garbage", garbage)
        .report("no-stats", no_stats)
        .report("good", good);
    let summary =
        Aggregator::new(runner).run_all(&suites(&["missing", "garbage", "no-stats", "good"]));

    assert_eq!(summary.total_cases, 4);
    assert_eq!(summary.total_failures, 0);
    let skipped: Vec<&str> = summary.skipped.iter().map(|s| s.suite.as_str()).collect();
    assert_eq!(skipped, vec!["missing", "garbage", "no-stats"]);
}

#[test]
fn streamed_urls_precede_report_urls_without_repeats() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = report("A", 1, 0, &[], &[]);
    doc["collection"]["testReportInfoUrlPath"] = json!(["https://streamed/1", "https://doc/1"]);
    let path = write_report(dir.path(), "a", &doc);

    let runner = FakeRunner::new().streamed("a", path, &["https://streamed/1"]);
    let summary = Aggregator::new(runner).run_all(&suites(&["a"]));
    assert_eq!(summary.report_urls, vec!["https://streamed/1", "https://doc/1"]);
}

#[test]
fn streamed_urls_survive_a_broken_report() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::new().streamed(
        "a",
        dir.path().join("absent.json"),
        &["https://streamed/9"],
    );
    let summary = Aggregator::new(runner).run_all(&suites(&["a"]));
    assert_eq!(summary.report_urls, vec!["https://streamed/9"]);
    assert_eq!(summary.skipped.len(), 1);
}

#[test]
fn tracer_records_each_stage() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_report(dir.path(), "good", &login_report());
    let trace_path = dir.path().join("trace.jsonl");

    let runner = FakeRunner::new().report("good", good).failing("bad");
    Aggregator::new(runner)
        .with_tracer(TraceLogger::new(&trace_path))
        .run_all(&suites(&["bad", "good"]));

    let lines: Vec<serde_json::Value> = std::fs::read_to_string(&trace_path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["suite"], "bad");
    assert_eq!(lines[0]["stage"], "invoke");
    assert_eq!(lines[0]["ok"], false);
    assert_eq!(lines[1]["stage"], "invoke");
    assert_eq!(lines[2]["stage"], "parse");
    assert_eq!(lines[2]["total"], 5);
    assert_eq!(lines[2]["failed"], 2);
}

#[test]
fn unopenable_trace_file_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_report(dir.path(), "good", &login_report());
    let trace_path = dir.path().join("no-such-dir").join("trace.jsonl");

    let summary = Aggregator::new(FakeRunner::new().report("good", good))
        .with_tracer(TraceLogger::new(&trace_path))
        .run_all(&suites(&["good"]));

    assert_eq!(summary.total_cases, 5);
    assert!(!trace_path.exists());
}

// ============================================================================
// 3. Notification hand-off
// ============================================================================

#[test]
fn run_notifies_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_report(dir.path(), "a", &checkout_report("first"));
    let b = write_report(dir.path(), "b", &checkout_report("second"));
    let notifier = RecordingNotifier::default();

    let outcome = run_suites(
        FakeRunner::new().report("a", a).report("b", b),
        &suites(&["a", "b"]),
        Some(&notifier),
        TraceLogger::disabled(),
    );

    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, "共测试接口用例2条，失败2条，失败的用例如下:\n");
    assert!(!sent[0].is_success);
    assert_eq!(sent[0].report_urls.len(), 2);
    assert_eq!(sent[0].failures[0].0, "Checkout");
    assert_eq!(sent[0].failures[0].1.error_text, "first\nsecond");
    assert!(!outcome.succeeded());
}

#[test]
fn notification_failure_keeps_summary() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_report(dir.path(), "good", &report("G", 3, 0, &[], &[]));
    let notifier = RecordingNotifier::failing();

    let outcome = run_suites(
        FakeRunner::new().report("good", good),
        &suites(&["good"]),
        Some(&notifier),
        TraceLogger::disabled(),
    );

    assert_eq!(outcome.summary.total_cases, 3);
    assert!(outcome.summary.is_success());
    assert!(matches!(outcome.delivery, Some(Err(_))));
    assert!(!outcome.succeeded());
}

#[test]
fn no_notifier_means_no_delivery() {
    let outcome = run_suites(
        FakeRunner::new(),
        &suites(&[]),
        None,
        TraceLogger::disabled(),
    );
    assert!(outcome.delivery.is_none());
    assert!(outcome.succeeded());
}

#[test]
fn empty_run_still_notifies_zero_cases() {
    let notifier = RecordingNotifier::default();
    let outcome = run_suites(
        FakeRunner::new(),
        &suites(&[]),
        Some(&notifier),
        TraceLogger::disabled(),
    );

    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, "共测试接口用例0条，全部成功！\n");
    assert!(sent[0].is_success);
    assert!(outcome.succeeded());
}

#[test]
fn deliver_passes_success_flag() {
    let summary = aggregate([parse(&report("S", 2, 0, &[], &[])).unwrap()]);
    let notifier = RecordingNotifier::default();
    deliver(&summary, &notifier).unwrap();
    let sent = notifier.sent.borrow();
    assert!(sent[0].is_success);
    assert!(sent[0].failures.is_empty());
}
