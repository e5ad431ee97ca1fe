//! # Test Harness
//!
//! A small runner for end-to-end checks that live outside `cargo test`,
//! e.g. scenarios driving a real persistence plugin from the binary.
//!
//! A test case is any closure producing one [`TestResult`]. Cases run in
//! registration order on the calling thread; a failing or panicking case
//! never stops the ones after it. There is no timeout, so a case that hangs
//! blocks the run.

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    name: String,
    passed: bool,
    message: String,
}

impl TestResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_passed(&self) -> bool {
        self.passed
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn assert_true(name: &str, condition: bool, message: &str) -> TestResult {
    if condition {
        TestResult::pass(name, message)
    } else {
        TestResult::fail(name, message)
    }
}

pub fn assert_false(name: &str, condition: bool, message: &str) -> TestResult {
    assert_true(name, !condition, message)
}

/// Two `None`s are equal; otherwise the values are compared with `PartialEq`.
/// On mismatch the message is extended with both values.
pub fn assert_equals<T>(
    name: &str,
    expected: Option<T>,
    actual: Option<T>,
    message: &str,
) -> TestResult
where
    T: PartialEq + Debug,
{
    if expected == actual {
        TestResult::pass(name, message)
    } else {
        TestResult::fail(
            name,
            format!("{message} (expected {expected:?}, got {actual:?})"),
        )
    }
}

/// A registered test case.
pub type TestCase = Box<dyn Fn() -> TestResult>;

/// Results of one run, in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
}

impl HarnessReport {
    fn from_results(results: Vec<TestResult>) -> Self {
        let passed = results.iter().filter(|r| r.is_passed()).count();
        let failed = results.len() - passed;
        Self {
            results,
            passed,
            failed,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Default)]
pub struct TestHarness {
    cases: Vec<(String, TestCase)>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a case under a generated label (`test-1`, `test-2`, ...).
    pub fn add_case<F>(&mut self, case: F)
    where
        F: Fn() -> TestResult + 'static,
    {
        let label = format!("test-{}", self.cases.len() + 1);
        self.add_test(label, case);
    }

    /// Registers a case. A case names its own [`TestResult`]; `label` is
    /// only used to name the failing result when the case panics before
    /// producing one.
    pub fn add_test<F>(&mut self, label: impl Into<String>, case: F)
    where
        F: Fn() -> TestResult + 'static,
    {
        self.cases.push((label.into(), Box::new(case)));
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn run_all_tests(&self) -> Vec<TestResult> {
        self.cases
            .iter()
            .map(|(label, case)| run_case(label, case))
            .collect()
    }

    pub fn run(&self) -> HarnessReport {
        let report = HarnessReport::from_results(self.run_all_tests());
        info!(
            "harness finished: {} passed, {} failed",
            report.passed, report.failed
        );
        report
    }
}

fn run_case(label: &str, case: &TestCase) -> TestResult {
    match panic::catch_unwind(AssertUnwindSafe(case)) {
        Ok(result) => {
            if !result.is_passed() {
                warn!("test {} failed: {}", result.name(), result.message());
            }
            result
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!("test {label} panicked: {reason}");
            TestResult::fail(label, format!("test panicked: {reason}"))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn assert_equals_treats_two_nones_as_equal() {
        assert!(assert_equals::<&str>("x", None, None, "m").is_passed());
    }

    #[test]
    fn assert_equals_compares_values() {
        assert!(!assert_equals("x", Some("a"), Some("b"), "m").is_passed());
        assert!(assert_equals("x", Some(42), Some(42), "m").is_passed());
        assert!(!assert_equals("x", None, Some(1), "m").is_passed());
    }

    #[test]
    fn assert_equals_reports_both_values_on_mismatch() {
        let result = assert_equals("x", Some("a"), Some("b"), "m");
        assert_eq!(result.message(), r#"m (expected Some("a"), got Some("b"))"#);
    }

    #[test]
    fn assert_false_negates() {
        assert!(assert_false("f", false, "m").is_passed());
        assert!(!assert_false("f", true, "m").is_passed());
        assert!(assert_true("t", true, "m").is_passed());
        assert_eq!(assert_true("t", true, "m").name(), "t");
    }

    #[test]
    fn runs_in_registration_order_without_fail_fast() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut harness = TestHarness::new();
        for (i, ok) in [true, false, true].into_iter().enumerate() {
            let seen = Rc::clone(&seen);
            harness.add_test(format!("case-{i}"), move || {
                seen.borrow_mut().push(i);
                assert_true(&format!("case-{i}"), ok, "checked")
            });
        }

        let results = harness.run_all_tests();
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
        let names: Vec<_> = results.iter().map(TestResult::name).collect();
        assert_eq!(names, ["case-0", "case-1", "case-2"]);
        assert!(!results[1].is_passed());
        assert!(results[2].is_passed());
    }

    #[test]
    fn panicking_case_becomes_a_failure() {
        let mut harness = TestHarness::new();
        harness.add_test("boom", || panic!("collaborator exploded"));
        harness.add_test("after", || assert_true("after", true, "still runs"));

        let report = harness.run();
        assert_eq!(report.failed, 1);
        assert_eq!(report.passed, 1);
        assert!(!report.all_passed());
        assert_eq!(report.results[0].name(), "boom");
        assert_eq!(
            report.results[0].message(),
            "test panicked: collaborator exploded"
        );
        assert!(report.results[1].is_passed());
    }

    #[test]
    fn unlabelled_cases_get_positional_labels() {
        let mut harness = TestHarness::new();
        harness.add_case(|| assert_true("named by the case", true, "ok"));
        harness.add_case(|| panic!("no result produced"));

        let results = harness.run_all_tests();
        assert_eq!(harness.len(), 2);
        assert_eq!(results[0].name(), "named by the case");
        assert_eq!(results[1].name(), "test-2");
        assert!(!results[1].is_passed());
    }

    #[test]
    fn empty_harness_reports_success() {
        let harness = TestHarness::new();
        assert!(harness.is_empty());
        let report = harness.run();
        assert!(report.all_passed());
        assert!(report.results.is_empty());
    }
}
