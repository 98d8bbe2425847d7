// Registration misuse and observed-failure edge cases

use std::sync::Arc;

use cfgprobe_core::application::{ConfigProbe, ProbeBatch};
use cfgprobe_core::domain::RuntimeTarget;
use cfgprobe_core::port::command_runner::mocks::MockCommandRunner;
use cfgprobe_core::ProbeError;

fn batch_with(mock: &Arc<MockCommandRunner>) -> Arc<ProbeBatch> {
    Arc::new(ProbeBatch::new(RuntimeTarget::rails(), mock.clone()))
}

#[tokio::test]
async fn test_registration_after_execution_is_rejected() {
    let mock = Arc::new(MockCommandRunner::new_output(
        "cfgprobe.detecting.config.for.a.b=local\n",
        true,
    ));
    let batch = batch_with(&mock);

    let _first = ConfigProbe::register("a.b", "Rails.application.config.a.b", &batch).unwrap();
    let command_before = batch.composed_command();

    assert!(batch.succeeded().await);

    let late = ConfigProbe::register("x.y", "Rails.application.config.x.y", &batch);
    assert!(matches!(late, Err(ProbeError::LateRegistration(_))));

    // The rejected registration mutated nothing.
    assert_eq!(batch.composed_command(), command_before);
    assert_eq!(
        batch.output().await,
        "cfgprobe.detecting.config.for.a.b=local\n"
    );
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_duplicate_key_is_rejected() {
    let mock = Arc::new(MockCommandRunner::new_output("", true));
    let batch = batch_with(&mock);

    let first = ConfigProbe::register("a.b", "Rails.application.config.a.b", &batch).unwrap();
    let command_before = batch.composed_command();

    let duplicate = ConfigProbe::register("a.b", "Rails.application.config.a.b", &batch);
    assert!(matches!(duplicate, Err(ProbeError::DuplicateKey(_))));
    assert_eq!(batch.composed_command(), command_before);

    // The surviving registration is the first one.
    assert_eq!(
        batch
            .composed_command()
            .matches(first.tag().as_str())
            .count(),
        1
    );
}

#[tokio::test]
async fn test_invalid_keys_are_rejected_at_registration() {
    let mock = Arc::new(MockCommandRunner::new_output("", true));
    let batch = batch_with(&mock);

    for key in ["", "a b", "a=b", ".a", "a.", "a\nb"] {
        let result = ConfigProbe::register(key, "Rails.application.config.x", &batch);
        assert!(
            matches!(result, Err(ProbeError::InvalidKey(_))),
            "expected key '{}' to be rejected",
            key.escape_debug()
        );
    }
}

#[tokio::test]
async fn test_invalid_expressions_are_rejected_at_registration() {
    let mock = Arc::new(MockCommandRunner::new_output("", true));
    let batch = batch_with(&mock);

    for expression in ["", "puts \"x\"", "`date`", "$PATH", "a # b", "a\nb"] {
        let result = ConfigProbe::register("a.b", expression, &batch);
        assert!(
            matches!(result, Err(ProbeError::InvalidExpression(_))),
            "expected expression '{}' to be rejected",
            expression.escape_debug()
        );
    }
}

#[tokio::test]
async fn test_spawn_failure_is_observed_not_raised() {
    let mock = Arc::new(MockCommandRunner::new_fail("sh: not found"));
    let batch = batch_with(&mock);

    let p = ConfigProbe::register("a.b", "Rails.application.config.a.b", &batch).unwrap();

    assert!(!batch.succeeded().await);
    assert_eq!(batch.output().await, "");
    assert!(!p.succeeded().await);
    assert!(!p.matches("local").await);
    assert_eq!(p.value().await, None);

    // The failed invocation is cached like a successful one.
    assert!(!batch.succeeded().await);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_empty_batch_still_runs_once() {
    let mock = Arc::new(MockCommandRunner::new_output("", true));
    let batch = batch_with(&mock);

    assert_eq!(batch.composed_command(), "bin/rails runner \"\"");
    assert!(batch.succeeded().await);
    assert_eq!(batch.output().await, "");
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_concurrent_first_reads_spawn_once() {
    let mock = Arc::new(MockCommandRunner::new_output(
        "cfgprobe.detecting.config.for.a.b=local\n",
        true,
    ));
    let batch = batch_with(&mock);
    let _p = ConfigProbe::register("a.b", "Rails.application.config.a.b", &batch).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let batch = Arc::clone(&batch);
        handles.push(tokio::spawn(async move { batch.succeeded().await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    assert_eq!(mock.call_count(), 1);
}
