use assess_core::model::{Choice, QuestionId, SubmitTrigger, TestId};

use super::test_harness::{TEST_ID, ViewKind, seeded_backend, setup_view_harness};

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_start_form() {
    let mut harness = setup_view_harness(ViewKind::Home, seeded_backend(1));
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Take a test"), "missing heading in {html}");
    assert!(html.contains("test-id"), "missing input in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn do_test_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(ViewKind::DoTest(TEST_ID), seeded_backend(3));
    harness.rebuild();
    assert!(harness.render().contains("Loading test..."));

    for _ in 0..5 {
        harness.drive_async().await;
    }
    let html = harness.render();
    assert!(html.contains("Ownership basics"), "missing title in {html}");
    assert!(html.contains("Question 1 of 3"), "missing position in {html}");
    assert!(html.contains("0 of 3 answered (0%)"), "missing progress in {html}");
    assert!(html.contains("Started 2023-11-14 22:13 UTC"), "missing start time in {html}");
    assert!(html.contains("Transfers ownership"), "missing option in {html}");
    assert!(html.contains("<code>move</code>"), "prompt not rendered as markdown in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn result_view_smoke_renders_score() {
    let backend = seeded_backend(2);
    let mut harness = setup_view_harness(ViewKind::Result(TEST_ID), backend);

    let attempt = harness
        .services
        .attempts()
        .start_attempt(TestId::new(TEST_ID))
        .await
        .expect("start attempt");
    attempt
        .set_answer(QuestionId::new(1), Choice::B)
        .expect("answer");
    attempt.submit(SubmitTrigger::Manual).await.expect("submit");
    assert_eq!(harness.backend.submissions().unwrap().len(), 1);

    harness.rebuild();
    for _ in 0..5 {
        harness.drive_async().await;
    }
    let html = harness.render();
    assert!(html.contains("50%"), "missing score in {html}");
    assert!(html.contains("Passed"), "missing verdict in {html}");
    assert!(html.contains("1 of 2 correct"), "missing count in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn result_view_smoke_reports_missing_attempt() {
    let mut harness = setup_view_harness(ViewKind::Result(TEST_ID), seeded_backend(1));
    harness.rebuild();
    for _ in 0..5 {
        harness.drive_async().await;
    }
    let html = harness.render();
    assert!(
        html.contains("No submitted attempt was found"),
        "missing error in {html}"
    );
}
