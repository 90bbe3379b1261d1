use orgtangle::report::{PlainStyler, Status, Styler, spawn_reporter};

#[tokio::test]
async fn reporter_runs_a_full_session() {
    let (reporter, render_task) = spawn_reporter(false, false, 10);

    reporter.begin("checking init.org").await;
    reporter.update("tangling init.org").await;
    reporter.plain("some interleaved log line").await;
    reporter.finish_done("tangled 1 file(s), compiled 0").await;

    drop(reporter);
    render_task.await.expect("render task panicked");
}

#[tokio::test]
async fn events_after_finish_are_ignored() {
    let (reporter, render_task) = spawn_reporter(false, true, 10);

    reporter.begin("checking").await;
    reporter.finish_failed("tangling failed").await;

    // A second life cycle must not restart the display.
    reporter.begin("zombie").await;
    reporter.update("still zombie").await;
    reporter.finish_ok("never shown").await;

    drop(reporter);
    render_task.await.expect("render task panicked");
}

#[tokio::test]
async fn detail_is_quiet_unless_verbose() {
    let (reporter, render_task) = spawn_reporter(false, false, 10);
    reporter.begin("checking").await;
    reporter.detail("engine chatter").await;
    reporter.finish_ok("done").await;
    drop(reporter);
    render_task.await.expect("render task panicked");
}

#[test]
fn terminal_status_classification() {
    assert!(Status::Failed.is_terminal());
    assert!(Status::Ok.is_terminal());
    assert!(Status::Done.is_terminal());
    assert!(!Status::Setup.is_terminal());
    assert!(!Status::Doing.is_terminal());
}

#[test]
fn plain_styler_has_no_escapes() {
    let painted = PlainStyler.failed("boom");
    assert_eq!(painted, "boom");
}
