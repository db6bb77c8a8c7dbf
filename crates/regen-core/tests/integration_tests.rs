//! Integration tests for regen-core: the controller, cache, resolver and
//! queue wired together over in-memory ports.

use std::{path::PathBuf, sync::Arc, time::Duration};

use regen_core::{
    prelude::*,
    test_utils::{FakeCompiler, FakeMetadata, FakeSolution, Harness, RecordingEngine},
};
use tokio_util::sync::CancellationToken;

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

/// A references B. B owns `defs.tst`.
fn two_projects() -> FakeSolution {
    FakeSolution::new()
        .project("A", "/sln/A", &["B"])
        .project("B", "/sln/B", &[])
        .file("/sln/A/a.cs", "class A {}")
        .file("/sln/B/b.cs", "class B {}")
        .file("/sln/B/defs.tst", "defs")
}

// ============================================================================
// Save handling
// ============================================================================

#[test]
fn saving_definition_renders_own_and_dependent_projects() {
    let h = Harness::new(two_projects());
    h.open();

    h.send(HostEvent::FileChanged("/sln/B/defs.tst".into()));
    assert_eq!(h.run(), 2);

    let rendered: Vec<_> = h.engine.rendered_targets().into_iter().collect();
    assert_eq!(rendered, paths(&["/sln/A/a.cs", "/sln/B/b.cs"]));
    assert_eq!(
        h.solution.persisted(),
        vec![ProjectEntry::new("/sln/B/defs.tst", ProjectId::from("B"))]
    );
}

#[test]
fn consumers_are_exactly_owner_and_dependents() {
    // P references Q; R is unrelated.
    let sln = FakeSolution::new()
        .project("P", "/sln/P", &["Q"])
        .project("Q", "/sln/Q", &[])
        .project("R", "/sln/R", &[])
        .file("/sln/P/p1.cs", "")
        .file("/sln/P/p2.cs", "")
        .file("/sln/Q/q.cs", "")
        .file("/sln/Q/q.tst", "q")
        .file("/sln/R/r.cs", "");
    let h = Harness::new(sln);
    h.open();

    assert_eq!(h.controller.template_saved("/sln/Q/q.tst".as_ref()), 3);
    h.run();

    let rendered: Vec<_> = h.engine.rendered_targets().into_iter().collect();
    assert_eq!(rendered, paths(&["/sln/P/p1.cs", "/sln/P/p2.cs", "/sln/Q/q.cs"]));
}

#[test]
fn references_scope_renders_referenced_projects() {
    let settings = GeneratorSettings {
        consumer_scope: ConsumerScope::References,
        ..GeneratorSettings::default()
    };
    let sln = two_projects().file("/sln/A/a.tst", "a");
    let h = Harness::with_settings(sln, settings);
    h.open();

    h.controller.template_saved("/sln/A/a.tst".as_ref());
    h.run();

    let rendered: Vec<_> = h.engine.rendered_targets().into_iter().collect();
    assert_eq!(rendered, paths(&["/sln/A/a.cs", "/sln/B/b.cs"]));
}

#[test]
fn render_on_save_disabled_only_invalidates() {
    let settings = GeneratorSettings {
        render_on_save: false,
        ..GeneratorSettings::default()
    };
    let h = Harness::with_settings(two_projects(), settings);
    h.open();
    let before = h.controller.cache().invalidation_count();

    h.send(HostEvent::FileChanged("/sln/B/defs.tst".into()));

    assert!(h.queue.is_empty());
    assert_eq!(h.controller.cache().invalidation_count(), before + 1);
}

#[test]
fn saving_malformed_definition_enqueues_nothing() {
    let sln = two_projects().file("/sln/B/bad.tst", FakeCompiler::INVALID_MARKER);
    let h = Harness::new(sln);
    h.open();

    assert_eq!(h.controller.template_saved("/sln/B/bad.tst".as_ref()), 0);
    assert!(h.queue.is_empty());
    assert!(h.solution.persisted().is_empty());
}

#[test]
fn render_all_covers_every_template() {
    let sln = two_projects().file("/sln/A/a.tst", "a");
    let h = Harness::new(sln);
    h.open();

    // defs.tst -> a.cs, b.cs; a.tst -> a.cs
    assert_eq!(h.controller.render_all().unwrap(), 3);
    assert_eq!(h.run(), 2);
    assert_eq!(h.engine.renders().len(), 3);
}

// ============================================================================
// Template cache
// ============================================================================

#[test]
fn malformed_template_is_excluded_and_others_load() {
    let sln = two_projects().file("/sln/A/broken.tst", FakeCompiler::INVALID_MARKER);
    let h = Harness::new(sln);
    h.open();

    let templates = h.controller.cache().templates().unwrap();
    let ids: Vec<_> = templates.iter().map(|t| t.id().to_string()).collect();
    assert_eq!(ids, vec!["/sln/B/defs.tst"]);
}

#[test]
fn renaming_definition_invalidates_exactly_once() {
    let h = Harness::new(two_projects());
    h.open();
    h.controller.cache().templates().unwrap();
    let before = h.controller.cache().invalidation_count();

    h.solution.remove("/sln/B/defs.tst".as_ref());
    h.solution.write("/sln/B/renamed.tst", "defs");
    h.send(HostEvent::FileRenamed {
        old: "/sln/B/defs.tst".into(),
        new: "/sln/B/renamed.tst".into(),
    });

    assert_eq!(h.controller.cache().invalidation_count(), before + 1);
    let templates = h.controller.cache().templates().unwrap();
    assert_eq!(templates[0].definition_path(), PathBuf::from("/sln/B/renamed.tst"));
}

#[test]
fn project_added_while_closed_keeps_cache() {
    let h = Harness::new(two_projects());
    h.open();
    h.controller.cache().templates().unwrap();
    h.send(HostEvent::SolutionClosed);
    let before = h.controller.cache().invalidation_count();

    h.send(HostEvent::ProjectAdded(ProjectId::from("C")));

    assert!(h.controller.cache().is_populated());
    assert_eq!(h.controller.cache().invalidation_count(), before);
}

#[test]
fn project_added_while_open_clears_cache() {
    let h = Harness::new(two_projects());
    h.open();
    h.controller.cache().templates().unwrap();
    let before = h.controller.cache().invalidation_count();

    h.send(HostEvent::ProjectAdded(ProjectId::from("C")));

    assert!(!h.controller.cache().is_populated());
    assert_eq!(h.controller.cache().invalidation_count(), before + 1);
    assert!(h.queue.is_empty());
}

#[test]
fn concurrent_reads_during_invalidation_see_whole_sets() {
    let mut sln = FakeSolution::new().project("P", "/sln/P", &[]);
    for i in 0..16 {
        sln = sln.file(format!("/sln/P/t{i:02}.tst"), "x");
    }
    let h = Arc::new(Harness::new(sln));
    h.open();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let h = h.clone();
            scope.spawn(move || {
                for _ in 0..25 {
                    assert_eq!(h.controller.cache().templates().unwrap().len(), 16);
                }
            });
        }
        let h = h.clone();
        scope.spawn(move || {
            for _ in 0..25 {
                h.send(HostEvent::ProjectAdded(ProjectId::from("X")));
            }
        });
    });
}

// ============================================================================
// Source tracking
// ============================================================================

#[test]
fn identical_changes_render_once() {
    let h = Harness::new(two_projects());
    h.open();

    for _ in 0..5 {
        h.send(HostEvent::FileChanged("/sln/A/a.cs".into()));
    }

    assert_eq!(h.queue.len(), 1);
    assert_eq!(h.run(), 1);
    assert_eq!(h.engine.renders().len(), 1);
    assert_eq!(h.metadata.lookup_count(), 1);
}

#[test]
fn unrelated_target_is_not_rendered() {
    let sln = two_projects()
        .project("C", "/sln/C", &[])
        .file("/sln/C/c.cs", "");
    let h = Harness::new(sln);
    h.open();

    h.send(HostEvent::FileChanged("/sln/C/c.cs".into()));

    assert!(h.queue.is_empty());
}

#[test]
fn templates_sharing_an_output_extension_never_write_the_same_file() {
    // a.tst and shared.tst both write `.g` outputs. A consumes both, so its
    // outputs belong to a.tst, the first by definition path.
    let sln = two_projects()
        .file("/sln/A/a.tst", "output=.g\na")
        .file("/sln/B/shared.tst", "output=.g\nshared");
    let h = Harness::new(sln);
    h.open();

    assert_eq!(h.controller.template_saved("/sln/B/shared.tst".as_ref()), 1);
    h.run();
    let rendered: Vec<_> = h.engine.rendered_targets().into_iter().collect();
    assert_eq!(rendered, paths(&["/sln/B/b.cs"]));

    h.engine.clear();
    h.send(HostEvent::FileChanged("/sln/A/a.cs".into()));
    assert_eq!(h.run(), 1);
    let templates: Vec<_> = h.engine.renders().into_iter().map(|(t, _)| t.to_string()).collect();
    assert_eq!(templates, vec!["/sln/A/a.tst", "/sln/B/defs.tst"]);
}

#[test]
fn template_writing_target_files_renders_nothing() {
    let sln = two_projects().file("/sln/B/clobber.tst", "output=.cs\nclobber");
    let h = Harness::new(sln);
    h.open();

    assert_eq!(h.controller.template_saved("/sln/B/clobber.tst".as_ref()), 0);
    h.send(HostEvent::FileChanged("/sln/B/b.cs".into()));
    h.run();

    let templates: Vec<_> = h.engine.renders().into_iter().map(|(t, _)| t.to_string()).collect();
    assert_eq!(templates, vec!["/sln/B/defs.tst"]);
}

#[test]
fn closed_solution_ignores_file_events() {
    let h = Harness::new(two_projects());

    h.send(HostEvent::FileChanged("/sln/A/a.cs".into()));
    h.send(HostEvent::FileChanged("/sln/B/defs.tst".into()));

    assert!(h.queue.is_empty());
    assert_eq!(h.controller.cache().invalidation_count(), 0);
}

#[test]
fn deleted_target_removes_outputs() {
    let h = Harness::new(two_projects());
    h.open();

    h.send(HostEvent::FileDeleted("/sln/A/a.cs".into()));
    h.run();

    let deletes = h.engine.deletes();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].1, PathBuf::from("/sln/A/a.cs"));
}

#[test]
fn renamed_target_moves_outputs() {
    let h = Harness::new(two_projects());
    h.open();

    h.send(HostEvent::FileRenamed {
        old: "/sln/A/a.cs".into(),
        new: "/sln/A/alpha.cs".into(),
    });
    h.run();

    let renames = h.engine.renames();
    assert_eq!(renames.len(), 1);
    assert_eq!(renames[0].1, PathBuf::from("/sln/A/a.cs"));
    assert_eq!(renames[0].2, PathBuf::from("/sln/A/alpha.cs"));
}

// ============================================================================
// Failure feedback
// ============================================================================

#[test]
fn failed_render_emits_one_notification_and_waits_for_next_event() {
    let h = Harness::new(two_projects());
    h.open();
    h.engine.fail_on("/sln/A/a.cs");

    h.send(HostEvent::FileChanged("/sln/A/a.cs".into()));
    assert_eq!(h.run(), 1);

    // Exactly one synthetic notification; nothing re-queued in this pass.
    let emitted = h.sink.notifications();
    assert_eq!(emitted, vec![Notification::render_failure("/sln/A/a.cs")]);
    assert!(h.queue.is_empty());

    // Delivered back: parked, not re-queued.
    assert_eq!(h.deliver_feedback(), 1);
    assert!(h.queue.is_empty());
    assert_eq!(h.controller.deferred(), paths(&["/sln/A/a.cs"]));
    assert_eq!(h.run(), 0);

    // The next host event replays it.
    h.engine.succeed_on("/sln/A/a.cs".as_ref());
    h.send(HostEvent::FileChanged("/sln/readme.md".into()));
    assert!(h.controller.deferred().is_empty());
    assert_eq!(h.run(), 1);
    assert!(h.sink.notifications().is_empty());
    assert_eq!(h.engine.renders().len(), 2);
}

#[test]
fn closing_solution_drops_parked_failures() {
    let h = Harness::new(two_projects());
    h.open();
    h.engine.fail_on("/sln/A/a.cs");
    h.send(HostEvent::FileChanged("/sln/A/a.cs".into()));
    h.run();
    h.deliver_feedback();

    h.send(HostEvent::SolutionClosed);

    assert!(h.controller.deferred().is_empty());
    assert!(!h.controller.is_open());
}

// ============================================================================
// Async pipeline
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn intake_and_worker_close_the_feedback_loop() {
    let sln = two_projects();
    let intake = EventIntake::new();
    let sender = intake.sender();
    let queue = Arc::new(RenderQueue::new());
    let engine = Arc::new(RecordingEngine::default());
    engine.fail_on("/sln/B/b.cs");

    let controller = Arc::new(GenerationController::new(
        GeneratorSettings::default(),
        ControllerPorts {
            model: sln.model(),
            filesystem: sln.filesystem(),
            compiler: Arc::new(FakeCompiler::default()),
        },
        queue.clone(),
    ));
    let executor = Arc::new(JobExecutor::new(
        Arc::new(FakeMetadata::default()),
        engine.clone(),
        Arc::new(intake.sink()),
    ));

    let cancel = CancellationToken::new();
    let worker = RenderWorker::spawn(queue.clone(), executor, cancel.clone());
    let intake_task = tokio::spawn(intake.run(controller.clone(), cancel.clone()));

    sender.send(HostEvent::SolutionOpened.into()).unwrap();
    sender
        .send(HostEvent::FileChanged("/sln/B/defs.tst".into()).into())
        .unwrap();

    // Wait for both targets to render and the failure to be parked.
    for _ in 0..200 {
        if engine.rendered_targets().len() == 2 && !controller.deferred().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(controller.deferred(), paths(&["/sln/B/b.cs"]));

    cancel.cancel();
    worker.await.unwrap();
    let handled = intake_task.await.unwrap();
    assert!(handled >= 3);
}
