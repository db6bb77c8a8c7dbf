//! End-to-end tests over the real adapters: an on-disk solution, the bundled
//! template format, the regex scanner and the placeholder renderer.

use std::{fs, path::Path, sync::Arc};

use regen_adapters::{
    LocalFilesystem, ManifestProjectModel, SimpleRenderer, SourceScanner, TomlTemplateCompiler,
    project_model::SolutionState,
};
use regen_core::prelude::*;
use regen_core::test_utils::RecordingSink;
use tempfile::TempDir;

const MANIFEST: &str = r#"
[[project]]
name = "App"
root = "src/App"
references = ["Core"]

[[project]]
name = "Core"
root = "src/Core"

[[project]]
name = "Tools"
root = "tools"
"#;

const MODELS_TST: &str = "+++\nextension = \".ts\"\n+++\n// {{FILE_NAME}} ({{NAMESPACE}})\n{{#types}}export interface {{name}} {}\n{{/types}}";

struct Pipeline {
    _temp: TempDir,
    root: std::path::PathBuf,
    model: Arc<ManifestProjectModel>,
    queue: Arc<RenderQueue>,
    controller: GenerationController,
    executor: JobExecutor,
    sink: Arc<RecordingSink>,
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn pipeline() -> Pipeline {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    write(&root, "regen.toml", MANIFEST);
    write(&root, "src/Core/models.tst", MODELS_TST);
    write(&root, "src/Core/Money.cs", "namespace Core;\npublic struct Money {}\n");
    write(&root, "src/App/User.cs", "namespace App\n{\n    public class User {}\n    public enum Role {}\n}\n");
    write(&root, "src/App/Empty.cs", "// no types\n");
    write(&root, "tools/Tool.cs", "class Tool {}\n");

    let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    let model = Arc::new(ManifestProjectModel::load(&root).unwrap());
    let queue = Arc::new(RenderQueue::new());
    let sink = Arc::new(RecordingSink::default());

    let controller = GenerationController::new(
        GeneratorSettings::default(),
        ControllerPorts {
            model: model.clone(),
            filesystem: filesystem.clone(),
            compiler: Arc::new(TomlTemplateCompiler::new()),
        },
        queue.clone(),
    );
    let executor = JobExecutor::new(
        Arc::new(SourceScanner::new(filesystem.clone())),
        Arc::new(SimpleRenderer::new(filesystem)),
        sink.clone(),
    );

    Pipeline {
        root: model.solution_root().to_path_buf(),
        _temp: temp,
        model,
        queue,
        controller,
        executor,
        sink,
    }
}

#[test]
fn saving_a_definition_renders_consumers_on_disk() {
    let p = pipeline();
    p.controller.handle(Notification::host(HostEvent::SolutionOpened));

    let enqueued = p.controller.template_saved(&p.root.join("src/Core/models.tst"));
    assert_eq!(enqueued, 3, "Money.cs, User.cs and Empty.cs");
    p.queue.run_pending(&p.executor);

    let user = fs::read_to_string(p.root.join("src/App/User.ts")).unwrap();
    assert_eq!(
        user,
        "// User.cs (App)\nexport interface User {}\nexport interface Role {}\n"
    );
    assert!(p.root.join("src/Core/Money.ts").exists());
    assert!(!p.root.join("tools/Tool.ts").exists(), "Tools does not consume Core");

    // Empty.cs declares no types: a soft failure fed back as a synthetic change.
    assert!(!p.root.join("src/App/Empty.ts").exists());
    let feedback = p.sink.take();
    assert_eq!(feedback.len(), 1);
    assert!(feedback[0].is_synthetic());
    assert_eq!(
        feedback[0].event,
        HostEvent::FileChanged(p.root.join("src/App/Empty.cs"))
    );
    assert_eq!(p.queue.stats().failed, 1);
}

#[test]
fn save_is_recorded_in_solution_state() {
    let p = pipeline();
    p.controller.handle(Notification::host(HostEvent::SolutionOpened));

    p.controller.template_saved(&p.root.join("src/Core/models.tst"));
    p.controller.template_saved(&p.root.join("src/Core/models.tst"));

    let state = SolutionState::load(&SolutionState::path_for(&p.root));
    let record = &state.templates["src/Core/models.tst"];
    assert_eq!(record.project, "Core");
    assert_eq!(record.saves, 2);
    assert_eq!(p.model.state(), state);
}

#[test]
fn changing_a_target_rerenders_only_that_target() {
    let p = pipeline();
    p.controller.handle(Notification::host(HostEvent::SolutionOpened));

    let user = p.root.join("src/App/User.cs");
    fs::write(&user, "namespace App;\nclass Person {}\n").unwrap();
    p.controller.handle(Notification::host(HostEvent::FileChanged(user)));
    assert_eq!(p.queue.len(), 1);
    p.queue.run_pending(&p.executor);

    let out = fs::read_to_string(p.root.join("src/App/User.ts")).unwrap();
    assert!(out.contains("export interface Person {}"));
    assert!(!p.root.join("src/Core/Money.ts").exists());
}

#[test]
fn deleting_and_renaming_targets_follow_outputs() {
    let p = pipeline();
    p.controller.handle(Notification::host(HostEvent::SolutionOpened));
    p.controller.template_saved(&p.root.join("src/Core/models.tst"));
    p.queue.run_pending(&p.executor);
    assert!(p.root.join("src/App/User.ts").exists());

    let old = p.root.join("src/App/User.cs");
    let new = p.root.join("src/App/Account.cs");
    fs::rename(&old, &new).unwrap();
    p.controller
        .handle(Notification::host(HostEvent::FileRenamed { old, new: new.clone() }));
    p.queue.run_pending(&p.executor);
    assert!(!p.root.join("src/App/User.ts").exists());
    assert!(p.root.join("src/App/Account.ts").exists());

    fs::remove_file(&new).unwrap();
    p.controller.handle(Notification::host(HostEvent::FileDeleted(new)));
    p.queue.run_pending(&p.executor);
    assert!(!p.root.join("src/App/Account.ts").exists());
}

#[test]
fn malformed_definition_is_excluded_from_the_cache() {
    let p = pipeline();
    write(&p.root, "src/Core/broken.tst", "no header at all");
    p.controller.handle(Notification::host(HostEvent::SolutionOpened));

    let templates = p.controller.cache().templates().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name(), "models");
    assert_eq!(p.controller.template_saved(&p.root.join("src/Core/broken.tst")), 0);
}

#[test]
fn definition_writing_target_files_is_excluded() {
    let p = pipeline();
    write(&p.root, "src/Core/clobber.tst", "+++\nextension = \".cs\"\n+++\noverwritten\n");
    p.controller.handle(Notification::host(HostEvent::SolutionOpened));

    let templates = p.controller.cache().templates().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name(), "models");
    assert_eq!(p.controller.template_saved(&p.root.join("src/Core/clobber.tst")), 0);

    let user = p.root.join("src/App/User.cs");
    p.controller.handle(Notification::host(HostEvent::FileChanged(user.clone())));
    p.queue.run_pending(&p.executor);

    let source = fs::read_to_string(&user).unwrap();
    assert!(source.contains("public class User {}"));
    assert!(!source.contains("overwritten"));
}

#[test]
fn first_definition_owns_a_shared_output_extension() {
    let p = pipeline();
    write(&p.root, "src/Core/dto.tst", "+++\nextension = \".ts\"\n+++\n// dto {{FILE_STEM}}\n");
    p.controller.handle(Notification::host(HostEvent::SolutionOpened));

    // dto.tst sorts before models.tst and owns every .ts output it consumes.
    assert_eq!(p.controller.template_saved(&p.root.join("src/Core/models.tst")), 0);
    assert_eq!(p.controller.template_saved(&p.root.join("src/Core/dto.tst")), 3);
    p.queue.run_pending(&p.executor);
    assert_eq!(
        fs::read_to_string(p.root.join("src/App/User.ts")).unwrap(),
        "// dto User\n"
    );

    let user = p.root.join("src/App/User.cs");
    p.controller.handle(Notification::host(HostEvent::FileChanged(user)));
    p.queue.run_pending(&p.executor);
    assert_eq!(
        fs::read_to_string(p.root.join("src/App/User.ts")).unwrap(),
        "// dto User\n"
    );
    assert_eq!(p.queue.stats().failed, 1, "only Empty.cs, which declares no types");
}
