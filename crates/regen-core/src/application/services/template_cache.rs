//! Template cache.
//!
//! Holds the set of successfully compiled templates. The cache is either
//! [`CacheState::Empty`] or [`CacheState::Populated`]; it is never partially
//! valid. Every read of a populated cache verifies each entry against the
//! project model, and the first failed verification discards the whole set
//! and rebuilds it from discovery. The mutex is held across verify, discard
//! and rebuild, so no reader can observe a half-built set.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, ProjectModel, TemplateCompiler},
        services::TemplateDiscovery,
    },
    domain::{DomainValidator as validator, Extension, ProjectEntry, Template},
    error::RegenResult,
};

/// Memoized template set.
#[derive(Debug, Default)]
pub enum CacheState {
    #[default]
    Empty,
    Populated(Vec<Arc<Template>>),
}

/// Process-wide template cache.
pub struct TemplateCache {
    state: Mutex<CacheState>,
    discovery: TemplateDiscovery,
    model: Arc<dyn ProjectModel>,
    filesystem: Arc<dyn Filesystem>,
    compiler: Arc<dyn TemplateCompiler>,
    extension: Extension,
    target_extension: Extension,
    invalidations: AtomicU64,
    rebuilds: AtomicU64,
}

impl TemplateCache {
    /// `extension` selects definition files; templates may write neither
    /// that extension nor `target_extension`.
    pub fn new(
        model: Arc<dyn ProjectModel>,
        filesystem: Arc<dyn Filesystem>,
        compiler: Arc<dyn TemplateCompiler>,
        extension: Extension,
        target_extension: Extension,
    ) -> Self {
        Self {
            state: Mutex::new(CacheState::Empty),
            discovery: TemplateDiscovery::new(model.clone(), filesystem.clone()),
            model,
            filesystem,
            compiler,
            extension,
            target_extension,
            invalidations: AtomicU64::new(0),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// The current template set, ordered by definition path.
    ///
    /// Builds the set when empty. When populated, verifies every entry; on
    /// the first failure the whole set is discarded and rebuilt once. The
    /// freshly rebuilt set is returned without a second verification.
    #[instrument(skip_all)]
    pub fn templates(&self) -> RegenResult<Vec<Arc<Template>>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned {
                name: "template cache",
            })?;

        if let CacheState::Populated(templates) = &*state {
            match templates.iter().find_map(|t| self.verify(t).err().map(|r| (t, r))) {
                None => return Ok(templates.clone()),
                Some((stale, reason)) => {
                    warn!(
                        template = %stale.id(),
                        reason = %reason,
                        "cached template failed verification; discarding template cache"
                    );
                    *state = CacheState::Empty;
                }
            }
        }

        let templates = self.build();
        *state = CacheState::Populated(templates.clone());
        Ok(templates)
    }

    /// Drop the cached set. The next read rebuilds it.
    pub fn invalidate(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = CacheState::Empty;
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        debug!("template cache invalidated");
    }

    pub fn is_populated(&self) -> bool {
        self.state
            .lock()
            .map(|s| matches!(*s, CacheState::Populated(_)))
            .unwrap_or(false)
    }

    /// Number of [`invalidate`](Self::invalidate) calls so far.
    pub fn invalidation_count(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    /// Number of full builds so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    /// Read and compile one definition file.
    pub fn construct(&self, entry: &ProjectEntry) -> RegenResult<Template> {
        let source = self.filesystem.read_to_string(&entry.path)?;
        let compiled = self.compiler.compile(&entry.path, &source)?;
        validator::validate_compiled_template(entry, &compiled)?;
        validator::validate_output_extension(
            entry,
            &compiled,
            &[&self.extension, &self.target_extension],
        )?;
        Ok(Template::new(entry.clone(), compiled))
    }

    /// Discover and construct every template. Failures are logged and skipped.
    fn build(&self) -> Vec<Arc<Template>> {
        let mut templates = Vec::new();

        for entry in self.discovery.discover(&self.extension) {
            match self.construct(&entry) {
                Ok(template) => templates.push(Arc::new(template)),
                Err(e) => {
                    // One bad template must not block the others.
                    warn!(
                        path = %entry.path.display(),
                        error = %e,
                        "skipping template that failed to compile"
                    );
                }
            }
        }

        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        info!(count = templates.len(), "template cache rebuilt");
        templates
    }

    /// A cached template is valid while its definition still resolves to a
    /// live entry of the same project and keeps the definition extension.
    fn verify(&self, template: &Template) -> Result<(), String> {
        let path = template.definition_path();

        if !self.extension.matches(path) {
            return Err(format!("'{}' is no longer a definition file", path.display()));
        }
        match self.model.resolve_entry(path) {
            None => Err("definition no longer belongs to any project".into()),
            Some(entry) if &entry.project != template.project() => Err(format!(
                "definition moved from project '{}' to '{}'",
                template.project(),
                entry.project
            )),
            Some(_) if !self.filesystem.exists(path) => Err("definition file is missing".into()),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::ProjectId;
    use crate::test_utils::{FakeCompiler, FakeSolution};

    fn cache_for(sln: &FakeSolution) -> TemplateCache {
        TemplateCache::new(
            sln.model(),
            sln.filesystem(),
            Arc::new(FakeCompiler::default()),
            Extension::new(".tst").unwrap(),
            Extension::new(".cs").unwrap(),
        )
    }

    fn ids(templates: &[Arc<Template>]) -> Vec<String> {
        templates.iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn lazily_builds_on_first_read() {
        let sln = FakeSolution::new()
            .project("P", "/sln/P", &[])
            .file("/sln/P/a.tst", "a");
        let cache = cache_for(&sln);

        assert!(!cache.is_populated());
        let templates = cache.templates().unwrap();
        assert_eq!(ids(&templates), vec!["/sln/P/a.tst"]);
        assert!(cache.is_populated());
        assert_eq!(cache.rebuild_count(), 1);
    }

    #[test]
    fn second_read_reuses_verified_set() {
        let sln = FakeSolution::new()
            .project("P", "/sln/P", &[])
            .file("/sln/P/a.tst", "a");
        let cache = cache_for(&sln);

        let first = cache.templates().unwrap();
        let second = cache.templates().unwrap();

        assert_eq!(cache.rebuild_count(), 1);
        assert!(Arc::ptr_eq(&first[0], &second[0]));
    }

    #[test]
    fn malformed_template_is_excluded_and_others_load() {
        let sln = FakeSolution::new()
            .project("P", "/sln/P", &[])
            .file("/sln/P/bad.tst", FakeCompiler::INVALID_MARKER)
            .file("/sln/P/good.tst", "good");
        let cache = cache_for(&sln);

        let templates = cache.templates().unwrap();
        assert_eq!(ids(&templates), vec!["/sln/P/good.tst"]);
    }

    #[test]
    fn template_writing_target_or_definition_files_is_excluded() {
        let sln = FakeSolution::new()
            .project("P", "/sln/P", &[])
            .file("/sln/P/clobber.tst", format!("{}.cs\nx", FakeCompiler::OUTPUT_PREFIX))
            .file("/sln/P/loop.tst", format!("{}.TST\nx", FakeCompiler::OUTPUT_PREFIX))
            .file("/sln/P/good.tst", "good");
        let cache = cache_for(&sln);

        let templates = cache.templates().unwrap();
        assert_eq!(ids(&templates), vec!["/sln/P/good.tst"]);

        let entry = ProjectEntry::new("/sln/P/clobber.tst", ProjectId::from("P"));
        let err = cache.construct(&entry).unwrap_err();
        assert!(err.to_string().contains("'.cs'"));
    }

    #[test]
    fn one_failed_verification_discards_whole_cache() {
        let sln = FakeSolution::new()
            .project("P", "/sln/P", &[])
            .file("/sln/P/a.tst", "a")
            .file("/sln/P/b.tst", "b");
        let cache = cache_for(&sln);
        let before = cache.templates().unwrap();

        sln.remove(Path::new("/sln/P/a.tst"));
        let after = cache.templates().unwrap();

        assert_eq!(ids(&after), vec!["/sln/P/b.tst"]);
        assert_eq!(cache.rebuild_count(), 2);
        // b.tst survived verification but was rebuilt anyway.
        assert!(!Arc::ptr_eq(&before[1], &after[0]));
    }

    #[test]
    fn template_moved_to_another_project_fails_verification() {
        let sln = FakeSolution::new()
            .project("P", "/sln/P", &[])
            .project("Q", "/sln/P/Q", &[])
            .file("/sln/P/Q/a.tst", "a");
        sln.remove_project("Q");
        let cache = cache_for(&sln);
        let before = cache.templates().unwrap();
        assert_eq!(before[0].project().as_str(), "P");

        sln.add_project("Q", "/sln/P/Q", &[]);
        let after = cache.templates().unwrap();

        assert_eq!(after[0].project().as_str(), "Q");
        assert_eq!(cache.rebuild_count(), 2);
    }

    #[test]
    fn invalidate_empties_and_counts() {
        let sln = FakeSolution::new()
            .project("P", "/sln/P", &[])
            .file("/sln/P/a.tst", "a");
        let cache = cache_for(&sln);
        cache.templates().unwrap();

        cache.invalidate();

        assert!(!cache.is_populated());
        assert_eq!(cache.invalidation_count(), 1);
        cache.templates().unwrap();
        assert_eq!(cache.rebuild_count(), 2);
    }

    #[test]
    fn concurrent_readers_never_see_partial_set() {
        let mut sln = FakeSolution::new().project("P", "/sln/P", &[]);
        for i in 0..20 {
            sln = sln.file(format!("/sln/P/t{i:02}.tst"), "x");
        }
        let cache = Arc::new(cache_for(&sln));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let cache = cache.clone();
                scope.spawn(move || {
                    for _ in 0..50 {
                        let templates = cache.templates().unwrap();
                        assert_eq!(templates.len(), 20);
                    }
                });
            }
            let cache = cache.clone();
            scope.spawn(move || {
                for _ in 0..50 {
                    cache.invalidate();
                }
            });
        });
    }
}
