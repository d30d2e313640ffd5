//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::{FixtureService, HierarchyService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{generator_for, Forest, IdGenerator};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding application settings and I/O boundaries.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Id generator for added nodes
    pub ids: Arc<dyn IdGenerator>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let ids = generator_for(settings.id_strategy, &settings.id_prefix);
        Self::with_deps(settings, Arc::new(RealFileSystem), ids)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, ids }
    }

    pub fn fixture_service(&self) -> FixtureService {
        FixtureService::new(Arc::clone(&self.fs))
    }

    /// Load the forest from `fixture`, the configured fixture, or the built-in one.
    pub fn load_forest(&self, fixture: Option<&Path>) -> ApplicationResult<Forest> {
        match fixture.or(self.settings.fixture.as_deref()) {
            Some(path) => self.fixture_service().load(path),
            None => {
                debug!("load_forest: using built-in fixture");
                FixtureService::load_builtin()
            }
        }
    }

    /// Start a hierarchy session on an already loaded forest.
    pub fn hierarchy_service(&self, forest: Forest) -> HierarchyService {
        HierarchyService::new(forest, Arc::clone(&self.ids))
    }
}
