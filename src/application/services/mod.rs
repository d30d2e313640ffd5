//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod fixture;
mod hierarchy;

pub use fixture::{to_json, FixtureIssue, FixtureService, BUILTIN_FIXTURE};
pub use hierarchy::HierarchyService;
