//! Manufacturer hierarchy manager for the dealer management system.
//!
//! - `domain`: hierarchy nodes, the persistent [`domain::Forest`], form rules, id generation
//! - `application`: the hierarchy session and fixture loading
//! - `views`: indented tree and org chart renderings
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: `dmsh` commands

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
pub mod views;
