//! Project-scope lifecycle: one [`ProjectScope`] per build-tool-discovered
//! project root plus a workspace-wide default, owned and routed by
//! [`ProjectScopeManager`].

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

mod manager;
mod scope;

pub use manager::ProjectScopeManager;
pub use scope::{ProjectScope, ScopeState};
