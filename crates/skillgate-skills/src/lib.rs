//! `SkillGate` Skills System
//!
//! Two kinds of skill live here:
//!
//! - Prompt skills: a fixed registry of [`Skill`]s whose prompt fragments and
//!   tool declarations are merged into one system prompt for every chat call.
//! - Skill bundles: directories holding a `SKILL.md` with YAML frontmatter and
//!   any supporting files, discovered on disk and uploaded to the provider.
//!
//! Composition order is priority descending; equal priorities keep their
//! registration order.

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod builtin;
pub mod bundle;
pub mod registry;

pub use bundle::{discover_bundles, mime_type_for, SkillBundle};
pub use registry::{compose_skills, SkillRegistry};
pub use skillgate_types::{CombinedConfig, Skill, Tool};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{compose_skills, CombinedConfig, Skill, SkillBundle, SkillRegistry, Tool};
}
