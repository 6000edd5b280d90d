//! Skill registry and system prompt composition
//!
//! The registry is fixed once the process has started. Composition is a pure
//! function of the registered skills, so callers are free to compute it once
//! and share the result.

use anyhow::{anyhow, Result};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::builtin;
use skillgate_types::{CombinedConfig, Skill, Tool};

const PROMPT_HEADER: &str = "# Agent Capabilities";
const PROMPT_INTRO: &str =
    "You are a specialized AI assistant with the following skills and capabilities:";
const PROMPT_SEPARATOR: &str = "---";
const PROMPT_CLOSING: &str = "When responding to user requests, identify which skill(s) are most \
relevant and apply them appropriately. You may combine multiple skills to solve complex problems.";

/// Registry holding every known skill in registration order
#[derive(Debug, Clone)]
pub struct SkillRegistry {
    skills: Vec<Skill>,
}

impl SkillRegistry {
    /// Create a registry from skills in registration order.
    ///
    /// Fails when an id is empty or registered twice.
    pub fn new(skills: Vec<Skill>) -> Result<Self> {
        let mut seen = HashSet::new();
        for skill in &skills {
            if skill.id.is_empty() {
                return Err(anyhow!("Skill '{}' has an empty id", skill.name));
            }
            if !seen.insert(skill.id.as_str()) {
                return Err(anyhow!("Skill id '{}' is registered twice", skill.id));
            }
        }
        Ok(Self { skills })
    }

    /// Registry with the skills shipped in this crate
    pub fn builtin() -> Self {
        Self {
            skills: builtin::all(),
        }
    }

    /// Switch off the given skill ids. Unknown ids are logged and ignored.
    pub fn with_disabled<S: AsRef<str>>(mut self, ids: &[S]) -> Self {
        for id in ids {
            let id = id.as_ref();
            match self.skills.iter_mut().find(|s| s.id == id) {
                Some(skill) => {
                    debug!("Disabling skill: {}", id);
                    skill.enabled = false;
                }
                None => warn!("Cannot disable unknown skill '{}'", id),
            }
        }
        self
    }

    /// Look up a skill by id
    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// All skills, enabled or not, in registration order
    pub fn all(&self) -> &[Skill] {
        &self.skills
    }

    /// Get number of skills
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Merge the enabled skills into one prompt and tool list
    pub fn compose(&self) -> CombinedConfig {
        let combined = compose_skills(&self.skills);
        info!(
            "Composed {} of {} skills ({} tools)",
            combined.enabled_skills.len(),
            self.skills.len(),
            combined.tools.len()
        );
        combined
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Merge enabled skills into a [`CombinedConfig`].
///
/// Skills are ordered by priority, highest first. Ties are broken by the
/// position in `skills` so the result never depends on sort stability.
/// A tool whose dedup key was already contributed by an earlier skill is
/// dropped.
pub fn compose_skills(skills: &[Skill]) -> CombinedConfig {
    let mut ranked: Vec<(usize, &Skill)> = skills
        .iter()
        .enumerate()
        .filter(|(_, skill)| skill.enabled)
        .collect();
    ranked.sort_unstable_by_key(|(index, skill)| (Reverse(skill.priority), *index));

    let enabled_skills: Vec<Skill> = ranked.into_iter().map(|(_, s)| s.clone()).collect();

    CombinedConfig {
        system_prompt: build_system_prompt(&enabled_skills),
        tools: merge_tools(&enabled_skills),
        enabled_skills,
    }
}

fn build_system_prompt(skills: &[Skill]) -> String {
    let mut lines: Vec<&str> = vec![PROMPT_HEADER, "", PROMPT_INTRO, ""];

    for skill in skills {
        lines.push(&skill.system_prompt);
        lines.push("");
    }

    lines.extend([PROMPT_SEPARATOR, "", PROMPT_CLOSING]);
    lines.join("\n")
}

fn merge_tools(skills: &[Skill]) -> Vec<Tool> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tools = Vec::new();

    for skill in skills {
        for tool in &skill.tools {
            if seen.insert(tool.dedup_key()) {
                tools.push(tool.clone());
            } else {
                debug!(
                    "Skill '{}' redeclares tool '{}', keeping the earlier one",
                    skill.id,
                    tool.dedup_key()
                );
            }
        }
    }

    tools
}
