//! On-disk skill bundles
//!
//! A bundle is a folder containing `SKILL.md` with YAML frontmatter plus any
//! scripts, references or assets next to it. Bundles are read whole so they
//! can be uploaded to the provider.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;
use skillgate_types::UploadFile;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Name of the manifest every bundle must contain
pub const SKILL_FILE: &str = "SKILL.md";

/// Maximum allowed name length accepted by the provider
const MAX_NAME_LENGTH: usize = 64;
/// Maximum allowed description length accepted by the provider
const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Metadata extracted from the `SKILL.md` frontmatter
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BundleMetadata {
    /// Display name of the skill
    pub name: String,
    /// What the skill does and when to use it
    pub description: String,
}

/// A skill bundle loaded from disk
#[derive(Debug, Clone)]
pub struct SkillBundle {
    /// Frontmatter metadata
    pub metadata: BundleMetadata,
    /// Folder name under the skills directory
    pub directory: String,
    /// Every file in the bundle, paths relative to the bundle root
    pub files: Vec<UploadFile>,
}

impl SkillBundle {
    /// Load a bundle and all of its files
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let skill_file = dir.join(SKILL_FILE);

        if !skill_file.is_file() {
            return Err(anyhow!("{} not found in {:?}", SKILL_FILE, dir));
        }

        let content = fs::read_to_string(&skill_file)
            .with_context(|| format!("Failed to read {:?}", skill_file))?;

        let metadata = parse_frontmatter(&content)
            .with_context(|| format!("Failed to parse skill from {:?}", skill_file))?;
        validate_metadata(&metadata)?;

        let mut files = Vec::new();
        collect_files(dir, "", &mut files)?;

        let directory = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            metadata,
            directory,
            files,
        })
    }

    /// Get the skill name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Get the skill description
    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    /// Number of files the bundle uploads
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Load every bundle under `root`.
///
/// A missing root yields no bundles. Folders that are not valid bundles are
/// logged and skipped.
pub fn discover_bundles(root: &Path) -> Result<Vec<SkillBundle>> {
    if !root.exists() {
        info!(
            "Skills directory {:?} not found, no bundles will be loaded",
            root
        );
        return Ok(Vec::new());
    }

    if !root.is_dir() {
        warn!("Skills path is not a directory: {:?}", root);
        return Ok(Vec::new());
    }

    let mut dirs: Vec<_> = fs::read_dir(root)
        .with_context(|| format!("Failed to read directory {:?}", root))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    let mut bundles = Vec::new();
    for dir in dirs {
        if !dir.join(SKILL_FILE).is_file() {
            warn!("{} not found in {:?}, skipping", SKILL_FILE, dir);
            continue;
        }

        match SkillBundle::from_dir(&dir) {
            Ok(bundle) => {
                info!(
                    "Loaded skill bundle: {} ({} files)",
                    bundle.name(),
                    bundle.file_count()
                );
                bundles.push(bundle);
            }
            Err(e) => error!("Error loading skill bundle from {:?}: {:#}", dir, e),
        }
    }

    Ok(bundles)
}

/// MIME type sent for a bundle file, chosen by extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "md" => "text/markdown",
        "py" => "text/x-python",
        "js" => "text/javascript",
        "ts" => "text/typescript",
        "json" => "application/json",
        "txt" => "text/plain",
        "yaml" | "yml" => "text/yaml",
        _ => "application/octet-stream",
    }
}

fn collect_files(dir: &Path, prefix: &str, out: &mut Vec<UploadFile>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {:?}", dir))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };

        if path.is_dir() {
            collect_files(&path, &relative, out)?;
        } else {
            let content =
                fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
            debug!("Bundling {} ({} bytes)", relative, content.len());
            out.push(UploadFile::new(relative, mime_type_for(&path), content));
        }
    }

    Ok(())
}

/// Extract `name` and `description` from the frontmatter of a `SKILL.md`.
///
/// Each field is read from its own `key: value` line, so plain values may
/// contain `: `. Block scalars (`|`, `>`) and fields spread over several lines
/// are handed to the YAML parser instead.
pub fn parse_frontmatter(content: &str) -> Result<BundleMetadata> {
    let frontmatter_re = Regex::new(r"^---\s*\n([\s\S]*?)\n---\s*\n")
        .map_err(|e| anyhow!("Failed to compile regex: {}", e))?;

    let captures = frontmatter_re.captures(content).ok_or_else(|| {
        anyhow!("SKILL.md must contain YAML frontmatter with name and description")
    })?;

    let frontmatter = captures
        .get(1)
        .ok_or_else(|| anyhow!("Failed to extract frontmatter"))?
        .as_str();

    let name = frontmatter_field(frontmatter, "name")?;
    let description = frontmatter_field(frontmatter, "description")?;

    match (name, description) {
        (Some(name), Some(description))
            if !is_block_scalar(&name) && !is_block_scalar(&description) =>
        {
            Ok(BundleMetadata { name, description })
        }
        _ => serde_yaml::from_str(frontmatter).with_context(|| {
            "SKILL.md frontmatter must include both name and description fields"
        }),
    }
}

/// Trimmed value of the first `key: value` line
fn frontmatter_field(frontmatter: &str, key: &str) -> Result<Option<String>> {
    let re = Regex::new(&format!(r"(?m)^{}:[ \t]*(.+)$", regex::escape(key)))
        .map_err(|e| anyhow!("Failed to compile regex: {}", e))?;
    Ok(re
        .captures(frontmatter)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn is_block_scalar(value: &str) -> bool {
    matches!(value.chars().next(), Some('|' | '>'))
}

fn validate_metadata(metadata: &BundleMetadata) -> Result<()> {
    if metadata.name.trim().is_empty() {
        return Err(anyhow!("Skill name cannot be empty"));
    }

    if metadata.name.len() > MAX_NAME_LENGTH {
        warn!(
            "Skill name '{}' exceeds {} characters (was {}), may be truncated",
            metadata.name,
            MAX_NAME_LENGTH,
            metadata.name.len()
        );
    }

    if metadata.description.trim().is_empty() {
        return Err(anyhow!("Skill description cannot be empty"));
    }

    if metadata.description.len() > MAX_DESCRIPTION_LENGTH {
        warn!(
            "Skill '{}' description exceeds {} characters (was {}), may be truncated",
            metadata.name,
            MAX_DESCRIPTION_LENGTH,
            metadata.description.len()
        );
    }

    Ok(())
}
