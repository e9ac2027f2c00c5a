//! The template registry: canonical content for framework-owned regions.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{collections::HashSet, fs::read_to_string};

use bon::Builder;
use color_eyre::{
    SectionExt,
    eyre::{Context, Result, bail},
};
use directories::ProjectDirs;
use itertools::Itertools;
use monostate::MustBe;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use tap::Tap;

use super::document::is_marker;

/// The registry bundled into the binary.
const BUILTIN: &str = include_str!("../../templates/claude.yaml");

/// A registry file.
///
/// ```yaml
/// version: 1
///
/// sections:
///   - name: devkit/overview
///     version: "1.0.0"
///     body: |
///       This project uses devkit lint rules.
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// The version of the registry file format.
    pub version: MustBe!(1),

    /// The sections defined in this file, in the order `init` writes them.
    pub sections: Vec<Section>,
}

/// The canonical content of one framework-owned region.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize, Serialize)]
pub struct Section {
    /// Region name, conventionally `namespace/topic`.
    #[builder(into)]
    pub name: String,

    /// Opaque version token, compared only for equality.
    ///
    /// Unquoted integers are accepted; other numbers must be quoted so that
    /// `1.0` does not silently become `1`.
    #[builder(into)]
    #[serde(deserialize_with = "version_token")]
    pub version: String,

    /// Region body.
    #[builder(into)]
    pub body: String,
}

/// An ordered set of sections, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    sections: Vec<Section>,
}

impl Registry {
    /// Build a registry from sections, in the given order.
    ///
    /// Bodies are normalized to LF line endings with surrounding blank lines
    /// removed. Fails if a name repeats, if a name or version is empty or
    /// contains whitespace, or if a body line would parse as a region marker.
    pub fn new(sections: impl IntoIterator<Item = Section>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::new();
        for mut section in sections {
            if !is_token(&section.name) {
                bail!(
                    "section name must be a non-empty token without whitespace: {:?}",
                    section.name
                );
            }
            if !is_token(&section.version) {
                bail!(
                    "section {:?} has an invalid version: {:?}",
                    section.name,
                    section.version
                );
            }
            if !seen.insert(section.name.clone()) {
                bail!("section {:?} is defined more than once", section.name);
            }
            let marker = section.body.lines().find_position(|line| is_marker(line));
            if let Some((index, line)) = marker {
                bail!(
                    "section {:?} has a region marker on body line {}: {:?}",
                    section.name,
                    index + 1,
                    line
                );
            }
            section.body = normalize_body(&section.body);
            normalized.push(section);
        }

        Ok(Self {
            sections: normalized,
        })
    }

    /// The registry bundled with devkit.
    #[tracing::instrument]
    pub fn builtin() -> Result<Self> {
        parse(BUILTIN).context("parse builtin registry")
    }

    /// Load a registry from a YAML file.
    #[tracing::instrument]
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            read_to_string(path).with_context(|| format!("read registry file: {path:?}"))?;
        parse(&content)
            .with_context(|| format!("parse registry file: {path:?}"))
            .with_context(|| content.header("File content:"))
    }

    /// Resolve the registry to use.
    ///
    /// Resolution order (first hit wins):
    /// 1. `explicit`, if provided
    /// 2. User-level registry at `ProjectDirs::config_dir()/claude.yaml` if it exists
    /// 3. The builtin registry
    #[tracing::instrument]
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Some(path) = user_registry_path() {
            match Self::load_from(&path) {
                Ok(registry) => return Ok(registry),
                Err(error) if is_not_found(&error) => {
                    tracing::debug!(?path, "no user registry");
                }
                Err(error) => return Err(error),
            }
        }

        Self::builtin()
    }

    /// All sections in registry order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The section with the given name.
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Section names in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Get the project directories for the application.
#[tracing::instrument]
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "devkit", "devkit")
}

/// Path of the user-level registry override, if the platform has a config
/// directory.
pub fn user_registry_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("claude.yaml"))
}

fn parse(content: &str) -> Result<Registry> {
    let config = serde_yaml::from_str::<RegistryConfig>(content)
        .context("deserialize registry")
        .tap(|config| tracing::debug!(?config, "parsed registry"))?;
    Registry::new(config.sections)
}

fn version_token<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    match Token::deserialize(deserializer)? {
        Token::Text(version) => Ok(version),
        Token::Integer(version) => Ok(version.to_string()),
        Token::Float(version) => Err(D::Error::custom(format!(
            "version {version:?} is a number; quote it, for example `version: \"1.0\"`"
        ))),
    }
}

fn is_not_found(error: &color_eyre::Report) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<std::io::Error>())
        .any(|cause| cause.kind() == ErrorKind::NotFound)
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}

fn normalize_body(body: &str) -> String {
    let lines = body
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .collect_vec();
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |last| last + 1);
    lines[..end].join("\n")
}
