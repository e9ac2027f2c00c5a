//! Merge registry sections into a parsed document.

use std::collections::HashSet;

use serde::Serialize;

use super::{
    document::{Document, MarkedRegion},
    registry::{Registry, Section},
};

/// Outcome of [`merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Registry-owned regions whose body or version was rewritten.
    pub updated: Vec<String>,

    /// Regions the registry does not own, left untouched.
    pub preserved: Vec<String>,

    /// Names that occur more than once; only the first occurrence is merged.
    pub duplicates: Vec<String>,
}

impl UpdateReport {
    /// Whether the merge changed the document.
    pub fn is_changed(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// Outcome of [`check`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// Whether any registry section is drifted or missing.
    pub has_updates: bool,

    /// Every registry section that is drifted or missing, in registry order.
    pub sections: Vec<String>,

    /// The subset of `sections` with no region in the document at all.
    ///
    /// `update` does not insert these; they need `init --force` or a
    /// hand-placed marker pair.
    pub missing: Vec<String>,
}

/// Whether `region` differs from the canonical `section`.
///
/// Bodies are compared with line endings normalized. A version stamp only
/// counts when the region carries one.
pub fn is_drifted(region: &MarkedRegion, section: &Section) -> bool {
    let body = region.body().replace("\r\n", "\n");
    let version_drifted = region
        .version()
        .is_some_and(|version| version != section.version);
    body != section.body || version_drifted
}

/// Rewrite every drifted registry-owned region of `document` in place.
///
/// Free regions and regions the registry does not own are never touched.
/// Registry sections missing from the document are not inserted. When a name
/// repeats, only its first occurrence is merged.
#[tracing::instrument(skip_all)]
pub fn merge(document: &mut Document, registry: &Registry) -> UpdateReport {
    let line_ending = document.line_ending();
    let mut report = UpdateReport::default();
    let mut seen = HashSet::new();

    for region in document.marked_mut() {
        let name = region.name().to_string();
        if !seen.insert(name.clone()) {
            tracing::warn!(
                %name,
                "duplicate region left untouched; only the first occurrence is merged"
            );
            if !report.duplicates.contains(&name) {
                report.duplicates.push(name);
            }
            continue;
        }

        match registry.get(&name) {
            None => {
                tracing::debug!(%name, "preserve region not owned by the registry");
                report.preserved.push(name);
            }
            Some(section) if is_drifted(region, section) => {
                tracing::debug!(
                    %name,
                    from = ?region.version(),
                    to = %section.version,
                    "update drifted region"
                );
                region.replace(section, line_ending);
                report.updated.push(name);
            }
            Some(_) => tracing::trace!(%name, "region is current"),
        }
    }

    report
}

/// Report which registry sections are drifted or missing, without changing
/// anything.
#[tracing::instrument(skip_all)]
pub fn check(document: &Document, registry: &Registry) -> CheckReport {
    let mut report = CheckReport::default();
    for section in registry.sections() {
        match document.get(&section.name) {
            None => {
                report.missing.push(section.name.clone());
                report.sections.push(section.name.clone());
            }
            Some(region) if is_drifted(region, section) => {
                report.sections.push(section.name.clone());
            }
            Some(_) => {}
        }
    }

    report.has_updates = !report.sections.is_empty();
    report
}
