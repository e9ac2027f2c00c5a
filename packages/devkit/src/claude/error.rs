//! Failures surfaced by CLAUDE.md operations.

use std::{io, path::PathBuf};

use derive_more::{Display, Error};

use crate::snippet::{Source, Span};

/// Errors returned by [`ClaudeMd`](super::ClaudeMd) operations and the
/// document parser.
///
/// All variants describe deterministic conditions; none are worth retrying.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// `init` was asked to write over an existing document without `force`.
    #[display("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    /// `update` or `check` was pointed at a document that does not exist.
    #[display("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    /// The document's markers are unbalanced or nested.
    #[display("malformed document at line {line}: {reason}")]
    MalformedDocument {
        /// Name of the region whose marker is at fault.
        name: String,

        /// 1-based line number of the offending marker.
        line: usize,

        /// Byte span of the offending marker line, without its terminator.
        span: Span,

        /// What is wrong with the marker.
        reason: Malformed,
    },

    /// Any other filesystem failure while reading or writing the document.
    #[display("{} {}", action, path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl Error {
    /// Render a compiler-style snippet of `source` pointing at the marker
    /// that made the document malformed.
    ///
    /// Returns `None` for errors that are not tied to a location.
    pub fn annotate(&self, source: &str) -> Option<String> {
        let Error::MalformedDocument { span, reason, .. } = self else {
            return None;
        };
        let rendered = Source::from(source).annotate(
            "the document is malformed; fix the markers by hand, then retry",
            [(*span, reason.to_string())],
        );
        Some(rendered)
    }
}

/// The ways region markers can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Malformed {
    /// A region was opened and never closed.
    #[display("region `{name}` is never closed")]
    Unterminated { name: String },

    /// A region was opened while another was still open.
    #[display("region `{name}` opens inside region `{outer}`; nesting is not supported")]
    Nested { name: String, outer: String },

    /// A region was closed under a different name than it was opened with.
    #[display("region `{open}` is closed by an END marker for `{name}`")]
    Mismatched { name: String, open: String },

    /// An END marker appeared with no region open.
    #[display("END marker for `{name}` has no matching BEGIN")]
    Unopened { name: String },
}

impl Malformed {
    /// Name of the region the faulty marker refers to.
    pub fn name(&self) -> &str {
        match self {
            Malformed::Unterminated { name }
            | Malformed::Nested { name, .. }
            | Malformed::Mismatched { name, .. }
            | Malformed::Unopened { name } => name,
        }
    }
}
