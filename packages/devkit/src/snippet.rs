//! Source snippet rendering for document diagnostics.
//!
//! Uses `annotate-snippets` to render compiler-like diagnostic output,
//! pointing to the exact marker line that made a document unparseable.

use std::ops::Range;

use annotate_snippets::{Level, Renderer, Snippet};

/// Document text to be annotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source(String);

impl Source {
    /// Annotate the source with the given annotations under a title.
    ///
    /// # Examples
    ///
    /// Produces output similar to Rust compiler diagnostics:
    ///
    /// ```text
    /// error: CLAUDE.md is malformed. Fix the markers by hand, then retry.
    ///    |
    ///  3 | <!-- BEGIN: devkit/rules v1 -->
    ///    | ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ region `devkit/rules` is never closed
    ///    |
    /// ```
    pub fn annotate(
        &self,
        title: &str,
        annotations: impl IntoIterator<Item = impl Into<Annotation>>,
    ) -> String {
        // The renderer borrows labels, so they have to outlive the iterator
        // that builds the annotation list.
        let annotations = annotations.into_iter().map(Into::into).collect::<Vec<_>>();
        let annotations = annotations
            .iter()
            .map(|Annotation { span, label }| Level::Error.span(span.range()).label(label));

        let snippet = Snippet::source(&self.0)
            .fold(true)
            .annotations(annotations);
        let message = Level::Error.title(title).snippet(snippet);
        Renderer::plain().render(message).to_string()
    }
}

impl<S: Into<String>> From<S> for Source {
    fn from(source: S) -> Self {
        Self(source.into())
    }
}

/// An annotation on a source snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// The byte range of the annotation.
    pub span: Span,

    /// The label of the annotation.
    pub label: String,
}

impl<S: Into<Span>, L: Into<String>> From<(S, L)> for Annotation {
    fn from((span, label): (S, L)) -> Self {
        Self {
            span: span.into(),
            label: label.into(),
        }
    }
}

/// A byte range in document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset.
    pub start: usize,

    /// End byte offset.
    pub end: usize,
}

impl Span {
    /// View the span as a `Range<usize>`.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}
