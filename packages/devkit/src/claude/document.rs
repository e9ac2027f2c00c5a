//! Line-oriented model of a CLAUDE.md document.
//!
//! A document is parsed into an alternating sequence of free regions and
//! marked regions, always starting and ending with a free region:
//!
//! ```text
//! Free, Marked, Free, Marked, ..., Free
//! ```
//!
//! Free regions may be empty; they exist so that the region order can be
//! reconstructed exactly. Marked regions are delimited by marker lines:
//!
//! ```markdown
//! <!-- BEGIN: devkit/overview v1.0.0 -->
//! Body text, owned by the template registry.
//! <!-- END: devkit/overview -->
//! ```
//!
//! Rendering an unmodified [`Document`] reproduces its source byte-for-byte.

use std::sync::LazyLock;

use derive_more::Display;
use itertools::Itertools;
use regex::Regex;

use super::{Error, Malformed, registry::Section};
use crate::snippet::Span;

static BEGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!-- BEGIN: (?<name>\S+)(?: v(?<version>\S+))? -->$")
        .expect("compile begin marker regex")
});

static END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!-- END: (?<name>\S+) -->$").expect("compile end marker regex")
});

/// The line terminator a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum LineEnding {
    #[default]
    #[display("\n")]
    Lf,

    #[display("\r\n")]
    Crlf,
}

impl LineEnding {
    /// Detect the convention of `text`: CRLF if any line uses it.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    regions: Vec<Region>,
    line_ending: LineEnding,
}

/// A region of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// Text outside any marker pair.
    Free(FreeRegion),

    /// Text between a BEGIN and END marker, including the markers.
    Marked(MarkedRegion),
}

/// Text outside any marker pair, always preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeRegion {
    index: usize,
    text: String,
}

impl FreeRegion {
    /// Positional key of the region: `custom-0`, `custom-1`, and so on.
    pub fn key(&self) -> String {
        format!("custom-{}", self.index)
    }

    /// The raw text of the region.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A named, optionally versioned region delimited by markers.
///
/// The raw marker lines and a single blank padding line on either side of
/// the body are retained so that untouched regions render exactly as parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedRegion {
    name: String,
    version: Option<String>,
    begin: String,
    leading_pad: Option<String>,
    body: String,
    trailing_pad: Option<String>,
    end: String,
}

impl MarkedRegion {
    /// Build a fresh region for a registry section.
    pub fn new(section: &Section, line_ending: LineEnding) -> Self {
        let mut region = Self {
            name: section.name.clone(),
            version: None,
            begin: String::new(),
            leading_pad: None,
            body: String::new(),
            trailing_pad: None,
            end: format!("<!-- END: {} -->{line_ending}", section.name),
        };
        region.replace(section, line_ending);
        region
    }

    /// The region name, conventionally `namespace/topic`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version stamped into the begin marker, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The body between the markers, without padding lines or a final line
    /// terminator.
    pub fn body(&self) -> &str {
        let body = self.body.strip_suffix('\n').unwrap_or(&self.body);
        body.strip_suffix('\r').unwrap_or(body)
    }

    /// Replace the body and version stamp with those of `section`.
    ///
    /// Padding lines and the raw END marker line are kept.
    pub fn replace(&mut self, section: &Section, line_ending: LineEnding) {
        self.version = Some(section.version.clone());
        self.begin = format!(
            "<!-- BEGIN: {} v{} -->{line_ending}",
            self.name, section.version
        );
        self.body = section
            .body
            .lines()
            .map(|line| format!("{line}{line_ending}"))
            .collect();
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.begin);
        out.extend(self.leading_pad.as_deref());
        out.push_str(&self.body);
        out.extend(self.trailing_pad.as_deref());
        out.push_str(&self.end);
    }
}

/// A marker region that has been opened but not yet closed.
struct OpenRegion<'a> {
    name: &'a str,
    version: Option<&'a str>,
    begin: &'a str,
    line: usize,
    span: Span,
    inner: Vec<&'a str>,
}

impl<'a> OpenRegion<'a> {
    fn close(self, end: &'a str) -> MarkedRegion {
        let mut inner = self.inner.as_slice();
        let leading_pad = match inner.split_first() {
            Some((first, rest)) if is_blank(first) => {
                inner = rest;
                Some(first.to_string())
            }
            _ => None,
        };
        let trailing_pad = match inner.split_last() {
            Some((last, rest)) if is_blank(last) => {
                inner = rest;
                Some(last.to_string())
            }
            _ => None,
        };

        MarkedRegion {
            name: self.name.to_string(),
            version: self.version.map(str::to_string),
            begin: self.begin.to_string(),
            leading_pad,
            body: inner.concat(),
            trailing_pad,
            end: end.to_string(),
        }
    }

    fn malformed(&self, reason: Malformed) -> Error {
        malformed(self.line, self.span, reason)
    }
}

/// A recognized marker line.
enum Marker<'a> {
    Begin {
        name: &'a str,
        version: Option<&'a str>,
    },
    End { name: &'a str },
}

impl<'a> Marker<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        if let Some(caps) = BEGIN.captures(line) {
            let name = caps.name("name")?.as_str();
            let version = caps.name("version").map(|m| m.as_str());
            return Some(Marker::Begin { name, version });
        }
        END.captures(line)
            .and_then(|caps| caps.name("name"))
            .map(|name| Marker::End {
                name: name.as_str(),
            })
    }
}

/// Whether `line` would be parsed as a BEGIN or END marker.
pub(super) fn is_marker(line: &str) -> bool {
    Marker::parse(strip_terminator(line)).is_some()
}

impl Document {
    /// Parse a document from its full text.
    ///
    /// Fails with [`Error::MalformedDocument`] if markers are unterminated,
    /// nested, mismatched, or closed without being opened.
    #[tracing::instrument(skip_all, fields(len = text.len()))]
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut regions = Vec::new();
        let mut free = String::new();
        let mut open: Option<OpenRegion<'_>> = None;
        let mut offset = 0;

        for (index, line) in text.split_inclusive('\n').enumerate() {
            let content = strip_terminator(line);
            let span = Span::from(offset..offset + content.len());
            let number = index + 1;
            offset += line.len();

            let marker = Marker::parse(content);
            match (marker, open.take()) {
                (None, Some(mut region)) => {
                    region.inner.push(line);
                    open = Some(region);
                }
                (None, None) => free.push_str(line),
                (Some(Marker::Begin { name, .. }), Some(outer)) => {
                    let reason = Malformed::Nested {
                        name: name.to_string(),
                        outer: outer.name.to_string(),
                    };
                    return Err(malformed(number, span, reason));
                }
                (Some(Marker::Begin { name, version }), None) => {
                    push_free(&mut regions, std::mem::take(&mut free));
                    open = Some(OpenRegion {
                        name,
                        version,
                        begin: line,
                        line: number,
                        span,
                        inner: Vec::new(),
                    });
                }
                (Some(Marker::End { name }), None) => {
                    let reason = Malformed::Unopened {
                        name: name.to_string(),
                    };
                    return Err(malformed(number, span, reason));
                }
                (Some(Marker::End { name }), Some(region)) if name != region.name => {
                    let reason = Malformed::Mismatched {
                        name: name.to_string(),
                        open: region.name.to_string(),
                    };
                    return Err(malformed(number, span, reason));
                }
                (Some(Marker::End { .. }), Some(region)) => {
                    tracing::trace!(name = region.name, line = region.line, "parsed region");
                    regions.push(Region::Marked(region.close(line)));
                }
            }
        }

        if let Some(region) = open {
            let reason = Malformed::Unterminated {
                name: region.name.to_string(),
            };
            return Err(region.malformed(reason));
        }
        push_free(&mut regions, free);

        Ok(Self {
            regions,
            line_ending: LineEnding::detect(text),
        })
    }

    /// Build a fresh document with one region per registry section followed
    /// by a free region holding `trailer`.
    pub fn from_sections<'s>(
        sections: impl IntoIterator<Item = &'s Section>,
        trailer: &str,
    ) -> Self {
        let line_ending = LineEnding::Lf;
        let mut regions = Vec::new();
        let mut gap = "";
        for section in sections {
            push_free(&mut regions, gap.to_string());
            regions.push(Region::Marked(MarkedRegion::new(section, line_ending)));
            gap = "\n";
        }
        push_free(&mut regions, format!("{gap}{trailer}"));

        Self {
            regions,
            line_ending,
        }
    }

    /// The line terminator convention of the document.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// All regions in source order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// All marked regions in source order, duplicates included.
    pub fn marked(&self) -> impl Iterator<Item = &MarkedRegion> {
        self.regions.iter().filter_map(|region| match region {
            Region::Marked(marked) => Some(marked),
            Region::Free(_) => None,
        })
    }

    /// All marked regions in source order, mutably.
    pub fn marked_mut(&mut self) -> impl Iterator<Item = &mut MarkedRegion> {
        self.regions.iter_mut().filter_map(|region| match region {
            Region::Marked(marked) => Some(marked),
            Region::Free(_) => None,
        })
    }

    /// All free regions in source order.
    pub fn free(&self) -> impl Iterator<Item = &FreeRegion> {
        self.regions.iter().filter_map(|region| match region {
            Region::Free(free) => Some(free),
            Region::Marked(_) => None,
        })
    }

    /// The first marked region with the given name.
    pub fn get(&self, name: &str) -> Option<&MarkedRegion> {
        self.marked().find(|region| region.name == name)
    }

    /// Names that occur on more than one marked region, in the order their
    /// first repeat appears.
    pub fn duplicates(&self) -> Vec<&str> {
        self.marked().map(MarkedRegion::name).duplicates().collect()
    }

    /// Render the document back to text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for region in &self.regions {
            match region {
                Region::Free(free) => out.push_str(&free.text),
                Region::Marked(marked) => marked.render_into(&mut out),
            }
        }
        out
    }
}

fn push_free(regions: &mut Vec<Region>, text: String) {
    let index = regions
        .iter()
        .filter(|region| matches!(region, Region::Free(_)))
        .count();
    regions.push(Region::Free(FreeRegion { index, text }));
}

fn malformed(line: usize, span: Span, reason: Malformed) -> Error {
    Error::MalformedDocument {
        name: reason.name().to_string(),
        line,
        span,
        reason,
    }
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
