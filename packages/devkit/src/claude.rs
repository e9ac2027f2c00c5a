//! Keep a project's CLAUDE.md in sync with the devkit template registry.
//!
//! The registry owns a set of named regions; everything else in the file
//! belongs to the user and survives every update byte-for-byte.

use std::fs::{self, Permissions};
use std::io::{self, ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use bon::Builder;
use tempfile::NamedTempFile;

pub use error::{Error, Malformed};

use document::Document;
use merge::{CheckReport, UpdateReport};
use registry::Registry;

pub mod document;
mod error;
pub mod merge;
pub mod registry;

/// Free text written after the registry sections by `init`.
pub const CUSTOM_PLACEHOLDER: &str = "<!-- Add project-specific instructions below. \
`devkit claude update` only rewrites text between BEGIN and END markers. -->\n";

/// A CLAUDE.md file on disk, paired with the registry that owns its
/// marked regions.
#[derive(Debug, Clone, Builder)]
pub struct ClaudeMd {
    /// Path of the document.
    #[builder(into)]
    path: PathBuf,

    /// Canonical content for framework-owned regions.
    registry: Registry,
}

impl ClaudeMd {
    /// Path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The registry this document is merged against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Write a fresh document: one region per registry section, in registry
    /// order, followed by a placeholder for custom instructions.
    ///
    /// Fails with [`Error::AlreadyExists`] if the document exists and `force`
    /// is not set; with `force` the old content is discarded.
    #[tracing::instrument(skip(self), fields(path = ?self.path))]
    pub fn init(&self, force: bool) -> Result<(), Error> {
        let exists = self
            .path
            .try_exists()
            .map_err(self.io_error("check existence of"))?;
        if exists && !force {
            return Err(Error::AlreadyExists {
                path: self.path.clone(),
            });
        }

        let document = Document::from_sections(self.registry.sections(), CUSTOM_PLACEHOLDER);
        self.write(&document.render())?;
        tracing::info!(sections = self.registry.len(), "initialized document");
        Ok(())
    }

    /// Merge the registry into the document and write the result.
    ///
    /// Nothing is written when no region drifted. Fails with
    /// [`Error::NotFound`] if the document does not exist, and with
    /// [`Error::MalformedDocument`] if its markers are broken.
    #[tracing::instrument(skip(self), fields(path = ?self.path))]
    pub fn update(&self) -> Result<UpdateReport, Error> {
        let mut document = self.read()?;
        let report = merge::merge(&mut document, &self.registry);
        if report.is_changed() {
            self.write(&document.render())?;
            tracing::info!(?report, "updated document");
        } else {
            tracing::debug!(?report, "document is current; nothing written");
        }
        Ok(report)
    }

    /// Report which registry sections `update` would change or which are
    /// missing, without writing anything.
    #[tracing::instrument(skip(self), fields(path = ?self.path))]
    pub fn check_for_updates(&self) -> Result<CheckReport, Error> {
        let document = self.read()?;
        Ok(merge::check(&document, &self.registry))
    }

    fn read(&self) -> Result<Document, Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(self.io_error("read")(e)),
        };
        Document::parse(&text)
    }

    /// Replace the document with `content` in one step.
    ///
    /// The content is written to a temporary file next to the document and
    /// then renamed over it, so readers see either the old or the new file.
    /// A symlinked document is written through to its target.
    fn write(&self, content: &str) -> Result<(), Error> {
        let target = self.target()?;
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let permissions = match fs::metadata(&target) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(e) if e.kind() == ErrorKind::NotFound => default_permissions(),
            Err(e) => return Err(self.io_error("read metadata of")(e)),
        };

        let mut file =
            NamedTempFile::new_in(dir).map_err(self.io_error("create temporary file for"))?;
        file.write_all(content.as_bytes())
            .map_err(self.io_error("write temporary file for"))?;
        if let Some(permissions) = permissions {
            file.as_file()
                .set_permissions(permissions)
                .map_err(self.io_error("set permissions of temporary file for"))?;
        }
        file.as_file()
            .sync_all()
            .map_err(self.io_error("sync temporary file for"))?;
        file.persist(&target)
            .map_err(|e| self.io_error("replace")(e.error))?;

        tracing::debug!(?target, bytes = content.len(), "wrote document");
        Ok(())
    }

    /// The file that actually holds the document: the path itself, or the
    /// file it links to.
    fn target(&self) -> Result<PathBuf, Error> {
        match fs::symlink_metadata(&self.path) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                let target = fs::canonicalize(&self.path)
                    .map_err(self.io_error("resolve symlink"))?;
                tracing::debug!(?target, "document is a symlink");
                Ok(target)
            }
            Ok(_) => Ok(self.path.clone()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(self.path.clone()),
            Err(e) => Err(self.io_error("read metadata of")(e)),
        }
    }

    fn io_error(&self, action: &'static str) -> impl FnOnce(io::Error) -> Error + '_ {
        move |source| Error::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}
