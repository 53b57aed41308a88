//! Resource model: content pointers, resources and the private store.

mod pointer;
mod store;

pub use pointer::{ContentPointer, PointerError};
pub use store::{ResourceStore, SourceLocator};

/// A publishable resource: a content pointer plus optional original naming.
///
/// Resources are created by the [`ResourceStore`]; the publishing engine
/// only reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pointer: ContentPointer,
    filename: Option<String>,
    extension: Option<String>,
}

impl Resource {
    /// Build a resource. Empty filename/extension strings count as absent.
    pub fn new(
        pointer: ContentPointer,
        filename: Option<String>,
        extension: Option<String>,
    ) -> Self {
        Self {
            pointer,
            filename: filename.filter(|s| !s.is_empty()),
            extension: extension.filter(|s| !s.is_empty()),
        }
    }

    #[inline]
    pub fn pointer(&self) -> &ContentPointer {
        &self.pointer
    }

    /// Original filename as uploaded, if the resource carries one.
    #[inline]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    #[inline]
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// File name the resource publishes under: hash plus extension when
    /// an extension is present, the bare hash otherwise.
    pub fn publish_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.pointer, ext),
            None => self.pointer.as_str().to_owned(),
        }
    }
}
