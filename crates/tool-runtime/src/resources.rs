//! Guide resources: one per catalog entry, plus the root and the index.

use async_trait::async_trait;
use std::sync::Arc;

use ts_pkg_distro_catalog::catalog::{INDEX_URI, ROOT_URI};
use ts_pkg_distro_catalog::GuideEntry;

use crate::library::GuideLibrary;
use crate::resource::{Resource, ResourceDefinition, MARKDOWN_MIME};

/// `ts-pkg-distro://resource/<id>`
pub struct GuideResource {
    entry: &'static GuideEntry,
    library: Arc<GuideLibrary>,
}

impl GuideResource {
    pub fn new(entry: &'static GuideEntry, library: Arc<GuideLibrary>) -> Self {
        Self { entry, library }
    }
}

#[async_trait]
impl Resource for GuideResource {
    fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: self.entry.resource_uri(),
            name: self.entry.title.to_string(),
            description: Some(self.entry.description.to_string()),
            mime_type: MARKDOWN_MIME.to_string(),
        }
    }

    async fn read(&self) -> String {
        self.library.guide_markdown(self.entry)
    }
}

/// The bare scheme URI, served with the first guide.
pub struct RootResource {
    entry: &'static GuideEntry,
    library: Arc<GuideLibrary>,
}

impl RootResource {
    /// `None` when the catalog is empty.
    pub fn new(library: Arc<GuideLibrary>) -> Option<Self> {
        let entry = library.catalog().first()?;
        Some(Self { entry, library })
    }
}

#[async_trait]
impl Resource for RootResource {
    fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: ROOT_URI.to_string(),
            name: self.entry.title.to_string(),
            description: Some(self.entry.description.to_string()),
            mime_type: MARKDOWN_MIME.to_string(),
        }
    }

    async fn read(&self) -> String {
        self.library.guide_markdown(self.entry)
    }
}

pub struct IndexResource {
    library: Arc<GuideLibrary>,
}

impl IndexResource {
    pub fn new(library: Arc<GuideLibrary>) -> Self {
        Self { library }
    }
}

#[async_trait]
impl Resource for IndexResource {
    fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: INDEX_URI.to_string(),
            name: "TypeScript Package Distribution Guides Index".to_string(),
            description: None,
            mime_type: MARKDOWN_MIME.to_string(),
        }
    }

    async fn read(&self) -> String {
        self.library.index_markdown()
    }
}
