//! Renders guide markdown from the catalog and the loader.

use ts_pkg_distro_catalog::{Catalog, GuideEntry, MarkdownLoader, NextGuide};

const HEADING: &str = "# TypeScript Package Distribution Guides";
const SEQUENCE_INTRO: &str = "The following guides are available in sequence:";

/// Reply when the current guide is the last in the sequence.
pub const END_OF_SEQUENCE: &str =
    "No next guide available. You've reached the end of the sequence.";

/// Catalog plus loader, shared by every guide tool and resource.
#[derive(Debug, Clone)]
pub struct GuideLibrary {
    catalog: Catalog,
    loader: MarkdownLoader,
}

impl GuideLibrary {
    pub fn new(catalog: Catalog, loader: MarkdownLoader) -> Self {
        Self { catalog, loader }
    }

    /// Standard catalog served from the bundled markdown directory.
    pub fn standard() -> Self {
        Self::new(Catalog::standard(), MarkdownLoader::bundled())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn loader(&self) -> &MarkdownLoader {
        &self.loader
    }

    pub fn guide_markdown(&self, entry: &GuideEntry) -> String {
        self.loader.load(entry.filename)
    }

    /// Markdown for `id`, or `None` when the id is not in the catalog.
    pub fn guide_by_id(&self, id: &str) -> Option<String> {
        self.catalog.get(id).map(|entry| self.guide_markdown(entry))
    }

    /// Bulleted list of every guide with its URI, used by `list_guides`.
    pub fn list_markdown(&self) -> String {
        let lines: Vec<String> = self
            .catalog
            .entries()
            .iter()
            .map(|e| format!("- **{}**: {}", e.title, e.resource_uri()))
            .collect();
        format!(
            "{HEADING}\n\n{SEQUENCE_INTRO}\n\n{}\n\nUse the `get_guide` tool with the guide parameter to access a specific guide.",
            lines.join("\n")
        )
    }

    /// Linked list of every guide with its description, served as the index resource.
    pub fn index_markdown(&self) -> String {
        let lines: Vec<String> = self
            .catalog
            .entries()
            .iter()
            .map(|e| format!("- **[{}]({})**: {}", e.title, e.resource_uri(), e.description))
            .collect();
        format!("{HEADING}\n\n{SEQUENCE_INTRO}\n\n{}", lines.join("\n"))
    }

    /// Content of the guide after `current`, or a plain message when there is none.
    pub fn next_guide_markdown(&self, current: &str) -> String {
        match self.catalog.next_after(current) {
            NextGuide::Next(entry) => format!(
                "# Next Guide: {}\n\nAccess at: {}\n\n{}",
                entry.title,
                entry.resource_uri(),
                self.guide_markdown(entry)
            ),
            NextGuide::End => END_OF_SEQUENCE.to_string(),
            NextGuide::Unknown => unknown_guide_message(current),
        }
    }
}

/// Reply when the current guide is not in the catalog.
pub fn unknown_guide_message(id: &str) -> String {
    format!("No next guide available. Unknown guide: '{id}'.")
}
