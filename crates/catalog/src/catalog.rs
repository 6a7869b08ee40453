use std::collections::HashSet;

/// URI scheme shared by every guide resource.
pub const URI_SCHEME: &str = "ts-pkg-distro://";

/// Root resource, served with the first guide in the sequence.
pub const ROOT_URI: &str = "ts-pkg-distro://";

/// Index resource listing every guide.
pub const INDEX_URI: &str = "ts-pkg-distro://resource/index";

/// One guide in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideEntry {
    /// Stable identifier, e.g. `"initial-setup"`.
    pub id: &'static str,
    /// Markdown file in the bundled resources directory.
    pub filename: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

impl GuideEntry {
    /// Per-guide tool name: `get_<id with underscores>_guide`.
    pub fn tool_name(&self) -> String {
        format!("get_{}_guide", self.id.replace('-', "_"))
    }

    /// Human-readable form of the id (`initial setup`).
    pub fn display_name(&self) -> String {
        self.id.replace('-', " ")
    }

    pub fn resource_uri(&self) -> String {
        format!("{}resource/{}", URI_SCHEME, self.id)
    }
}

/// The packaging guides, in reading order.
pub static GUIDES: [GuideEntry; 10] = [
    GuideEntry {
        id: "orchestrator",
        filename: "00-Orchestrator.md",
        title: "Setting Up a TypeScript Package for Distribution",
        description: "Main guide with overview of the entire process",
    },
    GuideEntry {
        id: "project-assessment",
        filename: "01-Project-Assessment.md",
        title: "TypeScript Package Setup - Project Assessment",
        description: "Assess your current project structure",
    },
    GuideEntry {
        id: "initial-setup",
        filename: "02-Initial-Setup.md",
        title: "TypeScript Package Setup - Initial Setup",
        description: "Initial setup for a TypeScript package",
    },
    GuideEntry {
        id: "typescript-configuration",
        filename: "03-TypeScript-Configuration.md",
        title: "TypeScript Package Setup - TypeScript Configuration",
        description: "Configure TypeScript for package distribution",
    },
    GuideEntry {
        id: "package-configuration",
        filename: "04-Package-Configuration.md",
        title: "TypeScript Package Setup - Package Configuration",
        description: "Package.json configuration for distribution",
    },
    GuideEntry {
        id: "executable-setup",
        filename: "05-Executable-Setup.md",
        title: "TypeScript Package Setup - Executable Setup",
        description: "Make your package executable with npx",
    },
    GuideEntry {
        id: "build-and-test",
        filename: "06-Build-and-Test.md",
        title: "TypeScript Package Setup - Build and Test",
        description: "Build and test your TypeScript package",
    },
    GuideEntry {
        id: "publishing-preparation",
        filename: "07-Publishing-Preparation.md",
        title: "TypeScript Package Setup - Publishing Preparation",
        description: "Prepare your package for publishing",
    },
    GuideEntry {
        id: "publishing-to-npm",
        filename: "08-Publishing-to-npm.md",
        title: "TypeScript Package Setup - Publishing to npm",
        description: "Publish your package to npm registry",
    },
    GuideEntry {
        id: "npm-organizations-guide",
        filename: "09-npm-Organizations-Guide.md",
        title: "Comprehensive Guide to npm Organizations (Scopes)",
        description: "Learn how to use npm organizations and scopes effectively",
    },
];

/// Outcome of looking up the guide that follows another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextGuide<'a> {
    Next(&'a GuideEntry),
    /// The given id is the last guide.
    End,
    /// The given id is not in the catalog.
    Unknown,
}

/// Ordered, read-only table of guides. Order is the reading sequence.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: &'static [GuideEntry],
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(entries: &'static [GuideEntry]) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.id) {
                return Err(CatalogError::DuplicateId(entry.id.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in packaging guides.
    pub fn standard() -> Self {
        Self { entries: &GUIDES }
    }

    pub fn entries(&self) -> &'static [GuideEntry] {
        self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|e| e.id)
    }

    pub fn get(&self, id: &str) -> Option<&'static GuideEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn first(&self) -> Option<&'static GuideEntry> {
        self.entries.first()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn next_after(&self, id: &str) -> NextGuide<'static> {
        match self.position(id) {
            None => NextGuide::Unknown,
            Some(idx) => match self.entries.get(idx + 1) {
                Some(next) => NextGuide::Next(next),
                None => NextGuide::End,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Guide id '{0}' appears more than once")]
    DuplicateId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_ids_unique() {
        assert!(Catalog::new(&GUIDES).is_ok());
        assert_eq!(Catalog::standard().len(), 10);
    }

    #[test]
    fn test_duplicate_rejected() {
        static DUPES: [GuideEntry; 2] = [
            GuideEntry {
                id: "a",
                filename: "a.md",
                title: "A",
                description: "first",
            },
            GuideEntry {
                id: "a",
                filename: "b.md",
                title: "B",
                description: "second",
            },
        ];
        let err = Catalog::new(&DUPES).unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_sequence_order() {
        let catalog = Catalog::standard();
        let ids: Vec<_> = catalog.ids().collect();
        assert_eq!(ids.first(), Some(&"orchestrator"));
        assert_eq!(ids.last(), Some(&"npm-organizations-guide"));
        assert_eq!(catalog.position("initial-setup"), Some(2));
    }

    #[test]
    fn test_next_after() {
        let catalog = Catalog::standard();
        match catalog.next_after("orchestrator") {
            NextGuide::Next(entry) => assert_eq!(entry.id, "project-assessment"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(catalog.next_after("npm-organizations-guide"), NextGuide::End);
        assert_eq!(catalog.next_after("not-a-guide"), NextGuide::Unknown);
    }

    #[test]
    fn test_names_and_uris() {
        let entry = Catalog::standard().get("build-and-test").copied().unwrap();
        assert_eq!(entry.tool_name(), "get_build_and_test_guide");
        assert_eq!(entry.display_name(), "build and test");
        assert_eq!(entry.resource_uri(), "ts-pkg-distro://resource/build-and-test");
    }
}
