//! Portfolio projects, validated once when the catalog is loaded.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;
use crate::reply::{is_id_char, ParsedReply};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    PackagingDesign,
    Branding,
    PublicationDesign,
    MagazineDesign,
    BookDesign,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::PackagingDesign,
        Category::Branding,
        Category::PublicationDesign,
        Category::MagazineDesign,
        Category::BookDesign,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::PackagingDesign => "Packaging Design",
            Category::Branding => "Branding",
            Category::PublicationDesign => "Publication Design",
            Category::MagazineDesign => "Magazine Design",
            Category::BookDesign => "Book Design",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    /// Matches labels case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(category) => category.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub full_description: String,
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    pub year: String,
}

impl Project {
    fn check(&self) -> Result<(), String> {
        if self.id.is_empty() || !self.id.chars().all(is_id_char) {
            return Err(format!("id `{}` must be one or more word characters", self.id));
        }
        if self.title.trim().is_empty() {
            return Err(format!("project `{}` has an empty title", self.id));
        }
        if self.year.len() != 4 || !self.year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("project `{}` has year `{}`, expected four digits", self.id, self.year));
        }
        if self.thumbnail.trim().is_empty() {
            return Err(format!("project `{}` has no thumbnail", self.id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    /// Validates every project and rejects duplicate ids.
    pub fn new(projects: Vec<Project>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for (index, project) in projects.iter().enumerate() {
            project
                .check()
                .map_err(|reason| CatalogError::InvalidProject { index, reason })?;
            if !seen.insert(project.id.as_str()) {
                return Err(CatalogError::DuplicateId(project.id.clone()));
            }
        }
        Ok(Self { projects })
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let projects: Vec<Project> = serde_json::from_str(text)?;
        Self::new(projects)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&text)?;
        info!("loaded {} projects from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn filter(&self, filter: CategoryFilter) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(move |p| filter.matches(p.category))
    }

    /// Categories that have at least one project, in catalog order.
    pub fn categories(&self) -> Vec<Category> {
        let mut out = Vec::new();
        for project in &self.projects {
            if !out.contains(&project.category) {
                out.push(project.category);
            }
        }
        out
    }

    /// Projects referenced by a reply; unknown ids are skipped.
    pub fn resolve<'a>(&'a self, reply: &'a ParsedReply) -> impl Iterator<Item = &'a Project> + 'a {
        reply.referenced_ids.iter().filter_map(move |id| self.get(id))
    }
}
