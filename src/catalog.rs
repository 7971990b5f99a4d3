use crate::model::widget_type_of;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

fn default_width() -> i32 {
    2
}

fn default_height() -> i32 {
    2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSize {
    #[serde(default = "default_width")]
    pub w: i32,
    #[serde(default = "default_height")]
    pub h: i32,
}

impl Default for DefaultSize {
    fn default() -> Self {
        Self {
            w: default_width(),
            h: default_height(),
        }
    }
}

/// Catalog entry describing a widget type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub default_size: DefaultSize,
}

impl WidgetDefinition {
    pub fn new(id: &str, title: &str, category: &str, w: i32, h: i32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            category: category.to_string(),
            default_size: DefaultSize { w, h },
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Read-only source of widget definitions.
pub trait WidgetCatalog: Send + Sync {
    fn list_all(&self) -> Vec<WidgetDefinition>;

    /// Definition for a widget type. Multi-instance ids resolve to their type.
    fn get(&self, id: &str) -> Option<WidgetDefinition> {
        let ty = widget_type_of(id);
        self.list_all().into_iter().find(|def| def.id == ty)
    }

    fn by_category(&self) -> BTreeMap<String, Vec<WidgetDefinition>> {
        let mut map: BTreeMap<String, Vec<WidgetDefinition>> = BTreeMap::new();
        for def in self.list_all() {
            map.entry(def.category.clone()).or_default().push(def);
        }
        map
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// In-memory widget catalog keyed by widget type.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<String, WidgetDefinition>,
}

impl WidgetRegistry {
    pub fn from_definitions(defs: impl IntoIterator<Item = WidgetDefinition>) -> Self {
        let mut reg = Self::default();
        for def in defs {
            reg.register(def);
        }
        reg
    }

    pub fn register(&mut self, def: WidgetDefinition) {
        if self.map.insert(def.id.clone(), def).is_some() {
            tracing::debug!("widget definition replaced");
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl WidgetCatalog for WidgetRegistry {
    fn list_all(&self) -> Vec<WidgetDefinition> {
        let mut defs: Vec<WidgetDefinition> = self.map.values().cloned().collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    fn get(&self, id: &str) -> Option<WidgetDefinition> {
        self.map.get(widget_type_of(id)).cloned()
    }
}

/// Search text and category narrowing applied to the catalog before a bulk
/// selection operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub search: String,
    pub category: Option<String>,
}

impl CatalogFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
            category: None,
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            search: String::new(),
            category: Some(category.into()),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Every whitespace-separated search term must appear in the id, title,
    /// description or category (case-insensitive).
    pub fn matches(&self, def: &WidgetDefinition) -> bool {
        if let Some(category) = &self.category {
            if !def.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        let haystack = format!(
            "{} {} {} {}",
            def.id, def.title, def.description, def.category
        )
        .to_lowercase();
        self.search
            .split_whitespace()
            .all(|term| haystack.contains(&term.to_lowercase()))
    }

    pub fn filtered<'a>(&self, defs: &'a [WidgetDefinition]) -> Vec<&'a WidgetDefinition> {
        defs.iter().filter(|def| self.matches(def)).collect()
    }

    pub fn filtered_ids(&self, catalog: &dyn WidgetCatalog) -> BTreeSet<String> {
        catalog
            .list_all()
            .into_iter()
            .filter(|def| self.matches(def))
            .map(|def| def.id)
            .collect()
    }
}
