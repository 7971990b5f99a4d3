use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Separator between widget type and instance in multi-instance placement ids.
pub const INSTANCE_SEPARATOR: char = ':';

fn default_enabled() -> bool {
    true
}

/// Grid rectangle in cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// One widget placed on the dashboard grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPlacement {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_config: Option<Map<String, Value>>,
}

impl WidgetPlacement {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            enabled: true,
            display_name: None,
            category: None,
            description: None,
            instance_config: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Name shown to the user: `displayName`, falling back to `id`.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    pub fn widget_type(&self) -> &str {
        widget_type_of(&self.id)
    }

    pub fn instance(&self) -> Option<&str> {
        self.id
            .split_once(INSTANCE_SEPARATOR)
            .map(|(_, instance)| instance)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.w = rect.w;
        self.h = rect.h;
    }
}

/// Widget type portion of a placement id (`clock:2` -> `clock`).
pub fn widget_type_of(id: &str) -> &str {
    id.split_once(INSTANCE_SEPARATOR)
        .map(|(ty, _)| ty)
        .unwrap_or(id)
}

pub fn instance_id(widget_type: &str, instance: &str) -> String {
    format!("{widget_type}{INSTANCE_SEPARATOR}{instance}")
}

pub fn enabled_count(layout: &[WidgetPlacement]) -> usize {
    layout.iter().filter(|p| p.enabled).count()
}

/// Order-insensitive identity of the enabled part of a layout. Two layouts
/// with equal fingerprints render the same widgets in the same cells.
pub fn enabled_fingerprint(layout: &[WidgetPlacement]) -> BTreeSet<(&str, Rect)> {
    layout
        .iter()
        .filter(|p| p.enabled)
        .map(|p| (p.id.as_str(), p.rect()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresetType {
    #[default]
    Grid,
    Fullscreen,
}

impl PresetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetType::Grid => "grid",
            PresetType::Fullscreen => "fullscreen",
        }
    }
}

impl std::fmt::Display for PresetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, persisted snapshot of a widget layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(rename = "type", default)]
    pub preset_type: PresetType,
    #[serde(default)]
    pub layout: Vec<WidgetPlacement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Preset {
    pub fn enabled_count(&self) -> usize {
        enabled_count(&self.layout)
    }

    /// A preset with no enabled placement counts as empty.
    pub fn is_empty(&self) -> bool {
        self.enabled_count() == 0
    }

    pub fn enabled_placements(&self) -> impl Iterator<Item = &WidgetPlacement> {
        self.layout.iter().filter(|p| p.enabled)
    }

    /// Keep only the first enabled placement of a fullscreen preset.
    /// Returns how many placements were disabled.
    pub fn enforce_fullscreen(&mut self) -> usize {
        if self.preset_type != PresetType::Fullscreen {
            return 0;
        }
        let mut seen = false;
        let mut disabled = 0;
        for placement in self.layout.iter_mut().filter(|p| p.enabled) {
            if seen {
                placement.enabled = false;
                disabled += 1;
            }
            seen = true;
        }
        disabled
    }

    /// Drop placements whose id repeats an earlier one. Returns the dropped ids.
    pub fn dedupe_placements(&mut self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut dropped = Vec::new();
        self.layout.retain(|p| {
            if seen.insert(p.id.clone()) {
                true
            } else {
                dropped.push(p.id.clone());
                false
            }
        });
        dropped
    }
}

/// Metadata edit for an existing preset. `None` leaves a field as is; an
/// empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetFields {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PresetFields {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
