use crate::model::WidgetPlacement;

pub const EMPTY_LAYOUT_NAME: &str = "Empty layout";
pub const DEFAULT_MAX_NAMES: usize = 3;

/// Derives a preset name from a layout. Must return the same name for the
/// same set of enabled widgets.
pub trait NameGenerator: Send + Sync {
    fn generate_name(&self, layout: &[WidgetPlacement]) -> String;
}

/// Lists the enabled widget labels in alphabetical order, capped at
/// `max_names` with a `+N more` suffix.
#[derive(Debug, Clone, Copy)]
pub struct WidgetListNameGenerator {
    pub max_names: usize,
}

impl Default for WidgetListNameGenerator {
    fn default() -> Self {
        Self {
            max_names: DEFAULT_MAX_NAMES,
        }
    }
}

impl WidgetListNameGenerator {
    pub fn new(max_names: usize) -> Self {
        Self {
            max_names: max_names.max(1),
        }
    }
}

impl NameGenerator for WidgetListNameGenerator {
    fn generate_name(&self, layout: &[WidgetPlacement]) -> String {
        let mut labels: Vec<&str> = layout
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.label())
            .collect();
        if labels.is_empty() {
            return EMPTY_LAYOUT_NAME.to_string();
        }
        labels.sort_unstable();
        let shown = labels.len().min(self.max_names);
        let mut name = labels[..shown].join(", ");
        if labels.len() > shown {
            name.push_str(&format!(" +{} more", labels.len() - shown));
        }
        name
    }
}

impl<F> NameGenerator for F
where
    F: Fn(&[WidgetPlacement]) -> String + Send + Sync,
{
    fn generate_name(&self, layout: &[WidgetPlacement]) -> String {
        self(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    fn placement(id: &str, name: Option<&str>) -> WidgetPlacement {
        let p = WidgetPlacement::new(id, Rect::default());
        match name {
            Some(n) => p.with_display_name(n),
            None => p,
        }
    }

    #[test]
    fn order_of_widgets_does_not_change_name() {
        let gen = WidgetListNameGenerator::default();
        let a = vec![placement("b", Some("Weather")), placement("a", Some("Clock"))];
        let b = vec![placement("a", Some("Clock")), placement("b", Some("Weather"))];
        assert_eq!(gen.generate_name(&a), "Clock, Weather");
        assert_eq!(gen.generate_name(&a), gen.generate_name(&b));
    }

    #[test]
    fn overflow_and_fallbacks() {
        let gen = WidgetListNameGenerator::new(2);
        let layout = vec![
            placement("notes", None),
            placement("clock", Some("Clock")),
            placement("weather", Some("Weather")),
            placement("hidden", Some("Hidden")).disabled(),
        ];
        assert_eq!(gen.generate_name(&layout), "Clock, Weather +1 more");
        assert_eq!(gen.generate_name(&[]), EMPTY_LAYOUT_NAME);
    }

    #[test]
    fn closures_are_generators() {
        let gen = |layout: &[WidgetPlacement]| format!("{} widgets", layout.len());
        assert_eq!(gen.generate_name(&[placement("a", None)]), "1 widgets");
    }
}
