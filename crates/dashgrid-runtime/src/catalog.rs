//! Ordered, id-unique set of configured widget descriptors.

use dashgrid_layout::WidgetDescriptor;

/// Configured widgets in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetCatalog {
    descriptors: Vec<WidgetDescriptor>,
}

impl WidgetCatalog {
    /// Build a catalog; later descriptors reusing an id are dropped.
    #[must_use]
    pub fn new(descriptors: impl IntoIterator<Item = WidgetDescriptor>) -> Self {
        let mut catalog = Self::default();
        for descriptor in descriptors {
            if catalog.get(&descriptor.id).is_some() {
                tracing::warn!(
                    target: "dashgrid.catalog",
                    widget = %descriptor.id,
                    "duplicate widget id ignored"
                );
                continue;
            }
            catalog.descriptors.push(descriptor);
        }
        catalog
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WidgetDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.id.as_str())
    }

    #[must_use]
    pub fn descriptors(&self) -> &[WidgetDescriptor] {
        &self.descriptors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashgrid_layout::WidgetKind;

    #[test]
    fn keeps_first_of_duplicate_ids() {
        let catalog = WidgetCatalog::new([
            WidgetDescriptor::new("a", WidgetKind::Clock).at(1, 0),
            WidgetDescriptor::new("b", WidgetKind::Rss),
            WidgetDescriptor::new("a", WidgetKind::Tasks),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").map(|d| d.kind), Some(WidgetKind::Clock));
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(!catalog.contains("zzz"));
    }
}
