//! Filters attached to timeline entries.
//!
//! MLT stores filter settings as ordered `<property name="key">value</property>`
//! children. Property order carries no meaning for Kdenlive but is kept
//! stable so generated projects diff cleanly.

use crate::document::Element;
use crate::rect::KeyframePair;

/// Tag name of filter elements inside an entry.
pub const FILTER_TAG: &str = "filter";

/// Service name of the transform filter used for pan/zoom.
pub const QTBLEND_SERVICE: &str = "qtblend";

/// A filter with an id and ordered key/value properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub id: String,
    pub properties: Vec<(String, String)>,
}

impl Filter {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: vec![],
        }
    }

    /// Append a property, keeping insertion order.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Value of a property by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The Kdenlive "Transform" (qtblend) filter animating `keyframes`.
    pub fn qtblend(id: u32, keyframes: &KeyframePair) -> Self {
        Self::new(id.to_string())
            .with_property("rotate_center", "1")
            .with_property("mlt_service", QTBLEND_SERVICE)
            .with_property("kdenlive_id", QTBLEND_SERVICE)
            .with_property("rect", keyframes.rect_property())
            .with_property("rotation", keyframes.rotation_property())
            .with_property("compositing", "0")
            .with_property("distort", "0")
            .with_property("kdenlive:collapsed", "0")
    }

    /// Build the `<filter>` element.
    pub fn to_element(&self) -> Element {
        let mut element = Element::new(FILTER_TAG).with_attr("id", self.id.as_str());
        for (name, value) in &self.properties {
            element.push_element(
                Element::new("property")
                    .with_attr("name", name.as_str())
                    .with_text(value.as_str()),
            );
        }
        element
    }

    /// Read a filter back from a `<filter>` element.
    ///
    /// Returns `None` when the element is not a filter or has no id.
    pub fn from_element(element: &Element) -> Option<Self> {
        if element.name != FILTER_TAG {
            return None;
        }
        let id = element.attr("id")?.to_string();
        let properties = element
            .children_named("property")
            .filter_map(|p| Some((p.attr("name")?.to_string(), p.text())))
            .collect();
        Some(Self { id, properties })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    fn sample_keyframes() -> KeyframePair {
        KeyframePair::new(
            "0",
            &Rect::new(0.0, 0.0, 1920.0, 1440.0),
            "125",
            &Rect::new(0.0, 0.0, 2112.0, 1584.0),
        )
    }

    #[test]
    fn test_qtblend_property_order() {
        let filter = Filter::qtblend(10, &sample_keyframes());
        let names: Vec<&str> = filter.properties.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "rotate_center",
                "mlt_service",
                "kdenlive_id",
                "rect",
                "rotation",
                "compositing",
                "distort",
                "kdenlive:collapsed",
            ]
        );
        assert_eq!(
            filter.property("rect"),
            Some("0=0 0 1920 1440 1.000000;125=0 0 2112 1584 1.000000")
        );
        assert_eq!(filter.property("rotation"), Some("0=0;125=0"));
    }

    #[test]
    fn test_element_conversion() {
        let filter = Filter::qtblend(42, &sample_keyframes());
        let element = filter.to_element();
        assert_eq!(element.name, "filter");
        assert_eq!(element.attr("id"), Some("42"));
        assert_eq!(element.property("mlt_service").as_deref(), Some("qtblend"));
        assert_eq!(Filter::from_element(&element), Some(filter));
    }

    #[test]
    fn test_from_element_rejects_other_tags() {
        assert_eq!(Filter::from_element(&Element::new("entry")), None);
        assert_eq!(Filter::from_element(&Element::new("filter")), None);
        assert_eq!(
            Filter::from_element(&Element::new("filter").with_attr("id", "filter3"))
                .map(|f| f.id),
            Some("filter3".to_string())
        );
    }
}
