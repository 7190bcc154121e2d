use std::collections::BTreeMap;

use foundation::Rgb;
use serde::Serialize;

use crate::target::{Property, Target};
use crate::value::Value;

/// Write access the animation engine needs from a rendering surface.
pub trait Surface {
    fn read(&self, target: &Target, property: Property) -> Option<Value>;
    fn write(&mut self, target: &Target, property: Property, value: Value);
}

/// In-memory scene graph: the current value of every animated attribute.
///
/// Storage is sorted (`BTreeMap`) so snapshots and iteration are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    nodes: BTreeMap<Target, BTreeMap<Property, Value>>,
    error: Option<String>,
    writes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub nodes: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an attribute without counting it as an animation write.
    pub fn insert(&mut self, target: Target, property: Property, value: Value) {
        self.nodes.entry(target).or_default().insert(property, value);
    }

    pub fn get(&self, target: &Target, property: Property) -> Option<&Value> {
        self.nodes.get(target).and_then(|props| props.get(&property))
    }

    pub fn number(&self, target: &Target, property: Property) -> Option<f64> {
        self.get(target, property).and_then(Value::as_number)
    }

    pub fn color(&self, target: &Target, property: Property) -> Option<Rgb> {
        self.get(target, property).and_then(Value::as_color)
    }

    pub fn text(&self, target: &Target, property: Property) -> Option<&str> {
        self.get(target, property).and_then(Value::as_str)
    }

    /// Opacity above zero; auto-hidden elements report `false`.
    pub fn is_visible(&self, target: &Target) -> bool {
        self.number(target, Property::Opacity)
            .is_some_and(|o| o > 0.0)
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.nodes.keys()
    }

    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().filter_map(|t| match t {
            Target::Region(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Drop every node and show only `message`. Later writes are ignored.
    pub fn replace_with_error(&mut self, message: impl Into<String>) {
        self.nodes.clear();
        self.error = Some(message.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of attribute writes made through [`Surface::write`].
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let nodes = self
            .nodes
            .iter()
            .map(|(target, props)| {
                let props = props
                    .iter()
                    .map(|(p, v)| (p.to_string(), v.clone()))
                    .collect();
                (target.to_string(), props)
            })
            .collect();
        SceneSnapshot {
            error: self.error.clone(),
            nodes,
        }
    }
}

impl Surface for Scene {
    fn read(&self, target: &Target, property: Property) -> Option<Value> {
        self.get(target, property).cloned()
    }

    fn write(&mut self, target: &Target, property: Property, value: Value) {
        if self.error.is_some() {
            return;
        }
        self.writes += 1;
        match self.nodes.get_mut(target) {
            Some(props) => {
                props.insert(property, value);
            }
            None => {
                self.insert(target.clone(), property, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Scene, Surface};
    use crate::target::{Property, Target};
    use crate::value::Value;
    use foundation::Rgb;

    #[test]
    fn write_then_read() {
        let mut scene = Scene::new();
        let kyiv = Target::region("Kiev");
        scene.write(&kyiv, Property::Fill, Value::Color(Rgb::new(1, 2, 3)));
        assert_eq!(scene.color(&kyiv, Property::Fill), Some(Rgb::new(1, 2, 3)));
        assert_eq!(scene.write_count(), 1);
    }

    #[test]
    fn insert_does_not_count_as_write() {
        let mut scene = Scene::new();
        scene.insert(Target::MapLayer, Property::Opacity, Value::Number(1.0));
        assert!(scene.is_visible(&Target::MapLayer));
        assert_eq!(scene.write_count(), 0);
    }

    #[test]
    fn error_replaces_everything_and_blocks_writes() {
        let mut scene = Scene::new();
        scene.insert(Target::MapLayer, Property::Opacity, Value::Number(1.0));
        scene.replace_with_error("boom");
        scene.write(&Target::MapLayer, Property::Opacity, Value::Number(1.0));
        assert_eq!(scene.targets().count(), 0);
        assert_eq!(scene.error(), Some("boom"));
        let snap = scene.snapshot();
        assert!(snap.nodes.is_empty());
    }

    #[test]
    fn snapshot_uses_display_keys() {
        let mut scene = Scene::new();
        scene.insert(Target::RadialBar(3), Property::ScaleY, Value::Number(0.0));
        let snap = scene.snapshot();
        assert!(snap.nodes["radial-bar/03"].contains_key("scaleY"));
    }
}
