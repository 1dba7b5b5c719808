//! Cached visual ids on the root window.
//!
//! The inspector remembers which system and RGBA visuals it picked by storing
//! both ids on the root window under [`VISUALS_PROPERTY`]. Readers accept the
//! property only if it is an integer property of format 32 with exactly two
//! items; anything else is treated as absent.

use std::collections::HashMap;

use tracing::debug;

/// Root window property holding the cached pair.
pub const VISUALS_PROPERTY: &str = "GDK_VISUALS";

/// Type of a root window property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Integer,
    Cardinal,
    Atom,
    String,
}

/// A property as stored on a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootProperty {
    pub name: String,
    pub type_: PropertyType,
    /// Bits per item: 8, 16 or 32.
    pub format: u8,
    pub items: Vec<u32>,
}

/// The cached pair of visual ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualCache {
    pub system: u32,
    pub rgba: u32,
}

impl VisualCache {
    pub fn new(system: u32, rgba: u32) -> Self {
        Self { system, rgba }
    }

    pub fn to_property(self) -> RootProperty {
        RootProperty {
            name: VISUALS_PROPERTY.to_owned(),
            type_: PropertyType::Integer,
            format: 32,
            items: vec![self.system, self.rgba],
        }
    }

    /// Decode a stored property. `None` unless it is `Integer`, format 32,
    /// with exactly two items.
    pub fn from_property(property: &RootProperty) -> Option<Self> {
        if property.type_ != PropertyType::Integer || property.format != 32 {
            return None;
        }
        match property.items.as_slice() {
            &[system, rgba] => Some(Self { system, rgba }),
            _ => None,
        }
    }

    /// Read the cache from `root`.
    pub fn load(root: &RootWindow) -> Option<Self> {
        root.get(VISUALS_PROPERTY).and_then(Self::from_property)
    }

    /// Write the cache to `root`, replacing any previous value.
    pub fn store(self, root: &mut RootWindow) {
        debug!(system = self.system, rgba = self.rgba, "visual ids cached");
        root.set(self.to_property());
    }
}

/// In-memory property store of a display's root window.
#[derive(Debug, Clone, Default)]
pub struct RootWindow {
    properties: HashMap<String, RootProperty>,
}

impl RootWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RootProperty> {
        self.properties.get(name)
    }

    /// Store `property` under its name. Returns the value it replaced.
    pub fn set(&mut self, property: RootProperty) -> Option<RootProperty> {
        self.properties.insert(property.name.clone(), property)
    }

    pub fn delete(&mut self, name: &str) -> Option<RootProperty> {
        self.properties.remove(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_loads() {
        let mut root = RootWindow::new();
        assert_eq!(VisualCache::load(&root), None);

        VisualCache::new(0x21, 0x5c).store(&mut root);
        assert_eq!(VisualCache::load(&root), Some(VisualCache::new(0x21, 0x5c)));

        let stored = root.get(VISUALS_PROPERTY).unwrap();
        assert_eq!(stored.type_, PropertyType::Integer);
        assert_eq!(stored.format, 32);
        assert_eq!(stored.items, vec![0x21, 0x5c]);

        root.delete(VISUALS_PROPERTY);
        assert!(root.is_empty());
    }

    #[test]
    fn rejects_malformed_properties() {
        let good = VisualCache::new(1, 2).to_property();

        let wrong_type = RootProperty {
            type_: PropertyType::Cardinal,
            ..good.clone()
        };
        let wrong_format = RootProperty {
            format: 16,
            ..good.clone()
        };
        let too_few = RootProperty {
            items: vec![1],
            ..good.clone()
        };
        let too_many = RootProperty {
            items: vec![1, 2, 3],
            ..good.clone()
        };

        for bad in [wrong_type, wrong_format, too_few, too_many] {
            assert_eq!(VisualCache::from_property(&bad), None, "{bad:?}");
        }
        assert_eq!(VisualCache::from_property(&good), Some(VisualCache::new(1, 2)));
    }

    #[test]
    fn set_replaces() {
        let mut root = RootWindow::new();
        assert!(root.set(VisualCache::new(1, 2).to_property()).is_none());
        let old = root.set(VisualCache::new(3, 4).to_property()).unwrap();
        assert_eq!(old.items, vec![1, 2]);
        assert_eq!(root.len(), 1);
    }
}
