use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap};
use zbus::zvariant::{Type, Value};

use crate::Attributes;

const ITEM_PROPERTY_LABEL: &str = "org.freedesktop.Secret.Item.Label";
const ITEM_PROPERTY_ATTRIBUTES: &str = "org.freedesktop.Secret.Item.Attributes";

/// The `a{sv}` properties dictionary passed to `CreateItem`.
#[derive(Debug, Type)]
#[zvariant(signature = "a{sv}")]
pub struct Properties {
    label: String,
    attributes: HashMap<String, String>,
}

impl Properties {
    pub fn for_item(label: &str, attributes: &Attributes) -> Self {
        Self {
            label: label.to_owned(),
            attributes: attributes.clone(),
        }
    }
}

impl Serialize for Properties {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(ITEM_PROPERTY_LABEL, &Value::from(self.label.as_str()))?;
        map.serialize_entry(
            ITEM_PROPERTY_ATTRIBUTES,
            &Value::from(self.attributes.clone()),
        )?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature() {
        assert_eq!(Properties::SIGNATURE, "a{sv}");
    }

    #[test]
    fn empty_attributes_are_kept() {
        let properties = Properties::for_item("label-123", &Attributes::new());
        assert_eq!(properties.label, "label-123");
        assert!(properties.attributes.is_empty());
    }
}
