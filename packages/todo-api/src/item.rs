//! The todo item record.

use remoting::{Describe, Field, Shape};
use serde::{Deserialize, Serialize};

/// One entry in the todo list.
///
/// # Example
///
/// ```json
/// { "id": "x", "description": "buy milk", "completed": false }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Caller-chosen identifier, unique within the list.
    pub id: String,

    pub description: String,

    /// Defaults to `false` when absent.
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            completed: false,
        }
    }
}

impl Describe for Item {
    fn shape() -> Shape {
        Shape::record(
            "Item",
            vec![
                Field::new("id", Shape::String),
                Field::new("description", Shape::String),
                Field::new("completed", Shape::optional(Shape::Bool)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_defaults_to_false() {
        let item: Item = serde_json::from_str(r#"{"id":"x","description":"buy milk"}"#).unwrap();
        assert_eq!(item, Item::new("x", "buy milk"));
    }

    #[test]
    fn serialised_form_fits_its_shape() {
        let value = serde_json::to_value(Item::new("x", "buy milk")).unwrap();
        assert!(Item::shape().check(&value).is_ok());
    }
}
