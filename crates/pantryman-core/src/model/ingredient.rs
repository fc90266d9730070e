//! Ingredient snapshot crossing the engine boundary

use crate::errors::{PantryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Derive the slug used for record file names: spaces become `_`, lowercased.
pub fn slug_for(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Unit of a pantry quantity.
///
/// Known units normalise their common spellings; anything else is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuantityUnit {
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Cup,
    Tablespoon,
    Teaspoon,
    Piece,
    Can,
    Bunch,
    Other(String),
}

impl QuantityUnit {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "g" | "gram" | "grams" => QuantityUnit::Gram,
            "kg" | "kilogram" | "kilograms" => QuantityUnit::Kilogram,
            "ml" | "milliliter" | "milliliters" | "millilitre" => QuantityUnit::Milliliter,
            "l" | "liter" | "liters" | "litre" | "litres" => QuantityUnit::Liter,
            "cup" | "cups" => QuantityUnit::Cup,
            "tbsp" | "tablespoon" | "tablespoons" => QuantityUnit::Tablespoon,
            "tsp" | "teaspoon" | "teaspoons" => QuantityUnit::Teaspoon,
            "piece" | "pieces" | "pcs" => QuantityUnit::Piece,
            "can" | "cans" => QuantityUnit::Can,
            "bunch" | "bunches" => QuantityUnit::Bunch,
            _ => QuantityUnit::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QuantityUnit::Gram => "g",
            QuantityUnit::Kilogram => "kg",
            QuantityUnit::Milliliter => "ml",
            QuantityUnit::Liter => "l",
            QuantityUnit::Cup => "cup",
            QuantityUnit::Tablespoon => "tbsp",
            QuantityUnit::Teaspoon => "tsp",
            QuantityUnit::Piece => "piece",
            QuantityUnit::Can => "can",
            QuantityUnit::Bunch => "bunch",
            QuantityUnit::Other(text) => text,
        }
    }
}

impl From<String> for QuantityUnit {
    fn from(value: String) -> Self {
        QuantityUnit::parse(&value)
    }
}

impl From<QuantityUnit> for String {
    fn from(unit: QuantityUnit) -> Self {
        unit.as_str().to_string()
    }
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable ingredient snapshot as returned by the engine.
///
/// `quantity` and `quantity_unit` are only populated while `is_in_pantry`
/// is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub kb: Option<String>,
    pub tags: BTreeSet<String>,
    pub is_in_pantry: bool,
    pub quantity: Option<f64>,
    #[serde(rename = "quantityType")]
    pub quantity_unit: Option<QuantityUnit>,
    pub last_updated: Option<String>,
}

/// Fields supplied when creating or updating an ingredient
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngredientDraft {
    pub name: String,
    pub category: String,
    pub kb: Option<String>,
    pub tags: BTreeSet<String>,
}

impl IngredientDraft {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            kb: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_kb(mut self, kb: impl Into<String>) -> Self {
        self.kb = Some(kb.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Trim fields, drop blank tags and an empty kb reference, and reject a
    /// missing name or category.
    ///
    /// The name becomes a single record file name, so path separators and
    /// dot-only names are rejected.
    pub fn normalized(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        let category = self.category.trim().to_string();
        if name.is_empty() {
            return Err(PantryError::InvalidIngredient {
                reason: "name must not be empty".to_string(),
            });
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(PantryError::InvalidIngredient {
                reason: format!("name must not contain path separators: '{}'", name),
            });
        }
        if name.chars().all(|c| c == '.') {
            return Err(PantryError::InvalidIngredient {
                reason: format!("'{}' is not a usable ingredient name", name),
            });
        }
        if category.is_empty() {
            return Err(PantryError::InvalidIngredient {
                reason: format!("category must not be empty for '{}'", name),
            });
        }
        let kb = self
            .kb
            .map(|kb| kb.trim().to_string())
            .filter(|kb| !kb.is_empty());
        let tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Ok(Self {
            name,
            category,
            kb,
            tags,
        })
    }

    pub fn slug(&self) -> String {
        slug_for(&self.name)
    }
}

/// Requested pantry change for one ingredient
#[derive(Debug, Clone, PartialEq)]
pub enum PantryUpdate {
    Remove,
    Stock {
        quantity: Option<f64>,
        unit: Option<QuantityUnit>,
    },
}

impl PantryUpdate {
    /// Build an update from the boundary's flat arguments.
    ///
    /// Quantity and unit are discarded when `in_pantry` is false. A
    /// non-positive or non-finite quantity and a blank unit become absent.
    pub fn from_parts(in_pantry: bool, quantity: Option<f64>, unit: Option<&str>) -> Self {
        if !in_pantry {
            return PantryUpdate::Remove;
        }
        PantryUpdate::Stock {
            quantity: quantity.filter(|q| q.is_finite() && *q > 0.0),
            unit: unit
                .filter(|u| !u.trim().is_empty())
                .map(QuantityUnit::parse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_for() {
        assert_eq!(slug_for("Olive Oil"), "olive_oil");
        assert_eq!(slug_for("  Salt "), "salt");
    }

    #[test]
    fn test_quantity_unit_aliases() {
        assert_eq!(QuantityUnit::parse("Grams"), QuantityUnit::Gram);
        assert_eq!(QuantityUnit::parse("tbsp"), QuantityUnit::Tablespoon);
        assert_eq!(
            QuantityUnit::parse(" handful "),
            QuantityUnit::Other("handful".to_string())
        );
        assert_eq!(QuantityUnit::Kilogram.to_string(), "kg");
    }

    #[test]
    fn test_quantity_unit_serializes_as_text() {
        let json = serde_json::to_string(&QuantityUnit::Milliliter).unwrap();
        assert_eq!(json, "\"ml\"");
        let parsed: QuantityUnit = serde_json::from_str("\"pinch\"").unwrap();
        assert_eq!(parsed, QuantityUnit::Other("pinch".to_string()));
    }

    #[test]
    fn test_draft_normalization() {
        let draft = IngredientDraft::new("  Basil ", "Herbs")
            .with_kb("   ")
            .with_tags(["fresh", " ", "green "]);
        let draft = draft.normalized().unwrap();
        assert_eq!(draft.name, "Basil");
        assert!(draft.kb.is_none());
        assert_eq!(
            draft.tags.into_iter().collect::<Vec<_>>(),
            vec!["fresh".to_string(), "green".to_string()]
        );
    }

    #[test]
    fn test_draft_requires_name_and_category() {
        assert!(IngredientDraft::new("", "Herbs").normalized().is_err());
        assert!(IngredientDraft::new("Basil", " ").normalized().is_err());
    }

    #[test]
    fn test_draft_rejects_names_that_leave_the_record_dir() {
        for name in ["Salt/Pepper", "..\\up", "../../escaped", "..", "."] {
            let err = IngredientDraft::new(name, "Spices").normalized().unwrap_err();
            assert!(
                matches!(err, PantryError::InvalidIngredient { .. }),
                "{} accepted",
                name
            );
        }
        assert!(IngredientDraft::new("Mr. Pepper", "Spices").normalized().is_ok());
    }

    #[test]
    fn test_pantry_update_drops_quantity_when_removed() {
        assert_eq!(
            PantryUpdate::from_parts(false, Some(3.0), Some("kg")),
            PantryUpdate::Remove
        );
        assert_eq!(
            PantryUpdate::from_parts(true, Some(0.0), Some("")),
            PantryUpdate::Stock {
                quantity: None,
                unit: None
            }
        );
        assert_eq!(
            PantryUpdate::from_parts(true, Some(2.5), Some("kg")),
            PantryUpdate::Stock {
                quantity: Some(2.5),
                unit: Some(QuantityUnit::Kilogram)
            }
        );
    }

    #[test]
    fn test_ingredient_json_shape() {
        let ingredient = Ingredient {
            name: "Salt".to_string(),
            slug: "salt".to_string(),
            category: "Spices".to_string(),
            kb: None,
            tags: BTreeSet::new(),
            is_in_pantry: true,
            quantity: Some(1.0),
            quantity_unit: Some(QuantityUnit::Kilogram),
            last_updated: Some("2024-05-01".to_string()),
        };
        let value = serde_json::to_value(&ingredient).unwrap();
        assert_eq!(value["isInPantry"], true);
        assert_eq!(value["quantityType"], "kg");
        assert_eq!(value["lastUpdated"], "2024-05-01");
    }
}
