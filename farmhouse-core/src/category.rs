//! Domain category tags.
//!
//! Categories mirror the Farmhouse routers that own records. On the wire they
//! travel as the CATEGORIES property; anything we don't recognize maps to
//! `Other` instead of failing the parse.

use serde::{Deserialize, Serialize};

/// The domain area a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PlantCare,
    Livestock,
    Budget,
    Health,
    DevTracking,
    Other,
}

impl Category {
    /// The CATEGORIES value written to the wire.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Category::PlantCare => "Plant Care",
            Category::Livestock => "Livestock",
            Category::Budget => "Budget",
            Category::Health => "Health",
            Category::DevTracking => "Dev Tracking",
            Category::Other => "Other",
        }
    }

    /// Map a wire tag back to the closest known category.
    pub fn from_tag(tag: &str) -> Category {
        match tag.trim().to_ascii_lowercase().as_str() {
            "plant care" | "plants" | "garden" => Category::PlantCare,
            "livestock" | "animals" => Category::Livestock,
            "budget" | "finance" => Category::Budget,
            "health" => Category::Health,
            "dev tracking" | "dev" => Category::DevTracking,
            _ => Category::Other,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_roundtrip() {
        for cat in [
            Category::PlantCare,
            Category::Livestock,
            Category::Budget,
            Category::Health,
            Category::DevTracking,
            Category::Other,
        ] {
            assert_eq!(Category::from_tag(cat.as_tag()), cat);
        }
    }

    #[test]
    fn test_unknown_tag_maps_to_other() {
        assert_eq!(Category::from_tag("Beekeeping"), Category::Other);
        assert_eq!(Category::from_tag(""), Category::Other);
    }

    #[test]
    fn test_tag_matching_is_case_insensitive() {
        assert_eq!(Category::from_tag("LIVESTOCK"), Category::Livestock);
        assert_eq!(Category::from_tag("plant care"), Category::PlantCare);
    }
}
