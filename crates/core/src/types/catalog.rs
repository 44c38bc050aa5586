//! Catalog records as the storefront receives them.
//!
//! A [`Jersey`] is copied into every cart line at add time, so these types
//! double as the snapshot format stored in the guest cart and returned by
//! the cart API.

use serde::{Deserialize, Serialize};

use super::id::{JerseyId, JerseyTypeId, TeamId};
use super::price::Price;

/// A jersey type ("Home", "Retro", ...) carrying the pricing for every
/// jersey of that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JerseyType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JerseyTypeId>,
    pub name: String,
    /// List price before any promotion.
    pub original_price: Price,
    /// Price charged today.
    pub current_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JerseyType {
    /// Returns true if the current price is below the original price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.current_price < self.original_price
    }
}

/// A jersey image. Images are embedded as base64 payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JerseyImage {
    pub image_base64: String,
    #[serde(default)]
    pub is_main: bool,
}

/// A catalog jersey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jersey {
    pub id: JerseyId,
    pub team_id: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub season: String,
    pub jersey_type_id: JerseyTypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey_type: Option<JerseyType>,
    pub main_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Images in display order.
    #[serde(default)]
    pub images: Vec<JerseyImage>,
}

impl Jersey {
    /// The price a cart line starts from.
    ///
    /// A jersey whose type was not expanded has no known price and counts as
    /// zero, so it can still be added.
    #[must_use]
    pub fn base_price(&self) -> Price {
        self.jersey_type
            .as_ref()
            .map_or(Price::ZERO, |t| t.current_price)
    }

    /// The image flagged as main, falling back to the first image.
    #[must_use]
    pub fn main_image(&self) -> Option<&JerseyImage> {
        self.images
            .iter()
            .find(|img| img.is_main)
            .or_else(|| self.images.first())
    }

    /// Human-readable name, e.g. `"Benfica 2024/25"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.team_name {
            Some(team) => format!("{team} {}", self.season),
            None => format!("Jersey #{} {}", self.id, self.season),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn jersey(jersey_type: Option<JerseyType>) -> Jersey {
        Jersey {
            id: JerseyId::new(1),
            team_id: TeamId::new(3),
            team_name: Some("Benfica".to_owned()),
            season: "2024/25".to_owned(),
            jersey_type_id: JerseyTypeId::new(2),
            jersey_type,
            main_color: "red".to_owned(),
            description: None,
            images: vec![
                JerseyImage {
                    image_base64: "AAA".to_owned(),
                    is_main: false,
                },
                JerseyImage {
                    image_base64: "BBB".to_owned(),
                    is_main: true,
                },
            ],
        }
    }

    #[test]
    fn test_base_price_uses_current_price() {
        let j = jersey(Some(JerseyType {
            id: None,
            name: "Home".to_owned(),
            original_price: Price::from_cents(2500),
            current_price: Price::from_cents(2000),
            description: None,
        }));
        assert_eq!(j.base_price(), Price::from_cents(2000));
        assert!(j.jersey_type.as_ref().unwrap().is_on_sale());
    }

    #[test]
    fn test_base_price_without_type_is_zero() {
        assert_eq!(jersey(None).base_price(), Price::ZERO);
    }

    #[test]
    fn test_main_image() {
        let j = jersey(None);
        assert_eq!(j.main_image().unwrap().image_base64, "BBB");
    }

    #[test]
    fn test_deserialize_catalog_payload() {
        let json = r#"{
            "id": 9, "team_id": 1, "team_name": "Porto", "season": "2023/24",
            "jersey_type_id": 4,
            "jersey_type": {"id": 4, "name": "Away", "original_price": 30.0, "current_price": 24.99},
            "main_color": "blue", "images": [], "created_at": "2024-01-01T00:00:00"
        }"#;
        let j: Jersey = serde_json::from_str(json).unwrap();
        assert_eq!(j.base_price(), Price::from_cents(2499));
        assert_eq!(j.display_name(), "Porto 2023/24");
    }
}
