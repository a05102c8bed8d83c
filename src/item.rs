use std::fmt::Display;

use serde::{de, Deserialize, Deserializer};

/// Catalog identifier in its canonical string form.
///
/// The API hands out numeric ids, but they are only ever compared and
/// persisted, so they are kept as the exact decimal text. Going through an
/// `f64` would silently corrupt anything above 2^53.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    /// Returns `None` for blank input, the id is trimmed otherwise.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Largest integer an `f64` can hold without gaps.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

struct ItemIdVisitor;

impl<'de> de::Visitor<'de> for ItemIdVisitor {
    type Value = ItemId;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("an integer or string identifier")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(ItemId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ItemId(v.to_string()))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(ItemId(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.fract() == 0.0 && v.abs() <= MAX_EXACT_FLOAT {
            Ok(ItemId(format!("{}", v as i64)))
        } else {
            Err(E::custom(format!("identifier {v} is not an exact integer")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        ItemId::parse(v).ok_or_else(|| E::custom("empty identifier"))
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ItemIdVisitor)
    }
}

/// One entry of the search listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemSummary {
    pub id: ItemId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
}

/// The extended record returned by the details endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub id: ItemId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub sale_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_for_sale: Option<bool>,
}

impl From<ItemSummary> for ItemDetail {
    fn from(value: ItemSummary) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price: value.price,
            creator_name: None,
            item_type: None,
            sale_count: None,
            is_for_sale: None,
        }
    }
}

// The catalog is loose about scalar types (null, "", strings where numbers
// belong). A value of the wrong shape counts as missing instead of failing
// the whole record.

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)))
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}
