//! Turns a catalog record into the webhook message announcing it.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::item::ItemDetail;
use crate::webhook::{Embed, EmbedField, EmbedFooter, EmbedImage, WebhookMessage};

pub const CURRENCY_SUFFIX: &str = "R$";
pub const FREE_LABEL: &str = "Free";
pub const UNTITLED_LABEL: &str = "Untitled";
pub const UNKNOWN_CREATOR_LABEL: &str = "Unknown";
pub const DEFAULT_ITEM_TYPE: &str = "Asset";
pub const FOOTER_LABEL: &str = "catalog-watch • Catalog Monitor";

const TITLE: &str = "🎯 NEW CATALOG ITEM!";
const HEADLINE: &str = "🚀 **A NEW ITEM JUST DROPPED!**";
const EMBED_COLOR: u32 = 0x00FF00;

#[derive(Debug, Clone)]
pub struct Formatter {
    site_base: String,
    mention: Option<String>,
}

impl Formatter {
    pub fn new(site_base: &str, mention: Option<String>) -> Self {
        Self {
            site_base: site_base.trim_end_matches('/').to_string(),
            mention: mention.filter(|m| !m.trim().is_empty()),
        }
    }

    pub fn item_url(&self, item: &ItemDetail) -> String {
        format!("{}/catalog/{}/www", self.site_base, item.id)
    }

    pub fn image_url(&self, item: &ItemDetail) -> String {
        format!(
            "{}/Thumbs/Asset.ashx?width=110&height=110&assetId={}",
            self.site_base, item.id
        )
    }

    /// Builds the message for `item` stamped with `now`.
    pub fn message(&self, item: &ItemDetail, now: DateTime<Utc>) -> WebhookMessage {
        let image_url = self.image_url(item);

        let fields = vec![
            field("💰 Price", price_text(item.price)),
            field("🆔 Item ID", format!("`{}`", item.id)),
            field(
                "👤 Creator",
                item.creator_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_CREATOR_LABEL.to_string()),
            ),
            field(
                "📦 Item Type",
                item.item_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ITEM_TYPE.to_string()),
            ),
            field("📊 Copies Sold", group_thousands(item.sale_count.unwrap_or(0))),
            field(
                "🔄 For Sale",
                if item.is_for_sale.unwrap_or(false) {
                    "✅ Yes".to_string()
                } else {
                    "❌ No".to_string()
                },
            ),
        ];

        let embed = Embed {
            title: TITLE.to_string(),
            description: format!("**{}**", item.name.as_deref().unwrap_or(UNTITLED_LABEL)),
            color: EMBED_COLOR,
            fields,
            thumbnail: EmbedImage {
                url: image_url.clone(),
            },
            image: EmbedImage { url: image_url },
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            footer: EmbedFooter {
                text: FOOTER_LABEL.to_string(),
            },
            url: self.item_url(item),
        };

        let content = match &self.mention {
            Some(mention) => format!("{} {}", mention, HEADLINE),
            None => HEADLINE.to_string(),
        };

        WebhookMessage {
            content,
            embeds: vec![embed],
        }
    }
}

fn field(name: &str, value: String) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value,
        inline: true,
    }
}

pub fn price_text(price: Option<f64>) -> String {
    match price {
        Some(p) if p > 0.0 => format!("{} {}", p, CURRENCY_SUFFIX),
        _ => FREE_LABEL.to_string(),
    }
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemId, ItemSummary};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
    }

    fn detail() -> ItemDetail {
        ItemDetail {
            id: ItemId::parse("1001").unwrap(),
            name: Some("Golden Crown".to_string()),
            price: Some(2500.0),
            creator_name: Some("ROBLOX".to_string()),
            item_type: Some("Hat".to_string()),
            sale_count: Some(1234567),
            is_for_sale: Some(true),
        }
    }

    fn field_value<'m>(message: &'m WebhookMessage, name: &str) -> &'m str {
        message.embeds[0]
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
            .unwrap()
    }

    #[test]
    fn price_labels() {
        assert_eq!(price_text(Some(25.0)), "25 R$");
        assert_eq!(price_text(Some(2.5)), "2.5 R$");
        assert_eq!(price_text(Some(0.0)), "Free");
        assert_eq!(price_text(Some(-3.0)), "Free");
        assert_eq!(price_text(None), "Free");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(100000), "100,000");
    }

    #[test]
    fn full_detail() {
        let formatter = Formatter::new("https://www.pekora.zip/", Some("<@42>".to_string()));
        let message = formatter.message(&detail(), fixed_now());
        let embed = &message.embeds[0];

        assert_eq!(message.content, "<@42> 🚀 **A NEW ITEM JUST DROPPED!**");
        assert_eq!(embed.description, "**Golden Crown**");
        assert_eq!(embed.url, "https://www.pekora.zip/catalog/1001/www");
        assert_eq!(
            embed.image.url,
            "https://www.pekora.zip/Thumbs/Asset.ashx?width=110&height=110&assetId=1001"
        );
        assert_eq!(embed.thumbnail, embed.image);
        assert_eq!(embed.timestamp, "2024-03-01T12:30:05.000Z");
        assert_eq!(embed.footer.text, FOOTER_LABEL);
        assert_eq!(embed.color, 0x00FF00);

        assert_eq!(field_value(&message, "💰 Price"), "2500 R$");
        assert_eq!(field_value(&message, "🆔 Item ID"), "`1001`");
        assert_eq!(field_value(&message, "👤 Creator"), "ROBLOX");
        assert_eq!(field_value(&message, "📦 Item Type"), "Hat");
        assert_eq!(field_value(&message, "📊 Copies Sold"), "1,234,567");
        assert_eq!(field_value(&message, "🔄 For Sale"), "✅ Yes");
    }

    #[test]
    fn summary_only_uses_fallback_labels() {
        let summary = ItemSummary {
            id: ItemId::parse("500").unwrap(),
            name: None,
            price: None,
        };
        let message = Formatter::new("https://example.test", None)
            .message(&ItemDetail::from(summary), fixed_now());

        assert_eq!(message.content, "🚀 **A NEW ITEM JUST DROPPED!**");
        assert_eq!(message.embeds[0].description, "**Untitled**");
        assert_eq!(field_value(&message, "💰 Price"), "Free");
        assert_eq!(field_value(&message, "👤 Creator"), "Unknown");
        assert_eq!(field_value(&message, "📦 Item Type"), "Asset");
        assert_eq!(field_value(&message, "📊 Copies Sold"), "0");
        assert_eq!(field_value(&message, "🔄 For Sale"), "❌ No");
    }

    #[test]
    fn same_input_same_bytes() {
        let formatter = Formatter::new("https://www.pekora.zip", Some("<@1>".to_string()));

        let first = serde_json::to_vec(&formatter.message(&detail(), fixed_now())).unwrap();
        let second = serde_json::to_vec(&formatter.message(&detail(), fixed_now())).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn blank_mention_is_dropped() {
        let message = Formatter::new("https://www.pekora.zip", Some(" ".to_string()))
            .message(&detail(), fixed_now());
        assert_eq!(message.content, HEADLINE);
    }
}
