use once_cell::sync::Lazy;
use std::collections::HashMap;

// Configuration defaults
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_STATE_FILE: &str = "last_update";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

// Environment overrides, applied after config.toml and .env are read
pub const ENV_TELEGRAM_TOKEN: &str = "SCANMAP_RELAY_TELEGRAM_TOKEN";
pub const ENV_CHAT_ID: &str = "SCANMAP_RELAY_CHAT_ID";
pub const ENV_FEED_URL: &str = "SCANMAP_RELAY_FEED_URL";

/// Label whose human-readable text is never rendered, even though it has a glyph.
pub const OTHER_LABEL: &str = "other";

static LABEL_GLYPHS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("alert", "⚠"),
        ("police_presence", "👮"),
        ("units_requested", "🚓"),
        ("fire", "🔥"),
        ("prisoner_van", "🚐"),
        ("group", "🚩"),
        ("injury", "🩹"),
        ("barricade", "🚧"),
        ("aviation", "🚁"),
        (OTHER_LABEL, "🔹"),
        ("aid", "⛑"),
        ("military", "💂"),
        ("protestor_barricade", "🛡"),
        ("arrests", "🚨 "),
    ])
});

/// Display glyph for a feed label, `None` for labels outside the fixed table.
pub fn label_glyph(label: &str) -> Option<&'static str> {
    LABEL_GLYPHS.get(label).copied()
}

/// Whether the label is one of the known feed labels.
pub fn is_known_label(label: &str) -> bool {
    LABEL_GLYPHS.contains_key(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_have_glyphs() {
        assert_eq!(label_glyph("fire"), Some("🔥"));
        assert_eq!(label_glyph(OTHER_LABEL), Some("🔹"));
        assert!(is_known_label("protestor_barricade"));
    }

    #[test]
    fn unknown_label_has_no_glyph() {
        assert_eq!(label_glyph("parade"), None);
        assert!(!is_known_label("Fire"));
    }
}
