use crate::config::SiteConfig;
use crate::constants::{is_known_label, label_glyph, OTHER_LABEL};
use crate::types::LogRecord;
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use tracing::warn;

const TIME_FORMAT: &str = "%I:%M%p\n%m/%d/%Y";

/// Time zone used to render entry timestamps.
#[derive(Debug, Clone, Copy)]
pub enum DisplayZone {
    Local,
    Fixed(FixedOffset),
}

impl From<Option<FixedOffset>> for DisplayZone {
    fn from(offset: Option<FixedOffset>) -> Self {
        offset.map_or(DisplayZone::Local, DisplayZone::Fixed)
    }
}

/// Renders feed entries into the HTML-flavoured text sent to the chat.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    site_name: String,
    site_url: String,
    hashtags: Option<String>,
    zone: DisplayZone,
}

impl MessageFormatter {
    pub fn new(site: &SiteConfig, zone: DisplayZone) -> Self {
        Self {
            site_name: site.name.clone(),
            site_url: site.url.clone(),
            hashtags: site.hashtags.clone().filter(|h| !h.trim().is_empty()),
            zone,
        }
    }

    pub fn format(&self, record: &LogRecord) -> String {
        let data = &record.data;
        let mut message = String::new();

        if let Some(glyph) = label_glyph(&data.label) {
            message.push_str(glyph);
            message.push(' ');
        }
        if let Some(label) = human_label(&data.label) {
            message.push_str(&label);
            message.push_str(" at ");
        }
        message.push_str(&escape_html(&data.location));
        message.push('\n');
        message.push_str(&escape_html(&data.text));
        message.push('\n');
        if let Some(hashtags) = &self.hashtags {
            message.push('\n');
            message.push_str(hashtags);
        }
        message.push_str("\n\n");
        message.push_str(&self.render_time(record.timestamp));
        message.push_str(&format!(
            "\nvia <a href='{}'>{}</a>",
            self.site_url, self.site_name
        ));
        message
    }

    fn render_time(&self, timestamp: f64) -> String {
        let Some(utc) = to_datetime(timestamp) else {
            warn!(timestamp, "Timestamp outside the representable date range, rendering it raw");
            return timestamp.to_string();
        };
        match self.zone {
            DisplayZone::Local => utc.with_timezone(&Local).format(TIME_FORMAT).to_string(),
            DisplayZone::Fixed(offset) => utc.with_timezone(&offset).format(TIME_FORMAT).to_string(),
        }
    }
}

/// "police_presence" -> "Police presence". `None` for "other" and unknown labels.
fn human_label(label: &str) -> Option<String> {
    if label == OTHER_LABEL || !is_known_label(label) {
        return None;
    }
    let spaced = label.replace('_', " ");
    let mut chars = spaced.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
}

fn to_datetime(timestamp: f64) -> Option<DateTime<Utc>> {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    Utc.timestamp_opt(secs as i64, nanos.min(999_999_999)).single()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogData;

    fn formatter(hashtags: Option<&str>) -> MessageFormatter {
        let site = SiteConfig {
            name: "Scanmap".to_string(),
            url: "https://scanmap.example".to_string(),
            hashtags: hashtags.map(str::to_string),
        };
        MessageFormatter::new(&site, DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap()))
    }

    fn record(label: &str) -> LogRecord {
        LogRecord {
            // 2020-06-01 20:05:00 UTC
            timestamp: 1591041900.0,
            data: LogData {
                label: label.to_string(),
                location: "5th & Pine".to_string(),
                text: "Crowd moving north".to_string(),
            },
        }
    }

    #[test]
    fn known_label_gets_glyph_and_label_text() {
        let msg = formatter(None).format(&record("police_presence"));
        assert_eq!(
            msg,
            "👮 Police presence at 5th &amp; Pine\nCrowd moving north\n\n\n08:05PM\n06/01/2020\nvia <a href='https://scanmap.example'>Scanmap</a>"
        );
    }

    #[test]
    fn hashtags_are_inserted_before_the_blank_line() {
        let msg = formatter(Some("#seattle #blm")).format(&record("fire"));
        assert_eq!(
            msg,
            "🔥 Fire at 5th &amp; Pine\nCrowd moving north\n\n#seattle #blm\n\n08:05PM\n06/01/2020\nvia <a href='https://scanmap.example'>Scanmap</a>"
        );
    }

    #[test]
    fn other_label_keeps_glyph_but_drops_label_text() {
        let msg = formatter(None).format(&record("other"));
        assert!(msg.starts_with("🔹 5th &amp; Pine\n"));
        assert!(!msg.contains(" at "));
    }

    #[test]
    fn unknown_label_drops_glyph_and_label_text() {
        let msg = formatter(None).format(&record("parade"));
        assert!(msg.starts_with("5th &amp; Pine\nCrowd moving north\n"));
        assert!(msg.contains("08:05PM\n06/01/2020"));
        assert!(msg.ends_with("via <a href='https://scanmap.example'>Scanmap</a>"));
    }

    #[test]
    fn format_is_deterministic() {
        let f = formatter(Some("#tag"));
        let r = record("units_requested");
        assert_eq!(f.format(&r), f.format(&r));
    }

    #[test]
    fn fixed_offset_shifts_rendered_time() {
        let site = SiteConfig {
            name: "S".to_string(),
            url: "u".to_string(),
            hashtags: None,
        };
        let pacific = FixedOffset::west_opt(7 * 3600).unwrap();
        let msg = MessageFormatter::new(&site, DisplayZone::Fixed(pacific)).format(&record("aid"));
        assert!(msg.contains("01:05PM\n06/01/2020"));
    }

    #[test]
    fn human_label_capitalizes_first_word_only() {
        assert_eq!(human_label("protestor_barricade").as_deref(), Some("Protestor barricade"));
        assert_eq!(human_label("other"), None);
        assert_eq!(human_label("unknown_thing"), None);
    }

    #[test]
    fn out_of_range_timestamp_is_rendered_raw() {
        let mut r = record("fire");
        r.timestamp = 1e20;
        let msg = formatter(None).format(&r);
        assert!(msg.contains("\n\n\n100000000000000000000\nvia "));
    }

    #[test]
    fn feed_text_is_html_escaped() {
        assert_eq!(escape_html("<b>a & b</b>"), "&lt;b&gt;a &amp; b&lt;/b&gt;");
    }
}
