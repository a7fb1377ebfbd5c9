use serde::{Deserialize, Deserializer};

/// Body returned by the feed endpoint. Entries are ordered oldest to newest.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub logs: Vec<LogRecord>,
}

/// A single entry of the remote log feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogRecord {
    /// Seconds since the Unix epoch. The feed sends either a JSON number or a
    /// decimal string.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: f64,
    pub data: LogData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogData {
    pub label: String,
    pub location: String,
    pub text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Number(f64),
    Text(String),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Number(n) => n,
        RawTimestamp::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("timestamp {:?}: {}", s, e)))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("timestamp must be a finite number"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamp_accepts_numbers_and_strings() {
        let body = json!({
            "logs": [
                {"timestamp": 1590969600, "data": {"label": "fire", "location": "5th & Pine", "text": "a"}},
                {"timestamp": "1590969660.25", "data": {"label": "aid", "location": "Broadway", "text": "b"}}
            ]
        });
        let feed: FeedResponse = serde_json::from_value(body).unwrap();
        assert_eq!(feed.logs[0].timestamp, 1590969600.0);
        assert_eq!(feed.logs[1].timestamp, 1590969660.25);
        assert_eq!(feed.logs[1].data.location, "Broadway");
    }

    #[test]
    fn non_numeric_timestamp_is_rejected() {
        let body = json!({
            "logs": [{"timestamp": "yesterday", "data": {"label": "fire", "location": "x", "text": "y"}}]
        });
        assert!(serde_json::from_value::<FeedResponse>(body).is_err());
    }

    #[test]
    fn bad_timestamp_surfaces_as_json_error() {
        let body = r#"{"logs": [{"timestamp": "NaN", "data": {"label": "fire", "location": "x", "text": "y"}}]}"#;
        let err: crate::error::RelayError = serde_json::from_str::<FeedResponse>(body).unwrap_err().into();
        assert!(matches!(err, crate::error::RelayError::Json(_)));
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn missing_data_field_is_rejected() {
        let body = json!({"logs": [{"timestamp": 1.0, "data": {"label": "fire", "text": "y"}}]});
        assert!(serde_json::from_value::<FeedResponse>(body).is_err());
    }
}
