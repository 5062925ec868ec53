//! Webhook payload parsing and normalization

use serde::{Deserialize, Deserializer};

/// Body sent by the media player on playback events.
///
/// Every field is optional; a missing or `null` field reads as empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload {
    #[serde(default, alias = "Title", deserialize_with = "null_as_empty")]
    title: String,
    #[serde(default, alias = "Actors", deserialize_with = "null_as_empty")]
    actors: String,
    #[serde(default, alias = "Studio", deserialize_with = "null_as_empty")]
    studio: String,
    #[serde(
        default,
        alias = "SecondsRemaining",
        deserialize_with = "null_as_empty"
    )]
    seconds_remaining: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Request body was empty")]
    Empty,

    #[error("Failed to parse {len} JSON bytes: {source}")]
    Malformed {
        len: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Recoverable problems found while normalizing a payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadWarning {
    #[error("Unable to parse seconds remaining value of '{0}'; the time remaining will not be calculated")]
    UnparseableSeconds(String),

    #[error("Seconds remaining value {0} is negative; the time remaining will not be calculated")]
    NegativeSeconds(i64),
}

/// A validated playback event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackEvent {
    pub title: String,
    /// Empty when the player did not report a studio
    pub studio: String,
    /// Actor segments in source order, kept as they appeared between the commas
    pub actors: Vec<String>,
    pub seconds_remaining: u64,
    pub warnings: Vec<PayloadWarning>,
}

impl PlaybackEvent {
    /// Actor names with surrounding whitespace removed
    pub fn actor_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.actors.iter().map(|actor| actor.trim())
    }
}

/// Parse a raw webhook body into a [`PlaybackEvent`].
///
/// Only an empty body or an invalid JSON document is an error. A bad
/// `secondsRemaining` degrades to zero and is reported through
/// [`PlaybackEvent::warnings`].
pub fn normalize(body: &[u8]) -> Result<PlaybackEvent, PayloadError> {
    if body.is_empty() {
        return Err(PayloadError::Empty);
    }

    let payload: WebhookPayload =
        serde_json::from_slice(body).map_err(|source| PayloadError::Malformed {
            len: body.len(),
            source,
        })?;

    let mut warnings = Vec::new();
    let seconds_remaining = match parse_seconds(&payload.seconds_remaining) {
        Ok(seconds) => seconds,
        Err(warning) => {
            tracing::warn!("{}", warning);
            warnings.push(warning);
            0
        }
    };

    Ok(PlaybackEvent {
        title: payload.title,
        studio: payload.studio,
        actors: split_actors(&payload.actors),
        seconds_remaining,
        warnings,
    })
}

fn split_actors(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|segment| !segment.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_seconds(raw: &str) -> Result<u64, PayloadWarning> {
    let value: i64 = raw
        .parse()
        .map_err(|_| PayloadWarning::UnparseableSeconds(raw.to_string()))?;

    u64::try_from(value).map_err(|_| PayloadWarning::NegativeSeconds(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_full_payload() {
        let body = br#"{"title":"Movie","studio":"StudioX","actors":"Zed, Amy","secondsRemaining":"120"}"#;
        let event = normalize(body).unwrap();

        assert_eq!(event.title, "Movie");
        assert_eq!(event.studio, "StudioX");
        assert_eq!(event.actors, vec!["Zed", " Amy"]);
        assert_eq!(event.actor_names().collect::<Vec<_>>(), vec!["Zed", "Amy"]);
        assert_eq!(event.seconds_remaining, 120);
        assert!(event.warnings.is_empty());
    }

    #[test]
    fn test_blank_actor_segments_dropped() {
        let event = normalize(br#"{"title":"t","actors":"Tom, , Alice"}"#).unwrap();
        assert_eq!(event.actors.len(), 2);
        assert_eq!(event.actor_names().collect::<Vec<_>>(), vec!["Tom", "Alice"]);

        let event = normalize(br#"{"title":"t","actors":" , ,,"}"#).unwrap();
        assert!(event.actors.is_empty());

        let event = normalize(br#"{"title":"t"}"#).unwrap();
        assert!(event.actors.is_empty());
    }

    #[test]
    fn test_unparseable_seconds_is_zero_with_warning() {
        let event = normalize(br#"{"title":"t","secondsRemaining":"abc"}"#).unwrap();
        assert_eq!(event.seconds_remaining, 0);
        assert_eq!(
            event.warnings,
            vec![PayloadWarning::UnparseableSeconds("abc".to_string())]
        );

        let event = normalize(br#"{"title":"t","secondsRemaining":"12.5"}"#).unwrap();
        assert_eq!(event.seconds_remaining, 0);
        assert_eq!(event.warnings.len(), 1);

        // Missing field parses as an empty string
        let event = normalize(br#"{"title":"t"}"#).unwrap();
        assert_eq!(event.seconds_remaining, 0);
        assert_eq!(
            event.warnings,
            vec![PayloadWarning::UnparseableSeconds(String::new())]
        );
    }

    #[test]
    fn test_negative_seconds_clamped() {
        let event = normalize(br#"{"title":"t","secondsRemaining":"-30"}"#).unwrap();
        assert_eq!(event.seconds_remaining, 0);
        assert_eq!(event.warnings, vec![PayloadWarning::NegativeSeconds(-30)]);
    }

    #[test]
    fn test_empty_body_rejected() {
        assert!(matches!(normalize(b""), Err(PayloadError::Empty)));
    }

    #[test]
    fn test_malformed_documents_rejected() {
        let bodies: [&[u8]; 6] = [
            b"not json",
            b"   ",
            b"null",
            b"[]",
            br#"{"title":["a"]}"#,
            br#"{"title":"t","secondsRemaining":120}"#,
        ];
        for body in bodies {
            assert!(
                matches!(normalize(body), Err(PayloadError::Malformed { .. })),
                "expected malformed: {}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let event = normalize(br#"{"title":"t","rating":"5"}"#).unwrap();
        assert_eq!(event.title, "t");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let event = normalize(br#"{"actors":"Zed","secondsRemaining":"5"}"#).unwrap();
        assert_eq!(event.title, "");
        assert_eq!(event.actors, vec!["Zed"]);
        assert_eq!(event.seconds_remaining, 5);

        let event = normalize(b"{}").unwrap();
        assert_eq!(event.title, "");
        assert!(event.actors.is_empty());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let event = normalize(br#"{"title":"Movie","studio":null}"#).unwrap();
        assert_eq!(event.title, "Movie");
        assert_eq!(event.studio, "");

        let event = normalize(
            br#"{"title":null,"actors":null,"studio":null,"secondsRemaining":null}"#,
        )
        .unwrap();
        assert_eq!(event.title, "");
        assert!(event.actors.is_empty());
        assert_eq!(event.seconds_remaining, 0);
        assert_eq!(
            event.warnings,
            vec![PayloadWarning::UnparseableSeconds(String::new())]
        );
    }

    #[test]
    fn test_capitalized_keys_accepted() {
        let body = br#"{"Title":"Movie","Studio":"StudioX","Actors":"Amy","SecondsRemaining":"60"}"#;
        let event = normalize(body).unwrap();
        assert_eq!(event.title, "Movie");
        assert_eq!(event.studio, "StudioX");
        assert_eq!(event.actors, vec!["Amy"]);
        assert_eq!(event.seconds_remaining, 60);
    }

    #[test]
    fn test_warning_messages() {
        assert_eq!(
            PayloadWarning::UnparseableSeconds("abc".to_string()).to_string(),
            "Unable to parse seconds remaining value of 'abc'; the time remaining will not be calculated"
        );
        assert!(PayloadWarning::NegativeSeconds(-3).to_string().contains("-3"));
    }
}
