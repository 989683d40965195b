//! Fetch adapters: one per read endpoint. Each turns raw JSON into a validated
//! view-model slice or a typed failure. No retries happen here; the scheduler's
//! next cycle is the retry.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::{AnalyticsBackend, Endpoint};
use crate::error::FetchError;
use crate::model::{
    DocumentDate, EmotionCount, FeedbackDoc, FeedbackRecord, KeywordCount, SentimentCounts,
};

pub const ANONYMOUS: &str = "Anonymous";
const MISSING_LABEL: &str = "N/A";

pub async fn fetch_sentiment<B: AnalyticsBackend>(backend: &B) -> Result<SentimentCounts, FetchError> {
    parse_sentiment(backend.get(Endpoint::SentimentCounts).await?)
}

pub async fn fetch_emotions<B: AnalyticsBackend>(backend: &B) -> Result<Vec<EmotionCount>, FetchError> {
    parse_emotions(backend.get(Endpoint::EmotionCounts).await?)
}

pub async fn fetch_keywords<B: AnalyticsBackend>(backend: &B) -> Result<Vec<KeywordCount>, FetchError> {
    parse_keywords(backend.get(Endpoint::TopKeywords).await?)
}

pub async fn fetch_feedback<B: AnalyticsBackend>(backend: &B) -> Result<Vec<FeedbackRecord>, FetchError> {
    let raw = backend.get(Endpoint::FeedbackList).await?;
    parse_feedback(raw, Utc::now())
}

pub fn parse_sentiment(raw: Value) -> Result<SentimentCounts, FetchError> {
    serde_json::from_value(raw).map_err(|e| {
        debug!(error = %e, "sentiment counts failed validation");
        FetchError::malformed(format!("sentiment counts: {e}"))
    })
}

/// Emotion counts arrive as a JSON object; entry order is the backend's.
pub fn parse_emotions(raw: Value) -> Result<Vec<EmotionCount>, FetchError> {
    let Value::Object(map) = raw else {
        return Err(FetchError::malformed("emotion counts: expected an object"));
    };

    map.into_iter()
        .map(|(label, count)| match count.as_u64() {
            Some(count) => Ok(EmotionCount { label, count }),
            None => Err(FetchError::malformed(format!(
                "emotion counts: `{label}` is not a non-negative integer"
            ))),
        })
        .collect()
}

pub fn parse_keywords(raw: Value) -> Result<Vec<KeywordCount>, FetchError> {
    serde_json::from_value(raw).map_err(|e| {
        debug!(error = %e, "keyword list failed validation");
        FetchError::malformed(format!("top keywords: {e}"))
    })
}

/// Validate the feedback list. `now` stands in for records without a timestamp.
pub fn parse_feedback(raw: Value, now: DateTime<Utc>) -> Result<Vec<FeedbackRecord>, FetchError> {
    let docs: Vec<FeedbackDoc> = serde_json::from_value(raw)
        .map_err(|e| FetchError::malformed(format!("feedback list: {e}")))?;

    docs.into_iter()
        .enumerate()
        .map(|(idx, doc)| into_record(idx, doc, now))
        .collect()
}

fn into_record(idx: usize, doc: FeedbackDoc, now: DateTime<Utc>) -> Result<FeedbackRecord, FetchError> {
    let rating = match doc.rating.unwrap_or(0) {
        r @ 0..=5 => r as u8,
        other => {
            return Err(FetchError::malformed(format!(
                "feedback list: record {idx} has rating {other}"
            )))
        }
    };

    let created_at = match &doc.created_at {
        Some(date) => parse_date(date).ok_or_else(|| {
            FetchError::malformed(format!("feedback list: record {idx} has an unreadable created_at"))
        })?,
        None => now,
    };

    Ok(FeedbackRecord {
        id: doc
            .id
            .as_ref()
            .map(|id| id.as_str().to_string())
            .unwrap_or_else(|| format!("#{idx}")),
        name: non_empty(doc.name).unwrap_or_else(|| ANONYMOUS.to_string()),
        rating,
        feedback_text: doc.feedback.unwrap_or_default(),
        sentiment_label: non_empty(doc.sentiment_label)
            .or_else(|| non_empty(doc.sentiment))
            .unwrap_or_else(|| MISSING_LABEL.to_string()),
        emotion_label: doc.emotion.unwrap_or_default(),
        keywords: doc.keywords.unwrap_or_default(),
        created_at,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_date(date: &DocumentDate) -> Option<DateTime<Utc>> {
    match date {
        DocumentDate::Millis(ms) => DateTime::from_timestamp_millis(*ms),
        DocumentDate::NumberLong { value } => value
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis),
        DocumentDate::Wrapped { date } => parse_date(date),
        DocumentDate::Text(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                // naive ISO timestamps are stored in UTC
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn sentiment_counts_require_non_negative_integers() {
        let ok = parse_sentiment(json!({"positive": 5, "neutral": 0, "negative": 10})).unwrap();
        assert_eq!(ok, SentimentCounts { positive: 5, neutral: 0, negative: 10 });

        assert!(matches!(
            parse_sentiment(json!({"positive": -1, "neutral": 0, "negative": 0})),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(
            parse_sentiment(json!({"positive": 1.5, "neutral": 0, "negative": 0})),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(parse_sentiment(json!({"positive": 1})), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn emotion_counts_keep_backend_order() {
        let parsed = parse_emotions(json!({"trust": 3, "joy": 9, "anger": 3})).unwrap();
        let labels: Vec<&str> = parsed.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["trust", "joy", "anger"]);
    }

    #[test]
    fn emotion_counts_reject_bad_values() {
        assert!(parse_emotions(json!({"joy": "many"})).is_err());
        assert!(parse_emotions(json!({"joy": -2})).is_err());
        assert!(parse_emotions(json!([1, 2])).is_err());
    }

    #[test]
    fn keyword_entries_need_both_fields() {
        let ok = parse_keywords(json!([{"keyword": "delivery", "count": 4}])).unwrap();
        assert_eq!(ok[0].keyword, "delivery");
        assert!(parse_keywords(json!([{"keyword": "delivery"}])).is_err());
        assert!(parse_keywords(json!([{"count": 2}])).is_err());
    }

    #[test]
    fn feedback_records_get_defaults() {
        let raw = json!([{
            "_id": {"$oid": "65f0c0ffee"},
            "feedback": "Great service",
            "rating": 4,
            "sentiment": "positive",
            "emotion": "joy",
            "created_at": {"$date": 1714564800000i64}
        }, {
            "name": "Ada",
            "feedback": "meh"
        }]);
        let records = parse_feedback(raw, now()).unwrap();

        assert_eq!(records[0].id, "65f0c0ffee");
        assert_eq!(records[0].name, "Anonymous");
        assert_eq!(records[0].sentiment_label, "positive");
        assert_eq!(records[0].created_at, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        assert_eq!(records[1].name, "Ada");
        assert_eq!(records[1].rating, 0);
        assert_eq!(records[1].sentiment_label, "N/A");
        assert!(records[1].keywords.is_empty());
        assert_eq!(records[1].created_at, now());
    }

    #[test]
    fn feedback_dates_accept_text_forms() {
        let raw = json!([
            {"created_at": "2024-05-01T12:00:00Z"},
            {"created_at": "2024-05-01T12:00:00.250000"},
            {"created_at": {"$date": {"$numberLong": "1714564800000"}}},
        ]);
        let records = parse_feedback(raw, now()).unwrap();
        assert_eq!(records[0].created_at, now());
        assert_eq!(records[1].created_at.timestamp_millis(), now().timestamp_millis() + 250);
        assert_eq!(records[2].created_at, now());
    }

    #[test]
    fn out_of_range_rating_is_malformed() {
        let raw = json!([{"feedback": "x", "rating": 9}]);
        assert!(matches!(parse_feedback(raw, now()), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn non_array_feedback_is_malformed() {
        assert!(parse_feedback(json!({"items": []}), now()).is_err());
    }
}
