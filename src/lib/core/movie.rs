use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::CatalogError;
use super::loose::{float_of, int_of, provided, text_of};

pub const UNKNOWN: &str = "Unknown";

/// A stored movie. Reading is lenient so that older records, such as one
/// with a `null` year, still load and survive the next save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id", deserialize_with = "loose_text")]
    pub id: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub title: String,
    /// `None` only for legacy records; new and updated movies always have one.
    #[serde(default, deserialize_with = "loose_int")]
    pub year: Option<i64>,
    #[serde(default = "unknown", deserialize_with = "or_unknown")]
    pub director: String,
    #[serde(default = "unknown_genre", deserialize_with = "or_unknown_genre")]
    pub genre: Vec<String>,
    #[serde(default, deserialize_with = "loose_float")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "loose_optional_text")]
    pub age_rating: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub description: String,
    #[serde(rename = "createdAt", default, deserialize_with = "or_default")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", default, deserialize_with = "or_default")]
    pub updated_at: DateTime<Utc>,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn unknown_genre() -> Vec<String> {
    vec![unknown()]
}

fn loose_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        other => text_of(&other),
    })
}

fn loose_optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .filter(|v| !v.is_null())
        .map(|v| text_of(&v)))
}

fn loose_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(int_of(&Value::deserialize(d)?))
}

fn loose_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(float_of(&Value::deserialize(d)?))
}

fn or_unknown<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .filter(|v| !v.is_null())
        .map(|v| text_of(&v))
        .unwrap_or_else(unknown))
}

fn or_unknown_genre<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .filter(|v| !v.is_null())
        .and_then(|v| genre_of(&v))
        .unwrap_or_else(unknown_genre))
}

fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Body of a create or update request. Every field is kept as raw JSON so
/// that numbers sent as strings and "falsy means absent" both work.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePayload {
    pub title: Option<Value>,
    pub year: Option<Value>,
    pub director: Option<Value>,
    pub genre: Option<Value>,
    pub rating: Option<Value>,
    pub age_rating: Option<Value>,
    pub description: Option<Value>,
}

/// Millisecond timestamp followed by nine random hex characters.
pub fn generate_movie_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("{}{}", Utc::now().timestamp_millis(), suffix)
}

fn year_of(value: &Value) -> Result<i64, CatalogError> {
    int_of(value).ok_or_else(|| CatalogError::Validation("Year must be a number".to_string()))
}

// An empty list keeps the previous (or default) genre so a movie always has one.
fn genre_of(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(items.iter().map(text_of).collect()),
        other => Some(vec![text_of(other)]),
    }
}

impl Movie {
    pub fn create(payload: &MoviePayload, now: DateTime<Utc>) -> Result<Self, CatalogError> {
        let (Some(title), Some(year)) = (provided(&payload.title), provided(&payload.year)) else {
            return Err(CatalogError::Validation("Title and year are required".to_string()));
        };

        Ok(Movie {
            id: generate_movie_id(),
            title: text_of(title),
            year: Some(year_of(year)?),
            director: provided(&payload.director).map(text_of).unwrap_or_else(unknown),
            genre: provided(&payload.genre).and_then(genre_of).unwrap_or_else(unknown_genre),
            rating: provided(&payload.rating).and_then(float_of),
            age_rating: provided(&payload.age_rating).map(text_of),
            description: provided(&payload.description).map(text_of).unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merges the provided fields over this record. Falsy fields keep the
    /// stored value; the identifier and creation time never change.
    pub fn apply_update(&mut self, payload: &MoviePayload, now: DateTime<Utc>) -> Result<(), CatalogError> {
        let year = provided(&payload.year).map(year_of).transpose()?;

        if let Some(title) = provided(&payload.title) {
            self.title = text_of(title);
        }
        if let Some(year) = year {
            self.year = Some(year);
        }
        if let Some(director) = provided(&payload.director) {
            self.director = text_of(director);
        }
        if let Some(genre) = provided(&payload.genre).and_then(genre_of) {
            self.genre = genre;
        }
        if let Some(rating) = provided(&payload.rating) {
            self.rating = float_of(rating);
        }
        if let Some(age_rating) = provided(&payload.age_rating) {
            self.age_rating = Some(text_of(age_rating));
        }
        if let Some(description) = provided(&payload.description) {
            self.description = text_of(description);
        }
        self.updated_at = now.max(self.created_at);
        Ok(())
    }
}
