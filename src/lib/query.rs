//! Filtering, sorting and field projection over a loaded movie collection.
//!
//! Directives run in a fixed order: the filters `genre`, `year`, `director`,
//! `title`, `year_min`, `year_max` (all AND-combined), then the sort, then the
//! projection. An empty directive is ignored. A numeric directive that does not
//! start with digits matches no movie at all.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::Movie;
use crate::core::loose::parse_int;

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieQuery {
    pub genre: Option<String>,
    pub year: Option<String>,
    pub director: Option<String>,
    pub title: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub count: usize,
    pub movies: Vec<Value>,
}

fn directive(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl MovieQuery {
    pub fn apply(&self, movies: Vec<Movie>) -> QueryResult {
        let mut records: Vec<Map<String, Value>> =
            self.filter(movies).into_iter().map(to_record).collect();

        if let Some(field) = directive(&self.sort_by) {
            let descending = self.order.as_deref() == Some("desc");
            // `sort_by` is stable, so ties keep their filtered order.
            records.sort_by(|a, b| {
                let ord = compare_fields(a.get(field), b.get(field));
                if descending { ord.reverse() } else { ord }
            });
        }

        let movies: Vec<Value> = match directive(&self.fields) {
            Some(fields) => records
                .into_iter()
                .map(|record| Value::Object(project(record, fields)))
                .collect(),
            None => records.into_iter().map(Value::Object).collect(),
        };

        QueryResult {
            count: movies.len(),
            movies,
        }
    }

    fn filter(&self, mut movies: Vec<Movie>) -> Vec<Movie> {
        if let Some(genre) = directive(&self.genre) {
            let genre = genre.to_lowercase();
            movies.retain(|m| m.genre.iter().any(|g| contains_ci(g, &genre)));
        }
        if let Some(year) = directive(&self.year) {
            let year = parse_int(year);
            movies.retain(|m| year.is_some() && m.year == year);
        }
        if let Some(director) = directive(&self.director) {
            let director = director.to_lowercase();
            movies.retain(|m| contains_ci(&m.director, &director));
        }
        if let Some(title) = directive(&self.title) {
            let title = title.to_lowercase();
            movies.retain(|m| contains_ci(&m.title, &title));
        }
        if let Some(min) = directive(&self.year_min) {
            let min = parse_int(min);
            movies.retain(|m| min.is_some_and(|min| m.year.unwrap_or(0) >= min));
        }
        if let Some(max) = directive(&self.year_max) {
            let max = parse_int(max);
            movies.retain(|m| max.is_some_and(|max| m.year.unwrap_or(0) <= max));
        }
        movies
    }
}

fn to_record(movie: Movie) -> Map<String, Value> {
    match serde_json::to_value(movie) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn sort_key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    }
}

// `null` and booleans order as numbers, so an unrated movie sorts as 0.
fn sort_key_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

/// Numbers (with `null` as 0) compare numerically, text lexicographically;
/// missing fields and mixed pairings compare equal.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (Some(a), Some(b)) = (a, b) else {
        return Ordering::Equal;
    };
    if let (Some(x), Some(y)) = (sort_key_number(a), sort_key_number(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    match (sort_key_text(a), sort_key_text(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Keeps the requested fields that the record has, in request order, and
/// always keeps the identifier.
fn project(mut record: Map<String, Value>, fields: &str) -> Map<String, Value> {
    let mut projected = Map::new();
    for field in fields.split(',').map(str::trim) {
        if let Some(value) = record.remove(field) {
            projected.insert(field.to_string(), value);
        }
    }
    if !projected.contains_key(ID_FIELD) {
        if let Some(id) = record.remove(ID_FIELD) {
            projected.insert(ID_FIELD.to_string(), id);
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MoviePayload;
    use chrono::Utc;
    use serde_json::json;

    fn movie(body: Value) -> Movie {
        let payload: MoviePayload = serde_json::from_value(body).unwrap();
        Movie::create(&payload, Utc::now()).unwrap()
    }

    fn catalog() -> Vec<Movie> {
        vec![
            movie(json!({ "title": "The Dark Knight", "year": 2008, "director": "Christopher Nolan", "genre": ["Action", "Crime"] })),
            movie(json!({ "title": "Iron Man", "year": 2008, "director": "Jon Favreau", "genre": ["Action", "Sci-Fi"] })),
            movie(json!({ "title": "Inception", "year": 2010, "director": "Christopher Nolan", "genre": ["Sci-Fi"] })),
            movie(json!({ "title": "Up", "year": 2009, "director": "Pete Docter", "genre": ["Animation"] })),
        ]
    }

    fn query(q: Value) -> MovieQuery {
        serde_json::from_value(q).unwrap()
    }

    fn titles(result: &QueryResult) -> Vec<&str> {
        result.movies.iter().map(|m| m["title"].as_str().unwrap()).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let result = MovieQuery::default().apply(catalog());
        assert_eq!(result.count, 4);
        assert_eq!(titles(&result), ["The Dark Knight", "Iron Man", "Inception", "Up"]);
    }

    #[test]
    fn filters_combine_with_and() {
        let result = query(json!({ "genre": "action", "year": "2008" })).apply(catalog());
        assert_eq!(titles(&result), ["The Dark Knight", "Iron Man"]);

        let result = query(json!({ "genre": "sci", "director": "NOLAN" })).apply(catalog());
        assert_eq!(titles(&result), ["Inception"]);
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let result = query(json!({ "year_min": "2009", "year_max": "2010" })).apply(catalog());
        assert_eq!(titles(&result), ["Inception", "Up"]);
    }

    #[test]
    fn non_numeric_years_match_nothing() {
        for q in [json!({ "year": "abc" }), json!({ "year_min": "x" }), json!({ "year_max": "?" })] {
            assert_eq!(query(q).apply(catalog()).count, 0);
        }
    }

    #[test]
    fn empty_directives_are_ignored() {
        let result = query(json!({ "year": "", "genre": "", "sortBy": "" })).apply(catalog());
        assert_eq!(result.count, 4);
    }

    #[test]
    fn sort_descending_keeps_ties_stable() {
        let result = query(json!({ "sortBy": "year", "order": "desc" })).apply(catalog());
        assert_eq!(titles(&result), ["Inception", "Up", "The Dark Knight", "Iron Man"]);

        let result = query(json!({ "sortBy": "year" })).apply(catalog());
        assert_eq!(titles(&result), ["The Dark Knight", "Iron Man", "Up", "Inception"]);
    }

    #[test]
    fn sort_by_text_field() {
        let result = query(json!({ "sortBy": "title" })).apply(catalog());
        assert_eq!(titles(&result), ["Inception", "Iron Man", "The Dark Knight", "Up"]);
    }

    fn rated(ratings: &[Option<f64>]) -> Vec<Movie> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, rating)| {
                let mut m = movie(json!({ "title": format!("M{i}"), "year": 2000 }));
                m.rating = *rating;
                m
            })
            .collect()
    }

    fn ratings(result: &QueryResult) -> Vec<Value> {
        result.movies.iter().map(|m| m["rating"].clone()).collect()
    }

    #[test]
    fn unrated_movies_sort_as_zero() {
        let movies = rated(&[Some(5.0), None, Some(8.0), None, Some(2.0)]);

        let result = query(json!({ "sortBy": "rating", "order": "desc" })).apply(movies.clone());
        assert_eq!(ratings(&result), [json!(8.0), json!(5.0), json!(2.0), Value::Null, Value::Null]);

        let result = query(json!({ "sortBy": "rating" })).apply(movies);
        assert_eq!(ratings(&result), [Value::Null, Value::Null, json!(2.0), json!(5.0), json!(8.0)]);
        assert_eq!(titles(&result)[..2], ["M1", "M3"]);
    }

    #[test]
    fn negative_ratings_sort_below_unrated() {
        let result = query(json!({ "sortBy": "rating" })).apply(rated(&[None, Some(-1.0), Some(3.0)]));
        assert_eq!(ratings(&result), [json!(-1.0), Value::Null, json!(3.0)]);
    }

    #[test]
    fn legacy_movie_without_year_counts_as_zero() {
        let mut movies = catalog();
        movies[3].year = None;

        assert_eq!(query(json!({ "year_max": "2009" })).apply(movies.clone()).count, 3);
        assert_eq!(query(json!({ "year_min": "2000" })).apply(movies.clone()).count, 3);

        let result = query(json!({ "sortBy": "year" })).apply(movies);
        assert_eq!(titles(&result)[0], "Up");
    }

    #[test]
    fn unknown_sort_field_keeps_order() {
        let result = query(json!({ "sortBy": "budget", "order": "desc" })).apply(catalog());
        assert_eq!(titles(&result), ["The Dark Knight", "Iron Man", "Inception", "Up"]);
    }

    #[test]
    fn projection_always_keeps_id() {
        let result = query(json!({ "fields": "title, year,nonexistent" })).apply(catalog());
        let first = result.movies[0].as_object().unwrap();
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys, ["title", "year", "_id"]);
        assert_eq!(result.count, 4);
    }

    #[test]
    fn projection_includes_null_fields() {
        let result = query(json!({ "fields": "rating" })).apply(catalog());
        assert_eq!(result.movies[0]["rating"], Value::Null);
        assert!(result.movies[0].get("_id").is_some());
    }
}
