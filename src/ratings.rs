//! Rating Submission
//!
//! Parsing happens before any storage access; persistence is a single
//! insert-or-update keyed by (user, store), see `Database::upsert_rating`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// A star rating guaranteed to lie in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RatingValue(u8);

impl RatingValue {
    pub fn new(value: i64) -> Result<Self, RatingError> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RatingError::OutOfRange)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    Missing,
    NotInteger,
    OutOfRange,
    MissingStore,
}

impl std::fmt::Display for RatingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingError::Missing => write!(f, "Rating is required"),
            RatingError::NotInteger => write!(f, "Rating must be a whole number"),
            RatingError::OutOfRange => {
                write!(f, "Rating must be between {MIN_RATING} and {MAX_RATING}")
            }
            RatingError::MissingStore => write!(f, "A valid store ID is required"),
        }
    }
}

impl std::error::Error for RatingError {}

/// POST /api/ratings body. Fields stay untyped so that wrong JSON types are
/// reported as rating errors instead of generic body errors.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSubmission {
    #[serde(default)]
    pub store_id: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
}

impl RatingSubmission {
    /// Validate into (store id, rating)
    pub fn parse(&self) -> Result<(i64, RatingValue), RatingError> {
        let store_id = self
            .store_id
            .as_ref()
            .and_then(Value::as_i64)
            .filter(|id| *id > 0)
            .ok_or(RatingError::MissingStore)?;

        let rating = match &self.rating {
            None | Some(Value::Null) => return Err(RatingError::Missing),
            Some(Value::Number(n)) => n.as_i64().ok_or(RatingError::NotInteger)?,
            Some(_) => return Err(RatingError::NotInteger),
        };

        Ok((store_id, RatingValue::new(rating)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(body: Value) -> RatingSubmission {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(RatingValue::new(0), Err(RatingError::OutOfRange));
        assert_eq!(RatingValue::new(6), Err(RatingError::OutOfRange));
        assert_eq!(RatingValue::new(-1), Err(RatingError::OutOfRange));
        assert_eq!(RatingValue::new(1).unwrap().get(), 1);
        assert_eq!(RatingValue::try_from(5).unwrap().get(), 5);
    }

    #[test]
    fn test_parse_valid_submission() {
        let (store_id, rating) = submission(json!({"storeId": 5, "rating": 4}))
            .parse()
            .unwrap();
        assert_eq!(store_id, 5);
        assert_eq!(rating.get(), 4);
    }

    #[test]
    fn test_parse_rejects_non_integer_rating() {
        assert_eq!(
            submission(json!({"storeId": 5, "rating": 3.5})).parse(),
            Err(RatingError::NotInteger)
        );
        assert_eq!(
            submission(json!({"storeId": 5, "rating": "4"})).parse(),
            Err(RatingError::NotInteger)
        );
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert_eq!(
            submission(json!({"storeId": 5})).parse(),
            Err(RatingError::Missing)
        );
        assert_eq!(
            submission(json!({"rating": 3})).parse(),
            Err(RatingError::MissingStore)
        );
        assert_eq!(
            submission(json!({"storeId": 0, "rating": 3})).parse(),
            Err(RatingError::MissingStore)
        );
    }

    #[test]
    fn test_store_checked_before_rating() {
        assert_eq!(
            submission(json!({"rating": 9})).parse(),
            Err(RatingError::MissingStore)
        );
    }
}
