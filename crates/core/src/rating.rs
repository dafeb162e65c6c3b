//! Review rating bounds shared by the API layer and the repository tests.

use crate::error::CoreError;

/// Lowest accepted review rating.
pub const RATING_MIN: i32 = 1;
/// Highest accepted review rating.
pub const RATING_MAX: i32 = 5;

/// Validate that a rating lies within the accepted range.
pub fn validate_rating(rating: i32) -> Result<(), CoreError> {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {RATING_MIN} and {RATING_MAX}"
        )));
    }
    Ok(())
}
