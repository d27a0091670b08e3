use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;

/// Per-line cap; merging an existing line is clamped to it as well
pub const MAX_QUANTITY: i32 = 999;

/// Units of one product in a cart line, 1..=999
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(i32);

impl Quantity {
    pub fn new(value: i64) -> AppResult<Self> {
        if !(1..=i64::from(MAX_QUANTITY)).contains(&value) {
            return Err(AppError::bad_request(format!(
                "Quantity must be between 1 and {MAX_QUANTITY}"
            )));
        }
        Ok(Self(value as i32))
    }

    pub fn from_db(value: i32) -> Self {
        Self(value)
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Sum with another line of the same product, clamped to the cap
    pub fn merge(self, other: Quantity) -> Self {
        Self(self.0.saturating_add(other.0).min(MAX_QUANTITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Quantity::new(0).is_err());
        assert!(Quantity::new(-3).is_err());
        assert!(Quantity::new(1000).is_err());
        assert_eq!(Quantity::new(1).unwrap().get(), 1);
        assert_eq!(Quantity::new(999).unwrap().get(), 999);
    }

    #[test]
    fn test_merge_clamps() {
        let a = Quantity::new(600).unwrap();
        assert_eq!(a.merge(Quantity::new(2).unwrap()).get(), 602);
        assert_eq!(a.merge(a).get(), MAX_QUANTITY);
    }
}
