use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three meal slots of a planned day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// All slots in the order they appear in a day.
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Field name used for this slot inside a stored day plan.
    pub fn key(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            _ => Err(format!(
                "Invalid meal slot '{}'. Valid options: breakfast, lunch, dinner",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_slot_display() {
        assert_eq!(format!("{}", MealSlot::Breakfast), "breakfast");
        assert_eq!(format!("{}", MealSlot::Lunch), "lunch");
        assert_eq!(format!("{}", MealSlot::Dinner), "dinner");
    }

    #[test]
    fn test_meal_slot_from_str() {
        assert_eq!(
            MealSlot::from_str("breakfast").unwrap(),
            MealSlot::Breakfast
        );
        assert_eq!(MealSlot::from_str("LUNCH").unwrap(), MealSlot::Lunch);
        assert_eq!(MealSlot::from_str(" Dinner ").unwrap(), MealSlot::Dinner);
    }

    #[test]
    fn test_meal_slot_from_str_invalid() {
        assert!(MealSlot::from_str("snack").is_err());
        assert!(MealSlot::from_str("").is_err());
    }

    #[test]
    fn test_meal_slot_serializes_lowercase() {
        let json = serde_json::to_string(&MealSlot::Breakfast).unwrap();
        assert_eq!(json, "\"breakfast\"");
    }
}
