//! Per-user collections.

use std::fmt;
use std::str::FromStr;

/// Collections that can be stored under a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Routines,
    Recipes,
    MealPlans,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Routines,
        Collection::Recipes,
        Collection::MealPlans,
    ];

    /// Returns the filename for this collection.
    pub fn filename(&self) -> &'static str {
        match self {
            Collection::Routines => "routines.automerge",
            Collection::Recipes => "recipes.automerge",
            Collection::MealPlans => "mealplans.automerge",
        }
    }

    /// Collection name as it appears in `users/{uid}/{name}`.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Routines => "routines",
            Collection::Recipes => "recipes",
            Collection::MealPlans => "mealPlans",
        }
    }

    /// Logical path of this collection for a user.
    pub fn path(&self, uid: &str) -> String {
        format!("users/{}/{}", uid, self.name())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown collection '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_filename() {
        assert_eq!(Collection::Routines.filename(), "routines.automerge");
        assert_eq!(Collection::Recipes.filename(), "recipes.automerge");
        assert_eq!(Collection::MealPlans.filename(), "mealplans.automerge");
    }

    #[test]
    fn test_collection_path() {
        assert_eq!(Collection::MealPlans.path("u1"), "users/u1/mealPlans");
    }

    #[test]
    fn test_collection_from_str() {
        assert_eq!("mealplans".parse::<Collection>().unwrap(), Collection::MealPlans);
        assert_eq!("routines".parse::<Collection>().unwrap(), Collection::Routines);
        assert!("workouts".parse::<Collection>().is_err());
    }
}
