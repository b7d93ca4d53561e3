use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::meal_slot::MealSlot;
use super::recipe::Recipe;
use super::weekday::Weekday;

/// The three meal slots of one day. `None` means nothing is planned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub breakfast: Option<Recipe>,
    #[serde(default)]
    pub lunch: Option<Recipe>,
    #[serde(default)]
    pub dinner: Option<Recipe>,
}

impl DayPlan {
    pub fn get(&self, slot: MealSlot) -> Option<&Recipe> {
        match slot {
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
        }
    }

    pub fn set(&mut self, slot: MealSlot, recipe: Option<Recipe>) {
        match slot {
            MealSlot::Breakfast => self.breakfast = recipe,
            MealSlot::Lunch => self.lunch = recipe,
            MealSlot::Dinner => self.dinner = recipe,
        }
    }

    pub fn is_empty(&self) -> bool {
        MealSlot::ALL.iter().all(|slot| self.get(*slot).is_none())
    }
}

/// A user's weekly meal plan: day x slot -> recipe snapshot.
///
/// Days with nothing assigned are not stored, so a plan read back with
/// explicit nulls compares equal to one where those entries are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Weekday, DayPlan>",
    into = "BTreeMap<Weekday, DayPlan>"
)]
pub struct WeeklyPlan {
    days: BTreeMap<Weekday, DayPlan>,
}

impl WeeklyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Weekday) -> Option<&DayPlan> {
        self.days.get(&day)
    }

    pub fn slot(&self, day: Weekday, slot: MealSlot) -> Option<&Recipe> {
        self.days.get(&day).and_then(|plan| plan.get(slot))
    }

    /// Assigns (or clears, with `None`) one slot in place.
    pub fn set_slot(&mut self, day: Weekday, slot: MealSlot, recipe: Option<Recipe>) {
        let day_plan = self.days.entry(day).or_default();
        day_plan.set(slot, recipe);
        if day_plan.is_empty() {
            self.days.remove(&day);
        }
    }

    /// Returns a copy with one slot overlaid; every other slot and day is kept.
    pub fn with_slot(&self, day: Weekday, slot: MealSlot, recipe: Option<Recipe>) -> WeeklyPlan {
        let mut plan = self.clone();
        plan.set_slot(day, slot, recipe);
        plan
    }

    /// Number of slots with a recipe assigned.
    pub fn assigned_count(&self) -> usize {
        self.days
            .values()
            .map(|day| {
                MealSlot::ALL
                    .iter()
                    .filter(|slot| day.get(**slot).is_some())
                    .count()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl From<BTreeMap<Weekday, DayPlan>> for WeeklyPlan {
    fn from(mut days: BTreeMap<Weekday, DayPlan>) -> Self {
        days.retain(|_, plan| !plan.is_empty());
        Self { days }
    }
}

impl From<WeeklyPlan> for BTreeMap<Weekday, DayPlan> {
    fn from(plan: WeeklyPlan) -> Self {
        plan.days
    }
}

impl fmt::Display for WeeklyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weekly Meal Plan")?;
        writeln!(f, "================")?;

        for day in Weekday::ALL {
            writeln!(f, "\n{}", day)?;
            for slot in MealSlot::ALL {
                let name = self
                    .slot(day, slot)
                    .map(|recipe| recipe.name.as_str())
                    .unwrap_or("-");
                writeln!(f, "  {:<10} {}", slot.key(), name)?;
            }
        }

        Ok(())
    }
}
