mod exercise;
mod meal_slot;
mod recipe;
mod routine;
mod weekday;
mod weekly_plan;

pub use exercise::Exercise;
pub use meal_slot::MealSlot;
pub use recipe::Recipe;
pub use routine::Routine;
pub use weekday::Weekday;
pub use weekly_plan::{DayPlan, WeeklyPlan};
