//! Meal record model
//!
//! Shape of a saved analysis, plus per-day totals. Storage of records is left
//! to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{NutrientProfile, UnifiedResult};

/// A saved meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub food_name: String,
    pub serving_size: String,
    pub nutrients: NutrientProfile,
    pub confidence: f64,
    pub recorded_at: DateTime<Utc>,
}

impl MealRecord {
    pub fn from_result(result: UnifiedResult, recorded_at: DateTime<Utc>) -> Self {
        Self {
            food_name: result.food_name,
            serving_size: result.serving_size,
            nutrients: result.nutrients,
            confidence: result.confidence,
            recorded_at,
        }
    }

    /// Calendar day (UTC) the meal was recorded on
    pub fn date(&self) -> NaiveDate {
        self.recorded_at.date_naive()
    }
}

/// Nutrient totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub meal_count: usize,
    pub totals: NutrientProfile,
}

impl DailySummary {
    /// Total the records that fall on `date`; records from other days are ignored
    pub fn for_day(records: &[MealRecord], date: NaiveDate) -> Self {
        let day_records: Vec<&MealRecord> = records.iter().filter(|r| r.date() == date).collect();

        Self {
            date,
            meal_count: day_records.len(),
            totals: day_records.iter().map(|r| r.nutrients).sum(),
        }
    }
}
