//! Nutrition analysis result model and static fallback table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a nutrition analysis came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NutritionSource {
    /// Live Gemini analysis.
    GeminiAi,
    /// Built-in fallback table.
    FallbackData,
}

/// Macro-nutrient figures extracted from an analysis, per 100 g.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct MacroFigures {
    /// Kilocalories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    /// Protein in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    /// Carbohydrates in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>,
    /// Fat in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

/// Nutrition analysis for a single food item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NutritionInfo {
    /// Name of the analyzed food.
    pub food_name: String,
    /// Free-text analysis.
    pub analysis: String,
    /// Macro figures extracted from the analysis text, when parseable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<MacroFigures>,
    /// Origin of the analysis.
    pub source: NutritionSource,
    /// When the analysis was produced.
    pub timestamp: DateTime<Utc>,
}

/// Built-in figures for the staple dishes the model is trained on, used
/// whenever the live analysis is unavailable.
const FALLBACK_TABLE: &[(&str, f64, f64, f64, f64, &str)] = &[
    (
        "nasi lemak",
        350.0,
        8.5,
        45.2,
        15.8,
        "Coconut rice is Malaysia's national dish; rich in carbohydrates and \
         coconut milk, relatively high in calories, commonly eaten at breakfast.",
    ),
    (
        "roti canai",
        280.0,
        6.2,
        35.5,
        12.3,
        "A flaky flatbread and common Malaysian breakfast, made from wheat \
         flour with moderate protein and carbohydrate content.",
    ),
    (
        "char kway teow",
        420.0,
        12.5,
        55.8,
        18.2,
        "A classic Malaysian stir-fried rice noodle dish with protein and \
         carbohydrates in moderate calorie range.",
    ),
    (
        "bak kut teh",
        380.0,
        25.8,
        8.5,
        22.3,
        "A Malaysian herbal pork rib soup, rich in protein with medicinal \
         herb ingredients.",
    ),
];

impl NutritionInfo {
    /// Fallback analysis for `food_name`.
    ///
    /// Known staples get their table entry; anything else gets a generic
    /// balanced-meal estimate so the caller always receives figures.
    #[must_use]
    pub fn fallback_for(food_name: &str) -> Self {
        let key = food_name.trim().to_lowercase().replace('_', " ");
        let (calories, protein, carbohydrates, fat, analysis) =
            match FALLBACK_TABLE.iter().find(|(name, ..)| *name == key) {
                Some(&(_, c, p, carbs, f, text)) => (c, p, carbs, f, text.to_owned()),
                None => (
                    300.0,
                    10.0,
                    40.0,
                    15.0,
                    format!(
                        "{food_name} is a traditional Malaysian food with balanced \
                         nutrition; moderate portions are recommended."
                    ),
                ),
            };

        Self {
            food_name: food_name.to_owned(),
            analysis,
            extracted_data: Some(MacroFigures {
                calories: Some(calories),
                protein: Some(protein),
                carbohydrates: Some(carbohydrates),
                fat: Some(fat),
            }),
            source: NutritionSource::FallbackData,
            timestamp: Utc::now(),
        }
    }
}
