//! Gemini nutrition-analysis client.
//!
//! Wraps the `generateContent` endpoint with a bounded timeout, a
//! process-local result cache, and a static fallback table so that an
//! unreachable API never fails a nutrition request.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::GeminiConfig;
use crate::models::nutrition::{MacroFigures, NutritionInfo, NutritionSource};
use crate::{AppError, Result};

/// Nutrition-analysis service backed by the Gemini API.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
    cache: Mutex<HashMap<String, NutritionInfo>>,
}

impl GeminiClient {
    /// Build a client with the given connectivity settings and timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::External` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            config,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Analyze one food item, in the requested response language.
    ///
    /// Serves from cache when a fresh entry exists; otherwise calls Gemini
    /// and caches the result. Any failure (missing credential, timeout,
    /// unexpected response shape) degrades to the built-in fallback table
    /// instead of surfacing an error.
    pub async fn analyze(&self, food_name: &str, language: &str) -> NutritionInfo {
        let cache_key = format!("nutrition_{food_name}_{language}");
        let ttl = chrono::Duration::hours(i64::try_from(self.config.cache_hours).unwrap_or(24));

        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&cache_key) {
                if Utc::now() - entry.timestamp < ttl {
                    return entry.clone();
                }
            }
        }

        match self.call_gemini(food_name, language).await {
            Ok(info) => {
                self.cache.lock().await.insert(cache_key, info.clone());
                info
            }
            Err(err) => {
                warn!(food_name, %err, "nutrition analysis failed, using fallback");
                NutritionInfo::fallback_for(food_name)
            }
        }
    }

    /// Analyze a batch of food items.
    ///
    /// Items are analyzed independently; a failure on one item falls back
    /// for that item only.
    pub async fn analyze_batch(
        &self,
        food_names: &[String],
        language: &str,
    ) -> BTreeMap<String, NutritionInfo> {
        let mut results = BTreeMap::new();
        for food_name in food_names {
            let info = self.analyze(food_name, language).await;
            results.insert(food_name.clone(), info);
        }
        results
    }

    /// Probe the Gemini API with a trivial prompt.
    ///
    /// # Errors
    ///
    /// Returns `AppError::External` when the credential is missing or the
    /// call fails.
    pub async fn test_connection(&self) -> Result<Value> {
        let text = self
            .generate("Briefly introduce Malaysian food in one sentence.")
            .await?;
        Ok(json!({
            "success": true,
            "message": "Gemini API reachable",
            "response_length": text.len(),
        }))
    }

    /// Drop every cached analysis.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Current cache size and configured TTL, for the monitor UI.
    pub async fn cache_stats(&self) -> Value {
        let cache = self.cache.lock().await;
        json!({
            "cache_size": cache.len(),
            "cache_hours": self.config.cache_hours,
            "cached_keys": cache.keys().cloned().collect::<Vec<_>>(),
        })
    }

    async fn call_gemini(&self, food_name: &str, language: &str) -> Result<NutritionInfo> {
        let prompt = nutrition_prompt(food_name, language);
        let analysis = self.generate(&prompt).await?;
        Ok(NutritionInfo {
            food_name: food_name.to_owned(),
            extracted_data: Some(extract_macros(&analysis)),
            analysis,
            source: NutritionSource::GeminiAi,
            timestamp: Utc::now(),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(AppError::External("gemini api key not configured".into()));
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 2048,
            },
        });

        let response: Value = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| AppError::External("unexpected gemini response shape".into()))
    }
}

/// Build the analysis prompt, asking for the caller's response language.
fn nutrition_prompt(food_name: &str, language: &str) -> String {
    let answer_language = match language {
        "zh-CN" => "Simplified Chinese",
        "ms" => "Bahasa Melayu",
        _ => "English",
    };
    format!(
        "Provide a detailed nutritional analysis for the Malaysian food: {food_name}.\n\
         Include per 100g: calories, protein (g), carbohydrates (g), fat (g), fiber (g);\n\
         vitamin and mineral content; health recommendations (best time to eat,\n\
         benefits, precautions); and the dish's Malaysian cultural background.\n\
         Answer in {answer_language} with specific figures."
    )
}

/// Pull macro figures out of the free-text analysis.
///
/// The regexes cover the common English and Chinese phrasings Gemini uses;
/// a figure that cannot be found is simply left unset.
fn extract_macros(text: &str) -> MacroFigures {
    MacroFigures {
        calories: first_number(text, r"(\d+(?:\.\d+)?)\s*(?:kcal|calories|卡路里)"),
        protein: first_number(text, r"(?i)(?:protein|蛋白质)\D{0,10}(\d+(?:\.\d+)?)\s*(?:g|克)"),
        carbohydrates: first_number(
            text,
            r"(?i)(?:carbohydrates?|碳水化合物)\D{0,10}(\d+(?:\.\d+)?)\s*(?:g|克)",
        ),
        fat: first_number(text, r"(?i)(?:fat|脂肪)\D{0,10}(\d+(?:\.\d+)?)\s*(?:g|克)"),
    }
}

fn first_number(text: &str, pattern: &str) -> Option<f64> {
    Regex::new(pattern)
        .ok()?
        .captures(text)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}
