//! Unit tests for the static nutrition fallback table.

use nutriscan_dashboard::models::nutrition::{NutritionInfo, NutritionSource};

#[test]
fn known_staples_get_their_table_entry() {
    let info = NutritionInfo::fallback_for("Nasi Lemak");
    assert_eq!(info.food_name, "Nasi Lemak");
    assert_eq!(info.source, NutritionSource::FallbackData);

    let macros = info.extracted_data.expect("fallback carries figures");
    assert_eq!(macros.calories, Some(350.0));
    assert_eq!(macros.protein, Some(8.5));
    assert_eq!(macros.carbohydrates, Some(45.2));
    assert_eq!(macros.fat, Some(15.8));
}

#[test]
fn lookup_normalizes_case_and_underscores() {
    let underscored = NutritionInfo::fallback_for("bak_kut_teh");
    let macros = underscored.extracted_data.expect("figures");
    assert_eq!(macros.calories, Some(380.0));
    assert_eq!(macros.protein, Some(25.8));

    let spaced = NutritionInfo::fallback_for("BAK KUT TEH");
    assert_eq!(
        spaced.extracted_data.expect("figures").calories,
        Some(380.0)
    );
}

#[test]
fn unknown_foods_get_the_generic_estimate() {
    let info = NutritionInfo::fallback_for("Cendol");
    assert_eq!(info.source, NutritionSource::FallbackData);
    assert!(info.analysis.contains("Cendol"));

    let macros = info.extracted_data.expect("figures");
    assert_eq!(macros.calories, Some(300.0));
    assert_eq!(macros.protein, Some(10.0));
    assert_eq!(macros.carbohydrates, Some(40.0));
    assert_eq!(macros.fat, Some(15.0));
}

#[test]
fn all_four_staples_are_covered() {
    for food in ["nasi lemak", "roti canai", "char kway teow", "bak kut teh"] {
        let info = NutritionInfo::fallback_for(food);
        assert!(
            !info.analysis.contains("traditional Malaysian food with balanced"),
            "{food} must use its dedicated entry"
        );
    }
}
