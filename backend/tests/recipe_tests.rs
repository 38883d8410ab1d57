//! Recipe resolver tests
//!
//! Doability against bar availability and against free-text ingredient lists.

use proptest::prelude::*;
use shared::{
    can_make_with, parse_ingredient_list, resolve, resolve_with, DoabilityMode, ExactNameMatcher,
    FuzzySubstringMatcher, RecipeLine, ALMOST_DOABLE_MAX_MISSING,
};
use std::collections::HashSet;
use uuid::Uuid;

fn line(name: &str, optional: bool) -> RecipeLine {
    RecipeLine {
        ingredient_id: Uuid::new_v4(),
        ingredient_name: name.to_string(),
        quantity: None,
        unit: None,
        is_optional: optional,
        cost_per_unit: None,
    }
}

fn mojito() -> Vec<RecipeLine> {
    vec![
        line("Rhum blanc", false),
        line("Jus de citron vert", false),
        line("Sucre de canne", false),
        line("Menthe fraîche", false),
        line("Eau gazeuse", true),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_optional_lines_never_block() {
        let lines = mojito();
        let available: HashSet<Uuid> = lines
            .iter()
            .filter(|l| !l.is_optional)
            .map(|l| l.ingredient_id)
            .collect();
        let d = resolve(&lines, |id| available.contains(&id));
        assert!(d.is_doable);
        assert_eq!(d.required_count, 4);
        assert_eq!(d.available_count, 4);
        assert!(d.missing_ingredients.is_empty());
    }

    #[test]
    fn test_two_missing_is_almost() {
        let lines = mojito();
        let available: HashSet<Uuid> = [lines[0].ingredient_id, lines[1].ingredient_id]
            .into_iter()
            .collect();
        let d = resolve(&lines, |id| available.contains(&id));
        assert_eq!(d.missing_count, 2);
        assert_eq!(d.missing_ingredients, vec!["Sucre de canne", "Menthe fraîche"]);
        assert!(d.is_almost);
        assert!(DoabilityMode::Almost.accepts(&d));
        assert!(!DoabilityMode::Doable.accepts(&d));
    }

    #[test]
    fn test_empty_recipe_is_doable() {
        let d = resolve(&[], |_| false);
        assert!(d.is_doable);
        assert!(!d.is_almost);
    }

    #[test]
    fn test_fuzzy_citron_matches_lime_juice() {
        let lines = vec![line("Gin", false), line("Jus de citron vert", false)];
        let typed = parse_ingredient_list("GIN, citron");
        assert!(can_make_with(&lines, &typed, &FuzzySubstringMatcher));

        let d = resolve_with(&lines, &parse_ingredient_list("gin"), &FuzzySubstringMatcher);
        assert_eq!(d.missing_ingredients, vec!["Jus de citron vert"]);
    }

    #[test]
    fn test_exact_matcher_needs_full_names() {
        let lines = vec![line("Gin", false), line("Jus de citron vert", false)];
        let typed = parse_ingredient_list("gin, jus de citron vert");
        assert!(can_make_with(&lines, &typed, &ExactNameMatcher));
        let typed = parse_ingredient_list("gin, citron");
        assert!(!can_make_with(&lines, &typed, &ExactNameMatcher));
    }

    #[test]
    fn test_mode_wire_names() {
        let mode: DoabilityMode = serde_json::from_str("\"almost\"").unwrap();
        assert_eq!(mode, DoabilityMode::Almost);
        assert_eq!(DoabilityMode::default(), DoabilityMode::All);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// (is_optional, is_available) per line
    fn recipe_strategy() -> impl Strategy<Value = Vec<(bool, bool)>> {
        prop::collection::vec((any::<bool>(), any::<bool>()), 0..12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Doable exactly when every required line is available; counts add up
        #[test]
        fn prop_doability_matches_required_lines(flags in recipe_strategy()) {
            let lines: Vec<RecipeLine> = flags
                .iter()
                .enumerate()
                .map(|(i, (optional, _))| line(&format!("Ingredient {}", i), *optional))
                .collect();
            let available: HashSet<Uuid> = lines
                .iter()
                .zip(&flags)
                .filter(|(_, (_, avail))| *avail)
                .map(|(l, _)| l.ingredient_id)
                .collect();

            let d = resolve(&lines, |id| available.contains(&id));
            let missing_required = flags.iter().filter(|(opt, avail)| !opt && !avail).count();

            prop_assert_eq!(d.missing_count, missing_required);
            prop_assert_eq!(d.available_count + d.missing_count, d.required_count);
            prop_assert_eq!(d.is_doable, missing_required == 0);
            prop_assert_eq!(
                d.is_almost,
                missing_required > 0 && missing_required <= ALMOST_DOABLE_MAX_MISSING
            );
            prop_assert!(!(d.is_doable && d.is_almost));
        }

        /// Typing every ingredient name makes any recipe doable
        #[test]
        fn prop_all_names_typed_is_doable(flags in recipe_strategy()) {
            let lines: Vec<RecipeLine> = flags
                .iter()
                .enumerate()
                .map(|(i, (optional, _))| line(&format!("Sirop {}", i), *optional))
                .collect();
            let typed: Vec<String> = lines.iter().map(|l| l.ingredient_name.to_uppercase()).collect();
            prop_assert!(can_make_with(&lines, &typed, &FuzzySubstringMatcher));
            prop_assert!(can_make_with(&lines, &typed, &ExactNameMatcher));
        }
    }
}
