//! Free-text ingredient matching
//!
//! The cocktail search lets staff type what they have behind the bar
//! ("gin, citron, tonic") instead of picking catalog entries. How a typed
//! name is compared with a recipe ingredient is isolated behind
//! [`IngredientMatcher`] so the permissive default can be swapped for an
//! exact comparison without touching the resolver.

use crate::models::{resolve, Doability, RecipeLine};

/// Decides whether a typed name stands for a recipe ingredient
pub trait IngredientMatcher: Send + Sync {
    fn matches(&self, typed: &str, ingredient_name: &str) -> bool;
}

/// Case-insensitive substring match in either direction
///
/// "citron" satisfies "Jus de citron vert", and "Rhum blanc agricole"
/// satisfies "Rhum blanc".
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzySubstringMatcher;

impl IngredientMatcher for FuzzySubstringMatcher {
    fn matches(&self, typed: &str, ingredient_name: &str) -> bool {
        let typed = typed.trim().to_lowercase();
        let name = ingredient_name.trim().to_lowercase();
        if typed.is_empty() || name.is_empty() {
            return false;
        }
        name.contains(&typed) || typed.contains(&name)
    }
}

/// Case-insensitive whole-name equality
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactNameMatcher;

impl IngredientMatcher for ExactNameMatcher {
    fn matches(&self, typed: &str, ingredient_name: &str) -> bool {
        let typed = typed.trim();
        !typed.is_empty() && typed.to_lowercase() == ingredient_name.trim().to_lowercase()
    }
}

/// Split a comma-separated list, dropping blanks
pub fn parse_ingredient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve doability where "available" means "one of the typed names matches"
pub fn resolve_with<M: IngredientMatcher + ?Sized>(
    lines: &[RecipeLine],
    typed: &[String],
    matcher: &M,
) -> Doability {
    let names: std::collections::HashMap<uuid::Uuid, &str> = lines
        .iter()
        .map(|l| (l.ingredient_id, l.ingredient_name.as_str()))
        .collect();
    resolve(lines, |id| {
        names
            .get(&id)
            .map(|name| typed.iter().any(|t| matcher.matches(t, name)))
            .unwrap_or(false)
    })
}

/// True when every required ingredient is covered by a typed name
///
/// An empty list filters nothing.
pub fn can_make_with<M: IngredientMatcher + ?Sized>(
    lines: &[RecipeLine],
    typed: &[String],
    matcher: &M,
) -> bool {
    typed.is_empty() || resolve_with(lines, typed, matcher).is_doable
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_substring_either_direction() {
        let m = FuzzySubstringMatcher;
        assert!(m.matches("citron", "Jus de citron vert"));
        assert!(m.matches("CITRON", "jus de citron vert"));
        assert!(m.matches("Rhum blanc agricole", "Rhum blanc"));
        assert!(!m.matches("vodka", "Gin"));
        assert!(!m.matches("   ", "Gin"));
    }

    #[test]
    fn test_exact_matcher_is_strict() {
        let m = ExactNameMatcher;
        assert!(m.matches(" gin ", "Gin"));
        assert!(!m.matches("citron", "Jus de citron vert"));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_ingredient_list(" gin, ,tonic ,citron"),
            vec!["gin", "tonic", "citron"]
        );
        assert!(parse_ingredient_list(" , ").is_empty());
    }

    #[test]
    fn test_can_make_with_fuzzy() {
        let lines = vec![
            line("Gin", false),
            line("Jus de citron vert", false),
            line("Menthe", true),
        ];
        let typed = parse_ingredient_list("gin, citron");
        assert!(can_make_with(&lines, &typed, &FuzzySubstringMatcher));
        assert!(!can_make_with(&lines, &typed, &ExactNameMatcher));
    }

    #[test]
    fn test_empty_list_filters_nothing() {
        let lines = vec![line("Gin", false)];
        assert!(can_make_with(&lines, &[], &FuzzySubstringMatcher));
    }
}
