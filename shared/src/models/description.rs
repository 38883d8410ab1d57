//! Menu description drafts
//!
//! Builds a short French blurb from what the back office form already holds.
//! Deterministic; the same draft always yields the same text.

use serde::Deserialize;

use super::CocktailType;

/// Cocktail form fields used for a description
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionDraft {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub cocktail_type: Option<CocktailType>,
    pub base_spirit: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<DraftIngredient>,
    pub garnish: Option<String>,
}

/// Ingredient row of the form; rows without a name are skipped
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftIngredient {
    pub ingredient_name: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Compose the description text
pub fn generate_description(draft: &DescriptionDraft) -> String {
    let style = match draft.cocktail_type {
        Some(CocktailType::ShortDrink) => "cocktail court et concentré",
        Some(CocktailType::LongDrink) => "cocktail long et rafraîchissant",
        Some(CocktailType::Shot) => "shot intense",
        None => "cocktail",
    };
    let mut text = format!("Le {} est un {}", draft.name.trim(), style);
    if let Some(spirit) = non_blank(&draft.base_spirit) {
        text.push_str(&format!(" à base de {}", spirit));
    }
    text.push_str(". ");

    let names: Vec<&str> = draft
        .ingredients
        .iter()
        .filter_map(|i| non_blank(&i.ingredient_name))
        .collect();
    match names.as_slice() {
        [] => {}
        [only] => text.push_str(&format!("Composé principalement de {}, ", only)),
        [first, second] => text.push_str(&format!("Alliant {} et {}, ", first, second)),
        [others @ .., last] => {
            text.push_str(&format!("Mêlant {} et {}, ", others.join(", "), last))
        }
    }

    text.push_str(match draft.cocktail_type {
        Some(CocktailType::ShortDrink) => {
            "ce cocktail offre une expérience gustative intense et sophistiquée"
        }
        Some(CocktailType::LongDrink) => {
            "ce cocktail désaltérant est parfait pour toutes les occasions"
        }
        Some(CocktailType::Shot) => "ce shot apporte une explosion de saveurs en une seule gorgée",
        None => "ce cocktail saura ravir vos papilles",
    });
    text.push('.');

    match non_blank(&draft.garnish) {
        Some(garnish) => {
            text.push_str(&format!(" Sublimé par {}, il allie élégance et saveur.", garnish))
        }
        None => text.push_str(" Un classique incontournable du bar."),
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredients(names: &[&str]) -> Vec<DraftIngredient> {
        names
            .iter()
            .map(|n| DraftIngredient {
                ingredient_name: Some(n.to_string()),
            })
            .collect()
    }

    #[test]
    fn test_long_drink_with_garnish() {
        let draft = DescriptionDraft {
            name: "Mojito".to_string(),
            cocktail_type: Some(CocktailType::LongDrink),
            base_spirit: Some("Rhum".to_string()),
            ingredients: ingredients(&["Rhum blanc", "Menthe", "Citron vert"]),
            garnish: Some("une branche de menthe".to_string()),
        };
        assert_eq!(
            generate_description(&draft),
            "Le Mojito est un cocktail long et rafraîchissant à base de Rhum. \
             Mêlant Rhum blanc, Menthe et Citron vert, ce cocktail désaltérant est parfait \
             pour toutes les occasions. Sublimé par une branche de menthe, il allie élégance \
             et saveur."
        );
    }

    #[test]
    fn test_minimal_draft() {
        let draft = DescriptionDraft {
            name: "Maison".to_string(),
            ..Default::default()
        };
        assert_eq!(
            generate_description(&draft),
            "Le Maison est un cocktail. ce cocktail saura ravir vos papilles. \
             Un classique incontournable du bar."
        );
    }

    #[test]
    fn test_ingredient_phrasing_by_count() {
        let mut draft = DescriptionDraft {
            name: "B52".to_string(),
            cocktail_type: Some(CocktailType::Shot),
            ..Default::default()
        };
        draft.ingredients = ingredients(&["Kahlúa"]);
        assert!(generate_description(&draft).contains("Composé principalement de Kahlúa, ce shot"));

        draft.ingredients = ingredients(&["Kahlúa", "Baileys"]);
        assert!(generate_description(&draft).contains("Alliant Kahlúa et Baileys, "));

        draft.ingredients = vec![DraftIngredient::default(), ingredients(&["Baileys"]).remove(0)];
        assert!(generate_description(&draft).contains("Composé principalement de Baileys"));
    }

    #[test]
    fn test_draft_wire_names() {
        let draft: DescriptionDraft = serde_json::from_str(
            r#"{"name": "Negroni", "type": "Short drink", "baseSpirit": "  ",
                "ingredients": [{"ingredientName": "Gin"}, {"ingredientName": null}]}"#,
        )
        .unwrap();
        assert_eq!(draft.cocktail_type, Some(CocktailType::ShortDrink));
        let text = generate_description(&draft);
        assert!(text.starts_with("Le Negroni est un cocktail court et concentré. "));
        assert!(text.contains("Composé principalement de Gin, "));
    }
}
