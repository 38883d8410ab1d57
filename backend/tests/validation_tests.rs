//! Input validation tests

use rust_decimal::Decimal;
use shared::{
    collapse_updates, validate_cocktail, validate_email, validate_password,
    validate_stock_thresholds, AvailabilityUpdate, BatchAvailabilityUpdate,
    CocktailIngredientInput, CocktailInput, CocktailType, UserRole, MIN_PASSWORD_LENGTH,
};
use uuid::Uuid;
use validator::Validate;

fn cocktail(ingredients: Vec<CocktailIngredientInput>) -> CocktailInput {
    CocktailInput {
        name: "Gin Tonic".to_string(),
        description: None,
        cocktail_type: CocktailType::LongDrink,
        base_spirit: Some("Gin".to_string()),
        glass: "Highball".to_string(),
        ice: true,
        ice_type: Some("cubes".to_string()),
        method: "Build over ice".to_string(),
        garnish: None,
        image_url: None,
        ingredients,
    }
}

fn link(id: Uuid) -> CocktailIngredientInput {
    CocktailIngredientInput {
        ingredient_id: id,
        quantity: Some(Decimal::from(5)),
        unit: Some("cl".to_string()),
        is_optional: false,
    }
}

#[test]
fn test_password_minimum_length() {
    assert!(validate_password(&"x".repeat(MIN_PASSWORD_LENGTH)).is_ok());
    let err = validate_password("12345").unwrap_err();
    assert_eq!(err.field, "newPassword");
}

#[test]
fn test_email_shape() {
    assert!(validate_email("barman@example.fr").is_ok());
    assert!(validate_email("barman").is_err());
}

#[test]
fn test_threshold_order() {
    assert!(validate_stock_thresholds(Some(Decimal::from(5)), Some(Decimal::from(10))).is_ok());
    assert!(validate_stock_thresholds(Some(Decimal::from(10)), Some(Decimal::from(5))).is_err());
    assert!(validate_stock_thresholds(Some(Decimal::from(-1)), None).is_err());
    assert!(validate_stock_thresholds(None, None).is_ok());
}

#[test]
fn test_cocktail_needs_ingredients() {
    let input = cocktail(vec![]);
    assert!(input.validate().is_err());
    assert!(validate_cocktail(&input).is_err());
}

#[test]
fn test_cocktail_rejects_duplicate_links() {
    let id = Uuid::new_v4();
    assert!(validate_cocktail(&cocktail(vec![link(id), link(id)])).is_err());
    assert!(validate_cocktail(&cocktail(vec![link(id), link(Uuid::new_v4())])).is_ok());
}

#[test]
fn test_cocktail_rejects_blank_glass() {
    let mut input = cocktail(vec![link(Uuid::new_v4())]);
    input.glass = "   ".to_string();
    assert!(validate_cocktail(&input).is_err());
}

#[test]
fn test_cocktail_payload_uses_type_key() {
    let json = serde_json::json!({
        "name": "B52",
        "type": "Shot",
        "glass": "Shot",
        "ice": false,
        "method": "Layer",
        "ingredients": [{"ingredientId": Uuid::new_v4(), "quantity": "2", "unit": "cl"}]
    });
    let input: CocktailInput = serde_json::from_value(json).unwrap();
    assert_eq!(input.cocktail_type, CocktailType::Shot);
    assert!(!input.ingredients[0].is_optional);
}

#[test]
fn test_availability_last_write_wins() {
    let id = Uuid::new_v4();
    let updates = vec![
        AvailabilityUpdate { ingredient_id: id, available: true },
        AvailabilityUpdate { ingredient_id: id, available: false },
    ];
    let collapsed = collapse_updates(&updates);
    assert_eq!(collapsed.len(), 1);
    assert!(!collapsed[0].available);
}

#[test]
fn test_batch_expands_to_updates() {
    let a = Uuid::new_v4();
    let batch = BatchAvailabilityUpdate {
        ingredient_ids: vec![a, a, Uuid::new_v4()],
        available: true,
    };
    let updates = batch.into_updates();
    assert_eq!(updates.len(), 2);
    assert!(updates.iter().all(|u| u.available));
}

#[test]
fn test_roles_parse() {
    assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
    assert!("owner".parse::<UserRole>().is_err());
}
