//! Form-level validation for recipe and comment input.
//!
//! Pure checks applied before any database write. Each function returns the
//! first violated rule only, as a user-facing message.

use crate::models::MealType;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const INGREDIENT_MAX_LEN: usize = 200;
pub const MAX_INGREDIENTS: usize = 50;
pub const PREP_MINUTES_MAX: i32 = 1440;
pub const COMMENT_MAX: usize = 1000;
pub const CALORIES_MAX: f64 = 10_000.0;
pub const MACRO_MAX: f64 = 1_000.0;

/// A recipe submission after trimming and dropping blank entries, ready for
/// insert. Produced only by [`validate_recipe`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub preparation_minutes: i32,
    pub meal_type: Option<MealType>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

/// Raw recipe form values as received from the client.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub preparation_minutes: i32,
    pub meal_type: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

pub fn validate_recipe(input: RecipeInput) -> Result<ValidRecipe, String> {
    let title = input.title.trim().to_string();
    if title.chars().count() < TITLE_MIN {
        return Err("Title must be at least 3 characters".to_string());
    }
    if title.chars().count() > TITLE_MAX {
        return Err("Title must be less than 100 characters".to_string());
    }

    // Blank entries come from empty form rows, not user intent
    let ingredients: Vec<String> = input
        .ingredients
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err("At least one ingredient is required".to_string());
    }
    if ingredients.len() > MAX_INGREDIENTS {
        return Err("Maximum 50 ingredients allowed".to_string());
    }
    for ingredient in &ingredients {
        if ingredient.chars().count() > INGREDIENT_MAX_LEN {
            return Err("Ingredient must be less than 200 characters".to_string());
        }
    }

    let steps: Vec<String> = input
        .steps
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if steps.is_empty() {
        return Err("At least one step is required".to_string());
    }

    if input.preparation_minutes < 1 {
        return Err("Preparation time must be at least 1 minute".to_string());
    }
    if input.preparation_minutes > PREP_MINUTES_MAX {
        return Err("Preparation time must be less than 24 hours".to_string());
    }

    let meal_type = match input.meal_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<MealType>()
                .map_err(|_| "Meal type must be breakfast, lunch or dinner".to_string())?,
        ),
    };

    validate_nutrition_field("Calories", input.calories, CALORIES_MAX)?;
    validate_nutrition_field("Protein", input.protein, MACRO_MAX)?;
    validate_nutrition_field("Carbs", input.carbs, MACRO_MAX)?;
    validate_nutrition_field("Fat", input.fat, MACRO_MAX)?;

    Ok(ValidRecipe {
        title,
        ingredients,
        steps,
        preparation_minutes: input.preparation_minutes,
        meal_type,
        calories: input.calories,
        protein: input.protein,
        carbs: input.carbs,
        fat: input.fat,
    })
}

fn validate_nutrition_field(name: &str, value: Option<f64>, max: f64) -> Result<(), String> {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            return Err(format!("{} must be a non-negative number", name));
        }
        if v > max {
            return Err(format!("{} must be at most {}", name, max));
        }
    }
    Ok(())
}

/// Validate and normalize a comment body: 1-1000 characters after trimming.
pub fn validate_comment_body(body: &str) -> Result<String, String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("Comment cannot be empty".to_string());
    }
    if trimmed.chars().count() > COMMENT_MAX {
        return Err("Comment must be less than 1000 characters".to_string());
    }
    Ok(trimmed.to_string())
}

/// Ratings are integer stars, 1-5.
pub fn validate_rating(rating: i32) -> Result<(), String> {
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> RecipeInput {
        RecipeInput {
            title: "Chocolate Chip Cookies".to_string(),
            ingredients: vec!["flour".to_string(), "sugar".to_string()],
            steps: vec!["Mix everything".to_string(), "Bake at 180C".to_string()],
            preparation_minutes: 30,
            meal_type: None,
            calories: None,
            protein: None,
            carbs: None,
            fat: None,
        }
    }

    #[test]
    fn test_valid_recipe_passes() {
        let valid = validate_recipe(valid_input()).unwrap();
        assert_eq!(valid.title, "Chocolate Chip Cookies");
        assert_eq!(valid.ingredients.len(), 2);
    }

    #[test]
    fn test_title_too_short() {
        let mut input = valid_input();
        input.title = "ab".to_string();
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_title_too_long() {
        let mut input = valid_input();
        input.title = "x".repeat(101);
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_title_boundaries_accepted() {
        let mut input = valid_input();
        input.title = "abc".to_string();
        assert!(validate_recipe(input.clone()).is_ok());
        input.title = "x".repeat(100);
        assert!(validate_recipe(input).is_ok());
    }

    #[test]
    fn test_zero_ingredients_rejected() {
        let mut input = valid_input();
        input.ingredients = vec![];
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_blank_ingredients_count_as_zero() {
        let mut input = valid_input();
        input.ingredients = vec!["  ".to_string(), "".to_string()];
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_fifty_one_ingredients_rejected() {
        let mut input = valid_input();
        input.ingredients = (0..51).map(|i| format!("ingredient {}", i)).collect();
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_fifty_ingredients_accepted() {
        let mut input = valid_input();
        input.ingredients = (0..50).map(|i| format!("ingredient {}", i)).collect();
        assert!(validate_recipe(input).is_ok());
    }

    #[test]
    fn test_overlong_ingredient_rejected() {
        let mut input = valid_input();
        input.ingredients = vec!["x".repeat(201)];
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_zero_prep_time_rejected() {
        let mut input = valid_input();
        input.preparation_minutes = 0;
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_prep_time_over_24h_rejected() {
        let mut input = valid_input();
        input.preparation_minutes = 1441;
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_prep_time_boundaries_accepted() {
        let mut input = valid_input();
        input.preparation_minutes = 1;
        assert!(validate_recipe(input.clone()).is_ok());
        input.preparation_minutes = 1440;
        assert!(validate_recipe(input).is_ok());
    }

    #[test]
    fn test_no_steps_rejected() {
        let mut input = valid_input();
        input.steps = vec!["   ".to_string()];
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_meal_type_parsed() {
        let mut input = valid_input();
        input.meal_type = Some("dinner".to_string());
        let valid = validate_recipe(input).unwrap();
        assert_eq!(valid.meal_type, Some(MealType::Dinner));
    }

    #[test]
    fn test_empty_meal_type_treated_as_none() {
        let mut input = valid_input();
        input.meal_type = Some("".to_string());
        let valid = validate_recipe(input).unwrap();
        assert_eq!(valid.meal_type, None);
    }

    #[test]
    fn test_unknown_meal_type_rejected() {
        let mut input = valid_input();
        input.meal_type = Some("brunch".to_string());
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_negative_nutrition_rejected() {
        let mut input = valid_input();
        input.protein = Some(-1.0);
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_nutrition_ceilings() {
        let mut input = valid_input();
        input.calories = Some(10_000.0);
        assert!(validate_recipe(input.clone()).is_ok());
        input.calories = Some(10_001.0);
        assert!(validate_recipe(input.clone()).is_err());
        input.calories = None;
        input.fat = Some(1_001.0);
        assert!(validate_recipe(input).is_err());
    }

    #[test]
    fn test_first_violation_wins() {
        let mut input = valid_input();
        input.title = "x".to_string();
        input.ingredients = vec![];
        let err = validate_recipe(input).unwrap_err();
        assert_eq!(err, "Title must be at least 3 characters");
    }

    #[test]
    fn test_comment_body_trimmed() {
        assert_eq!(validate_comment_body("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn test_empty_comment_rejected() {
        assert!(validate_comment_body("   ").is_err());
    }

    #[test]
    fn test_comment_length_boundary() {
        assert!(validate_comment_body(&"x".repeat(1000)).is_ok());
        assert!(validate_comment_body(&"x".repeat(1001)).is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(6).is_err());
    }
}
