use pantry_match::client::types::{MealsResponse, Recipe, RecipeIngredient, RecipeSummary};
use pretty_assertions::assert_eq;
use serde_json::json;

fn lookup_fixture() -> serde_json::Value {
    json!({
        "meals": [{
            "idMeal": "52772",
            "strMeal": "Teriyaki Chicken Casserole",
            "strDrinkAlternate": null,
            "strCategory": "Chicken",
            "strArea": "Japanese",
            "strInstructions": "Preheat oven to 350F.",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
            "strTags": "Meat, Casserole",
            "strYoutube": "https://www.youtube.com/watch?v=4aZr5hZXP_s",
            "strIngredient1": "soy sauce",
            "strIngredient2": "water",
            "strIngredient3": "brown sugar",
            "strIngredient4": "",
            "strIngredient5": "chicken breasts",
            "strIngredient6": null,
            "strIngredient7": " ",
            "strMeasure1": "3/4 cup",
            "strMeasure2": "1/2 cup",
            "strMeasure3": "1/4 cup",
            "strMeasure4": "",
            "strMeasure5": " ",
            "strMeasure6": null,
            "strMeasure7": "1 tsp",
            "strSource": "",
            "strImageSource": null,
            "strCreativeCommonsConfirmed": null,
            "dateModified": null
        }]
    })
}

#[test]
fn test_recipe_ingredients_folded_in_order() {
    let response: MealsResponse<Recipe> = serde_json::from_value(lookup_fixture()).unwrap();
    let recipes = response.into_vec();
    assert_eq!(recipes.len(), 1);

    let recipe = &recipes[0];
    assert_eq!(recipe.id, "52772");
    assert_eq!(recipe.name, "Teriyaki Chicken Casserole");
    assert_eq!(recipe.category.as_deref(), Some("Chicken"));
    assert_eq!(recipe.area.as_deref(), Some("Japanese"));
    assert_eq!(recipe.tags, vec!["Meat", "Casserole"]);
    assert_eq!(recipe.source, None, "Blank source should be dropped");
    assert_eq!(
        recipe.ingredients,
        vec![
            RecipeIngredient { name: "soy sauce".into(), measure: "3/4 cup".into() },
            RecipeIngredient { name: "water".into(), measure: "1/2 cup".into() },
            RecipeIngredient { name: "brown sugar".into(), measure: "1/4 cup".into() },
            RecipeIngredient { name: "chicken breasts".into(), measure: String::new() },
        ]
    );
    assert_eq!(
        recipe.ingredient_names(),
        vec!["soy sauce", "water", "brown sugar", "chicken breasts"]
    );
}

#[test]
fn test_out_of_range_slots_are_ignored() {
    let recipe: Recipe = serde_json::from_value(json!({
        "idMeal": "1",
        "strMeal": "Odd",
        "strIngredient0": "ignored",
        "strIngredient21": "ignored",
        "strIngredient20": "last slot",
        "strMeasure20": "pinch"
    }))
    .unwrap();

    assert_eq!(recipe.ingredient_names(), vec!["last slot"]);
    assert_eq!(recipe.ingredients[0].measure, "pinch");
    assert!(recipe.tags.is_empty());
}

#[test]
fn test_recipe_requires_id_and_name() {
    let missing_id = serde_json::from_value::<Recipe>(json!({"strMeal": "Nameless"}));
    assert!(missing_id.is_err());

    let missing_name = serde_json::from_value::<Recipe>(json!({"idMeal": "3"}));
    assert!(missing_name.is_err());
}

#[test]
fn test_null_meals_means_no_results() {
    let response: MealsResponse<Recipe> = serde_json::from_value(json!({"meals": null})).unwrap();
    assert!(response.into_vec().is_empty());

    let response: MealsResponse<RecipeSummary> = serde_json::from_value(json!({})).unwrap();
    assert!(response.into_vec().is_empty());
}

#[test]
fn test_filter_summaries() {
    let response: MealsResponse<RecipeSummary> = serde_json::from_value(json!({
        "meals": [
            {"strMeal": "Brown Stew Chicken", "strMealThumb": "https://example.com/a.jpg", "idMeal": "52940"},
            {"strMeal": "Chicken Handi", "idMeal": "52795"}
        ]
    }))
    .unwrap();

    let summaries = response.into_vec();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, "52940");
    assert_eq!(summaries[0].thumbnail.as_deref(), Some("https://example.com/a.jpg"));
    assert_eq!(summaries[1].name, "Chicken Handi");
    assert_eq!(summaries[1].thumbnail, None);
}

#[test]
fn test_recipe_serializes_with_plain_names() {
    let response: MealsResponse<Recipe> = serde_json::from_value(lookup_fixture()).unwrap();
    let recipe = response.into_vec().remove(0);

    let value = serde_json::to_value(&recipe).unwrap();
    assert_eq!(value["name"], "Teriyaki Chicken Casserole");
    assert_eq!(value["ingredients"][2]["name"], "brown sugar");
    assert_eq!(recipe.summary().id, "52772");
}
