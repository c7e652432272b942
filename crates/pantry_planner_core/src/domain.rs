//! crates/pantry_planner_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Users & Auth
//=========================================================================================

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

//=========================================================================================
// Pantry
//=========================================================================================

pub const DEFAULT_PANTRY_QUANTITY: &str = "1";
pub const DEFAULT_PANTRY_CATEGORY: &str = "general";

/// A single stock entry in a user's pantry.
///
/// `quantity` keeps the text the user entered; it is only interpreted as a
/// number when the grocery planner computes availability.
#[derive(Debug, Clone, PartialEq)]
pub struct PantryItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub category: String,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when adding a pantry item. Absent values take the pantry defaults.
#[derive(Debug, Clone, Default)]
pub struct NewPantryItem {
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl NewPantryItem {
    /// Resolves the defaults, returning `(quantity, unit, category)`.
    pub fn resolved_fields(&self) -> (String, String, String) {
        (
            self.quantity
                .clone()
                .unwrap_or_else(|| DEFAULT_PANTRY_QUANTITY.to_string()),
            self.unit.clone().unwrap_or_default(),
            self.category
                .clone()
                .unwrap_or_else(|| DEFAULT_PANTRY_CATEGORY.to_string()),
        )
    }
}

/// A partial update of a pantry item. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PantryItemPatch {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<Option<NaiveDate>>,
}

impl PantryItemPatch {
    pub fn apply(self, item: &mut PantryItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = self.unit {
            item.unit = unit;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(expiry_date) = self.expiry_date {
            item.expiry_date = expiry_date;
        }
    }
}

//=========================================================================================
// Recipes
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            _ => Err(format!("Unknown difficulty: {s}")),
        }
    }
}

/// One line of a recipe's ingredient list. Owned exclusively by its recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: String,
    pub difficulty: Difficulty,
    pub cook_time_minutes: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: String,
    pub difficulty: Difficulty,
    pub cook_time_minutes: i32,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<RecipeIngredient>>,
    pub steps: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub cook_time_minutes: Option<i32>,
    pub tags: Option<Vec<String>>,
}

impl RecipePatch {
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(description) = self.description {
            recipe.description = description;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(steps) = self.steps {
            recipe.steps = steps;
        }
        if let Some(difficulty) = self.difficulty {
            recipe.difficulty = difficulty;
        }
        if let Some(cook_time_minutes) = self.cook_time_minutes {
            recipe.cook_time_minutes = cook_time_minutes;
        }
        if let Some(tags) = self.tags {
            recipe.tags = tags;
        }
    }
}

/// Optional filters for listing recipes.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Case-insensitive pattern searched for in ingredient names.
    pub ingredient: Option<Regex>,
    pub difficulty: Option<Difficulty>,
}

impl RecipeFilter {
    /// Compiles an ingredient pattern. Plain words match as substrings.
    pub fn ingredient_pattern(pattern: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(pattern).case_insensitive(true).build()
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(difficulty) = self.difficulty {
            if recipe.difficulty != difficulty {
                return false;
            }
        }
        match &self.ingredient {
            Some(pattern) => recipe.ingredients.iter().any(|i| pattern.is_match(&i.name)),
            None => true,
        }
    }
}

//=========================================================================================
// Grocery Lists
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStatus {
    #[default]
    Active,
    Completed,
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListStatus::Active => write!(f, "active"),
            ListStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for ListStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ListStatus::Active),
            "completed" => Ok(ListStatus::Completed),
            _ => Err(format!("Unknown list status: {s}")),
        }
    }
}

/// A shortfall line produced by the planner, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroceryItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroceryListItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub is_purchased: bool,
}

impl From<NewGroceryItem> for GroceryListItem {
    fn from(item: NewGroceryItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            is_purchased: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroceryItemPatch {
    pub is_purchased: Option<bool>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl GroceryItemPatch {
    pub fn apply(self, item: &mut GroceryListItem) {
        if let Some(is_purchased) = self.is_purchased {
            item.is_purchased = is_purchased;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = self.unit {
            item.unit = unit;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroceryList {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub items: Vec<GroceryListItem>,
    pub status: ListStatus,
    /// Recipes the list was generated from. Recorded for provenance only.
    pub generated_from_recipes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct GroceryListPatch {
    pub name: Option<String>,
    pub status: Option<ListStatus>,
}

impl GroceryListPatch {
    pub fn apply(self, list: &mut GroceryList) {
        if let Some(name) = self.name {
            list.name = name;
        }
        if let Some(status) = self.status {
            list.status = status;
        }
    }
}

impl GroceryList {
    /// Applies `patch` to the embedded item with `item_id`.
    ///
    /// Returns `false` when the list holds no such item; nothing is changed then.
    pub fn update_item(&mut self, item_id: Uuid, patch: GroceryItemPatch) -> bool {
        match self.items.iter_mut().find(|item| item.id == item_id) {
            Some(item) => {
                patch.apply(item);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_with(names: &[&str], difficulty: Difficulty) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Test".to_string(),
            description: String::new(),
            ingredients: names
                .iter()
                .map(|n| RecipeIngredient {
                    name: n.to_string(),
                    quantity: "1".to_string(),
                    unit: String::new(),
                })
                .collect(),
            steps: String::new(),
            difficulty,
            cook_time_minutes: 0,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn list_with_item(item_id: Uuid) -> GroceryList {
        GroceryList {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Weekly".to_string(),
            items: vec![GroceryListItem {
                id: item_id,
                name: "Milk".to_string(),
                quantity: 2.0,
                unit: "l".to_string(),
                is_purchased: false,
            }],
            status: ListStatus::Active,
            generated_from_recipes: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn difficulty_round_trips_through_text() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(d.to_string().parse::<Difficulty>(), Ok(d));
        }
        assert!("easy".parse::<Difficulty>().is_err());
    }

    #[test]
    fn list_status_rejects_unknown_values() {
        assert_eq!("completed".parse::<ListStatus>(), Ok(ListStatus::Completed));
        assert!("archived".parse::<ListStatus>().is_err());
    }

    #[test]
    fn new_pantry_item_fills_defaults() {
        let new_item = NewPantryItem {
            name: "Rice".to_string(),
            ..Default::default()
        };
        let (quantity, unit, category) = new_item.resolved_fields();
        assert_eq!(quantity, "1");
        assert_eq!(unit, "");
        assert_eq!(category, "general");
    }

    fn ingredient_filter(pattern: &str) -> RecipeFilter {
        RecipeFilter {
            ingredient: Some(RecipeFilter::ingredient_pattern(pattern).unwrap()),
            difficulty: None,
        }
    }

    #[test]
    fn recipe_filter_matches_ingredient_substring_case_insensitively() {
        let recipe = recipe_with(&["Chicken Breast", "Salt"], Difficulty::Medium);

        assert!(ingredient_filter("chicken").matches(&recipe));

        let wrong_difficulty = RecipeFilter {
            difficulty: Some(Difficulty::Hard),
            ..ingredient_filter("CHICK")
        };
        assert!(!wrong_difficulty.matches(&recipe));

        assert!(!ingredient_filter("beef").matches(&recipe));
    }

    #[test]
    fn recipe_filter_treats_ingredient_as_pattern() {
        let recipe = recipe_with(&["Eggplant", "Large Eggs"], Difficulty::Easy);

        assert!(ingredient_filter("^egg").matches(&recipe));
        assert!(!ingredient_filter("^large$").matches(&recipe));
        assert!(ingredient_filter("eggs?$").matches(&recipe));
        assert!(RecipeFilter::ingredient_pattern("(egg").is_err());
    }

    #[test]
    fn item_patch_only_touches_supplied_fields() {
        let item_id = Uuid::new_v4();
        let mut list = list_with_item(item_id);

        let updated = list.update_item(
            item_id,
            GroceryItemPatch {
                is_purchased: Some(true),
                ..Default::default()
            },
        );

        assert!(updated);
        assert!(list.items[0].is_purchased);
        assert_eq!(list.items[0].quantity, 2.0);
        assert_eq!(list.items[0].unit, "l");
    }

    #[test]
    fn item_patch_for_unknown_item_changes_nothing() {
        let mut list = list_with_item(Uuid::new_v4());
        let before = list.clone();

        let updated = list.update_item(
            Uuid::new_v4(),
            GroceryItemPatch {
                quantity: Some(9.0),
                ..Default::default()
            },
        );

        assert!(!updated);
        assert_eq!(list, before);
    }

    #[test]
    fn pantry_patch_can_clear_expiry_date() {
        let mut item = PantryItem {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Yogurt".to_string(),
            quantity: "2".to_string(),
            unit: "cups".to_string(),
            category: "dairy".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        PantryItemPatch {
            quantity: Some("3".to_string()),
            expiry_date: Some(None),
            ..Default::default()
        }
        .apply(&mut item);

        assert_eq!(item.quantity, "3");
        assert_eq!(item.expiry_date, None);
        assert_eq!(item.category, "dairy");
    }
}
