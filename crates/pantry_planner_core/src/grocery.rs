//! crates/pantry_planner_core/src/grocery.rs
//!
//! Grocery list generation: totals the ingredients of a set of recipes, nets them
//! against what the pantry already holds and persists the shortfall as a new list.
//!
//! The arithmetic lives in [`compute_shortfall`], a pure function over recipes and
//! pantry items. [`GroceryPlanner`] wraps it with the two reads and the single write.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{GroceryList, NewGroceryItem, PantryItem, Recipe};
use crate::ports::{GroceryListStore, PantryStore, PortError, RecipeStore};
use crate::quantity::{available_quantity, needed_quantity, normalize_name};

pub const DEFAULT_LIST_NAME: &str = "Auto-generated list";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// No recipe resolved for the user. Nothing was persisted.
    #[error("No recipes found to generate list from.")]
    NoRecipes,

    #[error(transparent)]
    Port(#[from] PortError),
}

//=========================================================================================
// Pure Aggregation
//=========================================================================================

/// Total quantity on hand per normalized name. Duplicate entries add up.
pub fn pantry_availability(pantry: &[PantryItem]) -> HashMap<String, f64> {
    let mut available: HashMap<String, f64> = HashMap::new();
    for item in pantry {
        *available.entry(normalize_name(&item.name)).or_insert(0.0) +=
            available_quantity(&item.quantity);
    }
    available
}

/// Accumulated requirement for one normalized ingredient name.
#[derive(Debug, Clone, PartialEq)]
pub struct NeededIngredient {
    pub key: String,
    /// Spelling of the first occurrence.
    pub display_name: String,
    pub quantity: f64,
    /// Unit of the first occurrence. Later units are not converted, only ignored.
    pub unit: String,
}

/// Totals every ingredient of every recipe, in first-occurrence order.
pub fn needed_ingredients(recipes: &[Recipe]) -> Vec<NeededIngredient> {
    let mut needed: Vec<NeededIngredient> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for ingredient in recipes.iter().flat_map(|r| r.ingredients.iter()) {
        let key = normalize_name(&ingredient.name);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            needed.push(NeededIngredient {
                key,
                display_name: ingredient.name.clone(),
                quantity: 0.0,
                unit: ingredient.unit.clone(),
            });
            needed.len() - 1
        });
        needed[slot].quantity += needed_quantity(&ingredient.quantity);
    }

    needed
}

/// Items still to buy: needed minus available, keeping only strictly positive amounts.
pub fn compute_shortfall(recipes: &[Recipe], pantry: &[PantryItem]) -> Vec<NewGroceryItem> {
    let available = pantry_availability(pantry);
    let needed = needed_ingredients(recipes);
    debug!(
        pantry_keys = available.len(),
        needed_keys = needed.len(),
        "Aggregated ingredient totals"
    );

    needed
        .into_iter()
        .filter_map(|n| {
            let missing = n.quantity - available.get(&n.key).copied().unwrap_or(0.0);
            (missing > 0.0).then(|| NewGroceryItem {
                name: n.display_name,
                quantity: missing,
                unit: n.unit,
            })
        })
        .collect()
}

//=========================================================================================
// Planner Service
//=========================================================================================

/// Runs one generation: resolve recipes, read the pantry, compute, persist.
#[derive(Clone)]
pub struct GroceryPlanner {
    recipes: Arc<dyn RecipeStore>,
    pantry: Arc<dyn PantryStore>,
    lists: Arc<dyn GroceryListStore>,
}

impl GroceryPlanner {
    pub fn new(
        recipes: Arc<dyn RecipeStore>,
        pantry: Arc<dyn PantryStore>,
        lists: Arc<dyn GroceryListStore>,
    ) -> Self {
        Self {
            recipes,
            pantry,
            lists,
        }
    }

    /// Generates a new grocery list for `user_id`.
    ///
    /// An empty `recipe_ids` selects every recipe the user owns. An empty or absent
    /// `name` falls back to [`DEFAULT_LIST_NAME`].
    pub async fn generate(
        &self,
        user_id: Uuid,
        recipe_ids: &[Uuid],
        name: Option<&str>,
    ) -> Result<GroceryList, GenerateError> {
        let recipes = if recipe_ids.is_empty() {
            self.recipes.find_recipes_by_owner(user_id).await?
        } else {
            self.recipes.find_recipes_by_ids(user_id, recipe_ids).await?
        };

        if recipes.is_empty() {
            return Err(GenerateError::NoRecipes);
        }

        let pantry = self.pantry.list_pantry_items(user_id).await?;
        let items = compute_shortfall(&recipes, &pantry);

        let name = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_LIST_NAME);
        let source_ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
        let list = self
            .lists
            .create_grocery_list(user_id, name, items, &source_ids)
            .await?;

        info!(
            %user_id,
            list_id = %list.id,
            recipes = source_ids.len(),
            items = list.items.len(),
            "Generated grocery list"
        );
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        GroceryItemPatch, GroceryListItem, GroceryListPatch, ListStatus, NewPantryItem, NewRecipe,
        PantryItemPatch, RecipeFilter, RecipeIngredient, RecipePatch,
    };
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    //-------------------------------------------------------------------------------------
    // Fixtures
    //-------------------------------------------------------------------------------------

    fn ingredient(name: &str, quantity: &str, unit: &str) -> RecipeIngredient {
        RecipeIngredient {
            name: name.to_string(),
            quantity: quantity.to_string(),
            unit: unit.to_string(),
        }
    }

    fn recipe(user_id: Uuid, ingredients: Vec<RecipeIngredient>) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id,
            title: "Recipe".to_string(),
            description: String::new(),
            ingredients,
            steps: String::new(),
            difficulty: Default::default(),
            cook_time_minutes: 0,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn pantry_item(user_id: Uuid, name: &str, quantity: &str, unit: &str) -> PantryItem {
        PantryItem {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            quantity: quantity.to_string(),
            unit: unit.to_string(),
            category: "general".to_string(),
            expiry_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn shortfall(name: &str, quantity: f64, unit: &str) -> NewGroceryItem {
        NewGroceryItem {
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
        }
    }

    /// In-memory store backing the three ports the planner reads and writes.
    #[derive(Default)]
    struct FakeStore {
        recipes: Vec<Recipe>,
        pantry: Vec<PantryItem>,
        lists: Mutex<Vec<GroceryList>>,
        fail_pantry: bool,
    }

    #[async_trait]
    impl RecipeStore for FakeStore {
        async fn list_recipes(&self, user_id: Uuid, filter: &RecipeFilter) -> PortResult<Vec<Recipe>> {
            Ok(self
                .recipes
                .iter()
                .filter(|r| r.user_id == user_id && filter.matches(r))
                .cloned()
                .collect())
        }

        async fn find_recipes_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> PortResult<Vec<Recipe>> {
            Ok(self
                .recipes
                .iter()
                .filter(|r| r.user_id == user_id && ids.contains(&r.id))
                .cloned()
                .collect())
        }

        async fn find_recipes_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Recipe>> {
            Ok(self
                .recipes
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn get_recipe(&self, _: Uuid, _: Uuid) -> PortResult<Recipe> {
            unimplemented!()
        }

        async fn create_recipe(&self, _: Uuid, _: NewRecipe) -> PortResult<Recipe> {
            unimplemented!()
        }

        async fn update_recipe(&self, _: Uuid, _: Uuid, _: RecipePatch) -> PortResult<Recipe> {
            unimplemented!()
        }

        async fn delete_recipe(&self, _: Uuid, _: Uuid) -> PortResult<()> {
            unimplemented!()
        }
    }

    #[async_trait]
    impl PantryStore for FakeStore {
        async fn list_pantry_items(&self, user_id: Uuid) -> PortResult<Vec<PantryItem>> {
            if self.fail_pantry {
                return Err(PortError::Unexpected("pantry offline".to_string()));
            }
            Ok(self
                .pantry
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn create_pantry_item(&self, _: Uuid, _: NewPantryItem) -> PortResult<PantryItem> {
            unimplemented!()
        }

        async fn update_pantry_item(
            &self,
            _: Uuid,
            _: Uuid,
            _: PantryItemPatch,
        ) -> PortResult<PantryItem> {
            unimplemented!()
        }

        async fn delete_pantry_item(&self, _: Uuid, _: Uuid) -> PortResult<()> {
            unimplemented!()
        }
    }

    #[async_trait]
    impl GroceryListStore for FakeStore {
        async fn create_grocery_list(
            &self,
            user_id: Uuid,
            name: &str,
            items: Vec<NewGroceryItem>,
            source_recipe_ids: &[Uuid],
        ) -> PortResult<GroceryList> {
            let now = Utc::now();
            let list = GroceryList {
                id: Uuid::new_v4(),
                user_id,
                name: name.to_string(),
                items: items.into_iter().map(GroceryListItem::from).collect(),
                status: ListStatus::Active,
                generated_from_recipes: source_recipe_ids.to_vec(),
                created_at: now,
                updated_at: now,
            };
            self.lists.lock().unwrap().push(list.clone());
            Ok(list)
        }

        async fn list_grocery_lists(&self, user_id: Uuid) -> PortResult<Vec<GroceryList>> {
            Ok(self
                .lists
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn update_grocery_list(
            &self,
            _: Uuid,
            _: Uuid,
            _: GroceryListPatch,
        ) -> PortResult<GroceryList> {
            unimplemented!()
        }

        async fn update_grocery_item(
            &self,
            _: Uuid,
            _: Uuid,
            _: Uuid,
            _: GroceryItemPatch,
        ) -> PortResult<GroceryList> {
            unimplemented!()
        }

        async fn delete_grocery_list(&self, _: Uuid, _: Uuid) -> PortResult<()> {
            unimplemented!()
        }
    }

    fn planner(store: Arc<FakeStore>) -> GroceryPlanner {
        GroceryPlanner::new(store.clone(), store.clone(), store)
    }

    fn item_triples(list: &GroceryList) -> Vec<(String, f64, String)> {
        list.items
            .iter()
            .map(|i| (i.name.clone(), i.quantity, i.unit.clone()))
            .collect()
    }

    //-------------------------------------------------------------------------------------
    // Pure aggregation
    //-------------------------------------------------------------------------------------

    #[test]
    fn flour_and_sugar_across_two_recipes() {
        let user = Uuid::new_v4();
        let recipes = vec![
            recipe(
                user,
                vec![ingredient("flour", "1", "kg"), ingredient("sugar", "1", "cup")],
            ),
            recipe(
                user,
                vec![ingredient("flour", "2", "kg"), ingredient("sugar", "1", "cup")],
            ),
        ];
        let pantry = vec![pantry_item(user, "flour", "2", "kg")];

        let items = compute_shortfall(&recipes, &pantry);

        assert_eq!(
            items,
            vec![shortfall("flour", 1.0, "kg"), shortfall("sugar", 2.0, "cup")]
        );
    }

    #[test]
    fn empty_pantry_yields_full_need() {
        let user = Uuid::new_v4();
        let recipes = vec![recipe(user, vec![ingredient("eggs", "2", "")])];

        let items = compute_shortfall(&recipes, &[]);

        assert_eq!(items, vec![shortfall("eggs", 2.0, "")]);
    }

    #[test]
    fn unparseable_recipe_quantity_needs_one_unit() {
        let user = Uuid::new_v4();
        let recipes = vec![recipe(
            user,
            vec![ingredient("basil", "", "bunch"), ingredient("salt", "to taste", "")],
        )];

        let items = compute_shortfall(&recipes, &[]);

        assert_eq!(
            items,
            vec![shortfall("basil", 1.0, "bunch"), shortfall("salt", 1.0, "")]
        );
    }

    #[test]
    fn zero_recipe_quantity_needs_one_unit() {
        let user = Uuid::new_v4();
        let recipes = vec![recipe(user, vec![ingredient("salt", "0", "")])];

        let items = compute_shortfall(&recipes, &[]);

        assert_eq!(items, vec![shortfall("salt", 1.0, "")]);
    }

    #[test]
    fn unparseable_pantry_quantity_contributes_nothing() {
        let user = Uuid::new_v4();
        let recipes = vec![recipe(user, vec![ingredient("rice", "3", "cup")])];
        let pantry = vec![pantry_item(user, "rice", "plenty", "cup")];

        let items = compute_shortfall(&recipes, &pantry);

        assert_eq!(items, vec![shortfall("rice", 3.0, "cup")]);
    }

    #[test]
    fn pantry_entries_with_same_name_combine_case_insensitively() {
        let user = Uuid::new_v4();
        let pantry = vec![
            pantry_item(user, "Tomato", "1", ""),
            pantry_item(user, "tomato", "2", ""),
            pantry_item(user, "TOMATO", "n/a", ""),
        ];

        let available = pantry_availability(&pantry);

        assert_eq!(available.len(), 1);
        assert_eq!(available["tomato"], 3.0);
    }

    #[test]
    fn needed_keeps_first_spelling_and_first_unit() {
        let user = Uuid::new_v4();
        let recipes = vec![
            recipe(user, vec![ingredient("Milk", "200", "ml")]),
            recipe(user, vec![ingredient("milk", "1", "cup")]),
        ];

        let needed = needed_ingredients(&recipes);

        assert_eq!(
            needed,
            vec![NeededIngredient {
                key: "milk".to_string(),
                display_name: "Milk".to_string(),
                quantity: 201.0,
                unit: "ml".to_string(),
            }]
        );
    }

    #[test]
    fn covered_and_exactly_met_needs_are_omitted() {
        let user = Uuid::new_v4();
        let recipes = vec![recipe(
            user,
            vec![
                ingredient("Oil", "1", "tbsp"),
                ingredient("garlic", "2", "clove"),
                ingredient("onion", "1", ""),
            ],
        )];
        let pantry = vec![
            pantry_item(user, "oil", "5", "tbsp"),
            pantry_item(user, "Garlic", "2", "clove"),
        ];

        let items = compute_shortfall(&recipes, &pantry);

        assert_eq!(items, vec![shortfall("onion", 1.0, "")]);
        assert!(items.iter().all(|i| i.quantity > 0.0));
    }

    #[test]
    fn plurals_do_not_merge() {
        let user = Uuid::new_v4();
        let recipes = vec![recipe(user, vec![ingredient("tomatoes", "2", "")])];
        let pantry = vec![pantry_item(user, "tomato", "5", "")];

        let items = compute_shortfall(&recipes, &pantry);

        assert_eq!(items, vec![shortfall("tomatoes", 2.0, "")]);
    }

    //-------------------------------------------------------------------------------------
    // Planner
    //-------------------------------------------------------------------------------------

    #[tokio::test]
    async fn generate_without_ids_uses_all_owned_recipes() {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mine = recipe(user, vec![ingredient("flour", "1", "kg")]);
        let theirs = recipe(other, vec![ingredient("butter", "1", "")]);
        let store = Arc::new(FakeStore {
            recipes: vec![mine.clone(), theirs],
            ..Default::default()
        });

        let list = planner(store).generate(user, &[], None).await.unwrap();

        assert_eq!(list.name, DEFAULT_LIST_NAME);
        assert_eq!(list.status, ListStatus::Active);
        assert_eq!(list.generated_from_recipes, vec![mine.id]);
        assert_eq!(
            item_triples(&list),
            vec![("flour".to_string(), 1.0, "kg".to_string())]
        );
        assert!(list.items.iter().all(|i| !i.is_purchased));
    }

    #[tokio::test]
    async fn generate_with_ids_drops_foreign_and_unknown_ids() {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let picked = recipe(user, vec![ingredient("eggs", "2", "")]);
        let skipped = recipe(user, vec![ingredient("ham", "1", "")]);
        let theirs = recipe(other, vec![ingredient("butter", "1", "")]);
        let store = Arc::new(FakeStore {
            recipes: vec![picked.clone(), skipped, theirs.clone()],
            ..Default::default()
        });

        let list = planner(store)
            .generate(user, &[picked.id, theirs.id, Uuid::new_v4()], Some("Brunch"))
            .await
            .unwrap();

        assert_eq!(list.name, "Brunch");
        assert_eq!(list.generated_from_recipes, vec![picked.id]);
        assert_eq!(
            item_triples(&list),
            vec![("eggs".to_string(), 2.0, String::new())]
        );
    }

    #[tokio::test]
    async fn generate_without_recipes_fails_and_persists_nothing() {
        let user = Uuid::new_v4();
        let store = Arc::new(FakeStore::default());

        let result = planner(store.clone()).generate(user, &[], None).await;

        assert!(matches!(result, Err(GenerateError::NoRecipes)));
        assert!(store.lists.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generate_with_only_foreign_ids_is_domain_empty() {
        let user = Uuid::new_v4();
        let theirs = recipe(Uuid::new_v4(), vec![ingredient("butter", "1", "")]);
        let store = Arc::new(FakeStore {
            recipes: vec![theirs.clone()],
            ..Default::default()
        });

        let result = planner(store.clone())
            .generate(user, &[theirs.id], None)
            .await;

        assert!(matches!(result, Err(GenerateError::NoRecipes)));
        assert!(store.lists.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_name_falls_back_to_default() {
        let user = Uuid::new_v4();
        let store = Arc::new(FakeStore {
            recipes: vec![recipe(user, vec![ingredient("salt", "1", "")])],
            ..Default::default()
        });

        let list = planner(store).generate(user, &[], Some("")).await.unwrap();

        assert_eq!(list.name, DEFAULT_LIST_NAME);
    }

    #[tokio::test]
    async fn storage_failure_propagates_without_creating_a_list() {
        let user = Uuid::new_v4();
        let store = Arc::new(FakeStore {
            recipes: vec![recipe(user, vec![ingredient("salt", "1", "")])],
            fail_pantry: true,
            ..Default::default()
        });

        let result = planner(store.clone()).generate(user, &[], None).await;

        assert!(matches!(
            result,
            Err(GenerateError::Port(PortError::Unexpected(_)))
        ));
        assert!(store.lists.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_generation_creates_distinct_lists_with_same_items() {
        let user = Uuid::new_v4();
        let store = Arc::new(FakeStore {
            recipes: vec![recipe(
                user,
                vec![ingredient("flour", "3", "kg"), ingredient("yeast", "", "g")],
            )],
            pantry: vec![pantry_item(user, "Flour", "1", "kg")],
            ..Default::default()
        });
        let planner = planner(store.clone());

        let first = planner.generate(user, &[], None).await.unwrap();
        let second = planner.generate(user, &[], None).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(item_triples(&first), item_triples(&second));
        assert_eq!(store.list_grocery_lists(user).await.unwrap().len(), 2);
    }
}
