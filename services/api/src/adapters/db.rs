//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the store ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Every query filters on `user_id`, so a row owned by someone else is
//! indistinguishable from a missing row.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pantry_planner_core::domain::{
    GroceryItemPatch, GroceryList, GroceryListItem, GroceryListPatch, NewGroceryItem,
    NewPantryItem, NewRecipe, PantryItem, PantryItemPatch, Recipe, RecipeFilter,
    RecipeIngredient, RecipePatch, User, UserCredentials,
};
use pantry_planner_core::ports::{
    GroceryListStore, PantryStore, PortError, PortResult, RecipeStore, UserStore,
};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every store port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn malformed(what: &str, detail: String) -> PortError {
    PortError::Unexpected(format!("Malformed stored {}: {}", what, detail))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
    name: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct PantryItemRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    quantity: String,
    unit: String,
    category: String,
    expiry_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl PantryItemRecord {
    fn to_domain(self) -> PantryItem {
        PantryItem {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            category: self.category,
            expiry_date: self.expiry_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// JSON shape of one element of `recipes.ingredients`.
#[derive(Serialize, Deserialize)]
struct IngredientRecord {
    name: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    unit: String,
}
impl From<&RecipeIngredient> for IngredientRecord {
    fn from(i: &RecipeIngredient) -> Self {
        Self {
            name: i.name.clone(),
            quantity: i.quantity.clone(),
            unit: i.unit.clone(),
        }
    }
}

#[derive(FromRow)]
struct RecipeRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    ingredients: Json<Vec<IngredientRecord>>,
    steps: String,
    difficulty: String,
    cook_time_minutes: i32,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl RecipeRecord {
    fn to_domain(self) -> PortResult<Recipe> {
        let difficulty = self
            .difficulty
            .parse()
            .map_err(|e: String| malformed("recipe", e))?;
        Ok(Recipe {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            ingredients: self
                .ingredients
                .0
                .into_iter()
                .map(|i| RecipeIngredient {
                    name: i.name,
                    quantity: i.quantity,
                    unit: i.unit,
                })
                .collect(),
            steps: self.steps,
            difficulty,
            cook_time_minutes: self.cook_time_minutes,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// JSON shape of one element of `grocery_lists.items`.
#[derive(Serialize, Deserialize)]
struct GroceryItemRecord {
    id: Uuid,
    name: String,
    quantity: f64,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    is_purchased: bool,
}
impl From<&GroceryListItem> for GroceryItemRecord {
    fn from(i: &GroceryListItem) -> Self {
        Self {
            id: i.id,
            name: i.name.clone(),
            quantity: i.quantity,
            unit: i.unit.clone(),
            is_purchased: i.is_purchased,
        }
    }
}

#[derive(FromRow)]
struct GroceryListRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    items: Json<Vec<GroceryItemRecord>>,
    status: String,
    generated_from_recipes: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl GroceryListRecord {
    fn to_domain(self) -> PortResult<GroceryList> {
        let status = self
            .status
            .parse()
            .map_err(|e: String| malformed("grocery list", e))?;
        Ok(GroceryList {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            items: self
                .items
                .0
                .into_iter()
                .map(|i| GroceryListItem {
                    id: i.id,
                    name: i.name,
                    quantity: i.quantity,
                    unit: i.unit,
                    is_purchased: i.is_purchased,
                })
                .collect(),
            status,
            generated_from_recipes: self.generated_from_recipes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn recipes_to_domain(records: Vec<RecipeRecord>) -> PortResult<Vec<Recipe>> {
    records.into_iter().map(RecipeRecord::to_domain).collect()
}

const PANTRY_COLUMNS: &str =
    "id, user_id, name, quantity, unit, category, expiry_date, created_at, updated_at";
const RECIPE_COLUMNS: &str = "id, user_id, title, description, ingredients, steps, difficulty, \
     cook_time_minutes, tags, created_at, updated_at";
const GROCERY_LIST_COLUMNS: &str =
    "id, user_id, name, items, status, generated_from_recipes, created_at, updated_at";

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        name: Option<&str>,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password, name) VALUES ($1, $2, $3, $4) \
             RETURNING user_id, email, name",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Email {} is already registered", email))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, name FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `PantryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PantryStore for DbAdapter {
    async fn list_pantry_items(&self, user_id: Uuid) -> PortResult<Vec<PantryItem>> {
        let records = sqlx::query_as::<_, PantryItemRecord>(&format!(
            "SELECT {PANTRY_COLUMNS} FROM pantry_items WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_pantry_item(
        &self,
        user_id: Uuid,
        item: NewPantryItem,
    ) -> PortResult<PantryItem> {
        let (quantity, unit, category) = item.resolved_fields();
        let record = sqlx::query_as::<_, PantryItemRecord>(&format!(
            "INSERT INTO pantry_items (id, user_id, name, quantity, unit, category, expiry_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PANTRY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&item.name)
        .bind(quantity)
        .bind(unit)
        .bind(category)
        .bind(item.expiry_date)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_pantry_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        patch: PantryItemPatch,
    ) -> PortResult<PantryItem> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let mut item = sqlx::query_as::<_, PantryItemRecord>(&format!(
            "SELECT {PANTRY_COLUMNS} FROM pantry_items WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Item not found".to_string()))?
        .to_domain();

        patch.apply(&mut item);

        let record = sqlx::query_as::<_, PantryItemRecord>(&format!(
            "UPDATE pantry_items SET name = $3, quantity = $4, unit = $5, category = $6, \
             expiry_date = $7, updated_at = now() WHERE id = $1 AND user_id = $2 \
             RETURNING {PANTRY_COLUMNS}"
        ))
        .bind(item_id)
        .bind(user_id)
        .bind(&item.name)
        .bind(&item.quantity)
        .bind(&item.unit)
        .bind(&item.category)
        .bind(item.expiry_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM pantry_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Item not found".to_string()));
        }
        Ok(())
    }
}

//=========================================================================================
// `RecipeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecipeStore for DbAdapter {
    async fn list_recipes(&self, user_id: Uuid, filter: &RecipeFilter) -> PortResult<Vec<Recipe>> {
        let records = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes \
             WHERE user_id = $1 AND ($2::text IS NULL OR difficulty = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .bind(filter.difficulty.map(|d| d.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        // Ingredient names live inside the JSON array; match them with the domain rule.
        let recipes = recipes_to_domain(records)?;
        Ok(recipes.into_iter().filter(|r| filter.matches(r)).collect())
    }

    async fn find_recipes_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> PortResult<Vec<Recipe>> {
        let records = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = $1 AND id = ANY($2) \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        recipes_to_domain(records)
    }

    async fn find_recipes_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Recipe>> {
        let records = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        recipes_to_domain(records)
    }

    async fn get_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<Recipe> {
        sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2"
        ))
        .bind(recipe_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Recipe not found".to_string()))?
        .to_domain()
    }

    async fn create_recipe(&self, user_id: Uuid, recipe: NewRecipe) -> PortResult<Recipe> {
        let ingredients: Vec<IngredientRecord> =
            recipe.ingredients.iter().map(IngredientRecord::from).collect();
        sqlx::query_as::<_, RecipeRecord>(&format!(
            "INSERT INTO recipes (id, user_id, title, description, ingredients, steps, \
             difficulty, cook_time_minutes, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(Json(ingredients))
        .bind(&recipe.steps)
        .bind(recipe.difficulty.to_string())
        .bind(recipe.cook_time_minutes)
        .bind(&recipe.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn update_recipe(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        patch: RecipePatch,
    ) -> PortResult<Recipe> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let mut recipe = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(recipe_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Recipe not found".to_string()))?
        .to_domain()?;

        patch.apply(&mut recipe);

        let ingredients: Vec<IngredientRecord> =
            recipe.ingredients.iter().map(IngredientRecord::from).collect();
        let updated = sqlx::query_as::<_, RecipeRecord>(&format!(
            "UPDATE recipes SET title = $3, description = $4, ingredients = $5, steps = $6, \
             difficulty = $7, cook_time_minutes = $8, tags = $9, updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(recipe_id)
        .bind(user_id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(Json(ingredients))
        .bind(&recipe.steps)
        .bind(recipe.difficulty.to_string())
        .bind(recipe.cook_time_minutes)
        .bind(&recipe.tags)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        updated.to_domain()
    }

    async fn delete_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Recipe not found".to_string()));
        }
        Ok(())
    }
}

//=========================================================================================
// `GroceryListStore` Trait Implementation
//=========================================================================================

impl DbAdapter {
    /// Loads a list row for update inside `tx`, or `NotFound("List not found")`.
    async fn lock_grocery_list(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        list_id: Uuid,
    ) -> PortResult<GroceryList> {
        sqlx::query_as::<_, GroceryListRecord>(&format!(
            "SELECT {GROCERY_LIST_COLUMNS} FROM grocery_lists \
             WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(list_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("List not found".to_string()))?
        .to_domain()
    }

    async fn save_grocery_list(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        list: &GroceryList,
    ) -> PortResult<GroceryList> {
        let items: Vec<GroceryItemRecord> = list.items.iter().map(GroceryItemRecord::from).collect();
        sqlx::query_as::<_, GroceryListRecord>(&format!(
            "UPDATE grocery_lists SET name = $3, items = $4, status = $5, updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {GROCERY_LIST_COLUMNS}"
        ))
        .bind(list.id)
        .bind(list.user_id)
        .bind(&list.name)
        .bind(Json(items))
        .bind(list.status.to_string())
        .fetch_one(&mut **tx)
        .await
        .map_err(unexpected)?
        .to_domain()
    }
}

#[async_trait]
impl GroceryListStore for DbAdapter {
    async fn create_grocery_list(
        &self,
        user_id: Uuid,
        name: &str,
        items: Vec<NewGroceryItem>,
        source_recipe_ids: &[Uuid],
    ) -> PortResult<GroceryList> {
        let items: Vec<GroceryItemRecord> = items
            .into_iter()
            .map(GroceryListItem::from)
            .map(|i| GroceryItemRecord::from(&i))
            .collect();
        sqlx::query_as::<_, GroceryListRecord>(&format!(
            "INSERT INTO grocery_lists (id, user_id, name, items, generated_from_recipes) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {GROCERY_LIST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .bind(Json(items))
        .bind(source_recipe_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn list_grocery_lists(&self, user_id: Uuid) -> PortResult<Vec<GroceryList>> {
        let records = sqlx::query_as::<_, GroceryListRecord>(&format!(
            "SELECT {GROCERY_LIST_COLUMNS} FROM grocery_lists WHERE user_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(GroceryListRecord::to_domain).collect()
    }

    async fn update_grocery_list(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        patch: GroceryListPatch,
    ) -> PortResult<GroceryList> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let mut list = Self::lock_grocery_list(&mut tx, user_id, list_id).await?;
        patch.apply(&mut list);
        let saved = Self::save_grocery_list(&mut tx, &list).await?;
        tx.commit().await.map_err(unexpected)?;
        Ok(saved)
    }

    async fn update_grocery_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
        patch: GroceryItemPatch,
    ) -> PortResult<GroceryList> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let mut list = Self::lock_grocery_list(&mut tx, user_id, list_id).await?;
        if !list.update_item(item_id, patch) {
            // Dropping the transaction rolls it back.
            return Err(PortError::NotFound("Item not found".to_string()));
        }
        let saved = Self::save_grocery_list(&mut tx, &list).await?;
        tx.commit().await.map_err(unexpected)?;
        Ok(saved)
    }

    async fn delete_grocery_list(&self, user_id: Uuid, list_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM grocery_lists WHERE id = $1 AND user_id = $2")
            .bind(list_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("List not found".to_string()));
        }
        Ok(())
    }
}
