//! crates/pantry_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage implementations.
//!
//! Every store operation is scoped by the owning `user_id`. Implementations must
//! enforce that scoping themselves: a record owned by another user behaves exactly
//! like a record that does not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    GroceryItemPatch, GroceryList, GroceryListPatch, NewGroceryItem, NewPantryItem, NewRecipe,
    PantryItem, PantryItemPatch, Recipe, RecipeFilter, RecipePatch, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        name: Option<&str>,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning user for a live session. Expired sessions are `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait PantryStore: Send + Sync {
    /// All pantry items of the user, newest first.
    async fn list_pantry_items(&self, user_id: Uuid) -> PortResult<Vec<PantryItem>>;

    async fn create_pantry_item(&self, user_id: Uuid, item: NewPantryItem)
        -> PortResult<PantryItem>;

    async fn update_pantry_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        patch: PantryItemPatch,
    ) -> PortResult<PantryItem>;

    async fn delete_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Recipes of the user matching `filter`, newest first.
    async fn list_recipes(&self, user_id: Uuid, filter: &RecipeFilter) -> PortResult<Vec<Recipe>>;

    /// Recipes among `ids` owned by the user, oldest first. Unknown or foreign ids are skipped.
    async fn find_recipes_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> PortResult<Vec<Recipe>>;

    /// Every recipe owned by the user, oldest first.
    async fn find_recipes_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Recipe>>;

    async fn get_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<Recipe>;

    async fn create_recipe(&self, user_id: Uuid, recipe: NewRecipe) -> PortResult<Recipe>;

    async fn update_recipe(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        patch: RecipePatch,
    ) -> PortResult<Recipe>;

    async fn delete_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait GroceryListStore: Send + Sync {
    /// Atomically creates a list. Items get fresh ids and start unpurchased.
    async fn create_grocery_list(
        &self,
        user_id: Uuid,
        name: &str,
        items: Vec<NewGroceryItem>,
        source_recipe_ids: &[Uuid],
    ) -> PortResult<GroceryList>;

    /// All lists of the user, newest first.
    async fn list_grocery_lists(&self, user_id: Uuid) -> PortResult<Vec<GroceryList>>;

    async fn update_grocery_list(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        patch: GroceryListPatch,
    ) -> PortResult<GroceryList>;

    /// Fails with `NotFound` naming either the list or the item; nothing is written then.
    async fn update_grocery_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
        patch: GroceryItemPatch,
    ) -> PortResult<GroceryList>;

    async fn delete_grocery_list(&self, user_id: Uuid, list_id: Uuid) -> PortResult<()>;
}
