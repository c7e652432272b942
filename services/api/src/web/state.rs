//! services/api/src/web/state.rs
//!
//! The shared application state, created once at startup and passed to all handlers.

use crate::config::Config;
use pantry_planner_core::{GroceryListStore, GroceryPlanner, PantryStore, RecipeStore, UserStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub pantry: Arc<dyn PantryStore>,
    pub recipes: Arc<dyn RecipeStore>,
    pub grocery: Arc<dyn GroceryListStore>,
    pub planner: GroceryPlanner,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires every port to one adapter that implements all of them.
    pub fn new<D>(db: Arc<D>, config: Arc<Config>) -> Self
    where
        D: UserStore + PantryStore + RecipeStore + GroceryListStore + 'static,
    {
        let planner = GroceryPlanner::new(db.clone(), db.clone(), db.clone());
        Self {
            users: db.clone(),
            pantry: db.clone(),
            recipes: db.clone(),
            grocery: db,
            planner,
            config,
        }
    }
}
