//! services/api/src/web/recipes.rs
//!
//! REST handlers for the signed-in user's recipes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pantry_planner_core::{Difficulty, NewRecipe, Recipe, RecipeFilter, RecipeIngredient, RecipePatch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{port_error_response, HandlerError};
use crate::web::rest::{required_text, MessageResponse, QuantityInput};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// An ingredient line as sent and returned by the API.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct IngredientPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub quantity: Option<QuantityInput>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl IngredientPayload {
    fn into_domain(self) -> Result<RecipeIngredient, String> {
        Ok(RecipeIngredient {
            name: required_text("ingredient name", &self.name)?,
            quantity: self
                .quantity
                .map(QuantityInput::into_text)
                .unwrap_or_default(),
            unit: self.unit.unwrap_or_default(),
        })
    }
}

impl From<RecipeIngredient> for IngredientPayload {
    fn from(i: RecipeIngredient) -> Self {
        Self {
            name: i.name,
            quantity: Some(QuantityInput::Text(i.quantity)),
            unit: Some(i.unit),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<IngredientPayload>,
    pub steps: String,
    /// One of `Easy`, `Medium`, `Hard`.
    pub difficulty: String,
    pub cook_time_minutes: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeResponse {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            ingredients: r.ingredients.into_iter().map(IngredientPayload::from).collect(),
            steps: r.steps,
            difficulty: r.difficulty.to_string(),
            cook_time_minutes: r.cook_time_minutes,
            tags: r.tags,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Option<Vec<IngredientPayload>>,
    pub steps: Option<String>,
    pub difficulty: Option<String>,
    pub cook_time_minutes: Option<i32>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<IngredientPayload>>,
    pub steps: Option<String>,
    pub difficulty: Option<String>,
    pub cook_time_minutes: Option<i32>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeQuery {
    /// Case-insensitive pattern matched against ingredient names.
    pub ingredient: Option<String>,
    pub difficulty: Option<String>,
}

fn parse_difficulty(raw: &str) -> Result<Difficulty, String> {
    raw.parse::<Difficulty>()
}

fn parse_ingredients(raw: Vec<IngredientPayload>) -> Result<Vec<RecipeIngredient>, String> {
    raw.into_iter().map(IngredientPayload::into_domain).collect()
}

fn check_cook_time(minutes: i32) -> Result<i32, String> {
    if minutes < 0 {
        Err("cookTimeMinutes cannot be negative".to_string())
    } else {
        Ok(minutes)
    }
}

impl CreateRecipeRequest {
    pub fn into_new_recipe(self) -> Result<NewRecipe, String> {
        Ok(NewRecipe {
            title: required_text("title", &self.title)?,
            description: self.description.unwrap_or_default(),
            ingredients: parse_ingredients(self.ingredients.unwrap_or_default())?,
            steps: self.steps.unwrap_or_default(),
            difficulty: self
                .difficulty
                .as_deref()
                .map(parse_difficulty)
                .transpose()?
                .unwrap_or_default(),
            cook_time_minutes: check_cook_time(self.cook_time_minutes.unwrap_or(0))?,
            tags: self.tags.unwrap_or_default(),
        })
    }
}

impl UpdateRecipeRequest {
    pub fn into_patch(self) -> Result<RecipePatch, String> {
        Ok(RecipePatch {
            title: self
                .title
                .map(|t| required_text("title", &t))
                .transpose()?,
            description: self.description,
            ingredients: self.ingredients.map(parse_ingredients).transpose()?,
            steps: self.steps,
            difficulty: self
                .difficulty
                .as_deref()
                .map(parse_difficulty)
                .transpose()?,
            cook_time_minutes: self.cook_time_minutes.map(check_cook_time).transpose()?,
            tags: self.tags,
        })
    }
}

impl RecipeQuery {
    /// Empty query values are treated as absent.
    pub fn into_filter(self) -> Result<RecipeFilter, String> {
        Ok(RecipeFilter {
            ingredient: self
                .ingredient
                .filter(|s| !s.is_empty())
                .map(|p| {
                    RecipeFilter::ingredient_pattern(&p)
                        .map_err(|e| format!("Invalid ingredient pattern '{}': {}", p, e))
                })
                .transpose()?,
            difficulty: self
                .difficulty
                .filter(|s| !s.is_empty())
                .as_deref()
                .map(parse_difficulty)
                .transpose()?,
        })
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/recipes - List recipes, optionally filtered
#[utoipa::path(
    get,
    path = "/api/recipes",
    params(RecipeQuery),
    responses(
        (status = 200, description = "Recipes, newest first", body = [RecipeResponse]),
        (status = 400, description = "Unknown difficulty or invalid ingredient pattern"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_recipes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<RecipeQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let filter = query
        .into_filter()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let recipes = state
        .recipes
        .list_recipes(user_id, &filter)
        .await
        .map_err(|e| port_error_response("Failed to fetch recipes", e))?;

    Ok(Json(
        recipes
            .into_iter()
            .map(RecipeResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /api/recipes/{id} - Fetch one recipe
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "The recipe", body = RecipeResponse),
        (status = 404, description = "Recipe not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let recipe = state
        .recipes
        .get_recipe(user_id, recipe_id)
        .await
        .map_err(|e| port_error_response("Failed to fetch recipe", e))?;

    Ok(Json(RecipeResponse::from(recipe)))
}

/// POST /api/recipes - Create a recipe
#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateRecipeRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let new_recipe = req
        .into_new_recipe()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let recipe = state
        .recipes
        .create_recipe(user_id, new_recipe)
        .await
        .map_err(|e| port_error_response("Failed to create recipe", e))?;

    Ok((StatusCode::CREATED, Json(RecipeResponse::from(recipe))))
}

/// PUT /api/recipes/{id} - Update fields of a recipe
#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    request_body = UpdateRecipeRequest,
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Recipe not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(recipe_id): Path<Uuid>,
    Json(req): Json<UpdateRecipeRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let patch = req
        .into_patch()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let recipe = state
        .recipes
        .update_recipe(user_id, recipe_id, patch)
        .await
        .map_err(|e| port_error_response("Failed to update recipe", e))?;

    Ok(Json(RecipeResponse::from(recipe)))
}

/// DELETE /api/recipes/{id} - Remove a recipe
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe removed", body = MessageResponse),
        (status = 404, description = "Recipe not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_recipe_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(recipe_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    state
        .recipes
        .delete_recipe(user_id, recipe_id)
        .await
        .map_err(|e| port_error_response("Failed to delete recipe", e))?;

    Ok(Json(MessageResponse::new("Recipe removed")))
}
