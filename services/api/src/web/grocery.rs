//! services/api/src/web/grocery.rs
//!
//! REST handlers for grocery lists: generation from recipes and pantry, and the
//! edits a user makes afterwards.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pantry_planner_core::{GroceryItemPatch, GroceryList, GroceryListItem, GroceryListPatch, ListStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{generate_error_response, port_error_response, HandlerError};
use crate::web::rest::{required_text, MessageResponse, QuantityInput};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Recipes to plan for. Empty or omitted means every recipe the user owns.
    #[serde(default)]
    pub recipe_ids: Vec<Uuid>,
    pub name: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItemResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub is_purchased: bool,
}

impl From<GroceryListItem> for GroceryItemResponse {
    fn from(i: GroceryListItem) -> Self {
        Self {
            id: i.id,
            name: i.name,
            quantity: i.quantity,
            unit: i.unit,
            is_purchased: i.is_purchased,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroceryListResponse {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<GroceryItemResponse>,
    /// `active` or `completed`.
    pub status: String,
    pub generated_from_recipes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroceryList> for GroceryListResponse {
    fn from(list: GroceryList) -> Self {
        Self {
            id: list.id,
            name: list.name,
            items: list.items.into_iter().map(GroceryItemResponse::from).collect(),
            status: list.status.to_string(),
            generated_from_recipes: list.generated_from_recipes,
            created_at: list.created_at,
            updated_at: list.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroceryListRequest {
    pub name: Option<String>,
    pub status: Option<String>,
}

impl UpdateGroceryListRequest {
    pub fn into_patch(self) -> Result<GroceryListPatch, String> {
        Ok(GroceryListPatch {
            name: self
                .name
                .map(|n| required_text("name", &n))
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(str::parse::<ListStatus>)
                .transpose()?,
        })
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroceryItemRequest {
    pub is_purchased: Option<bool>,
    #[schema(value_type = Option<f64>)]
    pub quantity: Option<QuantityInput>,
    pub unit: Option<String>,
}

impl UpdateGroceryItemRequest {
    pub fn into_patch(self) -> Result<GroceryItemPatch, String> {
        Ok(GroceryItemPatch {
            is_purchased: self.is_purchased,
            quantity: self.quantity.map(QuantityInput::into_number).transpose()?,
            unit: self.unit,
        })
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/grocery/generate - Build a shortfall list from recipes and pantry
#[utoipa::path(
    post,
    path = "/api/grocery/generate",
    request_body = GenerateRequest,
    responses(
        (status = 201, description = "List generated", body = GroceryListResponse),
        (status = 404, description = "No recipes found to generate list from"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    body: Option<Json<GenerateRequest>>,
) -> Result<impl IntoResponse, HandlerError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    info!(
        %user_id,
        requested = req.recipe_ids.len(),
        "Generating grocery list"
    );

    let list = state
        .planner
        .generate(user_id, &req.recipe_ids, req.name.as_deref())
        .await
        .map_err(generate_error_response)?;

    Ok((StatusCode::CREATED, Json(GroceryListResponse::from(list))))
}

/// GET /api/grocery - List the user's grocery lists, newest first
#[utoipa::path(
    get,
    path = "/api/grocery",
    responses(
        (status = 200, description = "Grocery lists", body = [GroceryListResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_grocery_lists_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let lists = state
        .grocery
        .list_grocery_lists(user_id)
        .await
        .map_err(|e| port_error_response("Failed to fetch grocery lists", e))?;

    Ok(Json(
        lists
            .into_iter()
            .map(GroceryListResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// PUT /api/grocery/{id} - Rename a list or change its status
#[utoipa::path(
    put,
    path = "/api/grocery/{id}",
    request_body = UpdateGroceryListRequest,
    params(("id" = Uuid, Path, description = "Grocery list id")),
    responses(
        (status = 200, description = "List updated", body = GroceryListResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "List not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_grocery_list_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<UpdateGroceryListRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let patch = req
        .into_patch()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let list = state
        .grocery
        .update_grocery_list(user_id, list_id, patch)
        .await
        .map_err(|e| port_error_response("Failed to update grocery list", e))?;

    Ok(Json(GroceryListResponse::from(list)))
}

/// PATCH /api/grocery/{list_id}/items/{item_id} - Toggle or edit one item
#[utoipa::path(
    patch,
    path = "/api/grocery/{list_id}/items/{item_id}",
    request_body = UpdateGroceryItemRequest,
    params(
        ("list_id" = Uuid, Path, description = "Grocery list id"),
        ("item_id" = Uuid, Path, description = "Item id within the list")
    ),
    responses(
        (status = 200, description = "Item updated; the whole list is returned", body = GroceryListResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "List or item not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_grocery_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateGroceryItemRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let patch = req
        .into_patch()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let list = state
        .grocery
        .update_grocery_item(user_id, list_id, item_id, patch)
        .await
        .map_err(|e| port_error_response("Failed to update grocery item", e))?;

    Ok(Json(GroceryListResponse::from(list)))
}

/// DELETE /api/grocery/{id} - Remove a grocery list
#[utoipa::path(
    delete,
    path = "/api/grocery/{id}",
    params(("id" = Uuid, Path, description = "Grocery list id")),
    responses(
        (status = 200, description = "List removed", body = MessageResponse),
        (status = 404, description = "List not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_grocery_list_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(list_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    state
        .grocery
        .delete_grocery_list(user_id, list_id)
        .await
        .map_err(|e| port_error_response("Failed to delete grocery list", e))?;

    Ok(Json(MessageResponse::new("Grocery list removed")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_defaults_to_all_recipes() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(req.recipe_ids.is_empty());
        assert!(req.name.is_none());
    }

    #[test]
    fn list_patch_rejects_unknown_status() {
        let req: UpdateGroceryListRequest =
            serde_json::from_str(r#"{"status": "archived"}"#).unwrap();
        assert!(req.into_patch().is_err());

        let req: UpdateGroceryListRequest =
            serde_json::from_str(r#"{"status": "completed", "name": " Weekend "}"#).unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.status, Some(ListStatus::Completed));
        assert_eq!(patch.name.as_deref(), Some("Weekend"));
    }

    #[test]
    fn item_patch_accepts_numeric_strings_only() {
        let req: UpdateGroceryItemRequest =
            serde_json::from_str(r#"{"isPurchased": true, "quantity": "1.5"}"#).unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.is_purchased, Some(true));
        assert_eq!(patch.quantity, Some(1.5));

        let req: UpdateGroceryItemRequest =
            serde_json::from_str(r#"{"quantity": "a handful"}"#).unwrap();
        assert!(req.into_patch().is_err());
    }

    #[test]
    fn list_response_uses_camel_case_fields() {
        let now = Utc::now();
        let response = GroceryListResponse::from(GroceryList {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Auto-generated list".to_string(),
            items: vec![GroceryListItem {
                id: Uuid::new_v4(),
                name: "flour".to_string(),
                quantity: 1.0,
                unit: "kg".to_string(),
                is_purchased: false,
            }],
            status: ListStatus::Active,
            generated_from_recipes: vec![],
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "active");
        assert_eq!(json["items"][0]["isPurchased"], false);
        assert_eq!(json["items"][0]["quantity"], 1.0);
        assert!(json["generatedFromRecipes"].as_array().unwrap().is_empty());
    }
}
