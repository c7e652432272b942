pub mod domain;
pub mod grocery;
pub mod ports;
pub mod quantity;

pub use domain::{
    Difficulty, GroceryItemPatch, GroceryList, GroceryListItem, GroceryListPatch,
    ListStatus, NewGroceryItem, NewPantryItem, NewRecipe, PantryItem, PantryItemPatch, Recipe,
    RecipeFilter, RecipeIngredient, RecipePatch, User, UserCredentials,
};
pub use grocery::{compute_shortfall, GenerateError, GroceryPlanner, DEFAULT_LIST_NAME};
pub use ports::{GroceryListStore, PantryStore, PortError, PortResult, RecipeStore, UserStore};
