//! Database layer (Firestore, with an in-process fallback).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    /// Carts (keyed by user ID)
    pub const CARTS: &str = "carts";
    pub const ORDERS: &str = "orders";
    pub const COUNTRIES: &str = "countries";
    /// Reviews (keyed by user/product/order)
    pub const REVIEWS: &str = "reviews";
}
