pub mod product;
pub mod user;

pub use product::{NewProduct, Product, ProductFilter, ProductUpdate};
pub use user::{NewUser, ProfileUpdate, User};
