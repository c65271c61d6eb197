pub mod category;
pub mod position;
pub mod product;
pub mod role;
pub mod salary;
pub mod sale;
pub mod sale_product;
pub mod user;
