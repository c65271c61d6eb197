//! One repository per entity, each wrapping the shared pool. Insert and
//! update are distinct operations chosen by the caller, and delete works on
//! the key alone.

pub mod categories;
pub mod positions;
pub mod products;
pub mod salaries;
pub mod sales;
pub mod users;
