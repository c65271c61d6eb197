pub mod categories;
pub mod positions;
pub mod products;
pub mod salaries;
pub mod sales;
pub mod users;
