pub mod salary;
