pub mod customer;

pub use customer::{CategoryPolicy, CustomerRecord};
