// Genre and assignment indexes, built once from the metadata rows.

pub mod assignments;
pub mod builder;
pub mod genre;
