// Output: the result table, the run summary, and terminal reports.

pub mod summary;
pub mod terminal;
pub mod tsv;
