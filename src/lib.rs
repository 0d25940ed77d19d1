// Genredist: genre-vs-control distance sampling over document vectors.
//
// This is the library root. Data flows one way: `corpus` loads the inputs
// and builds the `index` structures, `sampling` runs single trials against
// them, `pipeline` drives many trials, and `output` persists and reports.

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod sampling;
