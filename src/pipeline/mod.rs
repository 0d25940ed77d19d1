// Experiment pipeline: trial batches and their aggregation.

pub mod experiment;
