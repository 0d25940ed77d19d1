// Per-trial sampling: focal draw, genre mate, and the two kinds of control.

pub mod sampler;
pub mod trial;
