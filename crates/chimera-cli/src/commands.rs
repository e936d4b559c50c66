pub mod annotate;
pub mod bindings;
pub mod distance;
pub mod matchstates;
