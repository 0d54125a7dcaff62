pub mod report;
pub mod sampler;
pub mod summary;
pub mod trajectory;
