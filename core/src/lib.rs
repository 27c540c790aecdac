pub mod geometry;
pub mod linkage;
