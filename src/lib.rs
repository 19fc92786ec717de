pub mod columns;
pub mod error;
pub mod load;
pub mod normalize;
pub mod operators;
pub mod providers;
pub mod registry;
