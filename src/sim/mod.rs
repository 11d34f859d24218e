pub mod element;
pub mod elements;
pub mod engine;
pub mod ray;
