pub mod fetch;
pub mod render;
