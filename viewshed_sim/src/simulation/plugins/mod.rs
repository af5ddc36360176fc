pub mod viewshed;
pub mod world;
