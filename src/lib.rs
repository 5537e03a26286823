pub mod callbacks;
pub mod config;
pub mod model;
pub mod scenario;
pub mod scene;
pub mod simulation;
