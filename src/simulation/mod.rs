pub mod animation;
pub mod callback;
pub mod clock;
pub mod error;
pub mod handler;
pub mod motion;
pub mod registry;
pub mod render;
pub mod resample;
pub mod timeline;
