pub mod cli;
pub mod color;
pub mod engine;
pub mod history;
pub mod pipeline;
pub mod prompt;
pub mod registry;
pub mod settings;
pub mod store;
pub mod theme;

pub use engine::Engine;
