pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod io;
pub mod library;
pub mod paths;
pub mod search;
pub mod template;
pub mod types;

pub use error::{KbError, Result};
