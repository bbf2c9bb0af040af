pub mod config;
pub mod init;
pub mod list;
pub mod placeholders;
pub mod render;
pub mod search;
pub mod show;
pub mod toc;
