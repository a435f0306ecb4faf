pub mod application;
pub mod build;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod error;
pub mod link;
pub mod package;
pub mod reporter;
pub mod runtime;
pub mod source;
