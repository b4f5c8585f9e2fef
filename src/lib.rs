pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod supabase;
