//! # DevConnect API Server Library
//!
//! Core of the DevConnect REST backend: accounts, profiles, posts,
//! comments, likes, uploads and the admin dashboard.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
