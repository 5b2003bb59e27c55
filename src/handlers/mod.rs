//! HTTP handlers

pub mod health;
pub mod auth;
pub mod contact;
pub mod predict;
pub mod models;
