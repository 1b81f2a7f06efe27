//! Cross-cutting helpers: configuration and markup escaping.

pub mod config;
pub mod html;
