//! site-sync: splice TeamUnify calendar and news feeds into a static website.
//!
//! Hexagonal layout: `domain` (pure data), `ports` (capability traits),
//! `adapters` (HTTP, feed parsers, filesystem, git), `usecases` (pipeline).

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
