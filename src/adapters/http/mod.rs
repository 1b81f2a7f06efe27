//! HTTP adapter. Implements ContentSource with reqwest.

pub mod reqwest_source;

pub use reqwest_source::ReqwestSource;
