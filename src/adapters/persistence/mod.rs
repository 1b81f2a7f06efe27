//! Persistence adapters. Target document storage.

pub mod fs_document;

pub use fs_document::FsDocumentStore;
