//! Filesystem-backed blob storage for uploaded images.

pub mod uploads;

pub use uploads::LocalBlobStore;
