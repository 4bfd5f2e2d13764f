//! Generative model abstraction.

pub mod provider;

pub use provider::ChatModel;
