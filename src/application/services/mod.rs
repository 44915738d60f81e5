pub mod cloner;

pub use cloner::{ClonerConfig, GitCloner};
