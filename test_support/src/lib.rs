//! Test utilities for makegraph integration tests.
//!
//! This crate provides temporary project trees and fake `make` executables
//! that record how they were invoked.

pub mod fake_make;
pub mod project;

pub use fake_make::{FakeMake, fake_make};
pub use project::ProjectTree;
