//! makegraph core library.
//!
//! This library turns declared C build targets into a Makefile: targets are
//! collected in a [`registry::Registry`], their dependency closure is
//! computed by [`graph`], and [`make_gen`] linearises the graph so every
//! target's rules follow those of its dependencies.

pub mod ast;
pub mod cli;
pub mod error;
pub mod fileset;
pub mod flags;
pub mod graph;
pub mod make_gen;
pub mod manifest;
pub mod registry;
pub mod runner;
pub mod target;
pub mod version;
