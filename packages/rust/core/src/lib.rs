//! Core launch orchestration for docmake.
//!
//! This crate ties together root resolution, submodule sync, and the
//! delegated documentation builder into one linear workflow (`launch`).

pub mod builder;
pub mod entrypoint;
pub mod process;
pub mod submodules;
