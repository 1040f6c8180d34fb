//! Condition parsing, rendering and matching
//!
//! This module handles condition strings like `env & ip != 1.1.1.1` or
//! `tag = ONLINE AND ip != 1.1.1.1`, turning them into trees that can be
//! rendered back to canonical text and matched against attributes.

mod ast;
pub mod cache;
pub mod dialect;
mod expression;
pub mod lexer;
mod matcher;
pub mod parser;
mod render;
mod traversal;


pub use ast::*;
pub use cache::*;
pub use dialect::*;
pub use expression::*;
pub use matcher::*;
pub use render::*;
pub use traversal::*;
