//! Programmatic Perl source generation.
//!
//! Callers build a tree of typed nodes (values, routines, control flow) and
//! render it into source text. Values commit to text the moment they are
//! admitted into a block; composite nodes stay live until the final render
//! pass, so nested control flow can keep accumulating children after being
//! attached to a parent.

pub mod ast;
mod emitter;
pub mod process;
pub mod registry;
pub mod tree;

pub use ast::*;
pub use registry::{Kind, KindSpec, TypeRegistry, SCALAR_CAST};
pub use sv_core::printer::{EmitConfig, IndentationConfig};
pub use sv_core::{Error, Result};
pub use tree::{
    Block, BlockId, BlockKind, Element, FileOptions, RootSlot, Scope, SourceTree, WhileLoop,
};
