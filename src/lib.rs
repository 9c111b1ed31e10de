//! Front-end for the ShaderLab shading DSL.
//!
//! The pipeline is compile-time-only and strictly layered:
//!
//! 1. [`frontend::preprocessor::Preprocessor`] expands `#define` macros and
//!    strips directive lines, producing plain shader source for a parser.
//! 2. The tokenizer and symbol machinery support that pass and the later
//!    semantic phases: [`frontend::tokenizer::Tokenizer`] for positioned
//!    scanning, [`common::symbol_table`] for scoped, overload-capable
//!    symbol lookup.
//! 3. [`frontend::ast`] nodes serialize themselves back into target shader
//!    source text (GLSL), which is what an external renderer consumes.
//!
//! Everything runs synchronously on one thread; errors abort the compile
//! pass for the current shader asset, warnings are advisory and collected
//! rather than printed.

pub mod common;
pub mod frontend;

pub use common::error::CompileError;
pub use common::position::{Position, PositionTicker};
pub use common::text::{replace_segments, ReplaceSegment};
pub use frontend::preprocessor::Preprocessor;
pub use frontend::tokenizer::{Token, Tokenizer};
