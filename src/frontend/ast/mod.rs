//! Typed parse-tree nodes and their serialization contract.
//!
//! Every node is an [`AstNode<T>`]: a position range plus construct-
//! specific content. Serialization back to shader source text is the
//! code-generation backend of the front-end: composite nodes concatenate
//! their children's output, leaf nodes return their literal text, and
//! scope-sensitive nodes consult the [`emit::EmitContext`] threaded
//! through the walk. `to_json` produces a debug-only structural dump and
//! is independent of the serialization path.

pub mod emit;
pub mod nodes;

use serde::Serialize;
use serde_json::Value;

use crate::common::position::Position;
pub use emit::{EmitContext, EmitOptions, EmitSource, GlslVersion, NodeDump};

/// Source span of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionRange {
    pub start: Position,
    pub end: Position,
}

impl PositionRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zeroed range for synthesized nodes.
    pub fn dummy() -> Self {
        let zero = Position::new(0, 0, 0);
        Self { start: zero, end: zero }
    }
}

/// A parse-tree node: where it came from plus what it is.
#[derive(Debug, Clone)]
pub struct AstNode<T> {
    pub range: PositionRange,
    pub content: T,
}

impl<T> AstNode<T> {
    pub fn new(range: PositionRange, content: T) -> Self {
        Self { range, content }
    }
}

impl<T: EmitSource> AstNode<T> {
    /// Serialize this node to target shader source text.
    pub fn serialize(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        self.content.emit(ctx, opts)
    }
}

impl<T: NodeDump> AstNode<T> {
    /// Debug-only structural dump. `include_pos` attaches the node's
    /// range, `with_class` its construct name; both propagate to
    /// children.
    pub fn to_json(&self, include_pos: bool, with_class: bool) -> Value {
        let mut value = self.content.dump(include_pos, with_class);
        if let Value::Object(map) = &mut value {
            if with_class {
                map.insert("node".to_string(), Value::String(self.content.class_name().to_string()));
            }
            if include_pos {
                map.insert(
                    "range".to_string(),
                    serde_json::to_value(self.range).unwrap_or(Value::Null),
                );
            }
        }
        value
    }
}
