//! Single-pass `#define` expansion for ShaderLab source.
//!
//! Handles:
//! - `#define` / `#undef` (object-like and function-like macros)
//! - `#if` / `#ifdef` / `#ifndef` / `#else` / `#elif` / `#endif` directive
//!   lines, which are stripped without being evaluated: neither branch is
//!   pruned, and only macro *registration* is suppressed inside a
//!   conditional region (a later pipeline stage owns true conditional
//!   compilation)
//! - Macro expansion in ordinary text
//!
//! The pass walks the source once with a [`Tokenizer`], records planned
//! edits as [`ReplaceSegment`]s against the original text (directive-line
//! deletions and macro substitutions, in scan order), and applies them
//! all at the end in a single splice.

use crate::common::error::CompileError;
use crate::common::text::{replace_segments, ReplaceSegment};
use crate::frontend::tokenizer::{ChunkOptions, Token, Tokenizer};

use super::macro_defs::{split_call_args, MacroDef, MacroTable};

pub struct Preprocessor {
    macros: MacroTable,
    /// Planned edits over the original source, in ascending scan order.
    segments: Vec<ReplaceSegment>,
    /// The directive currently being handled: the `#define` being consumed
    /// or the conditional that opened the region the scan is inside.
    cur_directive: Option<Token>,
    /// Nesting depth of conditional regions, so only the matching `#endif`
    /// clears `cur_directive`.
    conditional_depth: usize,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            macros: MacroTable::new(),
            segments: Vec::new(),
            cur_directive: None,
            conditional_depth: 0,
        }
    }

    /// Expand macros in `source` and strip directive lines, returning the
    /// substituted text. The macro table builds up incrementally during
    /// the pass; call [`reset`](Self::reset) before reusing this instance
    /// on different text.
    pub fn process(&mut self, source: &str) -> Result<String, CompileError> {
        let mut tokenizer = Tokenizer::new(source);
        while let Some(token) = tokenizer.scan_token() {
            match token.text.as_str() {
                "#define" => self.handle_define(&mut tokenizer, token)?,
                "#undef" => self.handle_undef(&mut tokenizer, token),
                "#if" | "#ifdef" | "#ifndef" => self.enter_conditional(&mut tokenizer, token),
                "#endif" => self.leave_conditional(&mut tokenizer, token),
                "#else" | "#elif" => self.delete_directive_line(&mut tokenizer, &token),
                _ => self.handle_word(&mut tokenizer, &token)?,
            }
        }
        Ok(replace_segments(source, &self.segments))
    }

    /// Clear all internal buffers and tables. Required before reusing one
    /// instance on different text; `process` does not self-clear.
    pub fn reset(&mut self) {
        self.macros.clear();
        self.segments.clear();
        self.cur_directive = None;
        self.conditional_depth = 0;
    }

    /// Macro definitions accumulated so far (tests and diagnostics).
    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    fn consume_line(tokenizer: &mut Tokenizer) {
        tokenizer.scan_chunk(|b| b == b'\n', ChunkOptions::default());
    }

    /// Delete from `start_idx` through the consumed end of the current
    /// line. When the line scan short-circuits at a `//` comment, the
    /// deletion stops there and the comment survives.
    fn delete_directive_line(&mut self, tokenizer: &mut Tokenizer, directive: &Token) {
        Self::consume_line(tokenizer);
        self.delete(directive.start.index, tokenizer.index());
    }

    fn delete(&mut self, start_idx: usize, end_idx: usize) {
        self.segments.push(ReplaceSegment::new(start_idx, end_idx, String::new()));
    }

    fn handle_define(&mut self, tokenizer: &mut Tokenizer, directive: Token) -> Result<(), CompileError> {
        if self.cur_directive.is_some() {
            // Inside a conditional region the definition is ignored, but
            // the directive line still disappears from the output.
            self.delete_directive_line(tokenizer, &directive);
            return Ok(());
        }
        self.cur_directive = Some(directive.clone());
        let name = tokenizer.scan_token().ok_or(CompileError::MissingMacroName)?;

        let def = if tokenizer.byte_at(name.end.index) == Some(b'(') {
            // Function-like: `(` immediately follows the name.
            let formals = tokenizer.scan_token_between_pair(b'(', b')')?;
            let params: Vec<String> = formals.value.into_iter().map(|t| t.text).collect();
            let body = tokenizer
                .scan_chunk(|b| b == b'\n', ChunkOptions { skip_heading_space: true, keep_terminator: false });
            MacroDef::function(&name.text, params, body.value.trim_end())
        } else {
            let body = tokenizer
                .scan_chunk(|b| b == b'\n', ChunkOptions { skip_heading_space: true, keep_terminator: false });
            // Replacement text self-expands against the existing table at
            // definition time, so chains like A -> B -> usage flatten out.
            let expanded = self.macros.expand_text(body.value.trim_end());
            MacroDef::object(&name.text, &expanded)
        };
        self.macros.define(def);
        self.delete(directive.start.index, tokenizer.index());
        self.cur_directive = None;
        Ok(())
    }

    fn handle_undef(&mut self, tokenizer: &mut Tokenizer, directive: Token) {
        if self.cur_directive.is_none() {
            if let Some(name) = tokenizer.scan_token() {
                self.macros.undefine(&name.text);
            }
        }
        self.delete_directive_line(tokenizer, &directive);
    }

    fn enter_conditional(&mut self, tokenizer: &mut Tokenizer, directive: Token) {
        if self.cur_directive.is_none() {
            self.cur_directive = Some(directive.clone());
        }
        self.conditional_depth += 1;
        self.delete_directive_line(tokenizer, &directive);
    }

    fn leave_conditional(&mut self, tokenizer: &mut Tokenizer, directive: Token) {
        if self.conditional_depth > 0 {
            self.conditional_depth -= 1;
            if self.conditional_depth == 0 {
                self.cur_directive = None;
            }
        }
        self.delete_directive_line(tokenizer, &directive);
    }

    /// Expand `token` if it names a defined macro, recording the planned
    /// substitution. Expansion runs inside conditional regions too; the
    /// guard only suppresses registration.
    fn handle_word(&mut self, tokenizer: &mut Tokenizer, token: &Token) -> Result<(), CompileError> {
        let Some(mac) = self.macros.get(&token.text) else {
            return Ok(());
        };
        if mac.is_function_like {
            // Scan the balanced call arguments; a non-whitespace character
            // other than `(` after the name propagates as a scan error.
            let call = tokenizer.scan_chunk_between_pair(b'(', b')')?;
            if call.end {
                // Unterminated invocation at end of input: leave it alone.
                return Ok(());
            }
            let args = split_call_args(&call.value);
            let replace = self.macros.expand_invocation(mac, &args);
            self.segments.push(ReplaceSegment::new(token.start.index, tokenizer.index(), replace));
        } else {
            // Bodies are pre-expanded at definition time; re-expanding at
            // the use site picks up names that were defined afterwards.
            let replace = self.macros.expand_text(&mac.body);
            self.segments.push(ReplaceSegment::new(token.start.index, token.end.index, replace));
        }
        Ok(())
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(source: &str) -> String {
        Preprocessor::new().process(source).expect("preprocess")
    }

    #[test]
    fn test_no_directives_unchanged() {
        let source = "vec3 c = vec3(1.0);\nfloat x = 2.0;\n";
        assert_eq!(process(source), source);
    }

    #[test]
    fn test_object_macro() {
        let out = process("#define FOO 1+2\nx = FOO;\n");
        assert_eq!(out, "x = 1+2;\n");
    }

    #[test]
    fn test_define_line_deleted_even_when_unused() {
        let out = process("#define UNUSED 42\nfloat y;\n");
        assert_eq!(out, "float y;\n");
    }

    #[test]
    fn test_function_macro_whole_word() {
        let out = process("#define ADD(a,b) a+b\nv = ADD(1, abc);\n");
        assert_eq!(out, "v = 1+abc;\n");
    }

    #[test]
    fn test_function_macro_spans_name_through_paren() {
        let out = process("#define HALF(x) (x*0.5)\ny = HALF(w) + 1.0;\n");
        assert_eq!(out, "y = (w*0.5) + 1.0;\n");
    }

    #[test]
    fn test_recursive_definition() {
        let out = process("#define A 1\n#define B A+A\nr = B;\n");
        assert_eq!(out, "r = 1+1;\n");
    }

    #[test]
    fn test_forward_reference_resolved_at_use() {
        let out = process("#define B A+A\n#define A 1\nr = B;\n");
        assert_eq!(out, "r = 1+1;\n");
    }

    #[test]
    fn test_argument_expansion() {
        let out = process("#define ONE 1\n#define ADD(a,b) a+b\nr = ADD(ONE, 2);\n");
        assert_eq!(out, "r = 1+2;\n");
    }

    #[test]
    fn test_undef_removes_macro() {
        let out = process("#define FOO 1\n#undef FOO\nx = FOO;\n");
        assert_eq!(out, "x = FOO;\n");
    }

    #[test]
    fn test_conditional_lines_stripped_branches_kept() {
        let source = "#ifdef HAS_FOG\nfog();\n#else\nnoFog();\n#endif\n";
        assert_eq!(process(source), "fog();\nnoFog();\n");
    }

    #[test]
    fn test_define_inside_conditional_not_registered() {
        let source = "#ifdef X\n#define FOO 1\n#endif\nx = FOO;\n";
        assert_eq!(process(source), "x = FOO;\n");
    }

    #[test]
    fn test_nested_conditionals_match_outermost_endif() {
        let source = "#if A\n#if B\n#define FOO 1\n#endif\n#endif\nx = FOO;\n";
        assert_eq!(process(source), "x = FOO;\n");
    }

    #[test]
    fn test_expansion_continues_inside_conditional() {
        let source = "#define FOO 1\n#ifdef X\nx = FOO;\n#endif\n";
        assert_eq!(process(source), "x = 1;\n");
    }

    #[test]
    fn test_define_body_trailing_comment_excluded() {
        let out = process("#define FOO 7 // lucky\nx = FOO;\n");
        // The macro body stops before the comment; the comment itself
        // survives on the directive's line.
        assert!(out.contains("x = 7;"));
        assert!(!out.contains("#define"));
    }

    #[test]
    fn test_missing_macro_name_errors() {
        let err = Preprocessor::new().process("#define").unwrap_err();
        assert_eq!(err, CompileError::MissingMacroName);
    }

    #[test]
    fn test_reset_clears_table() {
        let mut pp = Preprocessor::new();
        pp.process("#define FOO 1\nx = FOO;\n").expect("first pass");
        pp.reset();
        let out = pp.process("x = FOO;\n").expect("second pass");
        assert_eq!(out, "x = FOO;\n");
    }

    #[test]
    fn test_without_reset_macros_leak() {
        let mut pp = Preprocessor::new();
        pp.process("#define FOO 1\n").expect("first pass");
        // Stale segments make reuse without reset undefined; the macro
        // table demonstrably still holds the old definition.
        assert!(pp.macros().is_defined("FOO"));
    }

    #[test]
    fn test_empty_body_macro() {
        let out = process("#define TAG\nTAG float x;\n");
        assert_eq!(out, " float x;\n");
    }

    #[test]
    fn test_multiple_uses_one_line() {
        let out = process("#define N 4\nv = N + N;\n");
        assert_eq!(out, "v = 4 + 4;\n");
    }
}
