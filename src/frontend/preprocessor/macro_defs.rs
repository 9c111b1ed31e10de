//! Macro definitions and expansion logic for the shader preprocessor.
//!
//! Supports:
//! - Object-like macros: `#define FOO value`
//! - Function-like macros: `#define LERP(a, b, t) (a + (b - a) * t)`
//!
//! Expansion operates on byte slices and is fully recursive: replacement
//! text and call-site arguments are re-expanded against the table, with a
//! currently-expanding set suppressing self-referential macros so the
//! process always terminates. Formal parameters are substituted on whole
//! identifier runs only, never inside longer identifiers or string
//! literals.

use rustc_hash::{FxHashMap, FxHashSet};

use super::utils::{is_ident_cont_byte, is_ident_start_byte, skip_literal_bytes};

/// Represents a macro definition.
#[derive(Debug, Clone)]
pub struct MacroDef {
    /// Name of the macro.
    pub name: String,
    /// Whether this is a function-like macro.
    pub is_function_like: bool,
    /// Formal parameter names for function-like macros.
    pub params: Vec<String>,
    /// The replacement body (as raw text).
    pub body: String,
}

impl MacroDef {
    /// An object-like macro binding `name` to replacement `body`.
    pub fn object(name: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            is_function_like: false,
            params: Vec::new(),
            body: body.to_string(),
        }
    }

    /// A function-like macro with formal parameters.
    pub fn function(name: &str, params: Vec<String>, body: &str) -> Self {
        Self { name: name.to_string(), is_function_like: true, params, body: body.to_string() }
    }
}

/// Stores all macro definitions for one preprocessing pass and handles
/// recursive text expansion.
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: FxHashMap<String, MacroDef>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self { macros: FxHashMap::default() }
    }

    /// Define a new macro, replacing any previous definition of the name.
    pub fn define(&mut self, def: MacroDef) {
        self.macros.insert(def.name.clone(), def);
    }

    /// Undefine a macro.
    pub fn undefine(&mut self, name: &str) {
        self.macros.remove(name);
    }

    /// Check if a macro is defined.
    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Get a macro definition.
    pub fn get(&self, name: &str) -> Option<&MacroDef> {
        self.macros.get(name)
    }

    /// Remove every definition. The table must be cleared between
    /// preprocessing passes over different sources.
    pub fn clear(&mut self) {
        self.macros.clear();
    }

    /// Recursively expand all known macros in `text`.
    ///
    /// This single routine serves both the definition-time self-expansion
    /// of object-like replacement text and the call-site expansion of
    /// macro arguments.
    pub fn expand_text(&self, text: &str) -> String {
        let mut expanding = FxHashSet::default();
        self.expand_inner(text, &mut expanding)
    }

    /// Expand a function-like macro invocation: arguments are recursively
    /// expanded, substituted whole-word for the formals, and the result is
    /// rescanned with the macro's own name suppressed.
    pub fn expand_invocation(&self, mac: &MacroDef, args: &[String]) -> String {
        let mut expanding = FxHashSet::default();
        self.expand_function_macro(mac, args, &mut expanding)
    }

    fn expand_function_macro(
        &self,
        mac: &MacroDef,
        args: &[String],
        expanding: &mut FxHashSet<String>,
    ) -> String {
        let expanded_args: Vec<String> =
            args.iter().map(|arg| self.expand_inner(arg, expanding)).collect();
        let body = substitute_params(&mac.body, &mac.params, &expanded_args);
        expanding.insert(mac.name.clone());
        let result = self.expand_inner(&body, expanding);
        expanding.remove(&mac.name);
        result
    }

    fn expand_inner(&self, text: &str, expanding: &mut FxHashSet<String>) -> String {
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut result = String::with_capacity(text.len());
        let mut i = 0;
        while i < len {
            let b = bytes[i];
            if b == b'"' || b == b'\'' {
                let end = skip_literal_bytes(bytes, i, b);
                result.push_str(&text[i..end]);
                i = end;
            } else if is_ident_start_byte(b) {
                let start = i;
                i += 1;
                while i < len && is_ident_cont_byte(bytes[i]) {
                    i += 1;
                }
                i = self.expand_identifier(text, start, i, &mut result, expanding);
            } else if b < 0x80 {
                result.push(b as char);
                i += 1;
            } else {
                let ch = text[i..].chars().next().unwrap_or('\u{fffd}');
                result.push(ch);
                i += ch.len_utf8();
            }
        }
        result
    }

    /// Expand one identifier occurrence; returns the new scan position.
    fn expand_identifier(
        &self,
        text: &str,
        start: usize,
        after: usize,
        result: &mut String,
        expanding: &mut FxHashSet<String>,
    ) -> usize {
        let ident = &text[start..after];
        if expanding.contains(ident) {
            // Self-referential: copied verbatim, never re-expanded.
            result.push_str(ident);
            return after;
        }
        let Some(mac) = self.macros.get(ident) else {
            result.push_str(ident);
            return after;
        };
        if mac.is_function_like {
            let bytes = text.as_bytes();
            let mut j = after;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j >= bytes.len() || bytes[j] != b'(' {
                // A function-like name without arguments stays as-is.
                result.push_str(ident);
                return after;
            }
            let (args, end_pos) = parse_call_args(bytes, j);
            let expanded = self.expand_function_macro(mac, &args, expanding);
            result.push_str(&expanded);
            end_pos
        } else {
            expanding.insert(ident.to_string());
            let expanded = self.expand_inner(&mac.body, expanding);
            expanding.remove(ident);
            result.push_str(&expanded);
            after
        }
    }
}

/// Parse function-like call arguments from `bytes`, starting at the
/// opening paren. Returns the top-level-comma-split arguments and the
/// position after the closing paren (end of input if unterminated).
pub(super) fn parse_call_args(bytes: &[u8], start: usize) -> (Vec<String>, usize) {
    let len = bytes.len();
    let mut depth = 0usize;
    let mut i = start;
    while i < len {
        match bytes[i] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
                if depth == 0 {
                    break;
                }
            }
            b'"' | b'\'' => {
                i = skip_literal_bytes(bytes, i, bytes[i]);
            }
            _ => {
                i += 1;
            }
        }
    }
    let inner_start = (start + 1).min(i);
    let inner_end = if depth == 0 { i.saturating_sub(1).max(inner_start) } else { i };
    let inner = std::str::from_utf8(&bytes[inner_start..inner_end]).unwrap_or("");
    (split_call_args(inner), i)
}

/// Split raw call-argument text on top-level commas, trimming each piece.
/// Commas nested in parentheses or literals do not split.
pub(super) fn split_call_args(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut args: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut arg_start = 0usize;
    let mut i = 0;
    while i < len {
        match bytes[i] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b',' if depth == 0 => {
                args.push(text[arg_start..i].trim().to_string());
                i += 1;
                arg_start = i;
            }
            b'"' | b'\'' => {
                i = skip_literal_bytes(bytes, i, bytes[i]);
            }
            _ => {
                i += 1;
            }
        }
    }
    let last = text[arg_start..].trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last.to_string());
    }
    args
}

/// Whole-word substitution of formal parameters with argument text.
/// Identifier runs are compared in full, so a formal named `a` never
/// touches the `a` inside `abc`; string literal contents are untouched.
pub(super) fn substitute_params(body: &str, params: &[String], args: &[String]) -> String {
    let bytes = body.as_bytes();
    let len = bytes.len();
    let mut result = String::with_capacity(body.len());
    let mut i = 0;
    while i < len {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            let end = skip_literal_bytes(bytes, i, b);
            result.push_str(&body[i..end]);
            i = end;
        } else if is_ident_start_byte(b) {
            let start = i;
            i += 1;
            while i < len && is_ident_cont_byte(bytes[i]) {
                i += 1;
            }
            let ident = &body[start..i];
            if let Some(idx) = params.iter().position(|p| p == ident) {
                result.push_str(args.get(idx).map(String::as_str).unwrap_or(""));
            } else {
                result.push_str(ident);
            }
        } else if b < 0x80 {
            result.push(b as char);
            i += 1;
        } else {
            let ch = body[i..].chars().next().unwrap_or('\u{fffd}');
            result.push(ch);
            i += ch.len_utf8();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_macro_expansion() {
        let mut table = MacroTable::new();
        table.define(MacroDef::object("FOO", "1+2"));
        assert_eq!(table.expand_text("x = FOO;"), "x = 1+2;");
    }

    #[test]
    fn test_whole_word_only() {
        let mut table = MacroTable::new();
        table.define(MacroDef::object("A", "9"));
        assert_eq!(table.expand_text("A + ABS + BA"), "9 + ABS + BA");
    }

    #[test]
    fn test_recursive_expansion() {
        let mut table = MacroTable::new();
        table.define(MacroDef::object("A", "1"));
        table.define(MacroDef::object("B", "A+A"));
        assert_eq!(table.expand_text("B"), "1+1");
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut table = MacroTable::new();
        table.define(MacroDef::object("X", "X"));
        assert_eq!(table.expand_text("X"), "X");
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let mut table = MacroTable::new();
        table.define(MacroDef::object("P", "Q"));
        table.define(MacroDef::object("Q", "P"));
        assert_eq!(table.expand_text("P"), "P");
    }

    #[test]
    fn test_string_literals_untouched() {
        let mut table = MacroTable::new();
        table.define(MacroDef::object("FOO", "1"));
        assert_eq!(table.expand_text("\"FOO\" FOO"), "\"FOO\" 1");
    }

    #[test]
    fn test_function_macro_substitution() {
        let mut table = MacroTable::new();
        table.define(MacroDef::function("ADD", vec!["a".into(), "b".into()], "a+b"));
        assert_eq!(table.expand_text("ADD(1, abc)"), "1+abc");
    }

    #[test]
    fn test_function_macro_nested_call_in_argument() {
        let mut table = MacroTable::new();
        table.define(MacroDef::function("ADD", vec!["a".into(), "b".into()], "a+b"));
        assert_eq!(table.expand_text("ADD(ADD(1,2),3)"), "1+2+3");
    }

    #[test]
    fn test_function_macro_body_rescan() {
        let mut table = MacroTable::new();
        table.define(MacroDef::object("SCALE", "2.0"));
        table.define(MacroDef::function("MUL", vec!["x".into()], "x * SCALE"));
        assert_eq!(table.expand_text("MUL(v)"), "v * 2.0");
    }

    #[test]
    fn test_function_name_without_parens_kept() {
        let mut table = MacroTable::new();
        table.define(MacroDef::function("F", vec!["x".into()], "x"));
        assert_eq!(table.expand_text("F + 1"), "F + 1");
    }

    #[test]
    fn test_split_call_args_nested() {
        assert_eq!(split_call_args("a,(b,c),d"), vec!["a", "(b,c)", "d"]);
        assert_eq!(split_call_args(""), Vec::<String>::new());
        assert_eq!(split_call_args(" x "), vec!["x"]);
    }

    #[test]
    fn test_parse_call_args() {
        let bytes = b"(1, max(2, 3)) rest";
        let (args, end) = parse_call_args(bytes, 0);
        assert_eq!(args, vec!["1", "max(2, 3)"]);
        assert_eq!(end, 14);
    }
}
