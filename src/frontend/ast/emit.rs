//! Serialization of parse-tree nodes to target shader source text, plus
//! debug JSON dumps.
//!
//! Emission is the code-generation backend: each construct renders itself
//! and its children into GLSL-flavored text. The walk threads an
//! [`EmitContext`] carrying the active scope stack and target flags;
//! declaration owners register symbols as they pass, function bodies and
//! blocks push and pop scopes, so lexical visibility during emission
//! mirrors the source.

use serde_json::{json, Value};

use super::nodes::*;
use crate::common::symbol_table::SymbolTableStack;
use crate::frontend::sema::symbols::{ShaderSymbol, SymbolInfo, TargetSymbolTable};

/// Target GLSL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlslVersion {
    Es100,
    Es300,
}

/// The runtime surface this subsystem sees while emitting: the active
/// symbol-table stack plus target-emission flags.
pub struct EmitContext {
    pub symbols: SymbolTableStack<TargetSymbolTable>,
    pub version: GlslVersion,
    indent: usize,
}

impl EmitContext {
    /// A fresh context with the global scope already pushed.
    pub fn new(version: GlslVersion) -> Self {
        let mut symbols = SymbolTableStack::new();
        symbols.new_scope();
        Self { symbols, version, indent: 0 }
    }

    fn pad(&self) -> String {
        "    ".repeat(self.indent)
    }
}

/// Options bag threaded through `serialize`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitOptions {
    /// Emitting a global-scope declaration (chooses the global emission
    /// form for variable declarations).
    pub global: bool,
}

/// The serialization contract every node content type implements.
pub trait EmitSource {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String;
}

/// Debug structural dump, independent of the serialization path.
pub trait NodeDump {
    fn class_name(&self) -> &'static str;
    fn dump(&self, include_pos: bool, with_class: bool) -> Value;
}

impl EmitSource for NumberLiteral {
    fn emit(&self, _ctx: &mut EmitContext, _opts: &EmitOptions) -> String {
        self.text.clone()
    }
}

impl EmitSource for BoolLiteral {
    fn emit(&self, _ctx: &mut EmitContext, _opts: &EmitOptions) -> String {
        if self.value { "true".to_string() } else { "false".to_string() }
    }
}

impl EmitSource for Identifier {
    fn emit(&self, _ctx: &mut EmitContext, _opts: &EmitOptions) -> String {
        self.text.clone()
    }
}

impl EmitSource for TypeSpecifier {
    fn emit(&self, _ctx: &mut EmitContext, _opts: &EmitOptions) -> String {
        self.lexeme.clone()
    }
}

impl EmitSource for ArraySpecifier {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        match &self.size {
            Some(size) => format!("[{}]", size.serialize(ctx, opts)),
            None => "[]".to_string(),
        }
    }
}

impl EmitSource for Expr {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        match self {
            Expr::Number(n) => n.emit(ctx, opts),
            Expr::Bool(b) => b.emit(ctx, opts),
            Expr::Ident(id) => id.emit(ctx, opts),
            Expr::Binary { op, lhs, rhs } => {
                format!("{} {} {}", lhs.serialize(ctx, opts), op, rhs.serialize(ctx, opts))
            }
            Expr::Call { callee, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.serialize(ctx, opts)).collect();
                format!("{}({})", callee.text, rendered.join(", "))
            }
            Expr::Paren(inner) => format!("({})", inner.serialize(ctx, opts)),
            Expr::Index { base, index } => {
                format!("{}[{}]", base.serialize(ctx, opts), index.serialize(ctx, opts))
            }
        }
    }
}

impl EmitSource for VariableDeclaration {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        let mut out = String::new();
        // Global uninitialized declarations surface as uniforms in the
        // emitted program; initialized globals and locals stay plain.
        if opts.global && self.initializer.is_none() {
            out.push_str("uniform ");
        }
        out.push_str(&self.type_spec.serialize(ctx, opts));
        out.push(' ');
        out.push_str(&self.ident.serialize(ctx, opts));
        if let Some(spec) = &self.array_specifier {
            out.push_str(&spec.serialize(ctx, opts));
        }
        if let Some(init) = &self.initializer {
            out.push_str(" = ");
            out.push_str(&init.serialize(ctx, opts));
        }
        out.push(';');
        out
    }
}

impl EmitSource for ParamDecl {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        format!("{} {}", self.type_spec.serialize(ctx, opts), self.ident.serialize(ctx, opts))
    }
}

impl EmitSource for FunctionDecl {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        let ret = self.return_type.serialize(ctx, opts);
        let name = self.name.serialize(ctx, opts);

        // Parameters live in a scope that spans the body and dies with it.
        ctx.symbols.new_scope();
        for param in &self.params {
            ctx.symbols.insert(ShaderSymbol::with_info(SymbolInfo::for_param(&param.content)));
        }
        let rendered: Vec<String> = self.params.iter().map(|p| p.serialize(ctx, opts)).collect();
        let body = self.body.serialize(ctx, &EmitOptions::default());
        ctx.symbols.drop_scope();

        format!("{} {}({}) {}", ret, name, rendered.join(", "), body)
    }
}

impl EmitSource for StructField {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        let mut out = format!(
            "{} {}",
            self.type_spec.serialize(ctx, opts),
            self.ident.serialize(ctx, opts)
        );
        if let Some(spec) = &self.array_specifier {
            out.push_str(&spec.serialize(ctx, opts));
        }
        out.push(';');
        out
    }
}

impl EmitSource for StructDecl {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        let mut out = format!("struct {} {{\n", self.name.serialize(ctx, opts));
        // Field names live in the struct body's own scope.
        ctx.symbols.new_scope();
        for field in &self.fields {
            ctx.symbols.insert(ShaderSymbol::with_info(SymbolInfo::for_field(&field.content)));
            out.push_str("    ");
            out.push_str(&field.serialize(ctx, opts));
            out.push('\n');
        }
        ctx.symbols.drop_scope();
        out.push_str("};");
        out
    }
}

impl EmitSource for Stmt {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        match self {
            Stmt::Decl(decl) => {
                ctx.symbols
                    .insert(ShaderSymbol::with_info(SymbolInfo::for_variable(&decl.content)));
                decl.serialize(ctx, &EmitOptions::default())
            }
            Stmt::Expr(expr) => format!("{};", expr.serialize(ctx, opts)),
            Stmt::Return(Some(expr)) => format!("return {};", expr.serialize(ctx, opts)),
            Stmt::Return(None) => "return;".to_string(),
            Stmt::Block(block) => block.emit(ctx, opts),
        }
    }
}

impl EmitSource for Block {
    fn emit(&self, ctx: &mut EmitContext, opts: &EmitOptions) -> String {
        ctx.symbols.new_scope();
        ctx.indent += 1;
        let pad = ctx.pad();
        let mut out = String::from("{\n");
        for stmt in &self.stmts {
            out.push_str(&pad);
            let text = stmt.serialize(ctx, opts);
            out.push_str(&text);
            out.push('\n');
        }
        ctx.indent -= 1;
        out.push_str(&ctx.pad());
        out.push('}');
        ctx.symbols.drop_scope();
        out
    }
}

impl EmitSource for ShaderProgram {
    fn emit(&self, ctx: &mut EmitContext, _opts: &EmitOptions) -> String {
        let mut out = String::new();
        if ctx.version == GlslVersion::Es300 {
            out.push_str("#version 300 es\n");
        }
        let global = EmitOptions { global: true };
        for decl in &self.decls {
            let text = match decl {
                GlobalDecl::Var(var) => {
                    ctx.symbols.insert(ShaderSymbol::var(var.clone()));
                    var.serialize(ctx, &global)
                }
                GlobalDecl::Fn(fun) => {
                    ctx.symbols.insert(ShaderSymbol::function(fun.clone()));
                    fun.serialize(ctx, &global)
                }
                GlobalDecl::Struct(st) => {
                    ctx.symbols.insert(ShaderSymbol::structure(st.clone()));
                    st.serialize(ctx, &global)
                }
            };
            out.push_str(&text);
            out.push('\n');
        }
        out
    }
}

impl NodeDump for NumberLiteral {
    fn class_name(&self) -> &'static str {
        "NumberLiteral"
    }

    fn dump(&self, _include_pos: bool, _with_class: bool) -> Value {
        json!({ "text": self.text })
    }
}

impl NodeDump for BoolLiteral {
    fn class_name(&self) -> &'static str {
        "BoolLiteral"
    }

    fn dump(&self, _include_pos: bool, _with_class: bool) -> Value {
        json!({ "value": self.value })
    }
}

impl NodeDump for Identifier {
    fn class_name(&self) -> &'static str {
        "Identifier"
    }

    fn dump(&self, _include_pos: bool, _with_class: bool) -> Value {
        json!({ "text": self.text })
    }
}

impl NodeDump for TypeSpecifier {
    fn class_name(&self) -> &'static str {
        "TypeSpecifier"
    }

    fn dump(&self, _include_pos: bool, _with_class: bool) -> Value {
        json!({ "lexeme": self.lexeme })
    }
}

impl NodeDump for ArraySpecifier {
    fn class_name(&self) -> &'static str {
        "ArraySpecifier"
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        json!({
            "size": self.size.as_ref().map(|s| s.to_json(include_pos, with_class)),
        })
    }
}

impl NodeDump for Expr {
    fn class_name(&self) -> &'static str {
        match self {
            Expr::Number(_) => "NumberLiteral",
            Expr::Bool(_) => "BoolLiteral",
            Expr::Ident(_) => "Identifier",
            Expr::Binary { .. } => "BinaryExpr",
            Expr::Call { .. } => "CallExpr",
            Expr::Paren(_) => "ParenExpr",
            Expr::Index { .. } => "IndexExpr",
        }
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        match self {
            Expr::Number(n) => n.dump(include_pos, with_class),
            Expr::Bool(b) => b.dump(include_pos, with_class),
            Expr::Ident(id) => id.dump(include_pos, with_class),
            Expr::Binary { op, lhs, rhs } => json!({
                "op": op,
                "lhs": lhs.to_json(include_pos, with_class),
                "rhs": rhs.to_json(include_pos, with_class),
            }),
            Expr::Call { callee, args } => json!({
                "callee": callee.text,
                "args": args.iter().map(|a| a.to_json(include_pos, with_class)).collect::<Vec<_>>(),
            }),
            Expr::Paren(inner) => json!({ "inner": inner.to_json(include_pos, with_class) }),
            Expr::Index { base, index } => json!({
                "base": base.to_json(include_pos, with_class),
                "index": index.to_json(include_pos, with_class),
            }),
        }
    }
}

impl NodeDump for VariableDeclaration {
    fn class_name(&self) -> &'static str {
        "VariableDeclaration"
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        json!({
            "type": self.type_spec.content.lexeme,
            "ident": self.ident.content.text,
            "array": self.array_specifier.as_ref().map(|s| s.to_json(include_pos, with_class)),
            "initializer": self.initializer.as_ref().map(|i| i.to_json(include_pos, with_class)),
        })
    }
}

impl NodeDump for ParamDecl {
    fn class_name(&self) -> &'static str {
        "ParamDecl"
    }

    fn dump(&self, _include_pos: bool, _with_class: bool) -> Value {
        json!({
            "type": self.type_spec.content.lexeme,
            "ident": self.ident.content.text,
        })
    }
}

impl NodeDump for FunctionDecl {
    fn class_name(&self) -> &'static str {
        "FunctionDecl"
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        json!({
            "returnType": self.return_type.content.lexeme,
            "name": self.name.content.text,
            "params": self.params.iter().map(|p| p.to_json(include_pos, with_class)).collect::<Vec<_>>(),
            "body": self.body.to_json(include_pos, with_class),
        })
    }
}

impl NodeDump for StructField {
    fn class_name(&self) -> &'static str {
        "StructField"
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        json!({
            "type": self.type_spec.content.lexeme,
            "ident": self.ident.content.text,
            "array": self.array_specifier.as_ref().map(|s| s.to_json(include_pos, with_class)),
        })
    }
}

impl NodeDump for StructDecl {
    fn class_name(&self) -> &'static str {
        "StructDecl"
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        json!({
            "name": self.name.content.text,
            "fields": self.fields.iter().map(|f| f.to_json(include_pos, with_class)).collect::<Vec<_>>(),
        })
    }
}

impl NodeDump for Stmt {
    fn class_name(&self) -> &'static str {
        match self {
            Stmt::Decl(_) => "DeclStmt",
            Stmt::Expr(_) => "ExprStmt",
            Stmt::Return(_) => "ReturnStmt",
            Stmt::Block(_) => "BlockStmt",
        }
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        match self {
            Stmt::Decl(decl) => json!({ "decl": decl.to_json(include_pos, with_class) }),
            Stmt::Expr(expr) => json!({ "expr": expr.to_json(include_pos, with_class) }),
            Stmt::Return(expr) => json!({
                "value": expr.as_ref().map(|e| e.to_json(include_pos, with_class)),
            }),
            Stmt::Block(block) => block.dump(include_pos, with_class),
        }
    }
}

impl NodeDump for Block {
    fn class_name(&self) -> &'static str {
        "Block"
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        json!({
            "stmts": self.stmts.iter().map(|s| s.to_json(include_pos, with_class)).collect::<Vec<_>>(),
        })
    }
}

impl NodeDump for ShaderProgram {
    fn class_name(&self) -> &'static str {
        "ShaderProgram"
    }

    fn dump(&self, include_pos: bool, with_class: bool) -> Value {
        let decls: Vec<Value> = self
            .decls
            .iter()
            .map(|d| match d {
                GlobalDecl::Var(v) => v.to_json(include_pos, with_class),
                GlobalDecl::Fn(f) => f.to_json(include_pos, with_class),
                GlobalDecl::Struct(s) => s.to_json(include_pos, with_class),
            })
            .collect();
        json!({ "decls": decls })
    }
}
