//! Domain symbols layered on the generic tables.
//!
//! A symbol ties an identifier to its kind (variable, function, struct),
//! its shader data type, and — for functions — a parameter-type signature
//! that makes name overloading work: two functions share a bucket and are
//! told apart by positional signature comparison, with `DataType::Any`
//! acting as a wildcard on either side.

use std::rc::Rc;

use crate::common::symbol_table::{Scope, SymbolEntry, SymbolTable, SymbolTableStack};
use crate::frontend::ast::nodes::{
    ArraySpecifier, FunctionDecl, ParamDecl, StructDecl, StructField, VariableDeclaration,
};
use crate::frontend::ast::AstNode;

/// What a symbol declares. `Any` is only meaningful on queries: it
/// matches every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Fn,
    Struct,
    Any,
}

/// The shader type vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// Wildcard that matches any concrete type during overload matching.
    Any,
    Void,
    Float,
    Int,
    UInt,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    BVec2,
    BVec3,
    BVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    SamplerCube,
    /// User-declared struct type, identified by name.
    Named(String),
}

impl DataType {
    pub fn is_any(&self) -> bool {
        matches!(self, DataType::Any)
    }

    /// The GLSL spelling of this type.
    pub fn lexeme(&self) -> &str {
        match self {
            DataType::Any => "any",
            DataType::Void => "void",
            DataType::Float => "float",
            DataType::Int => "int",
            DataType::UInt => "uint",
            DataType::Bool => "bool",
            DataType::Vec2 => "vec2",
            DataType::Vec3 => "vec3",
            DataType::Vec4 => "vec4",
            DataType::IVec2 => "ivec2",
            DataType::IVec3 => "ivec3",
            DataType::IVec4 => "ivec4",
            DataType::BVec2 => "bvec2",
            DataType::BVec3 => "bvec3",
            DataType::BVec4 => "bvec4",
            DataType::Mat2 => "mat2",
            DataType::Mat3 => "mat3",
            DataType::Mat4 => "mat4",
            DataType::Sampler2D => "sampler2D",
            DataType::SamplerCube => "samplerCube",
            DataType::Named(name) => name,
        }
    }

    /// Map a type lexeme to its `DataType`; unknown lexemes become
    /// `Named` (user struct types).
    pub fn from_lexeme(lexeme: &str) -> DataType {
        match lexeme {
            "void" => DataType::Void,
            "float" => DataType::Float,
            "int" => DataType::Int,
            "uint" => DataType::UInt,
            "bool" => DataType::Bool,
            "vec2" => DataType::Vec2,
            "vec3" => DataType::Vec3,
            "vec4" => DataType::Vec4,
            "ivec2" => DataType::IVec2,
            "ivec3" => DataType::IVec3,
            "ivec4" => DataType::IVec4,
            "bvec2" => DataType::BVec2,
            "bvec3" => DataType::BVec3,
            "bvec4" => DataType::BVec4,
            "mat2" => DataType::Mat2,
            "mat3" => DataType::Mat3,
            "mat4" => DataType::Mat4,
            "sampler2D" => DataType::Sampler2D,
            "samplerCube" => DataType::SamplerCube,
            other => DataType::Named(other.to_string()),
        }
    }
}

/// A declared type plus its source spelling and optional array shape.
#[derive(Debug, Clone)]
pub struct SymbolDataType {
    pub ty: DataType,
    pub lexeme: String,
    pub array_specifier: Option<Rc<AstNode<ArraySpecifier>>>,
}

impl SymbolDataType {
    pub fn new(ty: DataType) -> Self {
        let lexeme = ty.lexeme().to_string();
        Self { ty, lexeme, array_specifier: None }
    }

    pub fn with_array(ty: DataType, array_specifier: Rc<AstNode<ArraySpecifier>>) -> Self {
        let lexeme = ty.lexeme().to_string();
        Self { ty, lexeme, array_specifier: Some(array_specifier) }
    }
}

impl PartialEq for SymbolDataType {
    /// Equality is by type only; the array specifier expression does not
    /// participate in overload matching.
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

/// Identity and typing of one declaration.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub ident: String,
    pub kind: SymbolKind,
    /// Declared type: a variable's type, a function's return type.
    pub data_type: Option<SymbolDataType>,
    /// Parameter types, present on function symbols and call queries.
    pub signature: Option<Vec<DataType>>,
    /// Declared inside an unevaluated conditional region.
    pub in_macro_branch: bool,
}

impl SymbolInfo {
    pub fn new(ident: &str, kind: SymbolKind) -> Self {
        Self {
            ident: ident.to_string(),
            kind,
            data_type: None,
            signature: None,
            in_macro_branch: false,
        }
    }

    pub fn for_variable(decl: &VariableDeclaration) -> Self {
        let mut info = SymbolInfo::new(&decl.ident.content.text, SymbolKind::Var);
        info.data_type = Some(match &decl.array_specifier {
            Some(spec) => SymbolDataType::with_array(decl.type_spec.content.ty.clone(), spec.clone()),
            None => SymbolDataType::new(decl.type_spec.content.ty.clone()),
        });
        info
    }

    pub fn for_param(param: &ParamDecl) -> Self {
        let mut info = SymbolInfo::new(&param.ident.content.text, SymbolKind::Var);
        info.data_type = Some(SymbolDataType::new(param.type_spec.content.ty.clone()));
        info
    }

    pub fn for_field(field: &StructField) -> Self {
        let mut info = SymbolInfo::new(&field.ident.content.text, SymbolKind::Var);
        info.data_type = Some(match &field.array_specifier {
            Some(spec) => {
                SymbolDataType::with_array(field.type_spec.content.ty.clone(), spec.clone())
            }
            None => SymbolDataType::new(field.type_spec.content.ty.clone()),
        });
        info
    }

    pub fn for_function(decl: &FunctionDecl) -> Self {
        let mut info = SymbolInfo::new(&decl.name.content.text, SymbolKind::Fn);
        info.data_type = Some(SymbolDataType::new(decl.return_type.content.ty.clone()));
        info.signature =
            Some(decl.params.iter().map(|p| p.content.type_spec.content.ty.clone()).collect());
        info
    }

    pub fn for_struct(decl: &StructDecl) -> Self {
        let mut info = SymbolInfo::new(&decl.name.content.text, SymbolKind::Struct);
        info.data_type =
            Some(SymbolDataType::new(DataType::Named(decl.name.content.text.clone())));
        info
    }

    /// Whether this (stored) symbol satisfies `query`.
    ///
    /// An `Any`-kind query matches unconditionally. Function symbols
    /// compare signatures positionally: a wildcard on either side matches
    /// that position, differing lengths never match. For the other kinds
    /// a kind match alone suffices, which is what gives ordinary
    /// variables and structs their latest-declaration-wins behavior.
    pub fn matches(&self, query: &SymbolInfo) -> bool {
        if query.kind == SymbolKind::Any {
            return true;
        }
        if self.kind == SymbolKind::Fn {
            let (Some(own), Some(other)) = (&self.signature, &query.signature) else {
                return false;
            };
            if own.len() != other.len() {
                return false;
            }
            own.iter().zip(other.iter()).all(|(a, b)| a.is_any() || b.is_any() || a == b)
        } else {
            self.kind == query.kind
        }
    }
}

/// The declaration node a symbol originated from.
#[derive(Debug, Clone)]
pub enum SymbolDecl {
    Var(Rc<AstNode<VariableDeclaration>>),
    Fn(Rc<AstNode<FunctionDecl>>),
    Struct(Rc<AstNode<StructDecl>>),
}

/// A declaration record in the symbol tables: identity plus an optional
/// back-reference to the declaring AST node (queries carry none).
#[derive(Debug, Clone)]
pub struct ShaderSymbol {
    pub info: SymbolInfo,
    pub decl: Option<SymbolDecl>,
}

impl ShaderSymbol {
    /// A variable symbol bound to its declaration.
    pub fn var(decl: Rc<AstNode<VariableDeclaration>>) -> Self {
        let info = SymbolInfo::for_variable(&decl.content);
        Self { info, decl: Some(SymbolDecl::Var(decl)) }
    }

    /// A function symbol bound to its declaration; the data type derives
    /// from the declared return type, the signature from the parameters.
    pub fn function(decl: Rc<AstNode<FunctionDecl>>) -> Self {
        let info = SymbolInfo::for_function(&decl.content);
        Self { info, decl: Some(SymbolDecl::Fn(decl)) }
    }

    /// A struct symbol bound to its declaration.
    pub fn structure(decl: Rc<AstNode<StructDecl>>) -> Self {
        let info = SymbolInfo::for_struct(&decl.content);
        Self { info, decl: Some(SymbolDecl::Struct(decl)) }
    }

    /// A symbol carrying only identity, no declaration node.
    pub fn with_info(info: SymbolInfo) -> Self {
        Self { info, decl: None }
    }

    /// A lookup query by identifier and kind.
    pub fn query(ident: &str, kind: SymbolKind) -> Self {
        Self::with_info(SymbolInfo::new(ident, kind))
    }

    /// A call-resolution query carrying argument types.
    pub fn fn_query(ident: &str, signature: Vec<DataType>) -> Self {
        let mut info = SymbolInfo::new(ident, SymbolKind::Fn);
        info.signature = Some(signature);
        Self::with_info(info)
    }

    /// Tag the symbol as declared inside an unevaluated conditional
    /// region.
    pub fn in_macro_branch(mut self, flag: bool) -> Self {
        self.info.in_macro_branch = flag;
        self
    }
}

impl SymbolEntry for ShaderSymbol {
    fn ident(&self) -> &str {
        &self.info.ident
    }

    fn matches(&self, query: &Self) -> bool {
        self.info.matches(&query.info)
    }

    fn in_macro_branch(&self) -> bool {
        self.info.in_macro_branch
    }
}

/// The scope table the emitter and resolver work against.
#[derive(Debug, Default)]
pub struct TargetSymbolTable {
    table: SymbolTable<ShaderSymbol>,
}

impl TargetSymbolTable {
    pub fn new() -> Self {
        Self { table: SymbolTable::new() }
    }

    pub fn insert(&mut self, symbol: ShaderSymbol) {
        self.table.insert(symbol);
    }

    pub fn get_symbol(&self, query: &ShaderSymbol, include_macro: bool) -> Option<&ShaderSymbol> {
        self.table.get_symbol(query, include_macro)
    }

    pub fn get_symbols(&self, query: &ShaderSymbol, include_macro: bool) -> Vec<&ShaderSymbol> {
        self.table.get_symbols(query, include_macro)
    }

    /// The FN-kind entries of `name`'s bucket, newest-first: the candidate
    /// set call resolution consults before argument-type matching.
    pub fn get_all_fn_symbols(&self, name: &str) -> Vec<&ShaderSymbol> {
        self.table
            .bucket(name)
            .iter()
            .rev()
            .filter(|s| s.info.kind == SymbolKind::Fn)
            .collect()
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        self.table.take_warnings()
    }
}

impl Scope for TargetSymbolTable {
    type Entry = ShaderSymbol;

    fn insert(&mut self, entry: ShaderSymbol) {
        TargetSymbolTable::insert(self, entry);
    }

    fn lookup(&self, query: &ShaderSymbol) -> Option<&ShaderSymbol> {
        self.get_symbol(query, false)
    }
}

/// Resolve a call against the scope stack: enumerate each scope's
/// overload candidates innermost-first and return the first whose
/// signature accepts the argument types.
pub fn resolve_function<'a>(
    stack: &'a SymbolTableStack<TargetSymbolTable>,
    name: &str,
    arg_types: &[DataType],
) -> Option<&'a ShaderSymbol> {
    let query = ShaderSymbol::fn_query(name, arg_types.to_vec());
    stack
        .scopes()
        .flat_map(|scope| scope.get_all_fn_symbols(name))
        .find(|candidate| candidate.matches(&query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::nodes::{Block, Identifier, TypeSpecifier};
    use crate::frontend::ast::PositionRange;

    fn ident(text: &str) -> AstNode<Identifier> {
        AstNode::new(PositionRange::dummy(), Identifier { text: text.to_string() })
    }

    fn type_spec(ty: DataType) -> AstNode<TypeSpecifier> {
        AstNode::new(PositionRange::dummy(), TypeSpecifier::new(ty))
    }

    fn param(name: &str, ty: DataType) -> AstNode<ParamDecl> {
        AstNode::new(
            PositionRange::dummy(),
            ParamDecl { type_spec: type_spec(ty), ident: ident(name) },
        )
    }

    fn fn_decl(name: &str, ret: DataType, params: Vec<AstNode<ParamDecl>>) -> Rc<AstNode<FunctionDecl>> {
        Rc::new(AstNode::new(
            PositionRange::dummy(),
            FunctionDecl {
                return_type: type_spec(ret),
                name: ident(name),
                params,
                body: AstNode::new(PositionRange::dummy(), Block { stmts: Vec::new() }),
            },
        ))
    }

    #[test]
    fn test_fn_symbol_derives_type_and_signature() {
        let decl = fn_decl("lerp", DataType::Vec3, vec![
            param("a", DataType::Vec3),
            param("b", DataType::Vec3),
            param("t", DataType::Float),
        ]);
        let sym = ShaderSymbol::function(decl);
        assert_eq!(sym.info.kind, SymbolKind::Fn);
        assert_eq!(sym.info.data_type.as_ref().map(|d| d.ty.clone()), Some(DataType::Vec3));
        assert_eq!(
            sym.info.signature,
            Some(vec![DataType::Vec3, DataType::Vec3, DataType::Float])
        );
    }

    #[test]
    fn test_overload_bucket_grows_and_replaces() {
        let mut table = TargetSymbolTable::new();
        table.insert(ShaderSymbol::function(fn_decl("foo", DataType::Float, vec![param("x", DataType::Float)])));
        table.insert(ShaderSymbol::function(fn_decl("foo", DataType::Vec2, vec![param("x", DataType::Vec2)])));
        assert_eq!(table.get_all_fn_symbols("foo").len(), 2);

        // Same signature again: replacement, not append.
        table.insert(ShaderSymbol::function(fn_decl("foo", DataType::Float, vec![param("y", DataType::Float)])));
        assert_eq!(table.get_all_fn_symbols("foo").len(), 2);
        assert_eq!(table.take_warnings().len(), 1);
    }

    #[test]
    fn test_wildcard_matches_any_concrete_type() {
        let mut table = TargetSymbolTable::new();
        table.insert(ShaderSymbol::function(fn_decl("tex", DataType::Vec4, vec![
            param("s", DataType::Sampler2D),
            param("uv", DataType::Vec2),
        ])));
        let query = ShaderSymbol::fn_query("tex", vec![DataType::Any, DataType::Vec2]);
        assert!(table.get_symbol(&query, false).is_some());
        let mismatch = ShaderSymbol::fn_query("tex", vec![DataType::Any]);
        assert!(table.get_symbol(&mismatch, false).is_none());
    }

    #[test]
    fn test_any_kind_query_matches_everything() {
        let mut table = TargetSymbolTable::new();
        table.insert(ShaderSymbol::function(fn_decl("thing", DataType::Void, Vec::new())));
        assert!(table.get_symbol(&ShaderSymbol::query("thing", SymbolKind::Any), false).is_some());
    }

    #[test]
    fn test_var_latest_declaration_wins() {
        let mut table = TargetSymbolTable::new();
        let mut first = SymbolInfo::new("x", SymbolKind::Var);
        first.data_type = Some(SymbolDataType::new(DataType::Float));
        let mut second = SymbolInfo::new("x", SymbolKind::Var);
        second.data_type = Some(SymbolDataType::new(DataType::Vec3));
        table.insert(ShaderSymbol::with_info(first));
        table.insert(ShaderSymbol::with_info(second));
        let found = table.get_symbol(&ShaderSymbol::query("x", SymbolKind::Var), false);
        assert_eq!(
            found.and_then(|s| s.info.data_type.as_ref()).map(|d| d.ty.clone()),
            Some(DataType::Vec3)
        );
        assert_eq!(table.take_warnings().len(), 1);
    }

    #[test]
    fn test_macro_branch_symbol_hidden_until_opt_in() {
        let mut table = TargetSymbolTable::new();
        table.insert(
            ShaderSymbol::with_info(SymbolInfo::new("shadowed", SymbolKind::Var)).in_macro_branch(true),
        );
        let query = ShaderSymbol::query("shadowed", SymbolKind::Var);
        assert!(table.get_symbol(&query, false).is_none());
        assert!(table.get_symbol(&query, true).is_some());
    }

    #[test]
    fn test_resolve_function_prefers_inner_scope() {
        let mut stack: SymbolTableStack<TargetSymbolTable> = SymbolTableStack::new();
        stack.new_scope();
        stack.insert(ShaderSymbol::function(fn_decl("f", DataType::Float, vec![param("x", DataType::Float)])));
        stack.new_scope();
        stack.insert(ShaderSymbol::function(fn_decl("f", DataType::Int, vec![param("x", DataType::Float)])));

        let resolved = resolve_function(&stack, "f", &[DataType::Float]).expect("resolved");
        assert_eq!(resolved.info.data_type.as_ref().map(|d| d.ty.clone()), Some(DataType::Int));

        stack.drop_scope();
        let resolved = resolve_function(&stack, "f", &[DataType::Float]).expect("resolved");
        assert_eq!(resolved.info.data_type.as_ref().map(|d| d.ty.clone()), Some(DataType::Float));

        assert!(resolve_function(&stack, "f", &[DataType::Vec2]).is_none());
        assert!(resolve_function(&stack, "g", &[DataType::Float]).is_none());
    }

    #[test]
    fn test_from_lexeme_roundtrip() {
        assert_eq!(DataType::from_lexeme("vec3"), DataType::Vec3);
        assert_eq!(DataType::from_lexeme("Light"), DataType::Named("Light".to_string()));
        assert_eq!(DataType::from_lexeme("vec3").lexeme(), "vec3");
    }
}
