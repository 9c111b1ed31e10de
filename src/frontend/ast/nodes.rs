//! Node content types for the ShaderLab parse tree.
//!
//! Constructs are plain structs; alternatives ([`Expr`], [`Stmt`],
//! [`GlobalDecl`]) are tagged enums matched exhaustively by the emitter.
//! Top-level declarations are reference-counted so symbol-table entries
//! can point back at their declaring node.

use std::rc::Rc;

use super::AstNode;
use crate::frontend::sema::symbols::DataType;

/// Numeric literal, kept as written (`1`, `0.5`, `2.`).
#[derive(Debug, Clone)]
pub struct NumberLiteral {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct BoolLiteral {
    pub value: bool,
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub text: String,
}

/// A type as written in a declaration.
#[derive(Debug, Clone)]
pub struct TypeSpecifier {
    pub ty: DataType,
    pub lexeme: String,
}

impl TypeSpecifier {
    pub fn new(ty: DataType) -> Self {
        let lexeme = ty.lexeme().to_string();
        Self { ty, lexeme }
    }

    pub fn from_lexeme(lexeme: &str) -> Self {
        Self { ty: DataType::from_lexeme(lexeme), lexeme: lexeme.to_string() }
    }
}

/// `[expr]` or the unsized `[]`.
#[derive(Debug, Clone)]
pub struct ArraySpecifier {
    pub size: Option<Box<AstNode<Expr>>>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number(NumberLiteral),
    Bool(BoolLiteral),
    Ident(Identifier),
    /// `lhs op rhs`; the operator is kept as its lexeme, the emitter
    /// never interprets it.
    Binary { op: String, lhs: Box<AstNode<Expr>>, rhs: Box<AstNode<Expr>> },
    Call { callee: Identifier, args: Vec<AstNode<Expr>> },
    Paren(Box<AstNode<Expr>>),
    Index { base: Box<AstNode<Expr>>, index: Box<AstNode<Expr>> },
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub type_spec: AstNode<TypeSpecifier>,
    pub ident: AstNode<Identifier>,
    pub array_specifier: Option<Rc<AstNode<ArraySpecifier>>>,
    pub initializer: Option<AstNode<Expr>>,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub type_spec: AstNode<TypeSpecifier>,
    pub ident: AstNode<Identifier>,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub return_type: AstNode<TypeSpecifier>,
    pub name: AstNode<Identifier>,
    pub params: Vec<AstNode<ParamDecl>>,
    pub body: AstNode<Block>,
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub type_spec: AstNode<TypeSpecifier>,
    pub ident: AstNode<Identifier>,
    pub array_specifier: Option<Rc<AstNode<ArraySpecifier>>>,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: AstNode<Identifier>,
    pub fields: Vec<AstNode<StructField>>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Decl(AstNode<VariableDeclaration>),
    Expr(AstNode<Expr>),
    Return(Option<AstNode<Expr>>),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<AstNode<Stmt>>,
}

/// Top-level declarations, reference-counted for symbol back-links.
#[derive(Debug, Clone)]
pub enum GlobalDecl {
    Var(Rc<AstNode<VariableDeclaration>>),
    Fn(Rc<AstNode<FunctionDecl>>),
    Struct(Rc<AstNode<StructDecl>>),
}

/// One complete shader stage's worth of declarations.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub decls: Vec<GlobalDecl>,
}
