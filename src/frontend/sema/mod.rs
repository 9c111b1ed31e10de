pub mod symbols;

pub use symbols::{
    resolve_function, DataType, ShaderSymbol, SymbolDataType, SymbolDecl, SymbolInfo, SymbolKind,
    TargetSymbolTable,
};
