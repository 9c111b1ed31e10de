//! Generic scoped symbol tables with pluggable equality.
//!
//! A table maps each identifier to a *bucket* of candidate entries, so a
//! single name can carry several declarations at once (function overloads
//! being the motivating case). What counts as "the same declaration" is
//! decided by the entry type through [`SymbolEntry::matches`]; inserting a
//! duplicate replaces the existing entry in place and records a warning
//! rather than failing.
//!
//! Three layers:
//! - [`BaseSymbolTable`] — buckets plus replace-on-conflict insert.
//! - [`SymbolTable`] — additionally understands entries declared inside
//!   unevaluated conditional regions (`in_macro_branch`), hiding them from
//!   default lookups and conflict checks.
//! - [`SymbolTableStack`] — LIFO stack of scopes searched innermost-first.

use rustc_hash::FxHashMap;

/// Contract a symbol must satisfy to live in the generic tables.
pub trait SymbolEntry {
    /// The identifier this entry is bucketed under.
    fn ident(&self) -> &str;
    /// Whether this (stored) entry satisfies `query`. Equality is
    /// type-specific; for overloadable entries it compares signatures.
    fn matches(&self, query: &Self) -> bool;
    /// Whether the entry was declared inside an unevaluated conditional
    /// region and should be invisible to default lookups.
    fn in_macro_branch(&self) -> bool {
        false
    }
}

/// Multi-candidate-per-name table with replace-on-conflict inserts.
#[derive(Debug)]
pub struct BaseSymbolTable<T> {
    buckets: FxHashMap<String, Vec<T>>,
    warnings: Vec<String>,
}

impl<T: SymbolEntry> BaseSymbolTable<T> {
    pub fn new() -> Self {
        Self { buckets: FxHashMap::default(), warnings: Vec::new() }
    }

    /// Append `symbol` to its identifier's bucket. If an existing entry
    /// already matches it, that entry is replaced in place (recorded as a
    /// warning) instead of being duplicated.
    pub fn insert(&mut self, symbol: T) {
        let bucket = self.buckets.entry(symbol.ident().to_string()).or_default();
        if let Some(pos) = bucket.iter().position(|e| e.matches(&symbol)) {
            self.warnings.push(format!(
                "duplicate declaration of '{}' replaces an earlier one",
                symbol.ident()
            ));
            bucket[pos] = symbol;
        } else {
            bucket.push(symbol);
        }
    }

    /// First entry in the bucket matching `query`, oldest first.
    pub fn lookup(&self, query: &T) -> Option<&T> {
        self.buckets.get(query.ident())?.iter().find(|e| e.matches(query))
    }

    /// All entries sharing `ident`, in insertion order.
    pub fn bucket(&self, ident: &str) -> &[T] {
        self.buckets.get(ident).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn bucket_mut(&mut self, ident: &str) -> &mut Vec<T> {
        self.buckets.entry(ident.to_string()).or_default()
    }

    pub(crate) fn push_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Drain the advisory warnings accumulated by inserts.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

impl<T: SymbolEntry> Default for BaseSymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Macro-branch-aware table.
///
/// Entries flagged `in_macro_branch` model "declared inside a conditional
/// region whose condition was never evaluated": they stay in the bucket
/// but are skipped by conflict detection and by lookups unless the caller
/// opts in with `include_macro`.
#[derive(Debug)]
pub struct SymbolTable<T> {
    base: BaseSymbolTable<T>,
}

impl<T: SymbolEntry> SymbolTable<T> {
    pub fn new() -> Self {
        Self { base: BaseSymbolTable::new() }
    }

    /// Insert, replacing a matching *visible* entry in place. Entries in
    /// macro branches never participate in conflict detection here.
    pub fn insert(&mut self, symbol: T) {
        let ident = symbol.ident().to_string();
        let bucket = self.base.bucket_mut(&ident);
        if let Some(pos) = bucket.iter().position(|e| !e.in_macro_branch() && e.matches(&symbol)) {
            bucket[pos] = symbol;
            self.base
                .push_warning(format!("duplicate declaration of '{}' replaces an earlier one", ident));
        } else {
            bucket.push(symbol);
        }
    }

    /// First matching entry. With `include_macro` false (the default
    /// callers use), macro-branch entries are invisible.
    pub fn get_symbol(&self, query: &T, include_macro: bool) -> Option<&T> {
        self.base
            .bucket(query.ident())
            .iter()
            .find(|e| (include_macro || !e.in_macro_branch()) && e.matches(query))
    }

    /// All matching entries, newest-first — the overload-set enumeration.
    pub fn get_symbols(&self, query: &T, include_macro: bool) -> Vec<&T> {
        self.base
            .bucket(query.ident())
            .iter()
            .rev()
            .filter(|e| (include_macro || !e.in_macro_branch()) && e.matches(query))
            .collect()
    }

    /// All entries sharing `ident`, in insertion order.
    pub fn bucket(&self, ident: &str) -> &[T] {
        self.base.bucket(ident)
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        self.base.take_warnings()
    }
}

impl<T: SymbolEntry> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One lexical scope's worth of table, stackable.
pub trait Scope {
    type Entry;
    fn insert(&mut self, entry: Self::Entry);
    fn lookup(&self, query: &Self::Entry) -> Option<&Self::Entry>;
}

impl<T: SymbolEntry> Scope for SymbolTable<T> {
    type Entry = T;

    fn insert(&mut self, entry: T) {
        SymbolTable::insert(self, entry);
    }

    fn lookup(&self, query: &T) -> Option<&T> {
        self.get_symbol(query, false)
    }
}

/// Explicit LIFO stack of scopes.
///
/// Insertion always targets the innermost scope; lookup searches from the
/// innermost scope outward and stops at the first match, which is what
/// gives inner declarations shadowing power.
#[derive(Debug)]
pub struct SymbolTableStack<S> {
    stack: Vec<S>,
}

impl<S: Scope> SymbolTableStack<S> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push a fresh scope.
    pub fn new_scope(&mut self)
    where
        S: Default,
    {
        self.stack.push(S::default());
    }

    /// Push an externally built scope.
    pub fn push_scope(&mut self, scope: S) {
        self.stack.push(scope);
    }

    /// Pop the innermost scope; its entries become unreachable.
    pub fn drop_scope(&mut self) -> Option<S> {
        self.stack.pop()
    }

    pub fn top(&mut self) -> Option<&mut S> {
        self.stack.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Scopes from innermost to outermost.
    pub fn scopes(&self) -> impl Iterator<Item = &S> {
        self.stack.iter().rev()
    }

    pub fn insert(&mut self, entry: S::Entry) {
        if let Some(top) = self.stack.last_mut() {
            top.insert(entry);
        }
    }

    pub fn lookup(&self, query: &S::Entry) -> Option<&S::Entry> {
        self.stack.iter().rev().find_map(|scope| scope.lookup(query))
    }
}

impl<S: Scope> Default for SymbolTableStack<S> {
    fn default() -> Self {
        Self::new()
    }
}
