pub mod macro_defs;
#[allow(clippy::module_inception)]
pub mod preprocessor;
pub mod utils;

pub use macro_defs::{MacroDef, MacroTable};
pub use preprocessor::Preprocessor;
