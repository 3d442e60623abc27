pub mod compiler;
pub mod constructor;
pub mod versions;

pub use compiler::{Compiler, SolcCompiler};
pub use constructor::encode_constructor_args;
