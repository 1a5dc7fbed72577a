pub mod linker;
pub mod prepare;
pub mod scanner;
pub mod sync;

pub use linker::{LinkKind, Linker};
pub use sync::{Bridge, Outcome, RunReport};
