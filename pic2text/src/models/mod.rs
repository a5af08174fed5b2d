mod item;
mod language;
mod preview;

pub use item::*;
pub use language::*;
pub use preview::*;
