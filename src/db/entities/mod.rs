pub mod application;
pub mod graph;
pub mod host;
pub mod item;
pub mod refs;
pub mod trigger;

pub use application::*;
pub use graph::*;
pub use host::*;
pub use item::*;
pub use refs::*;
pub use trigger::*;
