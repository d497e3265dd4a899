pub mod delete_service;
pub mod equivalence;
pub mod merge_service;
pub mod template_service;
pub mod validation_service;

pub use delete_service::*;
pub use equivalence::*;
pub use merge_service::*;
pub use template_service::*;
pub use validation_service::*;
