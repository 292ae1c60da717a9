pub mod canonical;
pub mod context;
pub mod error;
pub mod resolver;
pub mod roots;
pub mod write_guard;

pub use canonical::{normalize_lexical, CanonicalPath, Normalized};
pub use context::{
    is_system_variable, VariableContext, BUNDLE_ROOT, CORE_ROOT, OUTPUT_ROOT, PROJECT_ROOT,
    SYSTEM_VARIABLES,
};
pub use error::{AccessError, AccessKind, PUBLIC_SECURITY_MESSAGE};
pub use resolver::resolve_path;
pub use roots::Roots;
pub use write_guard::{validate_write_path, WriteGuard};
