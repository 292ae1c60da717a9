pub mod discovery;
pub mod sanitize;
pub mod validator;

pub use discovery::{
    discover_definitions, AgentDefinition, DiscoveryError, DiscoveryReport, RejectedDefinition,
};
pub use sanitize::sanitize;
pub use validator::{
    validate_definition_file, validate_definition_file_with, DefinitionRules, ValidationResult,
    AGENT_TAG, OPTIONAL_ATTRIBUTES, REQUIRED_ATTRIBUTES,
};
