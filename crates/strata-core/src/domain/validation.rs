use crate::domain::{
    entities::{task::validate_task_name, task_registry::TaskRegistry},
    error::DomainError,
    task_graph::TaskGraph,
};

/// Centralized domain validation.
///
/// Checks that span more than one entity live here, not in the entities.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_task_name(name: &str) -> Result<(), DomainError> {
        validate_task_name(name)
    }

    /// A cleanup exclusion must be a well-formed glob.
    pub fn validate_glob(pattern: &str) -> Result<(), DomainError> {
        glob::Pattern::new(pattern)
            .map(|_| ())
            .map_err(|e| DomainError::InvalidGlob {
                pattern: pattern.into(),
                reason: e.msg.to_string(),
            })
    }

    /// Keys match names, every spawn target exists, and the graph is acyclic.
    pub fn validate_registry(registry: &TaskRegistry) -> Result<(), DomainError> {
        registry.validate()?;
        TaskGraph::build(registry).validate()
    }
}
