//! Editing context configuration

use termgraph_core::constants;
use termgraph_core::types::{ComponentId, IdNamespace};

/// Tunables for an editing context.
#[derive(Debug, Clone)]
pub struct EditingConfig {
    /// Upper bound on identifier regeneration attempts before the
    /// uniqueness validator gives up with `IdentifierSpaceExhausted`.
    pub max_id_retries: usize,
    /// Module assigned to components created through this context.
    pub default_module_id: ComponentId,
    /// Namespace identifiers are generated in.
    pub default_namespace: IdNamespace,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            max_id_retries: 1000,
            default_module_id: constants::CORE_MODULE.clone(),
            default_namespace: IdNamespace::INTERNATIONAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditingConfig::default();
        assert_eq!(config.max_id_retries, 1000);
        assert_eq!(config.default_module_id, *constants::CORE_MODULE);
        assert_eq!(config.default_namespace, IdNamespace::INTERNATIONAL);
    }
}
