//! Well-known metadata concept identifiers
//!
//! Interned ids for the metadata concepts the editing core reasons about:
//! the taxonomy edge type, description types, language acceptability values,
//! inactivation indicator and historical-association reference sets. Each is
//! a `Lazy<ComponentId>` so repeated lookups share one allocation.

use crate::types::ComponentId;
use once_cell::sync::Lazy;

macro_rules! metadata_concept {
    ($(#[$doc:meta])* $name:ident = $id:literal) => {
        $(#[$doc])*
        pub static $name: Lazy<ComponentId> = Lazy::new(|| ComponentId::from($id));
    };
}

metadata_concept!(
    /// The root of the taxonomy.
    ROOT_CONCEPT = "138875005"
);
metadata_concept!(
    /// Relationship type whose active edges form the taxonomy.
    IS_A = "116680003"
);
metadata_concept!(
    /// Default module for newly created components.
    CORE_MODULE = "900000000000207008"
);

// Description types
metadata_concept!(
    /// Fully specified name description type.
    FULLY_SPECIFIED_NAME = "900000000000003001"
);
metadata_concept!(
    /// Synonym description type.
    SYNONYM = "900000000000013009"
);

// Definition statuses
metadata_concept!(
    /// Primitive concept definition status.
    PRIMITIVE = "900000000000074008"
);
metadata_concept!(
    /// Fully defined concept definition status.
    FULLY_DEFINED = "900000000000073002"
);

// Case significance
metadata_concept!(
    /// Entire term case sensitive.
    ENTIRE_TERM_CASE_SENSITIVE = "900000000000017005"
);
metadata_concept!(
    /// Entire term case insensitive.
    CASE_INSENSITIVE = "900000000000448009"
);

// Relationship characteristic types and modifier
metadata_concept!(
    /// Stated relationship characteristic type.
    STATED_RELATIONSHIP = "900000000000010007"
);
metadata_concept!(
    /// Inferred relationship characteristic type.
    INFERRED_RELATIONSHIP = "900000000000011006"
);
metadata_concept!(
    /// Existential restriction modifier.
    EXISTENTIAL_MODIFIER = "900000000000451002"
);

// Language acceptability
metadata_concept!(
    /// Preferred acceptability in a language reference set.
    PREFERRED = "900000000000548007"
);
metadata_concept!(
    /// Acceptable acceptability in a language reference set.
    ACCEPTABLE = "900000000000549004"
);
metadata_concept!(
    /// United States English language reference set.
    US_ENGLISH_LANGUAGE_REFSET = "900000000000509007"
);
metadata_concept!(
    /// Great Britain English language reference set.
    GB_ENGLISH_LANGUAGE_REFSET = "900000000000508004"
);

// Inactivation indicator reference sets and values
metadata_concept!(
    /// Concept inactivation indicator attribute-value reference set.
    CONCEPT_INACTIVATION_INDICATOR_REFSET = "900000000000489007"
);
metadata_concept!(
    /// Description inactivation indicator attribute-value reference set.
    DESCRIPTION_INACTIVATION_INDICATOR_REFSET = "900000000000490003"
);
metadata_concept!(
    /// "Concept non-current" description inactivation value.
    CONCEPT_NON_CURRENT = "900000000000495008"
);
metadata_concept!(
    /// Duplicate component inactivation value.
    DUPLICATE_COMPONENT = "900000000000482003"
);
metadata_concept!(
    /// Outdated component inactivation value.
    OUTDATED_COMPONENT = "900000000000483008"
);
metadata_concept!(
    /// Ambiguous component inactivation value.
    AMBIGUOUS_COMPONENT = "900000000000484002"
);
metadata_concept!(
    /// Erroneous component inactivation value.
    ERRONEOUS_COMPONENT = "900000000000485001"
);
metadata_concept!(
    /// Limited component inactivation value.
    LIMITED_COMPONENT = "900000000000486000"
);
metadata_concept!(
    /// Component moved elsewhere inactivation value.
    MOVED_ELSEWHERE = "900000000000487009"
);
metadata_concept!(
    /// Pending move inactivation value.
    PENDING_MOVE_VALUE = "900000000000492006"
);

// Historical association reference sets
metadata_concept!(
    /// SAME AS historical association reference set.
    SAME_AS_ASSOCIATION_REFSET = "900000000000527005"
);
metadata_concept!(
    /// REPLACED BY historical association reference set.
    REPLACED_BY_ASSOCIATION_REFSET = "900000000000526001"
);
metadata_concept!(
    /// POSSIBLY EQUIVALENT TO historical association reference set.
    POSSIBLY_EQUIVALENT_TO_ASSOCIATION_REFSET = "900000000000523009"
);
metadata_concept!(
    /// WAS A historical association reference set.
    WAS_A_ASSOCIATION_REFSET = "900000000000528000"
);
metadata_concept!(
    /// MOVED TO historical association reference set.
    MOVED_TO_ASSOCIATION_REFSET = "900000000000524003"
);
