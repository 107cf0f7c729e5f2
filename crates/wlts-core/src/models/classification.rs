//! Classification strategies
//!
//! A strategy tells a collection how a raw observation value becomes a class
//! label: a literal fixed per observation descriptor, the raw value itself,
//! or a second lookup against a classification datasource.

use serde::{Deserialize, Serialize};

/// Classification system used to disambiguate external lookups
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassificationSystem {
    pub name: Option<String>,
    pub id: Option<String>,
    pub version: Option<String>,
}

impl ClassificationSystem {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.id.is_none() && self.version.is_none()
    }
}

/// Parameters of a lookup against a classification datasource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalClassification {
    /// Datasource answering the lookup
    pub datasource_id: String,
    /// Feature type holding the classes
    pub property_name: String,
    /// Field carrying the class label
    pub class_property_name: String,
    /// Field matched against the observation's identifier
    pub class_property_value: String,
    /// Workspace override for `property_name`
    pub workspace: Option<String>,
    pub system: ClassificationSystem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassificationStrategy {
    /// Label comes from the observation descriptor
    Literal { system: ClassificationSystem },
    /// Label is the raw queried value
    #[serde(rename = "Self")]
    SelfValue { system: ClassificationSystem },
    /// Raw value is an identifier resolved through a classification datasource
    External(ExternalClassification),
}

impl ClassificationStrategy {
    /// Type tag as written in catalog files
    pub fn type_tag(&self) -> &'static str {
        match self {
            ClassificationStrategy::Literal { .. } => "Literal",
            ClassificationStrategy::SelfValue { .. } => "Self",
            ClassificationStrategy::External(_) => "External",
        }
    }

    pub fn system(&self) -> &ClassificationSystem {
        match self {
            ClassificationStrategy::Literal { system }
            | ClassificationStrategy::SelfValue { system } => system,
            ClassificationStrategy::External(external) => &external.system,
        }
    }

    /// Datasource required by the strategy, if any
    pub fn datasource_id(&self) -> Option<&str> {
        match self {
            ClassificationStrategy::External(external) => Some(&external.datasource_id),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, ClassificationStrategy::Literal { .. })
    }
}
