//! The dispatch record persisted as `tf-dispatch.xml` once Testing Farm
//! has accepted a request.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Root element of the dispatch record document.
const ROOT_ELEMENT: &str = "dispatch";

/// Durable evidence that a job was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    /// Request identifier returned by Testing Farm.
    #[serde(rename = "tfId")]
    pub tf_id: String,
}

impl DispatchRecord {
    pub fn new(tf_id: impl Into<String>) -> Self {
        Self {
            tf_id: tf_id.into(),
        }
    }

    /// Encode as `<dispatch><tfId>..</tfId></dispatch>`.
    pub fn to_xml(&self) -> Result<String, CoreError> {
        quick_xml::se::to_string_with_root(ROOT_ELEMENT, self).map_err(|e| CoreError::Markup {
            document: ROOT_ELEMENT,
            message: e.to_string(),
        })
    }

    pub fn from_xml(xml: &str) -> Result<Self, CoreError> {
        quick_xml::de::from_str(xml).map_err(|e| CoreError::Markup {
            document: ROOT_ELEMENT,
            message: e.to_string(),
        })
    }
}
