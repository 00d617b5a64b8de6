//! Database abstraction traits
//!
//! This module defines the trait that treatment-delivery database
//! adapters implement. The pipeline never writes to these databases; it
//! only runs named, read-only query templates against them during
//! enumeration.

use crate::domain::record::DeliveryRow;
use crate::domain::Result;
use async_trait::async_trait;

/// One positional parameter of a query template.
///
/// Templates reference parameters as `$1`, `$2`, ... in the order given.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateParam {
    /// Text parameter
    Text(String),
    /// 64-bit integer parameter
    Int(i64),
}

impl From<&str> for TemplateParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for TemplateParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Read-only client for a treatment-delivery database.
///
/// Implementations resolve a template name to SQL, execute it with the
/// given parameters, and map the result set into [`DeliveryRow`]s. A
/// connection or query failure fails the whole enumeration; defects inside
/// individual rows are carried in the row's optional fields and surface
/// later, at synthesis, so one bad row cannot sink the run.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Test the database connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Executes a named query template and maps the rows.
    ///
    /// # Arguments
    ///
    /// * `template` - Name of a registered query template
    /// * `params` - Positional parameters the template references
    ///
    /// # Errors
    ///
    /// Returns an error when the template is unknown, the connection
    /// fails, or the query is rejected.
    async fn execute(&self, template: &str, params: &[TemplateParam])
        -> Result<Vec<DeliveryRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_param_conversions() {
        assert_eq!(
            TemplateParam::from("RTRECORD"),
            TemplateParam::Text("RTRECORD".to_string())
        );
        assert_eq!(TemplateParam::from(90_i64), TemplateParam::Int(90));
    }
}
