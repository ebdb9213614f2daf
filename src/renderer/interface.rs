use crate::error::Result;
use crate::parser::ParsedConfig;
use crate::preprocess::Conditions;

/// Trait for dialect template engines.
pub trait TemplateRenderer {
    /// Renders a dialect template against a parsed configuration.
    ///
    /// # Arguments
    /// * `template` - Preprocessed template source
    /// * `parsed` - Transformed value tree and its origin table
    /// * `conditions` - Conditions active for this run, exposed to the template
    ///
    /// # Returns
    /// * `Result<String>` - Rendered configuration text
    fn render(
        &self,
        template: &str,
        parsed: &ParsedConfig,
        conditions: &Conditions,
    ) -> Result<String>;
}
