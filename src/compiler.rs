//! The compilation pipeline: preprocess, parse, transform, render.

use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::parser::{parse, ParsedConfig};
use crate::preprocess::{line_count, preprocess_inspected, Conditions, Pass, Placeholders};
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use crate::transform;
use log::{debug, info};
use std::path::Path;

/// Compiles configuration sources for one set of conditions and placeholders.
///
/// Holds no per-run state; every call builds its own tree and output sink.
pub struct Compiler {
    conditions: Conditions,
    placeholders: Placeholders,
    renderer: Box<dyn TemplateRenderer>,
}

impl Compiler {
    pub fn new(conditions: Conditions, placeholders: Placeholders) -> Self {
        Self { conditions, placeholders, renderer: Box::new(MiniJinjaRenderer::new()) }
    }

    /// Swaps the template engine used for the final render.
    pub fn with_renderer(mut self, renderer: Box<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Reads both sources and compiles them.
    pub fn compile<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        config_path: P,
        template_path: Q,
    ) -> Result<String> {
        let config_path = config_path.as_ref();
        let template_path = template_path.as_ref();

        if !config_path.exists() {
            return Err(Error::SourceNotFound { path: config_path.display_string() });
        }
        if !template_path.exists() {
            return Err(Error::TemplateNotFound { path: template_path.display_string() });
        }

        let config_text = std::fs::read_to_string(config_path)?;
        let template_text = std::fs::read_to_string(template_path)?;
        info!(
            "Compiling {} with {}",
            config_path.display(),
            template_path.display()
        );
        self.compile_named(
            &config_path.display_string(),
            &config_text,
            &template_path.display_string(),
            &template_text,
        )
    }

    /// Compiles in-memory sources.
    pub fn compile_str(&self, config_text: &str, template_text: &str) -> Result<String> {
        self.compile_named("<config>", config_text, "<template>", template_text)
    }

    fn compile_named(
        &self,
        config_name: &str,
        config_text: &str,
        template_name: &str,
        template_text: &str,
    ) -> Result<String> {
        let parsed = self.load_config(config_name, config_text)?;
        let template = self.preprocess(template_name, template_text)?;
        let rendered = self.renderer.render(&template, &parsed, &self.conditions)?;
        debug!("Rendered {} bytes", rendered.len());
        Ok(rendered)
    }

    /// Preprocesses, parses and transforms a configuration source.
    pub fn load_config(&self, source_name: &str, text: &str) -> Result<ParsedConfig> {
        let text = self.preprocess(source_name, text)?;
        let mut parsed = parse(&text)?;
        transform::apply_all(&mut parsed);
        Ok(parsed)
    }

    /// Runs the preprocessor passes, failing if the ifdef or placeholder pass
    /// changed the number of lines.
    pub fn preprocess(&self, source_name: &str, text: &str) -> Result<String> {
        let before = line_count(text);
        let text = preprocess_inspected(text, &self.conditions, &self.placeholders, |pass, out| {
            match pass {
                Pass::Ifdef | Pass::Placeholders => {
                    ensure_line_count(source_name, pass.as_str(), before, out)
                }
                Pass::Inline => Ok(()),
            }
        })?;
        debug!("Preprocessed {source_name} ({before} lines)");
        Ok(text)
    }
}

fn ensure_line_count(
    source_name: &str,
    stage: &'static str,
    before: usize,
    text: &str,
) -> Result<()> {
    let after = line_count(text);
    if after != before {
        return Err(Error::PreprocessorLineCountMismatch {
            source_name: source_name.to_string(),
            stage,
            before,
            after,
        });
    }
    Ok(())
}

/// Compiles `config_path` into the dialect rendered by `template_path`.
pub fn compile<P: AsRef<Path>, Q: AsRef<Path>>(
    config_path: P,
    conditions: &Conditions,
    placeholders: &Placeholders,
    template_path: Q,
) -> Result<String> {
    Compiler::new(conditions.clone(), placeholders.clone()).compile(config_path, template_path)
}
