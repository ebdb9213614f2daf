use crate::{
    cli::Args,
    compiler::Compiler,
    error::Result,
    ioutils::{load_placeholders_file, parse_placeholder_arg, write_output},
    preprocess::{Conditions, Placeholders},
};
use log::{debug, info};

/// Main CLI runner: gathers inputs, compiles, writes the result.
pub struct Runner {
    args: Args,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Executes the complete compilation workflow
    pub fn run(self) -> Result<()> {
        let conditions = self.conditions();
        let placeholders = self.collect_placeholders()?;
        debug!(
            "Conditions: {:?}; placeholders: {:?}",
            conditions,
            placeholders.keys().collect::<Vec<_>>()
        );

        let rendered =
            Compiler::new(conditions, placeholders).compile(&self.args.config, &self.args.template)?;

        write_output(&rendered, self.args.output.as_ref())?;
        info!("Compiled {}", self.args.config.display());
        Ok(())
    }

    fn conditions(&self) -> Conditions {
        self.args
            .conditions
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// File values first, then `--set` pairs on top.
    fn collect_placeholders(&self) -> Result<Placeholders> {
        let mut placeholders = match &self.args.placeholders_file {
            Some(path) => load_placeholders_file(path)?,
            None => Placeholders::new(),
        };
        for raw in &self.args.placeholders {
            let (key, value) = parse_placeholder_arg(raw)?;
            placeholders.insert(key, value);
        }
        Ok(placeholders)
    }
}

/// Entry point for CLI execution
pub fn run(args: Args) -> Result<()> {
    Runner::new(args).run()
}
