use super::filters;
use super::sink::{MacroSink, NoopWriter};
use crate::constants::{hooks, TEMPLATE_NAME};
use crate::error::{Error, Result};
use crate::origins::NodeOrigins;
use crate::parser::ParsedConfig;
use crate::preprocess::Conditions;
use crate::renderer::interface::TemplateRenderer;
use crate::value::ConfigValue;
use crate::writer::{
    CloseFn, Emitter, FieldWriters, OpenFn, OpenWriter, Visit, Walker, WriterRegistry,
};
use indexmap::IndexSet;
use log::debug;
use minijinja::value::{Object, Value};
use minijinja::{context, Environment, ErrorKind, State};
use std::sync::{Arc, Mutex};

/// MiniJinja-based dialect renderer.
///
/// Writer hooks are macros named `<field>_open`, `<field>_open_item`,
/// `<field>_close_item` and `<field>_close`, each taking `(out, node)`.
/// They must be defined before the template calls `walk()`.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_global("noop", Value::from_object(NoopWriter));
        filters::register(&mut env);
        Self { env }
    }

    fn render_internal(
        &self,
        template: &str,
        parsed: &ParsedConfig,
        conditions: &Conditions,
    ) -> Result<String> {
        let mut env = self.env.clone();
        let failure = Arc::new(Mutex::new(None));
        env.add_global(
            "walk",
            Value::from_object(WalkEntry {
                tree: Arc::new(parsed.tree.clone()),
                origins: Arc::new(parsed.origins.clone()),
                failure: Arc::clone(&failure),
            }),
        );
        env.add_template_owned(TEMPLATE_NAME, template.to_string())?;

        let ctx = context! {
            config => Value::from_serialize(&parsed.tree),
            origins => Value::from_serialize(&parsed.origins),
            conditions => conditions.iter().cloned().collect::<Vec<_>>(),
        };

        let tmpl = env.get_template(TEMPLATE_NAME)?;
        match tmpl.render(ctx) {
            Ok(rendered) => Ok(rendered),
            Err(err) => {
                // A walker failure is reported as itself rather than as the
                // template error that carried it out of the render.
                let walk_failure = failure.lock().ok().and_then(|mut slot| slot.take());
                Err(walk_failure.unwrap_or(Error::MinijinjaError(err)))
            }
        }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(
        &self,
        template: &str,
        parsed: &ParsedConfig,
        conditions: &Conditions,
    ) -> Result<String> {
        self.render_internal(template, parsed, conditions)
    }
}

/// The `walk()` global: runs the tree walker with the template's macros.
#[derive(Debug)]
struct WalkEntry {
    tree: Arc<ConfigValue>,
    origins: Arc<NodeOrigins>,
    failure: Arc<Mutex<Option<Error>>>,
}

impl Object for WalkEntry {
    fn call(
        self: &Arc<Self>,
        state: &State<'_, '_>,
        args: &[Value],
    ) -> Result<Value, minijinja::Error> {
        if !args.is_empty() {
            return Err(minijinja::Error::from(ErrorKind::TooManyArguments));
        }
        let registry = macro_registry(state, &self.tree);
        debug!("Walking configuration with {} templated field writer(s)", registry.len());

        let mut emitter = Emitter::new();
        match Walker::new(&registry, &self.origins).walk(&mut emitter, &self.tree) {
            Ok(()) => Ok(Value::from(emitter.into_string())),
            Err(err) => {
                let message = err.to_string();
                if let Ok(mut slot) = self.failure.lock() {
                    slot.get_or_insert(err);
                }
                Err(minijinja::Error::new(ErrorKind::InvalidOperation, message))
            }
        }
    }
}

fn collect_field_names(value: &ConfigValue, names: &mut IndexSet<String>) {
    match value {
        ConfigValue::Mapping(map) => {
            for (key, child) in map {
                names.insert(key.clone());
                collect_field_names(child, names);
            }
        }
        ConfigValue::Sequence(items) => {
            for item in items {
                collect_field_names(item, names);
            }
        }
        ConfigValue::Scalar(_) => {}
    }
}

fn lookup_hook(state: &State<'_, '_>, field: &str, hook: &str) -> Option<Value> {
    state
        .lookup(&format!("{field}{hook}"))
        .filter(|value| !value.is_undefined() && !value.is_none())
}

fn is_noop(writer: &Value) -> bool {
    writer.downcast_object_ref::<NoopWriter>().is_some()
}

/// Builds a registry from the macros visible to `state`, for every field
/// name that occurs in `tree`.
fn macro_registry<'s>(state: &'s State<'_, '_>, tree: &ConfigValue) -> WriterRegistry<'s> {
    let mut names = IndexSet::new();
    collect_field_names(tree, &mut names);

    let mut registry = WriterRegistry::new();
    for name in &names {
        let writers = FieldWriters {
            open: lookup_hook(state, name, hooks::OPEN).map(|writer| {
                if is_noop(&writer) {
                    OpenWriter::Noop
                } else {
                    OpenWriter::Write(open_hook(state, writer))
                }
            }),
            open_item: lookup_hook(state, name, hooks::OPEN_ITEM)
                .map(|writer| open_hook(state, writer)),
            close_item: lookup_hook(state, name, hooks::CLOSE_ITEM)
                .map(|writer| close_hook(state, writer)),
            close: lookup_hook(state, name, hooks::CLOSE).map(|writer| close_hook(state, writer)),
        };
        registry.insert(name, writers);
    }
    registry
}

fn open_hook<'s>(state: &'s State<'_, '_>, writer: Value) -> OpenFn<'s> {
    Box::new(move |emitter: &mut Emitter, visit: &Visit<'_>| {
        call_writer(state, &writer, emitter, visit)
    })
}

fn close_hook<'s>(state: &'s State<'_, '_>, writer: Value) -> CloseFn<'s> {
    Box::new(move |emitter: &mut Emitter, visit: &Visit<'_>| {
        call_writer(state, &writer, emitter, visit).map(|_| ())
    })
}

/// Calls one writer macro with a fresh sink and replays what it emitted.
fn call_writer(
    state: &State<'_, '_>,
    writer: &Value,
    emitter: &mut Emitter,
    visit: &Visit<'_>,
) -> Result<bool> {
    if is_noop(writer) {
        return Ok(false);
    }
    let out = Value::from_object(MacroSink::new(visit));
    writer.call(state, &[out.clone(), Value::from_serialize(visit.value)])?;
    let sink = out
        .downcast_object_ref::<MacroSink>()
        .ok_or_else(|| anyhow::anyhow!("writer sink for '{}' went missing", visit.key_path))?;
    Ok(sink.flush_into(emitter)?)
}
