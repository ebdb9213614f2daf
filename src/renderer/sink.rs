use crate::origins::LineRef;
use crate::writer::{Emitter, Visit};
use minijinja::value::{from_args, Object, Value};
use minijinja::{Error, ErrorKind, State};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
enum SinkOp {
    Line(String),
    Raw(String),
}

#[derive(Debug, Default)]
struct SinkState {
    ops: Vec<SinkOp>,
    handled: bool,
}

/// The `out` argument handed to a writer macro.
///
/// Collects what the macro emits for one visit; the output is only replayed
/// into the run's [`Emitter`] once the macro returned successfully.
#[derive(Debug)]
pub struct MacroSink {
    key_path: String,
    line: LineRef,
    level: usize,
    state: Mutex<SinkState>,
}

impl MacroSink {
    pub fn new(visit: &Visit<'_>) -> Self {
        Self {
            key_path: visit.key_path.to_string(),
            line: visit.line,
            level: visit.level,
            state: Mutex::new(SinkState::default()),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SinkState) -> T) -> Result<T, Error> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::new(ErrorKind::InvalidOperation, "writer sink is poisoned"))?;
        Ok(f(&mut state))
    }

    /// Replays the collected output into `emitter` and reports the handled flag.
    pub fn flush_into(&self, emitter: &mut Emitter) -> Result<bool, Error> {
        let level = self.level;
        self.with_state(|state| {
            for op in state.ops.drain(..) {
                match op {
                    SinkOp::Line(text) => emitter.line(level, &text),
                    SinkOp::Raw(text) => emitter.write(&text),
                }
            }
            state.handled
        })
    }
}

impl Object for MacroSink {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match key.as_str()? {
            "path" => Some(Value::from(self.key_path.clone())),
            "line_no" => Some(match self.line.get() {
                Some(line) => Value::from(line),
                None => Value::from("unknown"),
            }),
            "level" => Some(Value::from(self.level)),
            _ => None,
        }
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "line" => {
                let (text,): (String,) = from_args(args)?;
                self.with_state(|state| state.ops.push(SinkOp::Line(text)))?;
            }
            "write" => {
                let (text,): (String,) = from_args(args)?;
                self.with_state(|state| state.ops.push(SinkOp::Raw(text)))?;
            }
            "handled" => {
                if !args.is_empty() {
                    return Err(Error::from(ErrorKind::TooManyArguments));
                }
                self.with_state(|state| state.handled = true)?;
            }
            other => {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("writer sink has no method '{other}'"),
                ))
            }
        }
        Ok(Value::from(""))
    }
}

/// The designated no-op writer, exposed to templates as `noop`.
#[derive(Debug)]
pub struct NoopWriter;

impl Object for NoopWriter {
    fn call(self: &Arc<Self>, _state: &State<'_, '_>, _args: &[Value]) -> Result<Value, Error> {
        Ok(Value::from(""))
    }
}
