use super::emitter::{Emitter, Visit};
use crate::error::Result;
use indexmap::IndexMap;

/// Open hooks report whether they handled the whole subtree.
pub type OpenFn<'a> = Box<dyn Fn(&mut Emitter, &Visit<'_>) -> Result<bool> + 'a>;
pub type CloseFn<'a> = Box<dyn Fn(&mut Emitter, &Visit<'_>) -> Result<()> + 'a>;

/// What a field does when the walker enters it.
pub enum OpenWriter<'a> {
    /// Registered but emits nothing and does not indent its children.
    Noop,
    Write(OpenFn<'a>),
}

/// The four optional hooks a dialect may register for one field.
#[derive(Default)]
pub struct FieldWriters<'a> {
    pub open: Option<OpenWriter<'a>>,
    pub open_item: Option<OpenFn<'a>>,
    pub close_item: Option<CloseFn<'a>>,
    pub close: Option<CloseFn<'a>>,
}

impl FieldWriters<'_> {
    pub fn is_empty(&self) -> bool {
        self.open.is_none()
            && self.open_item.is_none()
            && self.close_item.is_none()
            && self.close.is_none()
    }
}

/// Per-dialect writers keyed by field name.
#[derive(Default)]
pub struct WriterRegistry<'a> {
    fields: IndexMap<String, FieldWriters<'a>>,
}

impl<'a> WriterRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or continues) registering hooks for `name`.
    pub fn field(&mut self, name: &str) -> FieldBuilder<'_, 'a> {
        FieldBuilder { writers: self.fields.entry(name.to_string()).or_default() }
    }

    /// Registers a complete bundle, ignoring bundles without any hook.
    pub fn insert(&mut self, name: &str, writers: FieldWriters<'a>) {
        if !writers.is_empty() {
            self.fields.insert(name.to_string(), writers);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldWriters<'a>> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub struct FieldBuilder<'r, 'a> {
    writers: &'r mut FieldWriters<'a>,
}

impl<'a> FieldBuilder<'_, 'a> {
    pub fn open<F>(self, f: F) -> Self
    where
        F: Fn(&mut Emitter, &Visit<'_>) -> Result<bool> + 'a,
    {
        self.writers.open = Some(OpenWriter::Write(Box::new(f)));
        self
    }

    pub fn noop_open(self) -> Self {
        self.writers.open = Some(OpenWriter::Noop);
        self
    }

    pub fn open_item<F>(self, f: F) -> Self
    where
        F: Fn(&mut Emitter, &Visit<'_>) -> Result<bool> + 'a,
    {
        self.writers.open_item = Some(Box::new(f));
        self
    }

    pub fn close_item<F>(self, f: F) -> Self
    where
        F: Fn(&mut Emitter, &Visit<'_>) -> Result<()> + 'a,
    {
        self.writers.close_item = Some(Box::new(f));
        self
    }

    pub fn close<F>(self, f: F) -> Self
    where
        F: Fn(&mut Emitter, &Visit<'_>) -> Result<()> + 'a,
    {
        self.writers.close = Some(Box::new(f));
        self
    }
}
