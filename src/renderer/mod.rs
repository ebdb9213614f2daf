pub mod filters;
pub mod interface;
pub mod minijinja;
pub mod sink;

pub use interface::TemplateRenderer;
pub use minijinja::MiniJinjaRenderer;
