//! Template declarations and the placeholder rendering engine.

pub mod engine;
pub mod template;

pub use engine::{
    PlaceholderRenderer, RenderContext, RenderError, RenderOptions, Renderer, render_string,
};
pub use template::{TEMPLATE_SUFFIX, Template, TemplateError, default_target};
