//! Lua bindings exposed to scripted expressions.
//!
//! This module provides the `rv` global table with helpers backed by the
//! placeholder renderer.

use mlua::{Function, Lua, LuaSerdeExt, Result as LuaResult, Table};
use serde_json::{Map, Value};

use crate::templates::engine::{RenderOptions, render_string, slugify};

/// Register the `rv` global table with all bindings.
///
/// After calling this function, Lua expressions can use:
/// - `rv.render(template, context)` - Render `{{placeholders}}` leniently
/// - `rv.slugify(str)` - Convert a string to a URL-friendly slug
/// - `rv.json(value)` - Encode a value as JSON
pub fn register_rv_table(lua: &Lua) -> LuaResult<()> {
    let rv = lua.create_table()?;

    rv.set("render", create_render_fn(lua)?)?;
    rv.set("slugify", lua.create_function(|_, s: String| Ok(slugify(&s)))?)?;
    rv.set("json", create_json_fn(lua)?)?;

    lua.globals().set("rv", rv)?;
    Ok(())
}

/// Create the `rv.render(template, context)` function.
///
/// ```lua
/// rv.render("Hello {{name}}", { name = "World" })  -- "Hello World"
/// ```
fn create_render_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|lua, (template, ctx_table): (String, Table)| {
        let ctx: Map<String, Value> = lua.from_value(mlua::Value::Table(ctx_table))?;
        render_string(&template, &ctx, RenderOptions::lenient())
            .map_err(|e| mlua::Error::runtime(e.to_string()))
    })
}

/// Create the `rv.json(value)` function.
fn create_json_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|lua, value: mlua::Value| {
        let value: Value = lua.from_value(value)?;
        serde_json::to_string(&value).map_err(|e| mlua::Error::runtime(e.to_string()))
    })
}
