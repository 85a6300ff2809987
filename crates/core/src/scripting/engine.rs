//! Lua scripting engine with sandboxing.
//!
//! `$`-prefixed sources are evaluated as Lua expressions with the
//! environment's top-level names exposed as globals, so `$this.version`
//! reads the `version` field of the `this` table.

use mlua::{Lua, LuaSerdeExt, Result as LuaResult, StdLib, Value as LuaValue};
use serde_json::Value;

use super::bindings::register_rv_table;
use super::environment::Environment;
use super::types::{EvalError, SandboxConfig};
use super::{Evaluator, is_expression};

/// A sandboxed Lua execution environment.
///
/// The engine provides the `rv` helper table while restricting dangerous
/// operations like file I/O and shell execution.
pub struct LuaEngine {
    lua: Lua,
}

impl LuaEngine {
    /// Create a new Lua engine with the given sandbox configuration.
    pub fn new(config: SandboxConfig) -> Result<Self, EvalError> {
        // Base functions (type, tostring, ...) are always available
        let libs = StdLib::TABLE | StdLib::STRING | StdLib::UTF8 | StdLib::MATH;
        let lua = Lua::new_with(libs, mlua::LuaOptions::default())?;

        if config.memory_limit > 0 {
            lua.set_memory_limit(config.memory_limit)?;
        }

        Self::apply_sandbox(&lua)?;
        register_rv_table(&lua)?;

        Ok(Self { lua })
    }

    /// Create a new engine with default restrictive sandbox.
    pub fn sandboxed() -> Result<Self, EvalError> {
        Self::new(SandboxConfig::restricted())
    }

    /// Evaluate a bare Lua expression against `env`.
    ///
    /// The environment is exposed through a fresh globals table per call,
    /// so nothing leaks between evaluations.
    pub fn eval_expression(&self, expr: &str, env: &Environment) -> Result<Value, EvalError> {
        let scope = self.lua.create_table()?;
        for (name, value) in env.iter() {
            scope.set(name.as_str(), self.lua.to_value(value)?)?;
        }

        let meta = self.lua.create_table()?;
        meta.set("__index", self.lua.globals())?;
        scope.set_metatable(Some(meta));

        let result: LuaValue = self
            .lua
            .load(format!("return {expr}"))
            .set_name("expression")
            .set_environment(scope)
            .eval()?;

        match result {
            LuaValue::Nil => Err(EvalError::Undefined(expr.to_string())),
            other => Ok(self.lua.from_value(other)?),
        }
    }

    /// Get a reference to the underlying Lua state (for advanced usage).
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Apply sandbox restrictions by removing dangerous globals.
    fn apply_sandbox(lua: &Lua) -> LuaResult<()> {
        let globals = lua.globals();

        globals.set("dofile", LuaValue::Nil)?;
        globals.set("loadfile", LuaValue::Nil)?;
        globals.set("load", LuaValue::Nil)?;
        globals.set("require", LuaValue::Nil)?;
        globals.set("package", LuaValue::Nil)?;
        globals.set("io", LuaValue::Nil)?;
        globals.set("os", LuaValue::Nil)?;
        globals.set("debug", LuaValue::Nil)?;
        globals.set("collectgarbage", LuaValue::Nil)?;

        Ok(())
    }
}

/// [`Evaluator`] backed by a sandboxed [`LuaEngine`].
pub struct LuaEvaluator {
    engine: LuaEngine,
}

impl LuaEvaluator {
    pub fn new(config: SandboxConfig) -> Result<Self, EvalError> {
        Ok(Self { engine: LuaEngine::new(config)? })
    }

    pub fn sandboxed() -> Result<Self, EvalError> {
        Self::new(SandboxConfig::restricted())
    }
}

impl Evaluator for LuaEvaluator {
    fn evaluate(&self, source: &str, env: &Environment) -> Result<Value, EvalError> {
        if !is_expression(source) {
            return Ok(Value::String(source.to_string()));
        }
        let expr = source[1..].trim();
        if expr.is_empty() {
            return Err(EvalError::Syntax(source.to_string()));
        }
        self.engine.eval_expression(expr, env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env() -> Environment {
        let mut env = Environment::new();
        env.insert_path("this.variable", "scripted world");
        env.insert_path("this.replicas", 3);
        env.insert_path("this.zones", json!(["eu", "us"]));
        env
    }

    #[test]
    fn test_dotted_lookup() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        let v = eval.evaluate("$this.variable", &env()).unwrap();
        assert_eq!(v, json!("scripted world"));
    }

    #[test]
    fn test_plain_string_is_literal() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        let v = eval.evaluate("not a script", &env()).unwrap();
        assert_eq!(v, json!("not a script"));
    }

    #[test]
    fn test_arithmetic_and_stdlib() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        assert_eq!(eval.evaluate("$this.replicas * 2", &env()).unwrap(), json!(6));
        assert_eq!(
            eval.evaluate("$string.upper(this.variable)", &env()).unwrap(),
            json!("SCRIPTED WORLD")
        );
    }

    #[test]
    fn test_list_round_trip() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        assert_eq!(eval.evaluate("$this.zones", &env()).unwrap(), json!(["eu", "us"]));
    }

    #[test]
    fn test_nil_is_undefined() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        let err = eval.evaluate("$this.missing", &env()).unwrap_err();
        assert!(matches!(err, EvalError::Undefined(_)));
    }

    #[test]
    fn test_indexing_nil_is_lua_error() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        let err = eval.evaluate("$nothing.here", &env()).unwrap_err();
        assert!(matches!(err, EvalError::Lua(_)));
    }

    #[test]
    fn test_env_does_not_leak_between_calls() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        eval.evaluate("$this.variable", &env()).unwrap();
        let err = eval.evaluate("$this", &Environment::new()).unwrap_err();
        assert!(matches!(err, EvalError::Undefined(_)));
    }

    #[test]
    fn test_sandbox_no_io() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        assert!(eval.evaluate("$io", &Environment::new()).is_err());
        assert!(eval.evaluate("$os", &Environment::new()).is_err());
        assert!(eval.evaluate("$require", &Environment::new()).is_err());
    }

    #[test]
    fn test_rv_render_binding() {
        let eval = LuaEvaluator::sandboxed().unwrap();
        let v = eval
            .evaluate(r#"$rv.render("Hello {{who}}", { who = this.variable })"#, &env())
            .unwrap();
        assert_eq!(v, json!("Hello scripted world"));
    }
}
