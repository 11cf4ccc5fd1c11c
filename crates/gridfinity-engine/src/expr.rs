//! Derived parameter values from expressions over other parameters.

use meval::{Context, ContextProvider, Expr};
use tracing::debug;

use crate::params::ParamSet;
use crate::types::EngineError;

/// Looks up variables among an object's numeric parameters.
struct ParamVars<'a> {
    params: &'a ParamSet,
}

impl ContextProvider for ParamVars<'_> {
    fn get_var(&self, name: &str) -> Option<f64> {
        self.params.get(name).ok().and_then(|v| v.as_f64())
    }
}

/// `if(cond, then[, else])`; a missing else branch is 0.
fn conditional(args: &[f64]) -> f64 {
    let otherwise = args.get(2).copied().unwrap_or(0.0);
    if args[0] != 0.0 {
        args[1]
    } else {
        otherwise
    }
}

fn functions() -> Context<'static> {
    let mut context = Context::new();
    context.funcn("if", conditional, 2..4);
    context.func("not", |v| if v != 0.0 { 0.0 } else { 1.0 });
    context
}

/// Evaluate one expression against the current parameter values.
pub fn evaluate(params: &ParamSet, name: &str, source: &str) -> Result<f64, EngineError> {
    let expr: Expr = source.parse().map_err(|e: meval::Error| EngineError::Expression {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let vars = ParamVars { params };
    let context = functions();
    let value = expr
        .eval_with_context((&vars, &context))
        .map_err(|e| EngineError::Expression {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    if !value.is_finite() {
        return Err(EngineError::Expression {
            name: name.to_string(),
            reason: format!("evaluates to {value}"),
        });
    }
    Ok(value)
}

/// Refresh every expression-bound parameter.
///
/// Expressions may read each other, so evaluation repeats until no value
/// changes. A chain that keeps changing after one pass per expression is a
/// cycle.
pub fn evaluate_expressions(params: &mut ParamSet) -> Result<(), EngineError> {
    let bound: Vec<(String, String)> = params
        .expressions()
        .map(|(n, e)| (n.to_string(), e.to_string()))
        .collect();
    if bound.is_empty() {
        return Ok(());
    }

    for pass in 0..=bound.len() {
        let mut changed = false;
        for (name, source) in &bound {
            let value = evaluate(params, name, source)?;
            let current = params.number(name)?;
            if (current - value).abs() > 1e-12 {
                params.set_computed(name, value)?;
                changed = true;
            }
        }
        if !changed {
            debug!(passes = pass + 1, expressions = bound.len(), "expressions settled");
            return Ok(());
        }
    }

    let names: Vec<&str> = bound.iter().map(|(n, _)| n.as_str()).collect();
    Err(EngineError::Expression {
        name: names.join(", "),
        reason: "expressions depend on each other in a cycle".to_string(),
    })
}
