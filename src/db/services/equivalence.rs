//! Pure comparisons used to decide whether a template entity can be
//! linked onto an existing host entity instead of being copied.

/// Whether a template entity pairs up with an existing host entity or
/// needs a fresh copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyDecision {
    /// Reuse the host entity with this id, marking it inherited.
    Link(u64),
    /// Create a new host entity.
    Create,
}

/// A trigger function together with the key of the item it evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionRef<'a> {
    pub function_id: u64,
    pub name: &'a str,
    pub parameter: &'a str,
    pub item_key: &'a str,
}

/// Compares a host trigger and a template trigger for structural
/// equality. Function tokens differ by id between the two, so template
/// tokens are rewritten to the id of the matching host function (same
/// function name, same parameter, same item key) before the expressions
/// are compared textually.
pub fn triggers_equivalent(
    host_expression: &str,
    host_functions: &[FunctionRef<'_>],
    template_expression: &str,
    template_functions: &[FunctionRef<'_>],
) -> bool {
    let mut rewritten = template_expression.to_string();
    for tf in template_functions {
        let matched = host_functions.iter().find(|hf| {
            hf.name == tf.name && hf.parameter == tf.parameter && hf.item_key == tf.item_key
        });
        if let Some(hf) = matched {
            rewritten = rewritten.replace(
                &function_token(tf.function_id),
                &function_token(hf.function_id),
            );
        }
    }
    rewritten == host_expression
}

pub fn function_token(function_id: u64) -> String {
    format!("{{{function_id}}}")
}

/// Compares the item rows of two graphs by key sequence. Callers pass
/// the keys sorted; equality means the graphs draw the same item keys
/// the same number of times.
pub fn graph_items_equivalent(host_keys: &[&str], template_keys: &[&str]) -> bool {
    host_keys == template_keys
}
