//! Rendered SQL fragments with their bound parameters.
//!
//! [`Statement`] stores SQL text and parameters separately. Fragments are
//! concatenated with [`Statement::append`] as larger statements are
//! assembled, and the final `?` placeholders are only substituted when
//! [`Statement::render`] is called for display or naive execution.

use crate::adapter::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// Positional placeholder marker used in statement text.
pub const PLACEHOLDER: char = '?';

/// A SQL fragment plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    text: String,
    params: Vec<Value>,
}

impl Statement {
    /// Create a statement from text and parameters.
    pub fn new(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    /// Create an empty statement.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a parameter-free statement.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    /// Replace the SQL text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// The SQL text, placeholders included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the bound parameters.
    pub fn set_params(&mut self, params: Vec<Value>) {
        self.params = params;
    }

    /// Append one bound parameter.
    pub fn add_param(&mut self, value: impl Into<Value>) {
        self.params.push(value.into());
    }

    /// Append bound parameters in order.
    pub fn add_params(&mut self, params: impl IntoIterator<Item = Value>) {
        self.params.extend(params);
    }

    /// The bound parameters, as a defensive copy.
    pub fn params(&self) -> Vec<Value> {
        self.params.clone()
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Append raw SQL text without parameters.
    pub fn push(&mut self, sql: &str) {
        self.text.push_str(sql);
    }

    /// Append a placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) {
        self.text.push(PLACEHOLDER);
        self.params.push(value.into());
    }

    /// Append another statement: text and parameters are concatenated.
    pub fn append(&mut self, other: Statement) {
        self.text.push_str(&other.text);
        self.params.extend(other.params);
    }

    /// Count placeholder markers in the text.
    pub fn placeholder_count(&self) -> usize {
        self.text.matches(PLACEHOLDER).count()
    }

    /// Substitute every placeholder with its literal value.
    ///
    /// Substitution runs right-to-left so literals containing `?` cannot
    /// shift later placeholder positions. Values are rendered through
    /// [`Dialect::prepare_input`]. Fails with
    /// [`OrmError::MalformedStatement`] when the placeholder count does not
    /// match the parameter count. Does not mutate the statement.
    pub fn render(&self, dialect: &dyn Dialect) -> OrmResult<String> {
        let holes: Vec<usize> = self
            .text
            .match_indices(PLACEHOLDER)
            .map(|(idx, _)| idx)
            .collect();
        if holes.len() != self.params.len() {
            return Err(OrmError::MalformedStatement {
                placeholders: holes.len(),
                params: self.params.len(),
            });
        }

        let mut out = self.text.clone();
        for (pos, value) in holes.iter().zip(self.params.iter()).rev() {
            let literal = dialect.prepare_input(value);
            out.replace_range(*pos..pos + PLACEHOLDER.len_utf8(), &literal);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::GenericDialect;

    #[test]
    fn placeholder_parity_holds_for_built_statements() {
        let mut stmt = Statement::raw("a = ");
        stmt.push_bind(1);
        stmt.push(" AND b = ");
        stmt.push_bind("x");
        assert_eq!(stmt.placeholder_count(), stmt.param_count());
    }

    #[test]
    fn append_concatenates_text_and_params() {
        let mut left = Statement::new("a = ?", vec![Value::Int(1)]);
        let right = Statement::new(" AND b = ?", vec![Value::Int(2)]);
        left.append(right);
        assert_eq!(left.text(), "a = ? AND b = ?");
        assert_eq!(left.params(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn params_returns_a_copy() {
        let stmt = Statement::new("a = ?", vec![Value::Int(1)]);
        let mut copy = stmt.params();
        copy.push(Value::Int(2));
        assert_eq!(stmt.param_count(), 1);
    }

    #[test]
    fn render_substitutes_in_order() {
        let stmt = Statement::new(
            "name = ? AND age > ?",
            vec![Value::Text("ann".to_string()), Value::Int(18)],
        );
        let sql = stmt.render(&GenericDialect::new()).unwrap();
        assert_eq!(sql, "name = 'ann' AND age > 18");
    }

    #[test]
    fn render_is_safe_against_question_marks_in_values() {
        let stmt = Statement::new(
            "q = ? AND n = ?",
            vec![Value::Text("what?".to_string()), Value::Int(7)],
        );
        let sql = stmt.render(&GenericDialect::new()).unwrap();
        assert_eq!(sql, "q = 'what?' AND n = 7");
    }

    #[test]
    fn render_rejects_placeholder_mismatch() {
        let stmt = Statement::new("a = ? AND b = ?", vec![Value::Int(1)]);
        let err = stmt.render(&GenericDialect::new()).unwrap_err();
        assert!(matches!(
            err,
            OrmError::MalformedStatement {
                placeholders: 2,
                params: 1
            }
        ));
    }

    #[test]
    fn render_does_not_mutate() {
        let stmt = Statement::new("a = ?", vec![Value::Int(1)]);
        stmt.render(&GenericDialect::new()).unwrap();
        assert_eq!(stmt.text(), "a = ?");
        assert_eq!(stmt.params(), vec![Value::Int(1)]);
    }
}
