//! Clause-accumulating SQL template builder.
//!
//! Fragments are collected per clause and substituted into a template at the
//! `/**where**/`, `/**set**/` and `/**select**/` markers:
//!
//! | marker | joined with | rendered as |
//! |---|---|---|
//! | `/**where**/` | ` and ` | `where a and b` |
//! | `/**set**/` | `,` | `set a,b` |
//! | `/**select**/` | `,` | `a,b` |
//!
//! A marker with no fragments renders as the empty string, keyword included.
//!
//! # Example
//! ```ignore
//! use rowsave::SqlBuilder;
//!
//! let mut b = SqlBuilder::new();
//! b.where_clause("Id=@Id");
//! assert_eq!(
//!     b.add_template("select count(*) from t /**where**/"),
//!     "select count(*) from t where Id=@Id"
//! );
//! ```

const WHERE_MARKER: &str = "/**where**/";
const SET_MARKER: &str = "/**set**/";
const SELECT_MARKER: &str = "/**select**/";

/// Accumulates `where`, `set` and `select` fragments.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct SqlBuilder {
    wheres: Vec<String>,
    sets: Vec<String>,
    selects: Vec<String>,
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate; predicates are joined with `and`.
    pub fn where_clause(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.wheres.push(fragment.into());
        self
    }

    /// Add a `column=placeholder` assignment.
    pub fn set(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.sets.push(fragment.into());
        self
    }

    /// Add a column to the select list.
    pub fn select(&mut self, column: impl Into<String>) -> &mut Self {
        self.selects.push(column.into());
        self
    }

    pub fn has_where(&self) -> bool {
        !self.wheres.is_empty()
    }

    pub fn has_set(&self) -> bool {
        !self.sets.is_empty()
    }

    /// Render `template`, replacing every marker with its accumulated clause.
    pub fn add_template(&self, template: &str) -> String {
        let mut sql = template.to_string();
        if sql.contains(WHERE_MARKER) {
            sql = sql.replace(WHERE_MARKER, &clause("where ", &self.wheres, " and "));
        }
        if sql.contains(SET_MARKER) {
            sql = sql.replace(SET_MARKER, &clause("set ", &self.sets, ","));
        }
        if sql.contains(SELECT_MARKER) {
            sql = sql.replace(SELECT_MARKER, &clause("", &self.selects, ","));
        }
        sql
    }
}

fn clause(prefix: &str, fragments: &[String], joiner: &str) -> String {
    if fragments.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(
        prefix.len() + fragments.iter().map(|f| f.len() + joiner.len()).sum::<usize>(),
    );
    out.push_str(prefix);
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            out.push_str(joiner);
        }
        out.push_str(fragment);
    }
    out
}
