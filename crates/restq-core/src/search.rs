//! Free-text search compiler.

use restq_proto::{SearchMethod, SearchSpec, Value};

use crate::error::Error;
use crate::schema::{FieldRef, SchemaDescriptor};

/// A compiled search: true when the term matches any field in scope.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPredicate {
    /// Term, already folded to lowercase for case-insensitive searches.
    pub term: String,
    /// Match mode.
    pub method: SearchMethod,
    /// Compare verbatim when set.
    pub case_sensitive: bool,
    /// Text fields in scope.
    pub fields: Vec<FieldRef>,
}

impl SearchPredicate {
    /// Evaluate against a record.
    pub fn matches<T>(&self, schema: &SchemaDescriptor<T>, record: &T) -> bool {
        self.fields.iter().any(|field| match schema.read(field, record) {
            Value::String(text) if self.case_sensitive => self.method.matches(&text, &self.term),
            Value::String(text) => self.method.matches(&text.to_lowercase(), &self.term),
            _ => false,
        })
    }
}

/// Compile a search directive.
///
/// A blank term compiles to `None` (no search). Names in an explicit field
/// subset must exist; fields in the subset that are not text are skipped.
/// Without a subset every text field of the schema is in scope.
pub fn compile_search<T>(
    schema: &SchemaDescriptor<T>,
    spec: &SearchSpec,
) -> Result<Option<SearchPredicate>, Error> {
    if spec.is_blank() {
        return Ok(None);
    }

    let fields = if spec.fields.is_empty() {
        schema.text_fields()
    } else {
        let mut fields = Vec::with_capacity(spec.fields.len());
        for name in &spec.fields {
            let field = schema.resolve(name)?;
            if schema.descriptor(&field).kind().is_text() && !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    };

    let term = if spec.case_sensitive {
        spec.term.clone()
    } else {
        spec.term.to_lowercase()
    };

    Ok(Some(SearchPredicate {
        term,
        method: spec.method,
        case_sensitive: spec.case_sensitive,
        fields,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    struct Note {
        title: String,
        body: Option<String>,
        stars: i64,
    }

    fn schema() -> SchemaDescriptor<Note> {
        SchemaDescriptor::builder("notes")
            .with_field(FieldDescriptor::text("title", |n: &Note| n.title.clone()))
            .with_field(FieldDescriptor::text("body", |n: &Note| n.body.clone()))
            .with_field(FieldDescriptor::number("stars", |n: &Note| n.stars))
            .build()
            .unwrap()
    }

    fn note(title: &str, body: Option<&str>) -> Note {
        Note {
            title: title.into(),
            body: body.map(Into::into),
            stars: 3,
        }
    }

    fn search(spec: SearchSpec, record: &Note) -> bool {
        let schema = schema();
        compile_search(&schema, &spec)
            .unwrap()
            .expect("non-blank search")
            .matches(&schema, record)
    }

    #[test]
    fn test_blank_term_is_skipped() {
        let schema = schema();
        assert_eq!(compile_search(&schema, &SearchSpec::new("  ")).unwrap(), None);
    }

    #[test]
    fn test_any_text_field_matches() {
        let record = note("Groceries", Some("buy Apples"));
        assert!(search(SearchSpec::new("apple"), &record));
        assert!(!search(SearchSpec::new("pear"), &record));
    }

    #[test]
    fn test_null_text_is_skipped() {
        assert!(search(SearchSpec::new("gro"), &note("Groceries", None)));
        assert!(!search(SearchSpec::new("x"), &note("Groceries", None)));
    }

    #[test]
    fn test_case_sensitivity() {
        let record = note("Apple", None);
        assert!(search(SearchSpec::new("apple"), &record));
        assert!(!search(SearchSpec::new("apple").case_sensitive(true), &record));
        assert!(search(SearchSpec::new("Apple").case_sensitive(true), &record));
        assert!(search(SearchSpec::new("Apple"), &record));
    }

    #[test]
    fn test_methods() {
        let record = note("apple pie", None);
        let starts = SearchSpec::new("apple").with_method(SearchMethod::StartsWith);
        let ends = SearchSpec::new("apple").with_method(SearchMethod::EndsWith);
        assert!(search(starts, &record));
        assert!(!search(ends, &record));
    }

    #[test]
    fn test_explicit_fields() {
        let record = note("Groceries", Some("apples"));
        let title_only = SearchSpec::new("apple").with_fields(vec!["title".into()]);
        assert!(!search(title_only, &record));

        // Non-text fields in the subset are skipped, leaving nothing in scope.
        let schema = schema();
        let numeric = SearchSpec::new("3").with_fields(vec!["stars".into()]);
        let compiled = compile_search(&schema, &numeric).unwrap().unwrap();
        assert!(compiled.fields.is_empty());
        assert!(!compiled.matches(&schema, &record));
    }

    #[test]
    fn test_unknown_search_field() {
        let schema = schema();
        let spec = SearchSpec::new("x").with_fields(vec!["summary".into()]);
        assert!(matches!(
            compile_search(&schema, &spec),
            Err(Error::FieldNotFound { .. })
        ));
    }
}
