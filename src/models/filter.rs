//! Case-insensitive substring filtering over a fixed set of text columns.

/// A search term matched with `ILIKE` against one or more columns.
///
/// A blank or missing term matches every row, so handlers can pass the raw
/// optional query parameter straight through.
#[derive(Debug, Clone)]
pub struct TextFilter {
    fields: &'static [&'static str],
    term: Option<String>,
}

impl TextFilter {
    pub fn new(fields: &'static [&'static str], query: Option<&str>) -> Self {
        let term = query
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        Self { fields, term }
    }

    /// Whether this filter constrains the result set at all.
    pub fn is_active(&self) -> bool {
        self.term.is_some() && !self.fields.is_empty()
    }

    /// The SQL predicate for this filter, with every column compared against
    /// the same `$param` placeholder. `None` when the filter matches all rows.
    pub fn condition(&self, param: usize) -> Option<String> {
        if !self.is_active() {
            return None;
        }
        let clauses: Vec<String> = self
            .fields
            .iter()
            .map(|field| format!("{field} ILIKE ${param}"))
            .collect();
        Some(format!("({})", clauses.join(" OR ")))
    }

    /// The bind value for the placeholder produced by [`condition`](Self::condition):
    /// the term wrapped in `%`, with LIKE metacharacters escaped so user input
    /// is always matched literally.
    pub fn pattern(&self) -> Option<String> {
        self.term
            .as_deref()
            .filter(|_| self.is_active())
            .map(|term| format!("%{}%", escape_like(term)))
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[&str] = &["name", "email"];

    #[test]
    fn missing_or_blank_term_matches_all() {
        for query in [None, Some(""), Some("   ")] {
            let filter = TextFilter::new(FIELDS, query);
            assert!(!filter.is_active());
            assert_eq!(filter.condition(1), None);
            assert_eq!(filter.pattern(), None);
        }
    }

    #[test]
    fn empty_field_list_matches_all() {
        let filter = TextFilter::new(&[], Some("acme"));
        assert!(!filter.is_active());
        assert_eq!(filter.condition(1), None);
        assert_eq!(filter.pattern(), None);
    }

    #[test]
    fn condition_ors_every_field_on_one_placeholder() {
        let filter = TextFilter::new(FIELDS, Some("acme"));
        assert_eq!(
            filter.condition(3).as_deref(),
            Some("(name ILIKE $3 OR email ILIKE $3)")
        );
        assert_eq!(filter.pattern().as_deref(), Some("%acme%"));
    }

    #[test]
    fn term_is_trimmed_before_matching() {
        let filter = TextFilter::new(FIELDS, Some("  acme  "));
        assert_eq!(filter.pattern().as_deref(), Some("%acme%"));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        let filter = TextFilter::new(FIELDS, Some("100%_a\\b"));
        assert_eq!(filter.pattern().as_deref(), Some("%100\\%\\_a\\\\b%"));
    }

    #[test]
    fn single_field_condition_is_still_parenthesized() {
        let filter = TextFilter::new(&["sku"], Some("WID"));
        assert_eq!(filter.condition(2).as_deref(), Some("(sku ILIKE $2)"));
    }
}
