//! Multi-column sort ordering for list endpoints.
//!
//! Each entity declares its sortable columns in a fixed order; the request
//! supplies a direction per column. Slots keep that declaration order in the
//! rendered `ORDER BY`, so logically equivalent requests always produce the
//! same SQL regardless of query-parameter order.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Parse a direction from a query parameter value, case-insensitively.
pub fn parse_direction(raw: &str) -> Option<SortDirection> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "asc" | "ascending" => Some(SortDirection::Asc),
        "desc" | "descending" => Some(SortDirection::Desc),
        _ => None,
    }
}

/// Deserialize an optional direction, treating an empty value as absent
/// (an empty direction omits the column rather than defaulting it).
pub fn de_opt_direction<'de, D>(de: D) -> Result<Option<SortDirection>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_direction(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid sort direction '{s}'"))),
    }
}

/// An ordered sequence of `(column, direction)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    terms: Vec<(&'static str, SortDirection)>,
}

impl OrderBy {
    pub fn single(column: &'static str, direction: SortDirection) -> Self {
        Self {
            terms: vec![(column, direction)],
        }
    }

    /// Build an ordering from declaration-ordered slots, keeping only the
    /// slots with a direction. Falls back to `default` when nothing is set.
    pub fn from_slots(
        slots: &[(&'static str, Option<SortDirection>)],
        default: (&'static str, SortDirection),
    ) -> Self {
        let terms: Vec<_> = slots
            .iter()
            .filter_map(|(column, direction)| direction.map(|d| (*column, d)))
            .collect();
        if terms.is_empty() {
            Self::single(default.0, default.1)
        } else {
            Self { terms }
        }
    }

    pub fn terms(&self) -> &[(&'static str, SortDirection)] {
        &self.terms
    }

    /// Render the `ORDER BY` clause. Column names come from static
    /// per-entity declarations, never from request input.
    pub fn to_sql(&self) -> String {
        let columns: Vec<String> = self
            .terms
            .iter()
            .map(|(column, direction)| format!("{column} {}", direction.as_sql()))
            .collect();
        format!("ORDER BY {}", columns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEFAULT: (&str, SortDirection) = ("created_at", SortDirection::Desc);

    #[test]
    fn empty_slots_fall_back_to_default() {
        let order = OrderBy::from_slots(&[("name", None), ("email", None)], DEFAULT);
        assert_eq!(order.terms(), &[("created_at", SortDirection::Desc)]);
        assert_eq!(order.to_sql(), "ORDER BY created_at DESC");
    }

    #[test]
    fn slots_keep_declaration_order() {
        let order = OrderBy::from_slots(
            &[
                ("name", Some(SortDirection::Asc)),
                ("email", None),
                ("created_at", Some(SortDirection::Desc)),
            ],
            DEFAULT,
        );
        assert_eq!(
            order.terms(),
            &[
                ("name", SortDirection::Asc),
                ("created_at", SortDirection::Desc),
            ]
        );
        assert_eq!(order.to_sql(), "ORDER BY name ASC, created_at DESC");
    }

    #[test]
    fn unset_slots_are_omitted_not_defaulted() {
        let order = OrderBy::from_slots(
            &[("name", None), ("email", Some(SortDirection::Asc))],
            DEFAULT,
        );
        assert_eq!(order.terms(), &[("email", SortDirection::Asc)]);
    }

    #[test]
    fn direction_parsing_is_case_insensitive() {
        assert_eq!(parse_direction("ASC"), Some(SortDirection::Asc));
        assert_eq!(parse_direction("Ascending"), Some(SortDirection::Asc));
        assert_eq!(parse_direction("desc"), Some(SortDirection::Desc));
        assert_eq!(parse_direction(" DESCENDING "), Some(SortDirection::Desc));
        assert_eq!(parse_direction("sideways"), None);
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "de_opt_direction")]
        dir: Option<SortDirection>,
    }

    #[test]
    fn empty_direction_deserializes_as_absent() {
        let probe: Probe = serde_json::from_value(json!({ "dir": "" })).unwrap();
        assert_eq!(probe.dir, None);

        let probe: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(probe.dir, None);

        let probe: Probe = serde_json::from_value(json!({ "dir": "desc" })).unwrap();
        assert_eq!(probe.dir, Some(SortDirection::Desc));
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let result: Result<Probe, _> = serde_json::from_value(json!({ "dir": "upward" }));
        assert!(result.is_err());
    }
}
