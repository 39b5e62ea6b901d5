//! Shared filter predicate composed once per request and reused by every
//! aggregate query, so all dashboard numbers describe the same population.

use crate::reporting::filter::ReportFilter;

/// An immutable WHERE fragment plus its positional parameters.
///
/// Clause order is fixed: the date-range bounds come first, the optional
/// user-equality clause second. Call sites append their own clauses and
/// binds *after* this pair, so the parameter order here must never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitPredicate {
    clauses: Vec<String>,
    params: Vec<i64>,
}

impl VisitPredicate {
    /// Build a fresh clause/parameter pair from the filter.
    ///
    /// The calendar-date range is expressed as half-open unix bounds
    /// (`occurred_at >= start AND occurred_at < end`), which is inclusive of
    /// both end dates at second granularity.
    pub fn compose(filter: &ReportFilter) -> Self {
        let mut clauses = vec![
            "occurred_at >= ?".to_string(),
            "occurred_at < ?".to_string(),
        ];
        let mut params = vec![filter.range_start_unix(), filter.range_end_unix()];

        if let Some(user_id) = filter.user_id() {
            clauses.push("user_id = ?".to_string());
            params.push(user_id);
        }

        Self { clauses, params }
    }

    /// The composed clauses joined with `AND`, without the `WHERE` keyword.
    pub fn where_sql(&self) -> String {
        self.clauses.join(" AND ")
    }

    /// Bind values in clause order.
    pub fn params(&self) -> &[i64] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filter(user_id: Option<i64>) -> ReportFilter {
        ReportFilter::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 7).unwrap(),
            user_id,
        )
        .unwrap()
    }

    #[test]
    fn range_only_when_user_absent() {
        let pred = VisitPredicate::compose(&filter(None));
        assert_eq!(pred.where_sql(), "occurred_at >= ? AND occurred_at < ?");
        assert_eq!(pred.params().len(), 2);
    }

    #[test]
    fn user_clause_appended_last() {
        let pred = VisitPredicate::compose(&filter(Some(42)));
        assert_eq!(
            pred.where_sql(),
            "occurred_at >= ? AND occurred_at < ? AND user_id = ?"
        );
        assert_eq!(pred.params()[2], 42);
    }

    #[test]
    fn compose_returns_fresh_pairs() {
        let f = filter(Some(1));
        let a = VisitPredicate::compose(&f);
        let b = VisitPredicate::compose(&f);
        assert_eq!(a, b);
        // The filter itself is untouched and reusable.
        assert_eq!(f.user_id(), Some(1));
    }

    #[test]
    fn params_follow_clause_order() {
        let f = filter(Some(7));
        let pred = VisitPredicate::compose(&f);
        assert_eq!(
            pred.params(),
            &[f.range_start_unix(), f.range_end_unix(), 7]
        );
    }
}
