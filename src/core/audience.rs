use crate::core::resolve::resolve_str;
use crate::domain::model::{Record, TargetAudience};

fn dimension_matches(allowed: &Option<Vec<String>>, actual: Option<&str>) -> bool {
    match allowed {
        None => true,
        Some(values) if values.is_empty() => true,
        Some(values) => match actual {
            Some(actual) => values.iter().any(|candidate| candidate == actual),
            // constrained dimension, but the record has no value to match
            None => false,
        },
    }
}

impl TargetAudience {
    pub fn everyone() -> Self {
        Self::default()
    }

    pub fn is_unconstrained(&self) -> bool {
        let empty = |dim: &Option<Vec<String>>| dim.as_ref().map(|v| v.is_empty()).unwrap_or(true);
        empty(&self.cities) && empty(&self.roles) && empty(&self.status)
    }

    /// Membership test: every constrained dimension must contain the
    /// record's value. Dimensions left empty do not constrain.
    pub fn matches(&self, record: &Record) -> bool {
        dimension_matches(&self.cities, resolve_str(record, "city"))
            && dimension_matches(&self.roles, resolve_str(record, "role"))
            && dimension_matches(&self.status, resolve_str(record, "status"))
    }

    pub fn select<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|record| self.matches(record)).collect()
    }

    /// Preview count shown before a campaign is actually sent.
    pub fn audience_size(&self, records: &[Record]) -> usize {
        records.iter().filter(|record| self.matches(record)).count()
    }
}
