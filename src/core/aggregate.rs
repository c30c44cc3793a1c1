use crate::core::format::{day_bucket_utc, default_cell_text};
use crate::core::resolve::resolve;
use crate::domain::model::{AggregationBucket, Record};
use std::collections::HashMap;

/// One grouping dimension: either a field's value as-is, or the UTC
/// calendar day of a timestamp field.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Field(String),
    Day(String),
}

impl GroupKey {
    pub fn field(path: impl Into<String>) -> Self {
        GroupKey::Field(path.into())
    }

    pub fn day(path: impl Into<String>) -> Self {
        GroupKey::Day(path.into())
    }

    /// Key text for one record. Unresolvable fields and unparseable
    /// timestamps land in the "" bucket instead of being dropped.
    fn extract(&self, record: &Record) -> String {
        match self {
            GroupKey::Field(path) => default_cell_text(resolve(record, path)),
            GroupKey::Day(path) => resolve(record, path)
                .and_then(|value| value.as_str())
                .and_then(day_bucket_utc)
                .unwrap_or_default(),
        }
    }
}

type DerivedPredicate = Box<dyn Fn(&Record) -> bool + Send + Sync>;

/// Declarative description of an aggregation pass: one or more grouping
/// keys plus named derived counts over each group.
pub struct GroupSpec {
    keys: Vec<GroupKey>,
    derived: Vec<(String, DerivedPredicate)>,
}

impl GroupSpec {
    pub fn by(key: GroupKey) -> Self {
        Self {
            keys: vec![key],
            derived: Vec::new(),
        }
    }

    pub fn and(mut self, key: GroupKey) -> Self {
        self.keys.push(key);
        self
    }

    pub fn derive(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Record) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.derived.push((name.into(), Box::new(predicate)));
        self
    }

    /// Buckets come back in first-seen order; multi-key groups join their
    /// parts with "|". Every record lands in exactly one bucket.
    pub fn run(&self, records: &[Record]) -> Vec<AggregationBucket> {
        let mut buckets: Vec<AggregationBucket> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let key = self
                .keys
                .iter()
                .map(|group_key| group_key.extract(record))
                .collect::<Vec<_>>()
                .join("|");

            let position = match index.get(&key) {
                Some(&position) => position,
                None => {
                    let mut derived_counts = HashMap::new();
                    for (name, _) in &self.derived {
                        derived_counts.insert(name.clone(), 0);
                    }
                    buckets.push(AggregationBucket {
                        key: key.clone(),
                        count: 0,
                        derived_counts,
                    });
                    index.insert(key, buckets.len() - 1);
                    buckets.len() - 1
                }
            };

            let bucket = &mut buckets[position];
            bucket.count += 1;
            for (name, predicate) in &self.derived {
                if predicate(record) {
                    if let Some(slot) = bucket.derived_counts.get_mut(name) {
                        *slot += 1;
                    }
                }
            }
        }

        buckets
    }
}
