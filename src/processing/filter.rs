//! Multi-criteria row filtering.
//!
//! A [`Criteria`] value holds zero or more optional criteria; a row is kept iff it satisfies all
//! of the active ones. Which criteria a dataset honors is declared by its [`FilterFields`], and a
//! criterion whose column is absent from the dataset is skipped rather than treated as an error.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{DataSet, DatasetKind, Value};

/// A filterable field and the canonical column it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    /// Case-insensitive substring match on `name`.
    Name,
    /// Membership in a set of `category` values.
    Category,
    /// Membership in a set of `employment_type` values.
    EmploymentType,
    /// Membership in a set of `status_ft/pt` values.
    Status,
    /// Membership in a set of `location` values.
    Location,
    /// Active/terminated selector on `terminated`.
    Employment,
}

impl FilterField {
    /// Every filter field.
    pub const ALL: [FilterField; 6] = [
        FilterField::Name,
        FilterField::Category,
        FilterField::EmploymentType,
        FilterField::Status,
        FilterField::Location,
        FilterField::Employment,
    ];

    /// The canonical column this field reads.
    pub fn column(self) -> &'static str {
        match self {
            FilterField::Name => "name",
            FilterField::Category => "category",
            FilterField::EmploymentType => "employment_type",
            FilterField::Status => "status_ft/pt",
            FilterField::Location => "location",
            FilterField::Employment => "terminated",
        }
    }
}

/// The set of filter fields a dataset recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterFields(BTreeSet<FilterField>);

impl FilterFields {
    /// Every field.
    pub fn all() -> Self {
        Self(FilterField::ALL.into_iter().collect())
    }

    /// Exactly the given fields.
    pub fn only(fields: impl IntoIterator<Item = FilterField>) -> Self {
        Self(fields.into_iter().collect())
    }

    /// Whether `field` is recognized.
    pub fn contains(&self, field: FilterField) -> bool {
        self.0.contains(&field)
    }

    /// Defaults: the roster recognizes every field, the other datasets only `Name`.
    pub fn default_for(kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::Roster => Self::all(),
            DatasetKind::Provider | DatasetKind::Directory | DatasetKind::Terminated => {
                Self::only([FilterField::Name])
            }
        }
    }

    /// Iterate recognized fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = FilterField> + '_ {
        self.0.iter().copied()
    }
}

/// Recognized filter fields for each dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterProfiles {
    pub roster: FilterFields,
    pub provider: FilterFields,
    pub directory: FilterFields,
    pub terminated: FilterFields,
}

impl FilterProfiles {
    /// The recognized fields for `kind`.
    pub fn for_kind(&self, kind: DatasetKind) -> &FilterFields {
        match kind {
            DatasetKind::Roster => &self.roster,
            DatasetKind::Provider => &self.provider,
            DatasetKind::Directory => &self.directory,
            DatasetKind::Terminated => &self.terminated,
        }
    }
}

impl Default for FilterProfiles {
    fn default() -> Self {
        Self {
            roster: FilterFields::default_for(DatasetKind::Roster),
            provider: FilterFields::default_for(DatasetKind::Provider),
            directory: FilterFields::default_for(DatasetKind::Directory),
            terminated: FilterFields::default_for(DatasetKind::Terminated),
        }
    }
}

/// Active/terminated selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// No constraint.
    #[default]
    All,
    /// `terminated == false`.
    Active,
    /// `terminated == true`.
    Terminated,
}

impl FromStr for EmploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "terminated" => Ok(Self::Terminated),
            other => Err(format!("unknown employment status '{other}' (expected All/Active/Terminated)")),
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Terminated => "Terminated",
        })
    }
}

/// Filter criteria. Every criterion is optional; empty text and empty sets impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    /// Case-insensitive substring of `name`.
    pub name: Option<String>,
    /// Allowed `category` values.
    pub category: Vec<Value>,
    /// Allowed `employment_type` values.
    pub employment_type: Vec<Value>,
    /// Allowed `status_ft/pt` values.
    pub status: Vec<Value>,
    /// Allowed `location` values.
    pub location: Vec<Value>,
    /// Active/terminated selector.
    pub employment: EmploymentStatus,
}

impl Criteria {
    /// No criteria.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name = Some(needle.into());
        self
    }

    pub fn category<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.category = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn employment_type<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.employment_type = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn status<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.status = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn location<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.location = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn employment(mut self, status: EmploymentStatus) -> Self {
        self.employment = status;
        self
    }

    /// Returns `true` if no criterion constrains anything.
    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| !self.is_active(*f))
    }

    fn is_active(&self, field: FilterField) -> bool {
        match field {
            FilterField::Name => self.name.as_deref().is_some_and(|n| !n.is_empty()),
            FilterField::Category => !self.category.is_empty(),
            FilterField::EmploymentType => !self.employment_type.is_empty(),
            FilterField::Status => !self.status.is_empty(),
            FilterField::Location => !self.location.is_empty(),
            FilterField::Employment => self.employment != EmploymentStatus::All,
        }
    }

    fn allowed(&self, field: FilterField) -> &[Value] {
        match field {
            FilterField::Category => &self.category,
            FilterField::EmploymentType => &self.employment_type,
            FilterField::Status => &self.status,
            FilterField::Location => &self.location,
            FilterField::Name | FilterField::Employment => &[],
        }
    }
}

enum Predicate<'c> {
    NameContains { idx: usize, needle: String },
    MemberOf { idx: usize, allowed: &'c [Value] },
    Flag { idx: usize, expected: bool },
}

impl Predicate<'_> {
    fn matches(&self, row: &[Value]) -> bool {
        match self {
            Predicate::NameContains { idx, needle } => row
                .get(*idx)
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase().contains(needle.as_str())),
            Predicate::MemberOf { idx, allowed } => row.get(*idx).is_some_and(|v| allowed.contains(v)),
            Predicate::Flag { idx, expected } => row.get(*idx).and_then(Value::as_bool) == Some(*expected),
        }
    }
}

fn compile<'c>(dataset: &DataSet, criteria: &'c Criteria, fields: &FilterFields) -> Vec<Predicate<'c>> {
    let mut predicates = Vec::new();
    for field in fields.iter().filter(|f| criteria.is_active(*f)) {
        let Some(col) = dataset.column(field.column()) else {
            tracing::debug!(column = field.column(), "filter column absent; criterion skipped");
            continue;
        };
        let idx = col.index;
        predicates.push(match field {
            FilterField::Name => Predicate::NameContains {
                idx,
                needle: criteria.name.as_deref().unwrap_or_default().to_lowercase(),
            },
            FilterField::Employment => Predicate::Flag {
                idx,
                expected: criteria.employment == EmploymentStatus::Terminated,
            },
            FilterField::Category | FilterField::EmploymentType | FilterField::Status | FilterField::Location => {
                Predicate::MemberOf {
                    idx,
                    allowed: criteria.allowed(field),
                }
            }
        });
    }
    predicates
}

/// Returns a new [`DataSet`] with the rows of `dataset` that satisfy every active criterion
/// recognized by `fields`, in their original order.
pub fn apply_filters(dataset: &DataSet, criteria: &Criteria, fields: &FilterFields) -> DataSet {
    let predicates = compile(dataset, criteria, fields);
    dataset.filter_rows(|row| predicates.iter().all(|p| p.matches(row)))
}
