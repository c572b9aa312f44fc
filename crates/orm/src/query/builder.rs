//! Query Builder - Core builder implementation

use super::types::*;

/// Query builder for constructing read queries
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) select_fields: Vec<SelectField>,
    pub(crate) from_table: Option<TableRef>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) where_conditions: Vec<WhereCondition>,
    pub(crate) order_by: Vec<(String, OrderDirection)>,
    pub(crate) limit_count: Option<u64>,
    pub(crate) offset_value: Option<u64>,
    pub(crate) distinct: bool,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_fields(&self) -> &[SelectField] {
        &self.select_fields
    }

    pub fn from_table(&self) -> Option<&TableRef> {
        self.from_table.as_ref()
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn where_conditions(&self) -> &[WhereCondition] {
        &self.where_conditions
    }

    pub fn order_by_clauses(&self) -> &[(String, OrderDirection)] {
        &self.order_by
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit_count
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset_value
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Number of bind parameters the rendered statement carries
    pub fn parameter_count(&self) -> usize {
        self.where_conditions
            .iter()
            .map(|condition| match condition.operator {
                QueryOperator::In => condition.values.len(),
                QueryOperator::IsNull | QueryOperator::IsNotNull => 0,
                _ => usize::from(condition.value.is_some()),
            })
            .sum()
    }
}
