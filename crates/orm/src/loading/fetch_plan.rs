//! Fetch plans: which associations are joined into a root query
//!
//! To-one joins preserve the root row count. A to-many join repeats each
//! root once per child, so a plan holding one cannot be paged and may hold
//! only one.

use crate::error::{ModelError, OrmResult};
use crate::paging::PageRequest;
use crate::query::QueryBuilder;
use crate::schema::{Association, Table};

/// One association joined into the plan
#[derive(Debug, Clone, PartialEq)]
pub struct FetchJoin {
    pub association: Association,
    pub owner_alias: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchPlan {
    root: Table,
    root_alias: String,
    joins: Vec<FetchJoin>,
}

impl FetchPlan {
    pub fn new(root: Table, alias: &str) -> Self {
        Self {
            root,
            root_alias: alias.to_string(),
            joins: Vec::new(),
        }
    }

    /// Join `association` from the source aliased `owner_alias` under `alias`
    pub fn fetch(mut self, association: Association, owner_alias: &str, alias: &str) -> OrmResult<Self> {
        let owner_table = self.table_for(owner_alias).ok_or_else(|| {
            ModelError::Query(format!("unknown alias '{}' in fetch plan", owner_alias))
        })?;
        if owner_table != association.owner {
            return Err(ModelError::Query(format!(
                "association '{}' starts at {}, not {}",
                association.name, association.owner.name, owner_table.name
            )));
        }
        if self.table_for(alias).is_some() {
            return Err(ModelError::Query(format!("alias '{}' is already used", alias)));
        }

        if association.kind.is_collection() {
            if let Some(existing) = self.collection() {
                return Err(ModelError::CollectionFetchLimit(format!(
                    "cannot fetch-join '{}' together with '{}'; at most one collection per query",
                    association.name, existing.association.name
                )));
            }
        }

        self.joins.push(FetchJoin {
            association,
            owner_alias: owner_alias.to_string(),
            alias: alias.to_string(),
        });
        Ok(self)
    }

    fn table_for(&self, alias: &str) -> Option<Table> {
        if alias == self.root_alias {
            return Some(self.root);
        }
        self.joins
            .iter()
            .find(|join| join.alias == alias)
            .map(|join| join.association.target)
    }

    pub fn joins(&self) -> &[FetchJoin] {
        &self.joins
    }

    /// The joined to-many association, if any
    pub fn collection(&self) -> Option<&FetchJoin> {
        self.joins.iter().find(|join| join.association.kind.is_collection())
    }

    pub fn multiplies_rows(&self) -> bool {
        self.joins.iter().any(|join| join.association.kind.multiplies_rows())
    }

    /// Paging a multiplied row set cuts through root groups, so such plans
    /// accept no offset or limit at all, not even the default values
    pub fn check_paging(&self, page: &PageRequest) -> OrmResult<()> {
        page.validate()?;
        if self.multiplies_rows() && page.is_supplied() {
            let collection = self.collection().map_or("collection", |join| join.association.name);
            return Err(ModelError::InvalidPaging(format!(
                "offset/limit cannot be applied when '{}' is fetch-joined; rows are multiplied per child",
                collection
            )));
        }
        Ok(())
    }

    /// FROM and LEFT JOIN clauses for the plan; the caller adds the projection.
    /// Joins are outer so a dangling reference surfaces as NULL columns.
    pub fn root_query(&self) -> QueryBuilder {
        self.joins.iter().fold(
            QueryBuilder::new().from_as(self.root.name, &self.root_alias),
            |query, join| {
                let (left, right) = join.association.join_columns(&join.owner_alias, &join.alias);
                query.left_join_as(join.association.target.name, &join.alias, &left, &right)
            },
        )
    }
}
