use std::sync::Arc;

use super::rows::{self, require, MEMBER_FIELDS};
use crate::backends::DatabasePool;
use crate::error::OrmResult;
use crate::query::QueryBuilder;
use crate::schema::Member;
use crate::session::Session;

/// Read access to members
#[derive(Clone)]
pub struct MemberQueryRepository {
    pool: Arc<dyn DatabasePool>,
}

impl MemberQueryRepository {
    pub fn new(pool: Arc<dyn DatabasePool>) -> Self {
        Self { pool }
    }

    fn base_query() -> QueryBuilder {
        QueryBuilder::new()
            .select(MEMBER_FIELDS)
            .from_as("member", "m")
            .order_by("m.member_id")
    }

    async fn fetch_members(&self, query: QueryBuilder) -> OrmResult<Vec<Member>> {
        let mut session = Session::begin(self.pool.as_ref()).await?;
        let result = match session.fetch_all(&query).await {
            Ok(found) => found
                .iter()
                .filter_map(|row| rows::member(row).transpose())
                .collect::<OrmResult<Vec<_>>>(),
            Err(err) => Err(err),
        };
        session.close(result).await
    }

    pub async fn find_members(&self) -> OrmResult<Vec<Member>> {
        self.fetch_members(Self::base_query()).await
    }

    pub async fn find_member_names(&self) -> OrmResult<Vec<String>> {
        Ok(self
            .find_members()
            .await?
            .into_iter()
            .map(|member| member.name)
            .collect())
    }

    /// `NotFound` when no member has this id
    pub async fn find_one(&self, id: i64) -> OrmResult<Member> {
        let found = self
            .fetch_members(Self::base_query().where_eq("m.member_id", id))
            .await?;
        require(found.into_iter().next(), "member", id)
    }
}
