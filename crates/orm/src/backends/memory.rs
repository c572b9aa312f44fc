//! In-memory backend
//!
//! Tables live behind a copy-on-write snapshot. A read transaction captures
//! the snapshot current at `begin_read_only` and evaluates structured queries
//! against it with PostgreSQL semantics for NULL, LIKE and ordering. Every
//! statement is recorded so callers can count round trips exactly.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::core::*;
use super::postgres::POSTGRES_MAX_BIND_PARAMETERS;
use super::DatabaseBackendType;
use crate::error::{ModelError, OrmResult};
use crate::query::{JoinType, OrderDirection, QueryBuilder, QueryOperator, TableRef, WhereCondition};
use crate::schema::{Table, ALL_TABLES};

static NULL: DatabaseValue = DatabaseValue::Null;

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<DatabaseValue>>,
}

impl MemoryTable {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

type Tables = HashMap<String, Arc<MemoryTable>>;

/// Snapshot-isolated in-memory store
#[derive(Debug)]
pub struct MemoryPool {
    tables: RwLock<Arc<Tables>>,
    query_log: Arc<Mutex<Vec<String>>>,
    max_bind_parameters: usize,
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPool {
    /// An empty store with no tables
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Arc::new(HashMap::new())),
            query_log: Arc::new(Mutex::new(Vec::new())),
            max_bind_parameters: POSTGRES_MAX_BIND_PARAMETERS,
        }
    }

    /// A store with the five catalog tables created and empty
    pub fn with_catalog_schema() -> Self {
        let tables = ALL_TABLES
            .iter()
            .map(|table| (table.name.to_string(), Arc::new(empty_table(table))))
            .collect();
        Self {
            tables: RwLock::new(Arc::new(tables)),
            ..Self::new()
        }
    }

    /// Lower the bind-parameter bound, e.g. to exercise chunking
    pub fn with_max_bind_parameters(mut self, limit: usize) -> Self {
        self.max_bind_parameters = limit;
        self
    }

    pub async fn create_table(&self, table: &Table) {
        let mut guard = self.tables.write().await;
        Arc::make_mut(&mut guard)
            .entry(table.name.to_string())
            .or_insert_with(|| Arc::new(empty_table(table)));
    }

    /// Append rows; columns not named in a row are stored as NULL
    pub async fn insert_rows(&self, rows: &[TableRow]) -> OrmResult<u64> {
        let mut guard = self.tables.write().await;
        let tables = Arc::make_mut(&mut guard);

        for row in rows {
            let table = tables
                .get_mut(row.table)
                .ok_or_else(|| ModelError::Query(format!("relation \"{}\" does not exist", row.table)))?;
            let table = Arc::make_mut(table);

            let mut values = vec![DatabaseValue::Null; table.columns.len()];
            for (column, value) in row.columns.iter().zip(&row.values) {
                let index = table.column_index(column).ok_or_else(|| {
                    ModelError::Query(format!("column \"{}\" of relation \"{}\" does not exist", column, row.table))
                })?;
                values[index] = value.clone();
            }
            table.rows.push(values);
        }

        Ok(rows.len() as u64)
    }

    /// Delete every row whose `column` equals `value`
    pub async fn delete_where(&self, table: &str, column: &str, value: impl Into<DatabaseValue>) -> OrmResult<u64> {
        let value = value.into();
        let mut guard = self.tables.write().await;
        let table_data = Arc::make_mut(&mut guard)
            .get_mut(table)
            .ok_or_else(|| ModelError::Query(format!("relation \"{}\" does not exist", table)))?;
        let table_data = Arc::make_mut(table_data);
        let index = table_data
            .column_index(column)
            .ok_or_else(|| ModelError::Query(format!("column \"{}\" does not exist", column)))?;

        let before = table_data.rows.len();
        table_data.rows.retain(|row| !row[index].sql_eq(&value));
        Ok((before - table_data.rows.len()) as u64)
    }

    /// SQL text of every statement executed so far, in order
    pub fn executed_queries(&self) -> Vec<String> {
        self.query_log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn query_count(&self) -> usize {
        self.query_log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn clear_query_log(&self) {
        self.query_log.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

fn empty_table(table: &Table) -> MemoryTable {
    MemoryTable {
        columns: table.columns.iter().map(|c| c.to_string()).collect(),
        rows: Vec::new(),
    }
}

#[async_trait]
impl DatabasePool for MemoryPool {
    async fn begin_read_only(&self) -> OrmResult<Box<dyn DatabaseTransaction>> {
        let snapshot = Arc::clone(&*self.tables.read().await);
        Ok(Box::new(MemoryTransaction {
            snapshot,
            query_log: Arc::clone(&self.query_log),
            max_bind_parameters: self.max_bind_parameters,
        }))
    }

    fn backend_type(&self) -> DatabaseBackendType {
        DatabaseBackendType::Memory
    }

    fn max_bind_parameters(&self) -> usize {
        self.max_bind_parameters
    }

    async fn health_check(&self) -> OrmResult<Duration> {
        let start = Instant::now();
        let _tables = self.tables.read().await;
        Ok(start.elapsed())
    }

    async fn close(&self) -> OrmResult<()> {
        Ok(())
    }
}

struct MemoryTransaction {
    snapshot: Arc<Tables>,
    query_log: Arc<Mutex<Vec<String>>>,
    max_bind_parameters: usize,
}

#[async_trait]
impl DatabaseTransaction for MemoryTransaction {
    async fn fetch_all(&mut self, query: &QueryBuilder) -> OrmResult<Vec<DatabaseRow>> {
        let count = query.parameter_count();
        if count > self.max_bind_parameters {
            return Err(ModelError::ParameterLimitExceeded {
                count,
                limit: self.max_bind_parameters,
            });
        }

        self.query_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_sql());

        evaluate(&self.snapshot, query)
    }

    async fn commit(self: Box<Self>) -> OrmResult<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> OrmResult<()> {
        Ok(())
    }
}

/// (source index, column index)
type ColumnRef = (usize, usize);

/// One row index per source; `None` is the NULL side of a LEFT JOIN
type Tuple = Vec<Option<usize>>;

struct Source<'t> {
    qualifier: String,
    table: &'t MemoryTable,
}

impl<'t> Source<'t> {
    fn open(tables: &'t Tables, table_ref: &TableRef) -> OrmResult<Self> {
        let table = tables
            .get(&table_ref.name)
            .ok_or_else(|| ModelError::Query(format!("relation \"{}\" does not exist", table_ref.name)))?;
        Ok(Self {
            qualifier: table_ref.qualifier().to_string(),
            table: table.as_ref(),
        })
    }
}

fn resolve(sources: &[Source<'_>], column: &str) -> OrmResult<ColumnRef> {
    let missing = || ModelError::Query(format!("column {} does not exist", column));

    match column.split_once('.') {
        Some((qualifier, name)) => {
            let source = sources
                .iter()
                .position(|s| s.qualifier == qualifier)
                .ok_or_else(|| {
                    ModelError::Query(format!("missing FROM-clause entry for table \"{}\"", qualifier))
                })?;
            let index = sources[source].table.column_index(name).ok_or_else(missing)?;
            Ok((source, index))
        }
        None => {
            let matches: Vec<ColumnRef> = sources
                .iter()
                .enumerate()
                .filter_map(|(s, source)| source.table.column_index(column).map(|c| (s, c)))
                .collect();
            match matches.as_slice() {
                [single] => Ok(*single),
                [] => Err(missing()),
                _ => Err(ModelError::Query(format!("column reference \"{}\" is ambiguous", column))),
            }
        }
    }
}

fn value<'t>(sources: &[Source<'t>], tuple: &[Option<usize>], (source, column): ColumnRef) -> &'t DatabaseValue {
    match tuple.get(source).copied().flatten() {
        Some(row) => {
            let table: &'t MemoryTable = sources[source].table;
            &table.rows[row][column]
        }
        None => &NULL,
    }
}

struct Filter<'q> {
    column: ColumnRef,
    condition: &'q WhereCondition,
}

impl Filter<'_> {
    fn matches(&self, sources: &[Source<'_>], tuple: &[Option<usize>]) -> bool {
        let actual = value(sources, tuple, self.column);
        let expected = self.condition.value.as_ref();

        match self.condition.operator {
            QueryOperator::Equal => expected.is_some_and(|v| actual.sql_eq(v)),
            QueryOperator::NotEqual => expected
                .and_then(|v| actual.compare(v))
                .is_some_and(|ordering| ordering != Ordering::Equal),
            QueryOperator::Like => match (actual.as_str(), expected.and_then(DatabaseValue::as_str)) {
                (Some(text), Some(pattern)) => like_match(text, pattern),
                _ => false,
            },
            QueryOperator::In => self.condition.values.iter().any(|v| actual.sql_eq(v)),
            QueryOperator::IsNull => actual.is_null(),
            QueryOperator::IsNotNull => !actual.is_null(),
        }
    }
}

/// PostgreSQL default ordering: NULLs sort last ascending and first descending
fn sort_key_cmp(a: &DatabaseValue, b: &DatabaseValue) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

fn evaluate(tables: &Tables, query: &QueryBuilder) -> OrmResult<Vec<DatabaseRow>> {
    let from = query
        .from_table()
        .ok_or_else(|| ModelError::Query("query has no FROM clause".to_string()))?;

    let mut sources = vec![Source::open(tables, from)?];
    let mut tuples: Vec<Tuple> = (0..sources[0].table.rows.len()).map(|i| vec![Some(i)]).collect();

    for join in query.joins() {
        sources.push(Source::open(tables, &join.table)?);
        let joined = sources.len() - 1;
        let conditions = join
            .on_conditions
            .iter()
            .map(|(left, right)| Ok((resolve(&sources, left)?, resolve(&sources, right)?)))
            .collect::<OrmResult<Vec<_>>>()?;

        let mut next = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            let mut matched = false;
            for row in 0..sources[joined].table.rows.len() {
                let mut candidate = tuple.clone();
                candidate.push(Some(row));
                let satisfied = conditions
                    .iter()
                    .all(|(l, r)| value(&sources, &candidate, *l).sql_eq(value(&sources, &candidate, *r)));
                if satisfied {
                    next.push(candidate);
                    matched = true;
                }
            }
            if !matched && join.join_type == JoinType::Left {
                let mut candidate = tuple;
                candidate.push(None);
                next.push(candidate);
            }
        }
        tuples = next;
    }

    let filters = query
        .where_conditions()
        .iter()
        .map(|condition| {
            Ok(Filter {
                column: resolve(&sources, &condition.column)?,
                condition,
            })
        })
        .collect::<OrmResult<Vec<_>>>()?;
    tuples.retain(|tuple| filters.iter().all(|f| f.matches(&sources, tuple)));

    let ordering = query
        .order_by_clauses()
        .iter()
        .map(|(column, direction)| Ok((resolve(&sources, column)?, *direction)))
        .collect::<OrmResult<Vec<_>>>()?;
    if !ordering.is_empty() {
        tuples.sort_by(|a, b| {
            for (column, direction) in &ordering {
                let ord = sort_key_cmp(value(&sources, a, *column), value(&sources, b, *column));
                let ord = match direction {
                    OrderDirection::Asc => ord,
                    OrderDirection::Desc => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }

    let (labels, columns): (Vec<String>, Vec<ColumnRef>) = if query.select_fields().is_empty() {
        sources
            .iter()
            .enumerate()
            .flat_map(|(s, source)| {
                source
                    .table
                    .columns
                    .iter()
                    .enumerate()
                    .map(move |(c, name)| (name.clone(), (s, c)))
            })
            .unzip()
    } else {
        query
            .select_fields()
            .iter()
            .map(|field| Ok((field.label().to_string(), resolve(&sources, &field.expr)?)))
            .collect::<OrmResult<Vec<_>>>()?
            .into_iter()
            .unzip()
    };

    let mut rows: Vec<Vec<DatabaseValue>> = tuples
        .iter()
        .map(|tuple| columns.iter().map(|c| value(&sources, tuple, *c).clone()).collect())
        .collect();

    if query.is_distinct() {
        let mut seen = HashSet::new();
        rows.retain(|row| seen.insert(format!("{:?}", row)));
    }

    let offset = query.offset_value().unwrap_or(0) as usize;
    let limit = query.limit_count().map_or(usize::MAX, |l| l as usize);

    Ok(rows
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|values| DatabaseRow::new(labels.clone(), values))
        .collect())
}

enum LikeToken {
    AnySequence,
    AnyChar,
    Literal(char),
}

/// SQL LIKE with `%`, `_` and backslash escapes
fn like_match(text: &str, pattern: &str) -> bool {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        tokens.push(match ch {
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            '%' => LikeToken::AnySequence,
            '_' => LikeToken::AnyChar,
            other => LikeToken::Literal(other),
        });
    }

    let text: Vec<char> = text.chars().collect();
    // reachable[j]: the tokens consumed so far match the first j characters
    let mut reachable = vec![false; text.len() + 1];
    reachable[0] = true;

    for token in &tokens {
        let mut next = vec![false; text.len() + 1];
        match token {
            LikeToken::AnySequence => {
                let mut seen = false;
                for j in 0..=text.len() {
                    seen |= reachable[j];
                    next[j] = seen;
                }
            }
            LikeToken::AnyChar => {
                for j in 1..=text.len() {
                    next[j] = reachable[j - 1];
                }
            }
            LikeToken::Literal(c) => {
                for j in 1..=text.len() {
                    next[j] = reachable[j - 1] && text[j - 1] == *c;
                }
            }
        }
        reachable = next;
    }

    reachable[text.len()]
}
