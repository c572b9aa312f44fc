//! Query Builder SQL generation

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::DatabaseValue;

impl QueryBuilder {
    /// Generate SQL with `$n` placeholders and return the bound parameters
    pub fn to_sql_with_params(&self) -> (String, Vec<DatabaseValue>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        // SELECT clause
        if self.distinct {
            sql.push_str("SELECT DISTINCT ");
        } else {
            sql.push_str("SELECT ");
        }

        if self.select_fields.is_empty() {
            sql.push('*');
        } else {
            let fields: Vec<String> = self.select_fields.iter().map(ToString::to_string).collect();
            sql.push_str(&fields.join(", "));
        }

        // FROM clause
        if let Some(table) = &self.from_table {
            sql.push_str(" FROM ");
            sql.push_str(&table.to_string());
        }

        // JOIN clauses
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.join_type.to_string());
            sql.push(' ');
            sql.push_str(&join.table.to_string());
            sql.push_str(" ON ");
            for (i, (left, right)) in join.on_conditions.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                sql.push_str(&format!("{} = {}", left, right));
            }
        }

        self.build_where_clause(&mut sql, &mut params);
        self.build_order_limit_clause(&mut sql);

        (sql, params)
    }

    /// SQL text only, for logging
    pub fn to_sql(&self) -> String {
        self.to_sql_with_params().0
    }

    fn build_where_clause(&self, sql: &mut String, params: &mut Vec<DatabaseValue>) {
        if self.where_conditions.is_empty() {
            return;
        }

        sql.push_str(" WHERE ");
        for (i, condition) in self.where_conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }

            match condition.operator {
                QueryOperator::In if condition.values.is_empty() => {
                    // An empty IN list is not valid SQL and matches nothing
                    sql.push_str("1 = 0");
                }
                QueryOperator::In => {
                    sql.push_str(&condition.column);
                    sql.push_str(" IN (");
                    for (j, value) in condition.values.iter().enumerate() {
                        if j > 0 {
                            sql.push_str(", ");
                        }
                        params.push(value.clone());
                        sql.push_str(&format!("${}", params.len()));
                    }
                    sql.push(')');
                }
                QueryOperator::IsNull | QueryOperator::IsNotNull => {
                    sql.push_str(&condition.column);
                    sql.push(' ');
                    sql.push_str(&condition.operator.to_string());
                }
                _ => {
                    sql.push_str(&condition.column);
                    sql.push(' ');
                    sql.push_str(&condition.operator.to_string());
                    if let Some(value) = &condition.value {
                        params.push(value.clone());
                        sql.push_str(&format!(" ${}", params.len()));
                    }
                }
            }
        }
    }

    fn build_order_limit_clause(&self, sql: &mut String) {
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            sql.push_str(&clauses.join(", "));
        }

        if let Some(limit) = self.limit_count {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_one_join_query_sql() {
        let query = QueryBuilder::new()
            .select("o.order_id, m.name AS member_name, d.city")
            .from_as("orders", "o")
            .left_join_as("member", "m", "o.member_id", "m.member_id")
            .left_join_as("delivery", "d", "o.delivery_id", "d.delivery_id")
            .where_eq("o.status", "ORDERED")
            .where_like("m.name", "%user%")
            .order_by("o.order_id")
            .paginate(10, 5);

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(
            sql,
            "SELECT o.order_id, m.name AS member_name, d.city FROM orders o \
             LEFT JOIN member m ON o.member_id = m.member_id \
             LEFT JOIN delivery d ON o.delivery_id = d.delivery_id \
             WHERE o.status = $1 AND m.name LIKE $2 \
             ORDER BY o.order_id ASC LIMIT 5 OFFSET 10"
        );
        assert_eq!(params, vec![DatabaseValue::from("ORDERED"), DatabaseValue::from("%user%")]);
    }

    #[test]
    fn test_in_clause_placeholders_continue_numbering() {
        let query = QueryBuilder::new()
            .select("oi.order_id")
            .from_as("order_item", "oi")
            .where_eq("oi.count", 2)
            .where_in("oi.order_id", vec![4i64, 11]);

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(
            sql,
            "SELECT oi.order_id FROM order_item oi WHERE oi.count = $1 AND oi.order_id IN ($2, $3)"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_in_list_renders_false_predicate() {
        let query = QueryBuilder::new().from("order_item").where_in("order_id", Vec::<i64>::new());
        assert_eq!(query.to_sql(), "SELECT * FROM order_item WHERE 1 = 0");
    }

    #[test]
    fn test_distinct_and_null_checks() {
        let query = QueryBuilder::new()
            .select_distinct("o.order_id")
            .from_as("orders", "o")
            .where_not_null("o.delivery_id");
        assert_eq!(
            query.to_sql(),
            "SELECT DISTINCT o.order_id FROM orders o WHERE o.delivery_id IS NOT NULL"
        );
    }
}
