//! Typed storage query → SeaORM condition and ordering
//!
//! Mirrors the in-memory semantics of [`StorageQuery::apply`]. Text comparisons
//! apply the store's `LOWER` to both the column and the bound value, so the
//! database folds both sides the same way whatever its collation. The keyword
//! is a `LIKE` substring match with `%`, `_` and `!` escaped.

use super::entity::{self, module_destination, module_source};
use crate::domain::query::{SortDirection, SortField, StorageFilter, StorageQuery};
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, Query, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, Order, Value};

const LIKE_ESCAPE: char = '!';

/// `LOWER(column)`
pub fn lower<C: IntoColumnRef>(column: C) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

/// `LOWER($value)`
pub fn lower_value<V: Into<Value>>(value: V) -> SimpleExpr {
    Func::lower(Expr::val(value)).into()
}

/// `LOWER(column) LIKE LOWER('%keyword%') ESCAPE '!'`
fn contains<C: IntoColumnRef>(column: C, keyword: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(keyword));
    Expr::cust_with_exprs(
        format!("LOWER($1) LIKE LOWER($2) ESCAPE '{}'", LIKE_ESCAPE),
        [Expr::col(column).into(), Expr::val(pattern).into()],
    )
}

/// Full WHERE clause for a query, including the active-row restriction
pub fn condition(query: &StorageQuery) -> Condition {
    let mut condition = Condition::all().add(entity::Column::IsDeleted.eq(false));

    for filter in &query.filters {
        condition = condition.add(filter_expr(filter));
    }

    if let Some(keyword) = &query.keyword {
        condition = condition.add(
            Condition::any()
                .add(contains(entity::Column::Code, keyword))
                .add(contains(entity::Column::Name, keyword)),
        );
    }

    condition
}

fn filter_expr(filter: &StorageFilter) -> SimpleExpr {
    match filter {
        StorageFilter::Id(id) => entity::Column::Id.eq(*id),
        StorageFilter::Code(code) => lower(entity::Column::Code).eq(lower_value(code.clone())),
        StorageFilter::Name(name) => lower(entity::Column::Name).eq(lower_value(name.clone())),
        StorageFilter::ModuleSourceCode(code) => entity::Column::Id.in_subquery(
            Query::select()
                .column(module_source::Column::StorageId)
                .from(module_source::Entity)
                .and_where(
                    lower(module_source::Column::ModuleCode).eq(lower_value(code.clone())),
                )
                .to_owned(),
        ),
        StorageFilter::ModuleDestinationCode(code) => entity::Column::Id.in_subquery(
            Query::select()
                .column(module_destination::Column::StorageId)
                .from(module_destination::Entity)
                .and_where(
                    lower(module_destination::Column::ModuleCode).eq(lower_value(code.clone())),
                )
                .to_owned(),
        ),
    }
}

pub fn sort_column(field: SortField) -> entity::Column {
    match field {
        SortField::Id => entity::Column::Id,
        SortField::Code => entity::Column::Code,
        SortField::Name => entity::Column::Name,
        SortField::CreatedUtc => entity::Column::CreatedUtc,
        SortField::LastModifiedUtc => entity::Column::LastModifiedUtc,
    }
}

pub fn sort_order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
