//! Translation of a resolved [`PostFilter`] into a SeaORM condition.

use sea_orm::sea_query::{Expr, Func, LikeExpr, Query, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, Value};

use inkpress_core::query::PostFilter;

use super::entity::{post, post_tag};

/// `%keyword%` with LIKE metacharacters escaped.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match on a text column.
pub(crate) fn lower_like<C: ColumnTrait>(column: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

fn date_part(part: &str, value: i32) -> SimpleExpr {
    Expr::cust_with_values(
        format!(r#"EXTRACT({part} FROM "posts"."posted_date" AT TIME ZONE 'UTC') = $1"#),
        [Value::from(value)],
    )
}

pub(crate) fn post_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(keyword) = &filter.keyword {
        let pattern = like_pattern(keyword);
        condition = condition.add(
            Condition::any()
                .add(lower_like(post::Column::Title, &pattern))
                .add(lower_like(post::Column::ShortDescription, &pattern))
                .add(lower_like(post::Column::Description, &pattern)),
        );
    }
    if let Some(id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(id));
    }
    if let Some(id) = filter.author_id {
        condition = condition.add(post::Column::AuthorId.eq(id));
    }
    if let Some(id) = filter.tag_id {
        condition = condition.add(
            post::Column::Id.in_subquery(
                Query::select()
                    .column(post_tag::Column::PostId)
                    .from(post_tag::Entity)
                    .and_where(post_tag::Column::TagId.eq(id))
                    .to_owned(),
            ),
        );
    }
    if let Some(year) = filter.year {
        condition = condition.add(date_part("YEAR", year));
    }
    if let Some(month) = filter.month {
        condition = condition.add(date_part("MONTH", month as i32));
    }
    if let Some(now) = filter.published_before {
        condition = condition
            .add(post::Column::Published.eq(true))
            .add(post::Column::PostedDate.lte(now));
    }

    condition
}
