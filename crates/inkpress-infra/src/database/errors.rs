//! Mapping from SeaORM errors to storage errors.

use sea_orm::{DbErr, SqlErr};

use inkpress_core::domain::EntityKind;
use inkpress_core::error::RepoError;

/// Errors from plain reads and statements with no constraint to report.
pub(crate) fn query_err(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

/// Errors from inserts and updates that carry a unique slug.
pub(crate) fn write_err(entity: EntityKind, slug: &str) -> impl FnOnce(DbErr) -> RepoError + '_ {
    move |err| classify_write(entity, slug, err.sql_err(), err)
}

/// Errors from deletes, where a foreign-key violation means the row is still referenced.
pub(crate) fn delete_err(entity: EntityKind, id: i32) -> impl FnOnce(DbErr) -> RepoError {
    move |err| classify_delete(entity, id, err.sql_err(), err)
}

/// Errors from `posts_tags` inserts: a duplicate or dangling link is a
/// constraint failure, anything else is a driver failure.
pub(crate) fn link_err(err: DbErr) -> RepoError {
    classify_link(err.sql_err(), err)
}

fn classify_write(entity: EntityKind, slug: &str, sql: Option<SqlErr>, err: DbErr) -> RepoError {
    match sql {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepoError::SlugConflict {
            entity,
            slug: slug.to_string(),
        },
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => RepoError::Constraint(detail),
        _ => query_err(err),
    }
}

fn classify_delete(entity: EntityKind, id: i32, sql: Option<SqlErr>, err: DbErr) -> RepoError {
    match sql {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => RepoError::InUse { entity, id },
        _ => query_err(err),
    }
}

fn classify_link(sql: Option<SqlErr>, err: DbErr) -> RepoError {
    match sql {
        Some(SqlErr::UniqueConstraintViolation(detail))
        | Some(SqlErr::ForeignKeyConstraintViolation(detail)) => RepoError::Constraint(detail),
        _ => query_err(err),
    }
}
