use learnflow_core::model::{CompletedCourse, CourseId, Score};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn map_course_row(row: &sqlx::sqlite::SqliteRow) -> Result<CompletedCourse, StorageError> {
    let course_id = CourseId::new(row.try_get::<String, _>("course_id").map_err(ser)?).map_err(ser)?;
    let score = Score::new(row.try_get::<f64, _>("score").map_err(ser)?).map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    Ok(CompletedCourse {
        course_id,
        score,
        completed_at,
    })
}
