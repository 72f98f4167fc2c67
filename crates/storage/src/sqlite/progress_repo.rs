use async_trait::async_trait;
use chrono::Utc;
use learnflow_core::model::{CompletedCourse, ProgressDocument, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_course_row};
use crate::repository::{AppendOutcome, ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, user: &UserId) -> Result<Option<ProgressDocument>, StorageError> {
        let exists = sqlx::query("SELECT 1 FROM progress_documents WHERE user_id = ?1")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query(
            r"
                SELECT course_id, score, completed_at
                FROM completed_courses
                WHERE user_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in &rows {
            courses.push(map_course_row(row)?);
        }
        Ok(Some(ProgressDocument::from_courses(courses)))
    }

    async fn append_course(
        &self,
        user: &UserId,
        course: &CompletedCourse,
    ) -> Result<AppendOutcome, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let created = sqlx::query(
            r"
                INSERT INTO progress_documents (user_id, created_at)
                VALUES (?1, ?2)
                ON CONFLICT(user_id) DO NOTHING
            ",
        )
        .bind(user.as_str())
        .bind(course.completed_at.unwrap_or_else(Utc::now))
        .execute(&mut *tx)
        .await
        .map_err(conn)?
        .rows_affected()
            == 1;

        let appended = sqlx::query(
            r"
                INSERT INTO completed_courses (user_id, course_id, score, completed_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id, course_id) DO NOTHING
            ",
        )
        .bind(user.as_str())
        .bind(course.course_id.as_str())
        .bind(course.score.value())
        .bind(course.completed_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?
        .rows_affected()
            == 1;

        tx.commit().await.map_err(conn)?;

        Ok(match (created, appended) {
            (_, false) => AppendOutcome::AlreadyPresent,
            (true, true) => AppendOutcome::Created,
            (false, true) => AppendOutcome::Appended,
        })
    }
}
