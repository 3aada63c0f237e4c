use sqlx::SqlitePool;
use tracing::info;

use super::models::{ContactMessage, SubmitMessageRequest};
use super::validators::ContactMessageValidator;
use crate::common::{
    clean_optional, generate_id, normalize_email, now_rfc3339, safe_email_log, ApiError,
    EntityPrefix, Validator,
};

const MESSAGE_COLUMNS: &str =
    "id, name, email, phone, subject, message, is_read, created_at, updated_at";

pub struct ContactMessageService {
    db: SqlitePool,
}

impl ContactMessageService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn submit(&self, request: SubmitMessageRequest) -> Result<ContactMessage, ApiError> {
        ContactMessageValidator.validate(&request).into_result()?;

        let id = generate_id(EntityPrefix::Message);
        let now = now_rfc3339();
        let email = normalize_email(&request.email);

        sqlx::query(
            r#"
            INSERT INTO contact_messages (id, name, email, phone, subject, message, is_read, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(request.name.trim())
        .bind(&email)
        .bind(clean_optional(request.phone))
        .bind(request.subject.trim())
        .bind(request.message.trim())
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(message_id = %id, email = %safe_email_log(&email), "Contact message received");
        self.get_message(&id).await
    }

    /// Newest first
    pub async fn list(&self, unread_only: bool) -> Result<Vec<ContactMessage>, ApiError> {
        let messages = sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {} FROM contact_messages WHERE (? = 0 OR is_read = 0) ORDER BY created_at DESC",
            MESSAGE_COLUMNS
        ))
        .bind(unread_only)
        .fetch_all(&self.db)
        .await?;

        Ok(messages)
    }

    pub async fn get_message(&self, id: &str) -> Result<ContactMessage, ApiError> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {} FROM contact_messages WHERE id = ?",
            MESSAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))
    }

    pub async fn unread_count(&self) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM contact_messages WHERE is_read = 0",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    pub async fn set_read(&self, id: &str, is_read: bool) -> Result<ContactMessage, ApiError> {
        let result = sqlx::query("UPDATE contact_messages SET is_read = ?, updated_at = ? WHERE id = ?")
            .bind(is_read)
            .bind(now_rfc3339())
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Message not found".to_string()));
        }
        self.get_message(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Message not found".to_string()));
        }

        info!(message_id = %id, "Contact message deleted");
        Ok(())
    }
}
