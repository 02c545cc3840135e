//! Repository functions for contact-form inquiries.

use sqlx::PgPool;

use crate::models::contact::ContactMessage;

pub async fn insert_contact_message(
    pool: &PgPool,
    message: &ContactMessage,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contact_messages (id, name, email, message, ip_address, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&message.id)
    .bind(&message.name)
    .bind(&message.email)
    .bind(&message.message)
    .bind(&message.ip_address)
    .bind(message.created_at)
    .execute(pool)
    .await
    .map(|_| ())
}
