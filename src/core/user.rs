//! Customer directory - find-or-create users by email.

use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::debug;

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};

/// Normalizes an email to its stored form.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Looks up a user by email.
pub async fn find_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user registered under `email`, creating one if none exists.
///
/// An existing user's name and phone are never overwritten. The insert ignores a unique
/// conflict on email so that two concurrent first bookings resolve to the same row.
pub async fn resolve_user<C>(db: &C, name: &str, email: &str, phone: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let email = normalize_email(email);
    if let Some(existing) = find_user_by_email(db, &email).await? {
        return Ok(existing);
    }

    let new_user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.clone()),
        phone: Set(phone.trim().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    User::insert(new_user)
        .on_conflict(
            OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    debug!(%email, "Registered new user");

    find_user_by_email(db, &email)
        .await?
        .ok_or_else(|| Error::PersistenceFailure(DbErr::RecordNotFound(email)))
}
