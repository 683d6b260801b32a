use super::IUserRepo;
use pillbox_domain::{Contact, User, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, user_id: &ID) -> anyhow::Result<Option<User>> {
        let user: Option<UserRaw> = sqlx::query_as(
            r#"
            SELECT user_uid, name, email, push_token, created FROM users
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user.map(User::from))
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    user_uid: Uuid,
    name: String,
    email: String,
    push_token: Option<String>,
    created: i64,
}

impl From<UserRaw> for User {
    fn from(e: UserRaw) -> Self {
        Self {
            id: e.user_uid.into(),
            name: e.name,
            email: e.email,
            push_token: e.push_token,
            created: e.created,
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users(user_uid, name, email, push_token, created)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.inner_ref())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.push_token)
        .bind(user.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        let rows = sqlx::query(
            r#"
            UPDATE users
            SET name = $2,
            email = $3,
            push_token = $4
            WHERE user_uid = $1
            "#,
        )
        .bind(user.id.inner_ref())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.push_token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to update user: {:?}", e);
            e
        })?
        .rows_affected();

        if rows == 0 {
            return Err(anyhow::Error::msg(format!(
                "User with id: {} was not found",
                user.id
            )));
        }
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        match self.fetch_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                error!("Unable to find user: {}. Error: {:?}", user_id, e);
                None
            }
        }
    }

    async fn resolve_contact(&self, user_id: &ID) -> anyhow::Result<Option<Contact>> {
        Ok(self.fetch_user(user_id).await?.map(|user| user.contact()))
    }

    async fn delete(&self, user_id: &ID) -> Option<User> {
        let user: UserRaw = sqlx::query_as(
            r#"
            DELETE FROM users
            WHERE user_uid = $1
            RETURNING user_uid, name, email, push_token, created
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_one(&self.pool)
        .await
        .ok()?;
        Some(user.into())
    }
}
