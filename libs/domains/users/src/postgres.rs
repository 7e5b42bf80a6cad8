use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{User, UserId},
    repository::UserRepository,
};

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(UserError::database)?;

        models.into_iter().map(User::try_from).collect()
    }

    async fn get_by_id(&self, id: UserId) -> UserResult<User> {
        entity::Entity::find_by_id(i64::from(id))
            .one(&self.db)
            .await
            .map_err(UserError::database)?
            .ok_or(UserError::NotFound(id))?
            .try_into()
    }

    async fn insert(&self, user: User) -> UserResult<User> {
        let txn = self.db.begin().await.map_err(UserError::database)?;

        // Blocks concurrent inserts until commit so MAX(id) + 1 stays unique.
        txn.execute_unprepared("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .await
            .map_err(UserError::database)?;

        let max_id = entity::Entity::find()
            .select_only()
            .column_as(entity::Column::Id.max(), "max_id")
            .into_tuple::<Option<i64>>()
            .one(&txn)
            .await
            .map_err(UserError::database)?
            .flatten()
            .unwrap_or(0);

        let id = max_id + 1;
        if id > i64::from(UserId::MAX) {
            return Err(UserError::Internal("user id space exhausted".to_string()));
        }

        let now = Utc::now().fixed_offset();
        let model = entity::ActiveModel {
            id: Set(id),
            name: Set(user.name),
            surname: Set(user.surname),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(UserError::database)?;

        txn.commit().await.map_err(UserError::database)?;

        tracing::info!(user_id = model.id, "Created user");
        model.try_into()
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::Name, Expr::value(user.name.clone()))
            .col_expr(entity::Column::Surname, Expr::value(user.surname.clone()))
            .col_expr(
                entity::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(entity::Column::Id.eq(i64::from(user.id)))
            .exec(&self.db)
            .await
            .map_err(UserError::database)?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(user.id));
        }

        tracing::info!(user_id = user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(i64::from(id))
            .exec(&self.db)
            .await
            .map_err(UserError::database)?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn row(id: i64, name: &str, surname: &str) -> entity::Model {
        let now = Utc::now().fixed_offset();
        entity::Model {
            id,
            name: name.to_string(),
            surname: surname.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn max_id(id: Option<i64>) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("max_id", Value::BigInt(id))])
    }

    /// Byte offsets of each needle in the debug-printed log, in order
    fn positions(log: &str, needles: &[&str]) -> Vec<Option<usize>> {
        needles.iter().map(|n| log.find(n)).collect()
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_list_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(1, "John", "Doe"), row(2, "Jane", "Doe")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let users = repo.list().await.unwrap();
        assert_eq!(
            users,
            vec![User::new(1, "John", "Doe"), User::new(2, "Jane", "Doe")]
        );
    }

    #[tokio::test]
    async fn test_insert_assigns_max_plus_one_under_lock() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([[max_id(Some(3))]])
            .append_query_results([[row(4, "John2", "Doe2")]])
            .into_connection();
        let repo = PgUserRepository::new(db.clone());

        let created = repo.insert(User::new(100, "John2", "Doe2")).await.unwrap();
        assert_eq!(created, User::new(4, "John2", "Doe2"));

        let log = format!("{:?}", db.into_transaction_log());
        let found = positions(
            &log,
            &["BEGIN", "LOCK TABLE users", "MAX", "INSERT INTO", "COMMIT"],
        );
        assert!(found.iter().all(Option::is_some), "log: {}", log);
        assert!(found.windows(2).all(|w| w[0] < w[1]), "log: {}", log);
        assert!(log.contains("BigInt(Some(4))"), "log: {}", log);
        assert!(!log.contains("BigInt(Some(100))"), "log: {}", log);
    }

    #[tokio::test]
    async fn test_insert_into_empty_table_starts_at_one() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([[max_id(None)]])
            .append_query_results([[row(1, "First", "User")]])
            .into_connection();
        let repo = PgUserRepository::new(db.clone());

        let created = repo.insert(User::new(0, "First", "User")).await.unwrap();
        assert_eq!(created.id, 1);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("BigInt(Some(1))"), "log: {}", log);
    }

    #[tokio::test]
    async fn test_insert_past_id_space_is_internal_and_rolls_back() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([[max_id(Some(i64::from(UserId::MAX)))]])
            .into_connection();
        let repo = PgUserRepository::new(db.clone());

        let result = repo.insert(User::new(0, "Late", "Comer")).await;
        assert!(matches!(result, Err(UserError::Internal(_))));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("INSERT"), "log: {}", log);
        assert!(!log.contains("COMMIT"), "log: {}", log);
        assert!(log.contains("ROLLBACK"), "log: {}", log);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert!(matches!(
            repo.get_by_id(999).await,
            Err(UserError::NotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_update_zero_rows_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo.update(User::new(42, "A", "B")).await;
        assert!(matches!(result, Err(UserError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_update_returns_new_value() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let updated = repo.update(User::new(1, "Johnny", "Doe")).await.unwrap();
        assert_eq!(updated, User::new(1, "Johnny", "Doe"));
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_database_failure_is_internal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert!(matches!(repo.list().await, Err(UserError::Internal(_))));
    }
}
