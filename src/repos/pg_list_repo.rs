/*
 * Responsibility
 * - ListRepo の PostgreSQL 実装 (SQLx)
 * - "listId" の FK (ON DELETE CASCADE) 前提でリスト削除 → アイテム削除
 * - アイテムの所有者チェックは lists との JOIN で 1 文にまとめる
 *   (チェックと書き込みの間に割り込まれない)
 */
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::{
    error::RepoResult,
    list_repo::{ItemPatch, ItemRow, ListPatch, ListRepo, ListRow, ListWithItems, attach_items},
};

#[derive(Clone, Debug)]
pub struct PgListRepo {
    pool: PgPool,
}

impl PgListRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Items of one list, only if the list belongs to owner_id.
    async fn items_of(&self, list_id: Uuid, owner_id: &str) -> RepoResult<Vec<ItemRow>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT
                i.id, i.name, i.completed, i."listId", i."createdAt", i."updatedAt"
            FROM list_items i
            JOIN lists l ON l.id = i."listId"
            WHERE i."listId" = $1 AND l."ownerId" = $2
            ORDER BY i."createdAt" ASC, i.id ASC
            "#,
        )
        .bind(list_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl ListRepo for PgListRepo {
    async fn list_all(&self, owner_id: &str) -> RepoResult<Vec<ListWithItems>> {
        let lists = sqlx::query_as::<_, ListRow>(
            r#"
            SELECT
                id, name, description, "ownerId", "createdAt", "updatedAt"
            FROM lists
            WHERE "ownerId" = $1
            ORDER BY "createdAt" DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        if lists.is_empty() {
            return Ok(Vec::new());
        }

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT
                i.id, i.name, i.completed, i."listId", i."createdAt", i."updatedAt"
            FROM list_items i
            JOIN lists l ON l.id = i."listId"
            WHERE l."ownerId" = $1
            ORDER BY i."createdAt" ASC, i.id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attach_items(lists, items))
    }

    async fn get_one(&self, list_id: Uuid, owner_id: &str) -> RepoResult<Option<ListWithItems>> {
        let list = sqlx::query_as::<_, ListRow>(
            r#"
            SELECT
                id, name, description, "ownerId", "createdAt", "updatedAt"
            FROM lists
            WHERE id = $1 AND "ownerId" = $2
            "#,
        )
        .bind(list_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(list) = list else {
            return Ok(None);
        };

        let items = self.items_of(list.id, owner_id).await?;
        Ok(Some(ListWithItems { list, items }))
    }

    async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<ListWithItems> {
        let list = sqlx::query_as::<_, ListRow>(
            r#"
            INSERT INTO lists (name, description, "ownerId")
            VALUES ($1, $2, $3)
            RETURNING
                id, name, description, "ownerId", "createdAt", "updatedAt"
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ListWithItems {
            list,
            items: Vec::new(),
        })
    }

    async fn update(
        &self,
        list_id: Uuid,
        owner_id: &str,
        patch: &ListPatch,
    ) -> RepoResult<Option<ListWithItems>> {
        if patch.is_empty() {
            return self.get_one(list_id, owner_id).await;
        }

        let list = sqlx::query_as::<_, ListRow>(
            r#"
            UPDATE lists
            SET
                name = COALESCE($3, name),
                description = CASE
                    WHEN $4 = false THEN description
                    ELSE $5
                END,
                "updatedAt" = now()
            WHERE id = $1 AND "ownerId" = $2
            RETURNING
                id, name, description, "ownerId", "createdAt", "updatedAt"
            "#,
        )
        .bind(list_id)
        .bind(owner_id)
        .bind(patch.name.as_deref())
        .bind(patch.description.is_some()) // $4: flag to set description
        .bind(patch.description.clone().flatten()) // $5: new description value
        .fetch_optional(&self.pool)
        .await?;

        let Some(list) = list else {
            return Ok(None);
        };

        let items = self.items_of(list.id, owner_id).await?;
        Ok(Some(ListWithItems { list, items }))
    }

    async fn delete(&self, list_id: Uuid, owner_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM lists
            WHERE id = $1 AND "ownerId" = $2
            "#,
        )
        .bind(list_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_item(
        &self,
        list_id: Uuid,
        owner_id: &str,
        name: &str,
    ) -> RepoResult<Option<ItemRow>> {
        // Inserts nothing (and returns no row) unless the list is owned by owner_id.
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO list_items (name, "listId")
            SELECT $3, l.id
            FROM lists l
            WHERE l.id = $1 AND l."ownerId" = $2
            RETURNING
                id, name, completed, "listId", "createdAt", "updatedAt"
            "#,
        )
        .bind(list_id)
        .bind(owner_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_item(
        &self,
        item_id: Uuid,
        owner_id: &str,
        patch: &ItemPatch,
    ) -> RepoResult<Option<ItemRow>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE list_items AS i
            SET
                name = COALESCE($3, i.name),
                completed = COALESCE($4, i.completed),
                "updatedAt" = CASE
                    WHEN $5 = true THEN i."updatedAt"
                    ELSE now()
                END
            FROM lists AS l
            WHERE i.id = $1
                AND l.id = i."listId"
                AND l."ownerId" = $2
            RETURNING
                i.id, i.name, i.completed, i."listId", i."createdAt", i."updatedAt"
            "#,
        )
        .bind(item_id)
        .bind(owner_id)
        .bind(patch.name.as_deref())
        .bind(patch.completed)
        .bind(patch.is_empty()) // $5: keep updatedAt on an empty patch
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn remove_item(&self, item_id: Uuid, owner_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM list_items AS i
            USING lists AS l
            WHERE i.id = $1
                AND l.id = i."listId"
                AND l."ownerId" = $2
            "#,
        )
        .bind(item_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// Needs a live PostgreSQL (CI runs these against a service container):
//   DATABASE_URL=postgres://... cargo test -- --ignored
#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn lists_are_invisible_to_other_owners(pool: PgPool) {
        let repo = PgListRepo::new(pool);
        let created = repo.create("user_a", "Groceries", None).await.unwrap();
        let item = repo
            .add_item(created.list.id, "user_a", "Milk")
            .await
            .unwrap()
            .unwrap();

        assert!(repo.get_one(created.list.id, "user_b").await.unwrap().is_none());
        assert!(repo.list_all("user_b").await.unwrap().is_empty());
        assert!(
            repo.add_item(created.list.id, "user_b", "Eggs")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.update_item(item.id, "user_b", &ItemPatch {
                completed: Some(true),
                ..Default::default()
            })
            .await
            .unwrap()
            .is_none()
        );
        assert!(!repo.remove_item(item.id, "user_b").await.unwrap());
        assert!(!repo.delete(created.list.id, "user_b").await.unwrap());

        let mine = repo.get_one(created.list.id, "user_a").await.unwrap().unwrap();
        assert_eq!(mine.items.len(), 1);
        assert!(!mine.items[0].completed);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn deleting_a_list_cascades_to_items(pool: PgPool) {
        let repo = PgListRepo::new(pool.clone());
        let created = repo.create("user_a", "Chores", Some("weekly")).await.unwrap();
        let item = repo
            .add_item(created.list.id, "user_a", "Laundry")
            .await
            .unwrap()
            .unwrap();

        assert!(repo.delete(created.list.id, "user_a").await.unwrap());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM list_items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(
            repo.update_item(item.id, "user_a", &ItemPatch::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn partial_update_keeps_other_fields(pool: PgPool) {
        let repo = PgListRepo::new(pool);
        let created = repo
            .create("user_a", "Groceries", Some("saturday"))
            .await
            .unwrap();

        let renamed = repo
            .update(created.list.id, "user_a", &ListPatch {
                name: Some("Market".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.list.name, "Market");
        assert_eq!(renamed.list.description.as_deref(), Some("saturday"));

        let cleared = repo
            .update(created.list.id, "user_a", &ListPatch {
                description: Some(None),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.list.name, "Market");
        assert_eq!(cleared.list.description, None);

        let untouched = repo
            .update(created.list.id, "user_a", &ListPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.list, cleared.list);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn item_edge_cases(pool: PgPool) {
        let repo = PgListRepo::new(pool);

        assert!(
            repo.add_item(Uuid::new_v4(), "user_a", "Milk")
                .await
                .unwrap()
                .is_none()
        );

        let list = repo.create("user_a", "Groceries", None).await.unwrap();
        let item = repo
            .add_item(list.list.id, "user_a", "Milk")
            .await
            .unwrap()
            .unwrap();

        let untouched = repo
            .update_item(item.id, "user_a", &ItemPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched, item);

        assert!(repo.remove_item(item.id, "user_a").await.unwrap());
        assert!(!repo.remove_item(item.id, "user_a").await.unwrap());
    }
}
