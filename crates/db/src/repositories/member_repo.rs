use sqlx::PgPool;

use kintree_core::types::DbId;

use crate::models::member::{CreateMember, FamilyMember, PositionUpdate, UpdateMember};

const COLUMNS: &str = "id, tree_id, first_name, last_name, nickname, gender, birth_date, \
     death_date, birth_place, death_place, occupation, bio, profile_picture_path, \
     position_x, position_y, created_at, updated_at";

/// Repository for family member CRUD and canvas position updates.
pub struct MemberRepo;

impl MemberRepo {
    pub async fn create(
        pool: &PgPool,
        tree_id: DbId,
        data: &CreateMember,
    ) -> Result<FamilyMember, sqlx::Error> {
        sqlx::query_as::<_, FamilyMember>(&format!(
            "INSERT INTO family_members (tree_id, first_name, last_name, nickname, gender,
                 birth_date, death_date, birth_place, death_place, occupation, bio,
                 position_x, position_y)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        ))
        .bind(tree_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.nickname)
        .bind(data.gender.as_str())
        .bind(data.birth_date)
        .bind(data.death_date)
        .bind(&data.birth_place)
        .bind(&data.death_place)
        .bind(&data.occupation)
        .bind(&data.bio)
        .bind(data.position_x)
        .bind(data.position_y)
        .fetch_one(pool)
        .await
    }

    /// Looks up a member scoped to its tree, so a member id from another
    /// tree can never leak through a tree-level permission check.
    pub async fn find_in_tree(
        pool: &PgPool,
        tree_id: DbId,
        member_id: DbId,
    ) -> Result<Option<FamilyMember>, sqlx::Error> {
        sqlx::query_as::<_, FamilyMember>(&format!(
            "SELECT {COLUMNS} FROM family_members WHERE id = $1 AND tree_id = $2"
        ))
        .bind(member_id)
        .bind(tree_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_tree(
        pool: &PgPool,
        tree_id: DbId,
    ) -> Result<Vec<FamilyMember>, sqlx::Error> {
        sqlx::query_as::<_, FamilyMember>(&format!(
            "SELECT {COLUMNS} FROM family_members WHERE tree_id = $1 ORDER BY id"
        ))
        .bind(tree_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        tree_id: DbId,
        member_id: DbId,
        data: &UpdateMember,
    ) -> Result<Option<FamilyMember>, sqlx::Error> {
        let Some(current) = Self::find_in_tree(pool, tree_id, member_id).await? else {
            return Ok(None);
        };

        let first_name = data.first_name.as_deref().unwrap_or(&current.first_name);
        let last_name = merge(&data.last_name, &current.last_name);
        let nickname = merge(&data.nickname, &current.nickname);
        let gender = data
            .gender
            .map(|g| g.as_str())
            .unwrap_or(current.gender.as_str());
        let birth_date = data.birth_date.unwrap_or(current.birth_date);
        let death_date = data.death_date.unwrap_or(current.death_date);
        let birth_place = merge(&data.birth_place, &current.birth_place);
        let death_place = merge(&data.death_place, &current.death_place);
        let occupation = merge(&data.occupation, &current.occupation);
        let bio = merge(&data.bio, &current.bio);
        let profile_picture_path = merge(&data.profile_picture_path, &current.profile_picture_path);
        let position_x = data.position_x.unwrap_or(current.position_x);
        let position_y = data.position_y.unwrap_or(current.position_y);

        sqlx::query_as::<_, FamilyMember>(&format!(
            "UPDATE family_members
             SET first_name = $3, last_name = $4, nickname = $5, gender = $6,
                 birth_date = $7, death_date = $8, birth_place = $9, death_place = $10,
                 occupation = $11, bio = $12, profile_picture_path = $13,
                 position_x = $14, position_y = $15, updated_at = NOW()
             WHERE id = $1 AND tree_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(member_id)
        .bind(tree_id)
        .bind(first_name)
        .bind(last_name)
        .bind(nickname)
        .bind(gender)
        .bind(birth_date)
        .bind(death_date)
        .bind(birth_place)
        .bind(death_place)
        .bind(occupation)
        .bind(bio)
        .bind(profile_picture_path)
        .bind(position_x)
        .bind(position_y)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_in_tree(
        pool: &PgPool,
        tree_id: DbId,
        member_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM family_members WHERE id = $1 AND tree_id = $2")
            .bind(member_id)
            .bind(tree_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_profile_picture(
        pool: &PgPool,
        member_id: DbId,
        path: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE family_members SET profile_picture_path = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(member_id)
        .bind(path)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Applies a batch of canvas positions in one transaction. Each row is
    /// scoped to the tree, so ids from other trees are silently skipped
    /// rather than written. Returns the number of rows actually updated.
    /// Returns the ids whose position was actually written; entries naming
    /// a member outside the tree match zero rows and are skipped.
    pub async fn bulk_set_positions(
        pool: &PgPool,
        tree_id: DbId,
        updates: &[PositionUpdate],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut applied = Vec::with_capacity(updates.len());
        for update in updates {
            let result = sqlx::query(
                "UPDATE family_members
                 SET position_x = $3, position_y = $4, updated_at = NOW()
                 WHERE id = $1 AND tree_id = $2",
            )
            .bind(update.id)
            .bind(tree_id)
            .bind(update.position_x)
            .bind(update.position_y)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() > 0 {
                applied.push(update.id);
            }
        }
        tx.commit().await?;
        Ok(applied)
    }

    /// Collects every stored file path belonging to the member, for
    /// cleaning up storage after a delete.
    pub async fn file_paths_for_member(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT profile_picture_path FROM family_members
                 WHERE id = $1 AND profile_picture_path IS NOT NULL
             UNION ALL
             SELECT file_path FROM photos WHERE member_id = $1
             UNION ALL
             SELECT file_path FROM documents WHERE member_id = $1
             UNION ALL
             SELECT file_path FROM audio_clips WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(path,)| path).collect())
    }

    /// Same collection across a whole tree, for tree deletion.
    pub async fn file_paths_for_tree(
        pool: &PgPool,
        tree_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT m.profile_picture_path FROM family_members m
                 WHERE m.tree_id = $1 AND m.profile_picture_path IS NOT NULL
             UNION ALL
             SELECT p.file_path FROM photos p
                 JOIN family_members m ON m.id = p.member_id WHERE m.tree_id = $1
             UNION ALL
             SELECT d.file_path FROM documents d
                 JOIN family_members m ON m.id = d.member_id WHERE m.tree_id = $1
             UNION ALL
             SELECT a.file_path FROM audio_clips a
                 JOIN family_members m ON m.id = a.member_id WHERE m.tree_id = $1",
        )
        .bind(tree_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(path,)| path).collect())
    }
}

/// Double-option merge: `None` keeps the current value, `Some(v)` replaces it
/// (including `Some(None)` to clear).
fn merge<'a, T>(update: &'a Option<Option<T>>, current: &'a Option<T>) -> Option<&'a T> {
    match update {
        Some(value) => value.as_ref(),
        None => current.as_ref(),
    }
}
