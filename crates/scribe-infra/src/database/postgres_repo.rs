//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use uuid::Uuid;

use scribe_core::domain::{Category, Post, User};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    CategoryFilter, CategoryRepository, PageRequest, PostFilter, PostRepository, TextMatch,
    UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Translate a [`TextMatch`] into SQL conditions on `col`.
fn text_condition<C: ColumnTrait>(col: C, m: &TextMatch) -> Condition {
    let mut cond = Condition::all();
    if let Some(eq) = &m.eq {
        cond = cond.add(col.eq(eq.as_str()));
    }
    if let Some(needle) = &m.contains {
        cond = cond.add(col.contains(needle.as_str()));
    }
    cond
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn list(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> Result<Vec<Category>, RepoError> {
        let mut query = CategoryEntity::find().filter(category::Column::IsDeleted.eq(false));

        if let Some(name) = &filter.name {
            query = query.filter(text_condition(category::Column::Name, name));
        }
        if let Some(level) = filter.level {
            query = query.filter(category::Column::Level.eq(level));
        }
        if let Some(parent_id) = filter.parent_id {
            query = query.filter(category::Column::ParentId.eq(parent_id));
        }

        // Materialized path gives depth-first tree order with siblings by name.
        let rows = query
            .order_by_asc(category::Column::Path)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_owned(&self, id: Uuid, author_id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::AuthorId.eq(author_id))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn find_by_author_and_title(
        &self,
        author_id: Uuid,
        title: &str,
    ) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::Title.eq(title))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find().filter(post::Column::IsDeleted.eq(false));

        if let Some(title) = &filter.title {
            query = query.filter(text_condition(post::Column::Title, title));
        }
        if let Some(author_username) = &filter.author_username {
            query = query
                .join(JoinType::InnerJoin, post::Relation::User.def())
                .filter(text_condition(user::Column::Username, author_username));
        }
        if let Some(category_name) = &filter.category_name {
            query = query
                .join(JoinType::InnerJoin, post::Relation::Category.def())
                .filter(text_condition(category::Column::Name, category_name));
        }

        let rows = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .filter(post::Column::IsDeleted.eq(false))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
