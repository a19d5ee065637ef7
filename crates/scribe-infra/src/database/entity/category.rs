//! Category entity for SeaORM. Self-referential: each row has an optional
//! parent row in the same table, with cached level and materialized path.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use scribe_core::domain::RecordMeta;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub path: String,
    pub is_deleted: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Parent,
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for scribe_core::domain::Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            parent_id: model.parent_id,
            level: model.level,
            path: model.path,
            meta: RecordMeta {
                created_at: model.created_at.into(),
                is_deleted: model.is_deleted,
            },
        }
    }
}

impl From<scribe_core::domain::Category> for ActiveModel {
    fn from(category: scribe_core::domain::Category) -> Self {
        Self {
            id: Set(category.id),
            name: Set(category.name),
            slug: Set(category.slug),
            parent_id: Set(category.parent_id),
            level: Set(category.level),
            path: Set(category.path),
            is_deleted: Set(category.meta.is_deleted),
            created_at: Set(category.meta.created_at.into()),
        }
    }
}
