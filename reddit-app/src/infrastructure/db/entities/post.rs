use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub community_id: String,
    pub creator_id: String,
    pub creator_display_name: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub vote_status: i64,
    pub number_of_comments: i64,
    pub created_at: DateTimeUtc,
    pub community_image_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::community::Entity",
        from = "Column::CommunityId",
        to = "super::community::Column::Id",
        on_delete = "Cascade"
    )]
    Community,
    #[sea_orm(has_many = "super::post_vote::Entity")]
    Votes,
}

impl Related<super::community::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Community.def()
    }
}

impl Related<super::post_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::Post {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            community_id: m.community_id,
            creator_id: m.creator_id,
            creator_display_name: m.creator_display_name,
            title: m.title,
            body: m.body,
            link: m.link,
            image_url: m.image_url,
            vote_status: m.vote_status,
            number_of_comments: m.number_of_comments,
            created_at: m.created_at,
            community_image_url: m.community_image_url,
        }
    }
}
