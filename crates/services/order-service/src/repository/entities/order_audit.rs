//! Order audit database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, OrderAudit, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "order_audits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub actor_user_id: Option<i64>,
    pub from_status: Option<String>,
    pub to_status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub payload: Option<Json>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorUserId",
        to = "super::user::Column::Id"
    )]
    Actor,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for OrderAudit {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(OrderAudit {
            id: model.id,
            order_id: model.order_id,
            actor_user_id: model.actor_user_id,
            from_status: model
                .from_status
                .as_deref()
                .map(str::parse::<OrderStatus>)
                .transpose()?,
            to_status: model.to_status.parse()?,
            reason: model.reason,
            payload: model.payload,
            created_at: model.created_at,
        })
    }
}
