//! Order database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, Order, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "Text")]
    pub game_name: String,
    pub amount_cents: i64,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub duration_hours: Decimal,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub boss_kook_id: String,
    #[sea_orm(column_type = "Text")]
    pub boss_kook_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub player_kook_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub player_kook_name: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub extra: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_audit::Entity")]
    OrderAudit,
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipt,
}

impl Related<super::order_audit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderAudit.def()
    }
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity.
///
/// Fails only on a status value outside the enum, which means the row
/// was written by something other than this service.
impl TryFrom<Model> for Order {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let mut duration_hours = model.duration_hours;
        duration_hours.rescale(domain::DURATION_SCALE);

        let extra = match model.extra {
            Json::Object(map) => map,
            _ => Default::default(),
        };

        Ok(Order {
            id: model.id,
            game_name: model.game_name,
            amount_cents: model.amount_cents,
            duration_hours,
            status: model.status.parse::<OrderStatus>()?,
            boss_kook_id: model.boss_kook_id,
            boss_kook_name: model.boss_kook_name,
            player_kook_id: model.player_kook_id,
            player_kook_name: model.player_kook_name,
            extra,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
