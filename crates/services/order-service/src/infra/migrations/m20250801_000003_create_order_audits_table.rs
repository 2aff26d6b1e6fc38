//! Migration: append-only order audit trail.

use sea_orm_migration::prelude::*;

use super::m20250801_000001_create_users_table::Users;
use super::m20250801_000002_create_orders_table::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderAudits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderAudits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderAudits::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(OrderAudits::ActorUserId).big_integer().null())
                    .col(ColumnDef::new(OrderAudits::FromStatus).string_len(32).null())
                    .col(ColumnDef::new(OrderAudits::ToStatus).string_len(32).not_null())
                    .col(ColumnDef::new(OrderAudits::Reason).text().null())
                    .col(ColumnDef::new(OrderAudits::Payload).json().null())
                    .col(
                        ColumnDef::new(OrderAudits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_audits_order_id")
                            .from(OrderAudits::Table, OrderAudits::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_audits_actor_user_id")
                            .from(OrderAudits::Table, OrderAudits::ActorUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_audits_order_id")
                    .table(OrderAudits::Table)
                    .col(OrderAudits::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderAudits::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OrderAudits {
    Table,
    Id,
    OrderId,
    ActorUserId,
    FromStatus,
    ToStatus,
    Reason,
    Payload,
    CreatedAt,
}
