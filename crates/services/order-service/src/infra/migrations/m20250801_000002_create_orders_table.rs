//! Migration: orders table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::GameName).text().not_null())
                    .col(ColumnDef::new(Orders::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Orders::DurationHours).decimal_len(6, 2).not_null())
                    .col(ColumnDef::new(Orders::Status).string_len(32).not_null())
                    .col(ColumnDef::new(Orders::BossKookId).text().not_null())
                    .col(ColumnDef::new(Orders::BossKookName).text().not_null())
                    .col(ColumnDef::new(Orders::PlayerKookId).text().null())
                    .col(ColumnDef::new(Orders::PlayerKookName).text().null())
                    .col(ColumnDef::new(Orders::Extra).json_binary().not_null().default("{}"))
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Orders {
    Table,
    Id,
    GameName,
    AmountCents,
    DurationHours,
    Status,
    BossKookId,
    BossKookName,
    PlayerKookId,
    PlayerKookName,
    Extra,
    CreatedAt,
    UpdatedAt,
}
