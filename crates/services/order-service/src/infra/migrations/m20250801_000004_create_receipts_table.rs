//! Migration: completion receipts.

use sea_orm_migration::prelude::*;

use super::m20250801_000002_create_orders_table::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Receipts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Receipts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Receipts::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(Receipts::ReceiptType).string_len(16).not_null())
                    .col(ColumnDef::new(Receipts::Payload).json().not_null())
                    .col(
                        ColumnDef::new(Receipts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_receipts_order_id")
                            .from(Receipts::Table, Receipts::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_receipts_order_id")
                    .table(Receipts::Table)
                    .col(Receipts::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Receipts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Receipts {
    Table,
    Id,
    OrderId,
    #[iden = "type"]
    ReceiptType,
    Payload,
    CreatedAt,
}
