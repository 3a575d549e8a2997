use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per OHLC bar, keyed by the raw timestamp string
        manager
            .create_table(
                Table::create()
                    .table(PriceBars::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PriceBars::Timestamp).string().not_null().primary_key())
                    .col(ColumnDef::new(PriceBars::Open).double().not_null())
                    .col(ColumnDef::new(PriceBars::High).double().not_null())
                    .col(ColumnDef::new(PriceBars::Low).double().not_null())
                    .col(ColumnDef::new(PriceBars::Close).double().not_null())
                    .col(ColumnDef::new(PriceBars::Dt).string().not_null()) // calendar date label, not unique
                    .col(ColumnDef::new(PriceBars::Time).double().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_price_bars_dt")
                    .table(PriceBars::Table)
                    .col(PriceBars::Dt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceBars::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PriceBars {
    Table,
    Timestamp,
    Open,
    High,
    Low,
    Close,
    Dt,
    Time,
}
