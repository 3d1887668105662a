use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Allocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Allocations::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Allocations::CampaignId).uuid().not_null())
                    .col(ColumnDef::new(Allocations::VendorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Allocations::AllocatedUnits)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Allocations::DeliveredUnits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Allocations::PaymentStatus)
                            .string_len(32)
                            .not_null()
                            .default("unpaid"),
                    )
                    .col(ColumnDef::new(Allocations::Cost).decimal().null())
                    .col(
                        ColumnDef::new(Allocations::LastDeliveryAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Allocations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Allocations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allocations_campaign_id")
                            .from(Allocations::Table, Allocations::CampaignId)
                            .to(
                                super::m20250301_000004_create_campaigns_table::Campaigns::Table,
                                super::m20250301_000004_create_campaigns_table::Campaigns::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allocations_vendor_id")
                            .from(Allocations::Table, Allocations::VendorId)
                            .to(
                                super::m20250301_000002_create_vendors_table::Vendors::Table,
                                super::m20250301_000002_create_vendors_table::Vendors::Id,
                            )
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Allocations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Allocations {
    Table,
    Id,
    CampaignId,
    VendorId,
    AllocatedUnits,
    DeliveredUnits,
    PaymentStatus,
    Cost,
    LastDeliveryAt,
    CreatedAt,
    UpdatedAt,
}
