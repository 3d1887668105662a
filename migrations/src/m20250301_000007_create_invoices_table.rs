use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::InvoiceNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Invoices::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Invoices::CampaignId).uuid().null())
                    .col(ColumnDef::new(Invoices::Amount).decimal().not_null())
                    .col(
                        ColumnDef::new(Invoices::Currency)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                    .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(Invoices::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Invoices::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Invoices::Notes).text().null())
                    .col(
                        ColumnDef::new(Invoices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_client_id")
                            .from(Invoices::Table, Invoices::ClientId)
                            .to(
                                super::m20250301_000001_create_clients_table::Clients::Table,
                                super::m20250301_000001_create_clients_table::Clients::Id,
                            )
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    // Billing history outlives any campaign row.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_campaign_id")
                            .from(Invoices::Table, Invoices::CampaignId)
                            .to(
                                super::m20250301_000004_create_campaigns_table::Campaigns::Table,
                                super::m20250301_000004_create_campaigns_table::Campaigns::Id,
                            )
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Invoices {
    Table,
    Id,
    InvoiceNumber,
    ClientId,
    CampaignId,
    Amount,
    Currency,
    IssueDate,
    DueDate,
    Status,
    PaidAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}
