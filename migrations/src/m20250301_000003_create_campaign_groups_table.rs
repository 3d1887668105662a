use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CampaignGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CampaignGroups::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CampaignGroups::ClientId).uuid().not_null())
                    .col(ColumnDef::new(CampaignGroups::Name).string().not_null())
                    .col(ColumnDef::new(CampaignGroups::Notes).text().null())
                    .col(
                        ColumnDef::new(CampaignGroups::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CampaignGroups::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaign_groups_client_id")
                            .from(CampaignGroups::Table, CampaignGroups::ClientId)
                            .to(
                                super::m20250301_000001_create_clients_table::Clients::Table,
                                super::m20250301_000001_create_clients_table::Clients::Id,
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
            .drop_table(Table::drop().table(CampaignGroups::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CampaignGroups {
    Table,
    Id,
    ClientId,
    Name,
    Notes,
    CreatedAt,
    UpdatedAt,
}
