use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Campaigns::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Campaigns::CampaignGroupId).uuid().null())
                    .col(ColumnDef::new(Campaigns::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Campaigns::Name).string().not_null())
                    .col(ColumnDef::new(Campaigns::ArtistName).string().not_null())
                    .col(ColumnDef::new(Campaigns::Platform).string_len(32).not_null())
                    .col(ColumnDef::new(Campaigns::TrackUrl).text().null())
                    .col(ColumnDef::new(Campaigns::Goal).big_integer().null())
                    .col(ColumnDef::new(Campaigns::StartDate).date().null())
                    .col(ColumnDef::new(Campaigns::DurationDays).integer().null())
                    .col(
                        ColumnDef::new(Campaigns::Status)
                            .string_len(32)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Campaigns::Budget).decimal().null())
                    .col(
                        ColumnDef::new(Campaigns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Campaigns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaigns_client_id")
                            .from(Campaigns::Table, Campaigns::ClientId)
                            .to(
                                super::m20250301_000001_create_clients_table::Clients::Table,
                                super::m20250301_000001_create_clients_table::Clients::Id,
                            )
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    // Deleting a group ungroups its campaigns, never removes them.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaigns_campaign_group_id")
                            .from(Campaigns::Table, Campaigns::CampaignGroupId)
                            .to(
                                super::m20250301_000003_create_campaign_groups_table::CampaignGroups::Table,
                                super::m20250301_000003_create_campaign_groups_table::CampaignGroups::Id,
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
            .drop_table(Table::drop().table(Campaigns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Campaigns {
    Table,
    Id,
    CampaignGroupId,
    ClientId,
    Name,
    ArtistName,
    Platform,
    TrackUrl,
    Goal,
    StartDate,
    DurationDays,
    Status,
    Budget,
    CreatedAt,
    UpdatedAt,
}
