use sea_orm_migration::prelude::*;

use crate::m20251001_000001_create_profiles::Profiles;

/// 奖品（cadeaux）：积分兑换抽奖券，达到目标后开奖
#[derive(DeriveIden)]
pub(crate) enum Cadeaux {
    Table,
    Id,
    Nom,
    ImageUrl,
    PointsParTicket,
    ObjectifTickets,
    TicketsActuels,
    Statut,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    UserId,
    CadeauId,
    TicketNumber,
    CreatedAt,
}

/// 中奖记录，每个奖品至多一条
#[derive(DeriveIden)]
enum Gagnants {
    Table,
    Id,
    UserId,
    CadeauId,
    TicketId,
    TicketNumber,
    Email,
    TicketsCount,
    CarriedOverTickets,
    CreatedAt,
}

/// 待发放奖励
#[derive(DeriveIden)]
pub(crate) enum Rewards {
    Table,
    Id,
    UserId,
    RewardType,
    Label,
    Status,
    CreatedAt,
    SentAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cadeaux::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cadeaux::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Cadeaux::Nom).string_len(255).not_null())
                    .col(ColumnDef::new(Cadeaux::ImageUrl).text().null())
                    .col(
                        ColumnDef::new(Cadeaux::PointsParTicket)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cadeaux::ObjectifTickets)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cadeaux::TicketsActuels)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Cadeaux::Statut)
                            .string_len(16)
                            .not_null()
                            .default("en_cours"),
                    )
                    .col(
                        ColumnDef::new(Cadeaux::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cadeaux::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tickets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tickets::UserId).uuid().not_null())
                    .col(ColumnDef::new(Tickets::CadeauId).uuid().not_null())
                    .col(ColumnDef::new(Tickets::TicketNumber).big_integer().not_null())
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_cadeau")
                            .from(Tickets::Table, Tickets::CadeauId)
                            .to(Cadeaux::Table, Cadeaux::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_user")
                            .from(Tickets::Table, Tickets::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一奖品内票号唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_cadeau_number_unique")
                    .table(Tickets::Table)
                    .col(Tickets::CadeauId)
                    .col(Tickets::TicketNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_user")
                    .table(Tickets::Table)
                    .col(Tickets::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Gagnants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Gagnants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Gagnants::UserId).uuid().not_null())
                    .col(ColumnDef::new(Gagnants::CadeauId).uuid().not_null())
                    .col(ColumnDef::new(Gagnants::TicketId).uuid().not_null())
                    .col(ColumnDef::new(Gagnants::TicketNumber).big_integer().not_null())
                    .col(ColumnDef::new(Gagnants::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Gagnants::TicketsCount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Gagnants::CarriedOverTickets)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Gagnants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gagnants_cadeau")
                            .from(Gagnants::Table, Gagnants::CadeauId)
                            .to(Cadeaux::Table, Cadeaux::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个奖品只能有一个中奖者
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_gagnants_cadeau_unique")
                    .table(Gagnants::Table)
                    .col(Gagnants::CadeauId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rewards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rewards::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rewards::UserId).uuid().not_null())
                    .col(ColumnDef::new(Rewards::RewardType).string_len(64).not_null())
                    .col(ColumnDef::new(Rewards::Label).string_len(255).null())
                    .col(
                        ColumnDef::new(Rewards::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Rewards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rewards::SentAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rewards_user")
                            .from(Rewards::Table, Rewards::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rewards_status_created")
                    .table(Rewards::Table)
                    .col(Rewards::Status)
                    .col(Rewards::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：奖励 -> 中奖 -> 票 -> 奖品
        manager
            .drop_table(Table::drop().if_exists().table(Rewards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Gagnants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Cadeaux::Table).to_owned())
            .await?;

        Ok(())
    }
}
