use sea_orm_migration::prelude::*;

use crate::m20251001_000001_create_profiles::Profiles;

/// 奖池（看广告累积进度）
#[derive(DeriveIden)]
enum RewardsPools {
    Table,
    Id,
    Name,
    ImageUrl,
    TargetVideos,
    CurrentVideos,
    TicketCost,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RewardsPoolViews {
    Table,
    Id,
    PoolId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Contributions {
    Table,
    Id,
    UserId,
    PoolId,
    TicketsEarned,
    PointsSpent,
    CreatedAt,
}

/// 激励广告观看记录（限频依据）
#[derive(DeriveIden)]
enum VideoViews {
    Table,
    Id,
    UserId,
    PointsAwarded,
    BonusApplied,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RewardsPools::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RewardsPools::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RewardsPools::Name).string_len(255).not_null())
                    .col(ColumnDef::new(RewardsPools::ImageUrl).text().null())
                    .col(ColumnDef::new(RewardsPools::TargetVideos).big_integer().not_null())
                    .col(
                        ColumnDef::new(RewardsPools::CurrentVideos)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RewardsPools::TicketCost)
                            .big_integer()
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(RewardsPools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RewardsPoolViews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RewardsPoolViews::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RewardsPoolViews::PoolId).uuid().not_null())
                    .col(ColumnDef::new(RewardsPoolViews::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(RewardsPoolViews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rewards_pool_views_pool")
                            .from(RewardsPoolViews::Table, RewardsPoolViews::PoolId)
                            .to(RewardsPools::Table, RewardsPools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rewards_pool_views_user_created")
                    .table(RewardsPoolViews::Table)
                    .col(RewardsPoolViews::UserId)
                    .col(RewardsPoolViews::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contributions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contributions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Contributions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Contributions::PoolId).uuid().not_null())
                    .col(
                        ColumnDef::new(Contributions::TicketsEarned)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contributions::PointsSpent)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contributions_pool")
                            .from(Contributions::Table, Contributions::PoolId)
                            .to(RewardsPools::Table, RewardsPools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_contributions_user_created")
                    .table(Contributions::Table)
                    .col(Contributions::UserId)
                    .col(Contributions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VideoViews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VideoViews::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VideoViews::UserId).uuid().not_null())
                    .col(ColumnDef::new(VideoViews::PointsAwarded).big_integer().not_null())
                    .col(
                        ColumnDef::new(VideoViews::BonusApplied)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VideoViews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_views_user")
                            .from(VideoViews::Table, VideoViews::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 限频查询：按用户 + 时间窗口
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_video_views_user_created")
                    .table(VideoViews::Table)
                    .col(VideoViews::UserId)
                    .col(VideoViews::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(VideoViews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Contributions::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(RewardsPoolViews::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(RewardsPools::Table).to_owned())
            .await?;

        Ok(())
    }
}
