use sea_orm_migration::prelude::*;

/// 全局配置（单行，id = 1）：会员等级名称与阈值
#[derive(DeriveIden)]
enum AppSettings {
    Table,
    Id,
    GradeDebutantLabel,
    GradeBronzeLabel,
    GradeArgentLabel,
    GradeOrLabel,
    GradeDebutantMax,
    GradeBronzeMax,
    GradeArgentMax,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Seasons {
    Table,
    Id,
    Name,
    StartDate,
    EndDate,
    IsActive,
    CreatedAt,
}

/// Tap-Tap 每周排行（VIP+）
#[derive(DeriveIden)]
enum TapTapLeaderboard {
    Table,
    Id,
    UserId,
    Score,
    CreatedAt,
}

/// 每周冠军历史，(week_year, week_number) 唯一保证幂等
#[derive(DeriveIden)]
enum HistoryLeaderboard {
    Table,
    Id,
    UserId,
    DisplayName,
    Score,
    WeekYear,
    WeekNumber,
    PrizeType,
    PrizeLabel,
    Status,
    CreatedAt,
}

/// 已处理的 Stripe 事件（webhook 去重）
#[derive(DeriveIden)]
enum StripeEvents {
    Table,
    Id,
    EventType,
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
                    .table(AppSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::GradeDebutantLabel)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::GradeBronzeLabel)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::GradeArgentLabel)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AppSettings::GradeOrLabel).string_len(64).not_null())
                    .col(
                        ColumnDef::new(AppSettings::GradeDebutantMax)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::GradeBronzeMax)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::GradeArgentMax)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 默认等级配置
        let seed = Query::insert()
            .into_table(AppSettings::Table)
            .columns([
                AppSettings::Id,
                AppSettings::GradeDebutantLabel,
                AppSettings::GradeBronzeLabel,
                AppSettings::GradeArgentLabel,
                AppSettings::GradeOrLabel,
                AppSettings::GradeDebutantMax,
                AppSettings::GradeBronzeMax,
                AppSettings::GradeArgentMax,
            ])
            .values_panic([
                1.into(),
                "Débutant".into(),
                "Bronze".into(),
                "Argent".into(),
                "Or".into(),
                100i64.into(),
                500i64.into(),
                1500i64.into(),
            ])
            .to_owned();
        manager.exec_stmt(seed).await?;

        manager
            .create_table(
                Table::create()
                    .table(Seasons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Seasons::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Seasons::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Seasons::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Seasons::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Seasons::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Seasons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TapTapLeaderboard::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TapTapLeaderboard::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TapTapLeaderboard::UserId).uuid().not_null())
                    .col(ColumnDef::new(TapTapLeaderboard::Score).big_integer().not_null())
                    .col(
                        ColumnDef::new(TapTapLeaderboard::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tap_tap_leaderboard_created")
                    .table(TapTapLeaderboard::Table)
                    .col(TapTapLeaderboard::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HistoryLeaderboard::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HistoryLeaderboard::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HistoryLeaderboard::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(HistoryLeaderboard::DisplayName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(HistoryLeaderboard::Score).big_integer().not_null())
                    .col(ColumnDef::new(HistoryLeaderboard::WeekYear).integer().not_null())
                    .col(ColumnDef::new(HistoryLeaderboard::WeekNumber).integer().not_null())
                    .col(
                        ColumnDef::new(HistoryLeaderboard::PrizeType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HistoryLeaderboard::PrizeLabel)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(HistoryLeaderboard::Status).string_len(32).not_null())
                    .col(
                        ColumnDef::new(HistoryLeaderboard::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_history_leaderboard_week_unique")
                    .table(HistoryLeaderboard::Table)
                    .col(HistoryLeaderboard::WeekYear)
                    .col(HistoryLeaderboard::WeekNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StripeEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StripeEvents::Id)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StripeEvents::EventType).string_len(128).not_null())
                    .col(
                        ColumnDef::new(StripeEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(StripeEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(HistoryLeaderboard::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(TapTapLeaderboard::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Seasons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(AppSettings::Table).to_owned())
            .await?;

        Ok(())
    }
}
