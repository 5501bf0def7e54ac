use sea_orm_migration::prelude::*;

/// 用户资料（积分余额、会员状态、冷却时间戳、收货地址）
#[derive(DeriveIden)]
pub(crate) enum Profiles {
    Table,
    Id,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Points,
    IsAdmin,
    IsVip,
    IsVipPlus,
    VipUntil,
    VipPlan,
    StripeCustomerId,
    StripeSubscriptionId,
    LastClaimDate,
    LastScratchAt,
    LastWheelAt,
    LastVipSlotAt,
    ReferralCode,
    ReferredBy,
    #[sea_orm(iden = "adresse")]
    Address,
    #[sea_orm(iden = "code_postal")]
    PostalCode,
    #[sea_orm(iden = "ville")]
    City,
    CreatedAt,
    UpdatedAt,
}

/// 积分流水
#[derive(DeriveIden)]
enum PointTransactions {
    Table,
    Id,
    UserId,
    Kind,
    Amount,
    BalanceAfter,
    Description,
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
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Profiles::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Profiles::FirstName).string_len(100).null())
                    .col(ColumnDef::new(Profiles::LastName).string_len(100).null())
                    .col(
                        ColumnDef::new(Profiles::Points)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profiles::IsVip)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profiles::IsVipPlus)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Profiles::VipUntil).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Profiles::VipPlan).string_len(32).null())
                    .col(ColumnDef::new(Profiles::StripeCustomerId).string_len(255).null())
                    .col(ColumnDef::new(Profiles::StripeSubscriptionId).string_len(255).null())
                    .col(ColumnDef::new(Profiles::LastClaimDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Profiles::LastScratchAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Profiles::LastWheelAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Profiles::LastVipSlotAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Profiles::ReferralCode).string_len(16).not_null())
                    .col(ColumnDef::new(Profiles::ReferredBy).uuid().null())
                    .col(ColumnDef::new(Profiles::Address).string_len(255).null())
                    .col(ColumnDef::new(Profiles::PostalCode).string_len(16).null())
                    .col(ColumnDef::new(Profiles::City).string_len(100).null())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
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
                    .name("idx_profiles_email_unique")
                    .table(Profiles::Table)
                    .col(Profiles::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_profiles_referral_code_unique")
                    .table(Profiles::Table)
                    .col(Profiles::ReferralCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_profiles_stripe_subscription")
                    .table(Profiles::Table)
                    .col(Profiles::StripeSubscriptionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointTransactions::UserId).uuid().not_null())
                    .col(ColumnDef::new(PointTransactions::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(PointTransactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(PointTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::Description).text().null())
                    .col(
                        ColumnDef::new(PointTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_transactions_user")
                            .from(PointTransactions::Table, PointTransactions::UserId)
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
                    .name("idx_point_transactions_user_created")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::UserId)
                    .col(PointTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PointTransactions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Profiles::Table).to_owned())
            .await?;

        Ok(())
    }
}
