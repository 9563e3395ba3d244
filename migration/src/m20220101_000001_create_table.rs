use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Url::Table)
                    .if_not_exists()
                    .col(pk_auto(Url::Id))
                    .col(string_len(Url::Slug, 16).not_null())
                    .col(text(Url::NormalizedUrl).not_null())
                    .col(
                        timestamp_with_time_zone(Url::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone_null(Url::ExpiresAt))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_urls_slug")
                    .table(Url::Table)
                    .col(Url::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_urls_normalized_url")
                    .table(Url::Table)
                    .col(Url::NormalizedUrl)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccessLog::Table)
                    .if_not_exists()
                    .col(
                        big_integer(AccessLog::Id)
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(integer(AccessLog::UrlId).not_null())
                    .col(
                        timestamp_with_time_zone(AccessLog::AccessedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_access_logs_url_id")
                            .from(AccessLog::Table, AccessLog::UrlId)
                            .to(Url::Table, Url::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_access_logs_url_id")
                    .table(AccessLog::Table)
                    .col(AccessLog::UrlId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_access_logs_accessed_at")
                    .table(AccessLog::Table)
                    .col(AccessLog::AccessedAt)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // access_logs first, it holds the foreign key
        manager
            .drop_table(Table::drop().table(AccessLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Url::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Url {
    #[sea_orm(iden = "urls")]
    Table,
    Id,
    Slug,
    NormalizedUrl,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum AccessLog {
    #[sea_orm(iden = "access_logs")]
    Table,
    Id,
    UrlId,
    AccessedAt,
}
