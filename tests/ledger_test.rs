// Integration tests for the points ledger and prize tickets.

mod common;

use bkreward_backend::AppError;
use bkreward_backend::entities::{LedgerEntryKind, PrizeStatus, point_transaction_entity as journal};
use bkreward_backend::models::PaginationParams;
use bkreward_backend::services::{LedgerService, PrizeService};
use common::{ProfileSeed, create_prize, create_profile, setup_db, setup_file_db};
use futures_util::future::join_all;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_debits_never_go_negative() {
    let file = setup_file_db(8).await;
    let db = file.db.clone();
    let user = create_profile(&db, ProfileSeed { points: 10, ..Default::default() }).await;
    let ledger = LedgerService::new(db.clone());

    // 20 笔 1 分的扣款同时提交，余额只够 10 笔
    let handles: Vec<_> = (0..20)
        .map(|_| {
            let ledger = ledger.clone();
            let user_id = user.id;
            tokio::spawn(async move {
                ledger
                    .spend(user_id, 1, LedgerEntryKind::PoolPurchase, None)
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for result in join_all(handles).await {
        match result.expect("debit task panicked") {
            Ok(balance) => {
                assert!(balance >= 0);
                succeeded += 1;
            }
            Err(err) => assert_eq!(err.wire_code(), "insufficient_points", "{err}"),
        }
    }
    assert_eq!(succeeded, 10);

    assert_eq!(ledger.balance(user.id).await.unwrap(), 10 - succeeded);
    let entries = journal::Entity::find()
        .filter(journal::Column::UserId.eq(user.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(entries, succeeded as u64);
}

#[tokio::test]
async fn test_history_records_balance_after() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed::default()).await;
    let ledger = LedgerService::new(db.clone());

    ledger
        .grant(user.id, 20, LedgerEntryKind::Referral, Some("bonus".into()))
        .await
        .unwrap();
    ledger
        .spend(user.id, 5, LedgerEntryKind::PrizeTicket, None)
        .await
        .unwrap();

    let page = ledger
        .history(user.id, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    let amounts: Vec<(i64, i64)> = page.data.iter().map(|e| (e.amount, e.balance_after)).collect();
    assert!(amounts.contains(&(20, 20)));
    assert!(amounts.contains(&(-5, 15)));
}

#[tokio::test]
async fn test_ticket_purchase_until_points_run_out() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed { points: 12, ..Default::default() }).await;
    let prize = create_prize(&db, 10, 100, 0).await;
    let service = PrizeService::new(db.clone());

    let resp = service.participate(user.id, prize.id).await.unwrap();
    assert_eq!(resp.new_points, 2);
    assert_eq!(resp.ticket.ticket_number, 1);
    assert_eq!(resp.cadeau.tickets_actuels, 1);

    let err = service.participate(user.id, prize.id).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance { required: 10, available: 2 }));

    // 失败的购票不改变计数
    let prizes = service.list_prizes(Some(user.id)).await.unwrap();
    assert_eq!(prizes[0].tickets_actuels, 1);
    assert_eq!(prizes[0].my_tickets, Some(1));
}

#[tokio::test]
async fn test_last_ticket_closes_prize() {
    let db = setup_db().await;
    let user = create_profile(&db, ProfileSeed { points: 50, ..Default::default() }).await;
    let prize = create_prize(&db, 5, 100, 99).await;
    let service = PrizeService::new(db.clone());

    let resp = service.participate(user.id, prize.id).await.unwrap();
    assert_eq!(resp.cadeau.tickets_actuels, 100);
    assert_eq!(resp.cadeau.statut, PrizeStatus::Complet);

    let err = service.participate(user.id, prize.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "prize_closed");
    assert_eq!(LedgerService::new(db).balance(user.id).await.unwrap(), 45);
}

#[tokio::test]
async fn test_participation_requires_shipping_address() {
    let db = setup_db().await;
    let user = create_profile(
        &db,
        ProfileSeed { points: 50, with_address: false, ..Default::default() },
    )
    .await;
    let prize = create_prize(&db, 5, 10, 0).await;
    let service = PrizeService::new(db.clone());

    let err = service.participate(user.id, prize.id).await.unwrap_err();
    assert_eq!(err.wire_code(), "address_required");

    assert_eq!(LedgerService::new(db.clone()).balance(user.id).await.unwrap(), 50);
    let prizes = service.list_prizes(None).await.unwrap();
    assert_eq!(prizes[0].tickets_actuels, 0);
}
