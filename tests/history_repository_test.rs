use chrono::{DateTime, Duration, TimeZone, Utc};
use churninsight::domain::customer::{
    CustomerFeatures, PaymentMethod, PredictionRequest, SubscriptionType,
};
use churninsight::domain::history::{HistoryRecord, PageRequest};
use churninsight::domain::prediction::{PredictionLabel, PredictionResult};
use churninsight::domain::repositories::HistoryRepository;
use churninsight::domain::risk_tier::RiskTier;
use churninsight::infrastructure::InMemoryHistoryRepository;
use churninsight::infrastructure::persistence::{Database, SqliteHistoryRepository};
use tokio_test::assert_ok;

fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn record(customer_id: &str, probability: f64, at: DateTime<Utc>) -> HistoryRecord {
    let request = PredictionRequest::new(
        customer_id,
        CustomerFeatures {
            subscription_type: SubscriptionType::Premium,
            watch_hours: 22.5,
            last_login_days: 3,
            monthly_fee: 17.99,
            number_of_profiles: 4,
            avg_watch_time_per_day: 2.25,
            payment_method: PaymentMethod::GiftCard,
        },
    );
    let label = if probability >= 0.5 {
        PredictionLabel::WillChurn
    } else {
        PredictionLabel::WillContinue
    };
    HistoryRecord::from_prediction(&request, &PredictionResult { label, probability }, Some(at))
}

async fn repository() -> SqliteHistoryRepository {
    let db = Database::in_memory().await.unwrap();
    SqliteHistoryRepository::new(db.pool)
}

#[tokio::test]
async fn test_insert_assigns_identity_and_round_trips_fields() {
    let repo = repository().await;
    let original = record("user-1", 0.82, origin());

    let stored = assert_ok!(repo.insert(&original).await);
    assert!(stored.id.is_some());

    let loaded = repo.find_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    let loaded = &loaded[0];
    assert_eq!(loaded.id, stored.id);
    assert_eq!(loaded.customer_id, "user-1");
    assert_eq!(loaded.subscription_type, "PREMIUM");
    assert_eq!(loaded.payment_method, "GIFT_CARD");
    assert_eq!(loaded.monthly_fee, 17.99);
    assert_eq!(loaded.number_of_profiles, 4);
    assert_eq!(loaded.label, "will_churn");
    assert_eq!(loaded.tier(), Some(RiskTier::High));
    assert_eq!(loaded.created_at, origin());
}

#[tokio::test]
async fn test_pages_are_newest_first_with_identity_tiebreak() {
    let repo = repository().await;
    let a = repo.insert(&record("user-1", 0.1, origin())).await.unwrap();
    let b = repo.insert(&record("user-2", 0.2, origin())).await.unwrap();
    let c = repo
        .insert(&record("user-3", 0.3, origin() + Duration::seconds(1)))
        .await
        .unwrap();

    let first = repo.page(PageRequest::new(0, 2).unwrap()).await.unwrap();
    let second = repo.page(PageRequest::new(1, 2).unwrap()).await.unwrap();

    let ids: Vec<Option<i64>> = first.iter().chain(second.iter()).map(|r| r.id).collect();
    assert_eq!(ids, vec![c.id, b.id, a.id]);
    assert!(repo.page(PageRequest::new(2, 2).unwrap()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_latest_per_customer_prefers_newest_then_highest_id() {
    let repo = repository().await;
    repo.insert(&record("user-1", 0.9, origin())).await.unwrap();
    repo.insert(&record("user-1", 0.1, origin() + Duration::minutes(5)))
        .await
        .unwrap();
    repo.insert(&record("user-2", 0.4, origin())).await.unwrap();
    let tie_winner = repo.insert(&record("user-2", 0.6, origin())).await.unwrap();

    let latest = repo.latest_per_customer().await.unwrap();

    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].customer_id, "user-1");
    let user_1 = latest.iter().find(|r| r.customer_id == "user-1").unwrap();
    let user_2 = latest.iter().find(|r| r.customer_id == "user-2").unwrap();
    assert_eq!(user_1.probability, 0.1);
    assert_eq!(user_2.id, tie_winner.id);
}

#[tokio::test]
async fn test_customer_and_range_queries() {
    let repo = repository().await;
    for minute in 0..5 {
        repo.insert(&record("user-1", 0.5, origin() + Duration::minutes(minute)))
            .await
            .unwrap();
    }
    repo.insert(&record("user-2", 0.5, origin())).await.unwrap();
    let page = PageRequest::first(50).unwrap();

    let user_1 = repo.page_by_customer("user-1", page).await.unwrap();
    assert_eq!(user_1.len(), 5);
    assert!(user_1.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let range = repo
        .page_by_created_range(
            origin() + Duration::minutes(1),
            origin() + Duration::minutes(3),
            page,
        )
        .await
        .unwrap();
    assert_eq!(range.len(), 3);
    assert_eq!(range[0].created_at, origin() + Duration::minutes(3));
    assert_eq!(range[2].created_at, origin() + Duration::minutes(1));

    assert!(repo.page_by_customer("nobody", page).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sub_millisecond_times_agree_across_stores() {
    let sqlite = repository().await;
    let memory = InMemoryHistoryRepository::new();
    let stores: [&dyn HistoryRepository; 2] = [&sqlite, &memory];
    let page = PageRequest::first(10).unwrap();

    for store in stores {
        let mut original = record("user-1", 0.5, origin());
        original.created_at = origin() + Duration::microseconds(700);

        let inserted = store.insert(&original).await.unwrap();
        assert_eq!(inserted.created_at, origin());
        assert_eq!(store.find_all().await.unwrap(), vec![inserted]);

        let around = store
            .page_by_created_range(origin(), origin() + Duration::microseconds(300), page)
            .await
            .unwrap();
        assert_eq!(around.len(), 1);

        let after = store
            .page_by_created_range(
                origin() + Duration::microseconds(300),
                origin() + Duration::microseconds(900),
                page,
            )
            .await
            .unwrap();
        assert!(after.is_empty());
    }
}

#[tokio::test]
async fn test_clear_all_reports_removed_rows() {
    let repo = repository().await;
    repo.insert(&record("user-1", 0.5, origin())).await.unwrap();
    repo.insert(&record("user-2", 0.5, origin())).await.unwrap();

    assert_eq!(repo.clear_all().await.unwrap(), 2);
    assert!(repo.find_all().await.unwrap().is_empty());
    assert_eq!(repo.clear_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_file_database_persists_across_connections() {
    let dir = std::env::temp_dir().join(format!("churninsight-{}", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}/history.db", dir.display());

    {
        let db = Database::new(&url).await.unwrap();
        let repo = SqliteHistoryRepository::new(db.pool.clone());
        repo.insert(&record("user-1", 0.75, origin())).await.unwrap();
        db.pool.close().await;
    }

    let db = Database::new(&url).await.unwrap();
    let repo = SqliteHistoryRepository::new(db.pool.clone());
    assert_eq!(repo.find_all().await.unwrap().len(), 1);
    db.pool.close().await;

    let _ = std::fs::remove_dir_all(&dir);
}
