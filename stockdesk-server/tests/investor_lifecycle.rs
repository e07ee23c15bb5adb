//! Database-backed tests for the investor and holdings repositories.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p stockdesk-server -- --ignored

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use stockdesk_server::db::schema;
use stockdesk_server::db::{
    DbError, HoldingRepo, InvestorRepo, LocationChange, TableRepo,
};
use stockdesk_server::models::{
    CompanyThreshold, ConditionRequest, Investor, InvestorUpdate, NewInvestor, TableName,
    UpdateInvestorRequest, UNKNOWN_LOCATION,
};
use stockdesk_server::{Database, PoolConfig};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Key unique to this process and call, so reruns do not collide.
fn unique(prefix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

async fn database() -> Database {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let db = Database::open(&url, &PoolConfig::default())
        .await
        .expect("pool creation failed");
    schema::bootstrap(&db).await.expect("schema bootstrap failed");
    db
}

fn new_investor() -> NewInvestor {
    NewInvestor {
        id: unique("U"),
        name: "Alice".into(),
        postal_code: unique("A1A"),
        address: "1 Main St".into(),
        country: "CA".into(),
        province: "ON".into(),
        city: "Toronto".into(),
    }
}

fn as_record(n: &NewInvestor) -> Investor {
    Investor {
        id: n.id.clone(),
        name: n.name.clone(),
        postal_code: Some(n.postal_code.clone()),
        address: Some(n.address.clone()),
        country: Some(n.country.clone()),
        province: Some(n.province.clone()),
        city: Some(n.city.clone()),
    }
}

fn update_for(id: &str, f: impl FnOnce(&mut UpdateInvestorRequest)) -> InvestorUpdate {
    let mut req = UpdateInvestorRequest {
        id: Some(id.to_owned()),
        ..Default::default()
    };
    f(&mut req);
    InvestorUpdate::try_from(req).expect("valid update")
}

#[tokio::test]
#[ignore = "requires database"]
async fn registration_round_trips() {
    let db = database().await;
    let repo = InvestorRepo::new(&db);
    let investor = new_investor();

    repo.register(&investor).await.unwrap();

    let fetched = repo.find(&investor.id).await.unwrap();
    assert_eq!(fetched, Some(as_record(&investor)));

    let listed: Vec<_> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.id == investor.id)
        .collect();
    assert_eq!(listed, vec![as_record(&investor)]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_registration_fails() {
    let db = database().await;
    let repo = InvestorRepo::new(&db);
    let investor = new_investor();

    repo.register(&investor).await.unwrap();
    let err = repo.register(&investor).await.unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)));
}

#[tokio::test]
#[ignore = "requires database"]
async fn name_update_leaves_location_alone() {
    let db = database().await;
    let repo = InvestorRepo::new(&db);
    let investor = new_investor();
    repo.register(&investor).await.unwrap();

    let outcome = repo
        .update(&update_for(&investor.id, |r| r.name = Some("Bob".into())))
        .await
        .unwrap();
    assert!(outcome.name_updated);
    assert!(!outcome.profile_updated);
    assert_eq!(outcome.location, LocationChange::NotRequested);

    let mut expected = as_record(&investor);
    expected.name = "Bob".into();
    assert_eq!(repo.find(&investor.id).await.unwrap(), Some(expected));
}

#[tokio::test]
#[ignore = "requires database"]
async fn province_update_changes_only_province() {
    let db = database().await;
    let repo = InvestorRepo::new(&db);
    let investor = new_investor();
    repo.register(&investor).await.unwrap();

    let outcome = repo
        .update(&update_for(&investor.id, |r| r.province = Some("QC".into())))
        .await
        .unwrap();
    assert_eq!(outcome.location, LocationChange::Updated);

    let mut expected = as_record(&investor);
    expected.province = Some("QC".into());
    assert_eq!(repo.find(&investor.id).await.unwrap(), Some(expected));
}

#[tokio::test]
#[ignore = "requires database"]
async fn new_postal_code_creates_unknown_location() {
    let db = database().await;
    let repo = InvestorRepo::new(&db);
    let investor = new_investor();
    repo.register(&investor).await.unwrap();

    let postal_code = unique("H2X");
    let outcome = repo
        .update(&update_for(&investor.id, |r| {
            r.postal_code = Some(postal_code.clone());
            r.country = Some("CA".into());
            r.city = Some("Montreal".into());
        }))
        .await
        .unwrap();
    assert!(outcome.location_created);
    assert!(outcome.profile_updated);
    assert_eq!(outcome.location, LocationChange::Updated);

    let fetched = repo.find(&investor.id).await.unwrap().expect("investor");
    assert_eq!(fetched.postal_code.as_deref(), Some(postal_code.as_str()));
    assert_eq!(fetched.province.as_deref(), Some(UNKNOWN_LOCATION));
    assert_eq!(fetched.city.as_deref(), Some("Montreal"));
    assert_eq!(fetched.address.as_deref(), Some("1 Main St"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn location_update_without_profile_key_is_skipped() {
    let db = database().await;
    let id = unique("U");
    sqlx::query("INSERT INTO user_table (id, name) VALUES ($1, 'Nokey')")
        .bind(&id)
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO investor1 (id, postal_code, address, country) VALUES ($1, NULL, '9 Elm St', NULL)")
        .bind(&id)
        .execute(db.pool())
        .await
        .unwrap();

    let outcome = InvestorRepo::new(&db)
        .update(&update_for(&id, |r| {
            r.province = Some("QC".into());
            r.city = Some("Montreal".into());
        }))
        .await
        .unwrap();
    assert_eq!(outcome.location, LocationChange::SkippedMissingKey);
    assert!(!outcome.profile_updated);
    assert!(!outcome.location_created);

    let address: String = sqlx::query_scalar("SELECT address FROM investor1 WHERE id = $1")
        .bind(&id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(address, "9 Elm St");
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_of_unknown_id_is_not_found() {
    let db = database().await;
    let err = InvestorRepo::new(&db)
        .update(&update_for(&unique("missing"), |r| r.name = Some("X".into())))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "user", .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn delete_removes_profile_only() {
    let db = database().await;
    let repo = InvestorRepo::new(&db);
    let investor = new_investor();
    repo.register(&investor).await.unwrap();

    repo.delete(&investor.id).await.unwrap();
    assert_eq!(repo.find(&investor.id).await.unwrap(), None);

    let user_left: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_table WHERE id = $1)")
        .bind(&investor.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert!(user_left);

    let err = repo.delete(&investor.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "investor", .. }));
}

async fn seed_holdings(db: &Database, investor_id: &str, companies: &[String]) {
    for company in companies {
        let tx = unique("T");
        sqlx::query("INSERT INTO transactionable_share_of_company_stock (transaction_id, company_name, price_per_share) VALUES ($1, $2, 10)")
            .bind(&tx)
            .bind(company)
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO executed_transaction (transaction_id, investor_id, number_of_shares) VALUES ($1, $2, 5)")
            .bind(&tx)
            .bind(investor_id)
            .execute(db.pool())
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn diversified_investors_meet_threshold() {
    let db = database().await;
    let repo = InvestorRepo::new(&db);

    let industry = unique("Energy");
    sqlx::query("INSERT INTO industry (industry_name) VALUES ($1)")
        .bind(&industry)
        .execute(db.pool())
        .await
        .unwrap();

    let companies: Vec<String> = (0..3).map(|_| unique("Co")).collect();
    for company in &companies {
        sqlx::query("INSERT INTO industrial_company (company_name, industry_name, net_worth) VALUES ($1, $2, 1000)")
            .bind(company)
            .bind(&industry)
            .execute(db.pool())
            .await
            .unwrap();
    }

    let heavy = new_investor();
    let light = new_investor();
    repo.register(&heavy).await.unwrap();
    repo.register(&light).await.unwrap();
    seed_holdings(&db, &heavy.id, &companies).await;
    seed_holdings(&db, &light.id, &companies[..1]).await;

    let rows = HoldingRepo::new(&db)
        .diversified(CompanyThreshold::parse(Some("3")).unwrap())
        .await
        .unwrap();
    assert!(rows.iter().all(|r| r.number_of_companies >= 3));
    assert!(rows.iter().any(|r| r.investor_id == heavy.id));
    assert!(!rows.iter().any(|r| r.investor_id == light.id));

    let shares = HoldingRepo::new(&db).shares_of(&light.id).await.unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].total_shares, 5);

    let buyers = HoldingRepo::new(&db).buyers_of(&companies[0]).await.unwrap();
    assert!(buyers.iter().any(|b| b.investor_id == heavy.id));
    assert!(buyers.iter().any(|b| b.investor_id == light.id));
}

#[tokio::test]
#[ignore = "requires database"]
async fn unknown_stock_is_not_found() {
    let db = database().await;
    let err = HoldingRepo::new(&db)
        .buyers_of(&unique("NoSuchCo"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "stock", .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn selection_binds_values() {
    let db = database().await;
    let investor = new_investor();
    InvestorRepo::new(&db).register(&investor).await.unwrap();

    let table = TableName::new("USER_TABLE").unwrap();
    let conditions: Vec<ConditionRequest> = serde_json::from_value(json!([
        { "logic": null, "attribute": "ID", "operator": "=", "value": investor.id },
        { "logic": "OR", "attribute": "NAME", "operator": "=", "value": "x' OR '1'='1" }
    ]))
    .unwrap();

    let rows = TableRepo::new(&db).select(&table, conditions).await.unwrap();
    assert_eq!(rows, vec![json!([investor.id, "Alice"])]);

    let columns = TableRepo::new(&db).columns(&table).await.unwrap();
    assert_eq!(columns.names(), ["id", "name"]);

    let missing = TableName::new("no_such_table").unwrap();
    let err = TableRepo::new(&db).columns(&missing).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "table", .. }));
}
