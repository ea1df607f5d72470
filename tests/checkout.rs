pub mod common;

use reqwest::{header::CONTENT_TYPE, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn buys_tickets() {
    let mut client = common::Client::new();
    let receipt = client.buy(common::peter(), common::general(), 2).await.unwrap();

    assert_eq!(receipt.total_amount, Decimal::from(2000));
    assert!(receipt.transaction_reference.starts_with("TXN-"));
    assert_eq!(receipt.transaction_reference.len(), 14);
    assert_eq!(receipt.tickets.len(), 2);
    assert_ne!(receipt.tickets[0].unique_code, receipt.tickets[1].unique_code);
    for ticket in &receipt.tickets {
        assert_eq!(ticket.order_id, receipt.order_id);
        assert_eq!(ticket.ticket_type_id, common::general());
        assert_eq!(ticket.attendee_email, "attendee@event.com");
        assert!(!ticket.is_redeemed);
        assert_eq!(
            ticket.qr_code_path.as_deref(),
            Some(format!("/qr_codes/qr_{}.png", ticket.unique_code).as_str()),
        );
    }
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn serves_qr_images() {
    let mut client = common::Client::new();
    let receipt = client.buy(common::lucy(), common::student_pass(), 1).await.unwrap();
    let path = receipt.tickets[0].qr_code_path.clone().unwrap();

    let resp = client.get_raw(&path).await.unwrap();
    assert_eq!(resp.headers()[CONTENT_TYPE], "image/png");
    let png = resp.bytes().await.unwrap();
    assert!(png.starts_with(b"\x89PNG"));
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn rejects_empty_cart() {
    let status = common::Client::new()
        .checkout(json!({
            "user_id": common::peter(),
            "quantities": {},
            "attendee_name": "Peter",
            "attendee_email": "peter@event.com",
        }))
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn rejects_missing_user_id() {
    let status = common::Client::new()
        .checkout(json!({
            "quantities": { common::general().to_string(): 1 },
            "attendee_name": "Peter",
            "attendee_email": "peter@event.com",
        }))
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn rejects_unknown_user() {
    let status = common::Client::new()
        .buy(ticketing_backend::api::user::Id::new(), common::general(), 1)
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn rejects_tickets_of_several_events() {
    let status = common::Client::new()
        .checkout(json!({
            "user_id": common::peter(),
            "quantities": {
                common::general().to_string(): 1,
                common::student_pass().to_string(): 1,
            },
            "attendee_name": "Peter",
            "attendee_email": "peter@event.com",
        }))
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn rejects_more_than_available() {
    let status = common::Client::new()
        .buy(common::peter(), common::vip(), 3)
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn sells_last_tickets_once() {
    let mut peter = common::Client::new();
    let mut lucy = common::Client::new();

    let (first, second) = tokio::join!(
        peter.buy(common::peter(), common::vip(), 2),
        lucy.buy(common::lucy(), common::vip(), 2),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| r.as_ref().err() == Some(&StatusCode::BAD_REQUEST)));

    let status = common::Client::new()
        .buy(common::peter(), common::vip(), 1)
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn rejects_negative_quantity() {
    let status = common::Client::new()
        .checkout(json!({
            "user_id": common::peter(),
            "quantities": { common::general().to_string(): -1 },
            "attendee_name": "Peter",
            "attendee_email": "peter@event.com",
        }))
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "needs a running server seeded with sql/seed.sql"]
async fn serves_reads_while_checkouts_commit() {
    let buys = (0..5).map(|_| async {
        common::Client::new()
            .buy(common::peter(), common::general(), 1)
            .await
    });
    let reads = (0..20).map(|_| async {
        let mut peter = common::Client::logged_in("peter@event.com").await;
        peter.profile_tickets().await
    });

    let (buys, reads) = tokio::join!(
        futures::future::join_all(buys),
        futures::future::join_all(reads),
    );
    assert!(buys.iter().all(Result::is_ok));
    assert!(reads.iter().all(Result::is_ok));
}
