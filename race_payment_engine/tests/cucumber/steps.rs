use cucumber::{then, when};
use race_payment_engine::{
    db_types::{PaymentStatus, RegistrationId, Won},
    RegistrationManagement,
};

use crate::cucumber::ReconciliationWorld;

fn parse_ids(ids: &str) -> Vec<RegistrationId> {
    ids.split(',').map(|s| RegistrationId::from(s.trim())).collect()
}

#[when(expr = "the agent looks up order {word}")]
async fn look_up_order(world: &mut ReconciliationWorld, id: String) {
    let order = world.api().order_detail(&id.into()).await.expect("Error looking up order");
    world.last_order = Some(order);
}

#[when(expr = "the agent confirms orders {word}")]
async fn confirm_orders(world: &mut ReconciliationWorld, ids: String) {
    let results = world.api().confirm_orders(&parse_ids(&ids)).await;
    world.last_batch = results;
}

#[when(expr = "registration {word} is cancelled")]
async fn cancel_registration(world: &mut ReconciliationWorld, id: String) {
    world.api().flow().cancel(&id.into()).await.expect("Error cancelling registration");
}

#[then(expr = "the order price is {int}")]
async fn check_order_price(world: &mut ReconciliationWorld, price: i64) {
    let order = world.last_order.as_ref().expect("No order was looked up");
    assert_eq!(order.order_price_amount, Won::from(price));
}

#[then(expr = "the billing name is {string}")]
async fn check_billing_name(world: &mut ReconciliationWorld, name: String) {
    let order = world.last_order.as_ref().expect("No order was looked up");
    assert_eq!(order.billing_name, name);
}

#[then(expr = "the batch is reported as a success")]
async fn batch_succeeded(world: &mut ReconciliationWorld) {
    assert!(!world.last_batch.is_empty());
    assert!(world.last_batch.iter().all(|r| r.outcome.is_success()), "{:?}", world.last_batch);
}

#[then(expr = "the batch is reported as a failure")]
async fn batch_failed(world: &mut ReconciliationWorld) {
    assert!(world.last_batch.iter().any(|r| !r.outcome.is_success()), "{:?}", world.last_batch);
}

#[then(expr = "order {word} is reported as {string}")]
async fn check_order_result(world: &mut ReconciliationWorld, id: String, description: String) {
    let result = world.last_batch.iter().find(|r| r.order_id == id).expect("Order is not in the last batch");
    assert_eq!(result.outcome.description(), description);
}

#[then(expr = "the batch results are in the order {word}")]
async fn check_result_order(world: &mut ReconciliationWorld, ids: String) {
    let expected = ids.split(',').map(str::trim).collect::<Vec<_>>();
    let actual = world.last_batch.iter().map(|r| r.order_id.as_str()).collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[then(expr = "registration {word} is {word}")]
async fn check_status(world: &mut ReconciliationWorld, id: String, status: String) {
    let expected = status.parse::<PaymentStatus>().expect("Not a payment status");
    let registration = world
        .api()
        .flow()
        .db()
        .fetch_registration(&id.into())
        .await
        .expect("Error fetching registration")
        .expect("Registration does not exist");
    assert_eq!(registration.payment_status, expected);
}

#[then(expr = "there are {int} pending orders")]
async fn count_pending(world: &mut ReconciliationWorld, count: usize) {
    let orders = world.api().list_pending_orders().await.expect("Error listing orders");
    assert_eq!(orders.len(), count);
}
