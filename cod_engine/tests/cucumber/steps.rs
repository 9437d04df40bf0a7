use chrono::{DateTime, Duration, Utc};
use cod_engine::{
    db_types::{CanonicalStatus, Order, OrderId},
    sync::{FeedOrder, WorksheetRow},
    test_utils::metadata_block,
    traits::GeoResult,
    ScoringMode,
};
use cucumber::{given, then, when};

use crate::cucumber::CodWorld;

fn status(value: &str) -> CanonicalStatus {
    value.parse().expect("Not a canonical status")
}

fn order_mut<'a>(world: &'a mut CodWorld, id: &str) -> &'a mut Order {
    let id = OrderId::from(id);
    world.orders.iter_mut().find(|o| o.external_id == id).expect("Order {id} was never added")
}

async fn ledger_order(world: &mut CodWorld, id: &str) -> Order {
    let id = OrderId::from(id);
    world.ledger().orders().await.into_iter().find(|o| o.external_id == id).expect("Order is not in the ledger")
}

//--------------------------------------  Ledger setup  --------------------------------------------------------------

#[given("an empty ledger")]
async fn empty_ledger(world: &mut CodWorld) {
    world.orders.clear();
}

#[given(expr = "the clock reads {string}")]
async fn clock(world: &mut CodWorld, now: String) {
    let now = now.parse::<DateTime<Utc>>().expect("Not an RFC 3339 timestamp");
    world.now = Some(now);
}

#[given(expr = "order {word} with status {string}")]
async fn order_with_status(world: &mut CodWorld, id: String, value: String) {
    world.orders.push(Order::new(id).with_status(status(&value)));
}

#[given(expr = "order {word} without a status")]
async fn order_without_status(world: &mut CodWorld, id: String) {
    world.orders.push(Order::new(id));
}

#[given(expr = "order {word} placed {int} minutes ago from IP {string}, shipping to {string} in {string}, province {word}")]
async fn order_with_metadata(
    world: &mut CodWorld,
    id: String,
    minutes: i64,
    ip: String,
    address: String,
    city: String,
    province: String,
) {
    let date = world.now() - Duration::minutes(minutes);
    let meta = metadata_block(&ip, &province, &city, &address);
    world.orders.push(Order::new(id).with_date(date).with_metadata(meta));
}

#[given(expr = "order {word} has metadata without an IP")]
async fn order_without_ip(world: &mut CodWorld, id: String) {
    world.orders.push(Order::new(id).with_metadata("Nombre: Sin IP\nCiudad: Madrid\nProvincia: M"));
}

#[given(expr = "order {word} is already labelled {string}")]
async fn already_labelled(world: &mut CodWorld, id: String, label: String) {
    let order = order_mut(world, &id);
    order.risk_label = Some(label);
}

//--------------------------------------  Geolocation  ---------------------------------------------------------------

#[given(expr = "IP {string} geolocates to {string}, {string}, {string}")]
async fn geolocates(world: &mut CodWorld, ip: String, country: String, region: String, city: String) {
    let locator = std::mem::take(&mut world.locator);
    world.locator = locator.with(&ip, GeoResult::success(country, region, city));
}

#[given(expr = "the geolocation service fails for IP {string}")]
async fn geolocation_fails(world: &mut CodWorld, ip: String) {
    let locator = std::mem::take(&mut world.locator);
    world.locator = locator.with_error(&ip);
}

//--------------------------------------  Status sources  ------------------------------------------------------------

#[given(expr = "the worksheet reports {string} as {string}")]
async fn worksheet_row(world: &mut CodWorld, formatted_id: String, status: String) {
    world.worksheet.push(WorksheetRow::new(formatted_id, status));
}

fn push_feed_order(world: &mut CodWorld, id: String, status: String, tracking: Option<String>) {
    if world.feed_pages.is_empty() {
        world.feed_pages.push(vec![]);
    }
    let page = world.feed_pages.last_mut().expect("at least one page");
    let feed_id = format!("dropea-{}", page.len() + 1);
    page.push(FeedOrder {
        id: feed_id,
        status: Some(status),
        external_order_id: Some(id),
        tracking_code: tracking,
        created_at: None,
    });
}

#[given(expr = "the feed reports order {word} as {string}")]
async fn feed_order(world: &mut CodWorld, id: String, status: String) {
    push_feed_order(world, id, status, None);
}

#[given(expr = "the feed reports order {word} as {string} with tracking code {string}")]
async fn feed_order_with_tracking(world: &mut CodWorld, id: String, status: String, tracking: String) {
    push_feed_order(world, id, status, Some(tracking));
}

#[given("the feed starts a new page")]
async fn new_feed_page(world: &mut CodWorld) {
    world.feed_pages.push(vec![]);
}

#[given(expr = "the feed fails from page {int}")]
async fn feed_fails(world: &mut CodWorld, page: u32) {
    world.feed_fails_from = Some(page);
}

//--------------------------------------  Actions  -------------------------------------------------------------------

#[when("I sync from the worksheet")]
async fn sync_worksheet(world: &mut CodWorld) {
    let api = world.reconciliation_api();
    match api.sync_from_worksheet(&world.worksheet).await {
        Ok(report) => world.report = Some(report),
        Err(e) => world.error = Some(e.to_string()),
    }
}

#[when("I sync from the feed")]
async fn sync_feed(world: &mut CodWorld) {
    let api = world.reconciliation_api();
    let feed = world.feed();
    match api.sync_from_feed(&feed).await {
        Ok(report) => world.report = Some(report),
        Err(e) => world.error = Some(e.to_string()),
    }
    world.feed_calls = feed.calls();
}

async fn scan(world: &mut CodWorld, mode: ScoringMode, rescore: bool) {
    let api = world.fraud_api();
    let now = world.now();
    match api.scan_at(mode, rescore, now).await {
        Ok(summary) => world.summary = Some(summary),
        Err(e) => world.error = Some(e.to_string()),
    }
}

#[when("I run a fraud scan")]
async fn fraud_scan(world: &mut CodWorld) {
    scan(world, ScoringMode::Standard, false).await;
}

#[when("I run a fraud scan with history")]
async fn fraud_scan_with_history(world: &mut CodWorld) {
    scan(world, ScoringMode::WithHistory, false).await;
}

#[when("I rescore every order")]
async fn rescore(world: &mut CodWorld) {
    scan(world, ScoringMode::Standard, true).await;
}

//--------------------------------------  Checks  --------------------------------------------------------------------

#[then(expr = "order {word} has status {string}")]
async fn check_status(world: &mut CodWorld, id: String, expected: String) {
    let order = ledger_order(world, &id).await;
    assert_eq!(order.current_status, Some(status(&expected)), "Status of {id} is incorrect");
}

#[then(expr = "order {word} still has no status")]
async fn check_no_status(world: &mut CodWorld, id: String) {
    let order = ledger_order(world, &id).await;
    assert_eq!(order.current_status, None, "{id} should have no status");
}

#[then(expr = "order {word} has risk label {string}")]
async fn check_risk_label(world: &mut CodWorld, id: String, label: String) {
    let order = ledger_order(world, &id).await;
    assert_eq!(order.risk_label.as_deref(), Some(label.as_str()), "Risk label of {id} is incorrect");
}

#[then(expr = "order {word} has no risk label")]
async fn check_no_risk_label(world: &mut CodWorld, id: String) {
    let order = ledger_order(world, &id).await;
    assert_eq!(order.risk_label, None, "{id} should not have been scored");
}

#[then(expr = "{int} change(s) applied")]
async fn check_changes(world: &mut CodWorld, count: usize) {
    assert_eq!(world.report().changes.len(), count, "Number of changes is incorrect");
}

#[then(expr = "the change to order {word} went from {string} to {string}")]
async fn check_change(world: &mut CodWorld, id: String, prior: String, new: String) {
    let id = OrderId::from(id);
    let change = world.report().changes.iter().find(|c| c.external_id == id).expect("No change for that order");
    assert_eq!(CanonicalStatus::display_optional(change.prior), prior);
    assert_eq!(change.new, status(&new));
}

#[then(expr = "the change to order {word} carries tracking code {string}")]
async fn check_tracking(world: &mut CodWorld, id: String, tracking: String) {
    let id = OrderId::from(id);
    let change = world.report().changes.iter().find(|c| c.external_id == id).expect("No change for that order");
    assert_eq!(change.tracking_ref.as_deref(), Some(tracking.as_str()));
}

#[then(expr = "{int} update(s) skipped as {word}")]
async fn check_skipped(world: &mut CodWorld, count: usize, reason: String) {
    let skipped = world.report().skipped;
    let actual = match reason.as_str() {
        "unmatched" => skipped.no_match,
        "terminal" => skipped.terminal,
        "held" => skipped.manual_hold,
        "unchanged" => skipped.unchanged,
        "unmapped" => skipped.unmapped,
        "malformed" => skipped.malformed,
        _ => panic!("Unknown skip reason {reason}"),
    };
    assert_eq!(actual, count, "Number of {reason} skips is incorrect");
}

#[then(expr = "the sync fetched {int} page(s)")]
async fn check_pages(world: &mut CodWorld, pages: u32) {
    assert_eq!(world.report().pages_fetched, pages);
}

#[then(expr = "the sync was truncated with {string}")]
async fn check_truncated(world: &mut CodWorld, reason: String) {
    assert_eq!(world.report().truncation.as_deref(), Some(reason.as_str()));
}

#[then(expr = "the feed was queried {int} time(s)")]
async fn check_feed_calls(world: &mut CodWorld, calls: usize) {
    assert_eq!(world.feed_calls, calls);
}

#[then(expr = "the run failed with {string}")]
async fn check_error(world: &mut CodWorld, message: String) {
    assert_eq!(world.error.as_deref(), Some(message.as_str()));
}

#[then(expr = "the scan processed {int} order(s)")]
async fn check_processed(world: &mut CodWorld, count: usize) {
    let summary = world.summary.expect("No scan has run");
    assert_eq!(summary.processed, count, "Number of scored orders is incorrect");
}

#[then(expr = "{int} order(s) flagged as suspicious")]
async fn check_suspicious(world: &mut CodWorld, count: usize) {
    let summary = world.summary.expect("No scan has run");
    assert_eq!(summary.suspicious, count, "Number of suspicious orders is incorrect");
}
