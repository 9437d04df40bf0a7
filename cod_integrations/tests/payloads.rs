use cod_engine::{
    db_types::{CanonicalStatus, StatusSource},
    status_mapper::StatusMapper,
};
use cod_integrations::{
    dropea::{parse_orders_response, DropeaOrders},
    ip_api::parse_geo_response,
};

const ORDERS_PAGE: &str = include_str!("data/dropea_orders_page.json");
const GEO_SUCCESS: &str = include_str!("data/ip_api_success.json");
const GEO_FAIL: &str = include_str!("data/ip_api_fail.json");

#[test]
fn dropea_orders_page() {
    let body = serde_json::from_str(ORDERS_PAGE).unwrap();
    let page = parse_orders_response(body, 2).unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 7);
    assert_eq!(page.orders.len(), 4);
    let first = &page.orders[0];
    assert_eq!(first.id, "88121");
    assert_eq!(first.external_order_id.as_deref(), Some("10452"));
    assert_eq!(first.tracking_code.as_deref(), Some("GLS-7731002"));
    // numeric ids are read as strings
    assert_eq!(page.orders[1].external_order_id.as_deref(), Some("10453"));
    assert_eq!(page.orders[2].external_order_id, None);
    assert_eq!(page.orders[3].tracking_code, None);
}

#[test]
fn dropea_creation_dates_pass_through_to_the_feed() {
    let body = serde_json::from_str(ORDERS_PAGE).unwrap();
    let page = parse_orders_response(body, 1).unwrap();
    assert_eq!(page.orders[0].created_at.as_deref(), Some("2026-03-08T10:12:44Z"));
    assert_eq!(page.orders[3].created_at, None);
}

#[test]
fn dropea_statuses_map_onto_the_ledger_vocabulary() {
    let body = serde_json::from_str(ORDERS_PAGE).unwrap();
    let page = parse_orders_response(body, 2).unwrap();
    let mapper = StatusMapper::default();
    let statuses = page
        .orders
        .iter()
        .filter_map(|o| o.status.as_deref())
        .map(|s| mapper.map_status(s, StatusSource::ExternalFeed))
        .collect::<Vec<_>>();
    use CanonicalStatus::*;
    assert_eq!(statuses, vec![Some(Delivered), Some(Incident), Some(InTransit), Some(Incident)]);
}

#[test]
fn unpaginated_responses_are_a_single_page() {
    let orders: DropeaOrders = serde_json::from_str(r#"{ "data": [{ "id": 1, "status": "CHARGED" }] }"#).unwrap();
    let page = orders.into_feed_page(1);
    assert_eq!((page.page, page.total_pages), (1, 1));
    assert_eq!(page.orders[0].status.as_deref(), Some("CHARGED"));
}

#[test]
fn ip_api_payloads() {
    let located = parse_geo_response(GEO_SUCCESS).unwrap();
    assert!(located.is_success());
    assert_eq!(located.country.as_deref(), Some("España"));
    assert_eq!(located.region_name.as_deref(), Some("Comunidad de Madrid"));
    assert_eq!(located.city.as_deref(), Some("Getafe"));

    let failed = parse_geo_response(GEO_FAIL).unwrap();
    assert!(!failed.is_success());
    assert_eq!(failed.message.as_deref(), Some("private range"));

    assert!(parse_geo_response("<html>Too many requests</html>").is_err());
}
