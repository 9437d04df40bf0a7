mod worksheet_id;

pub use worksheet_id::extract_worksheet_order_id;
