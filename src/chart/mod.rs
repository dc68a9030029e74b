//! Income and expense charts for an account over a chosen range.

mod aggregation;
mod handlers;

pub use aggregation::{ChartBucket, ChartSummary, RangeKey, build_chart};
pub use handlers::get_chart_endpoint;
