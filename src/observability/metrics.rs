//! Store metrics.
//!
//! # Metrics
//! - `query_params_store_navigations_total` (counter): navigations seen
//! - `query_params_store_published_total` (counter): states published
//! - `query_params_store_state_keys` (gauge): keys in the last published state
//! - `query_params_store_redirects_total` (counter): corrective navigations by reason
//! - `query_params_store_param_errors_total` (counter): rejected parameters by reason

use crate::store::validator::ParamError;

pub fn record_navigation() {
    ::metrics::counter!("query_params_store_navigations_total").increment(1);
}

pub fn record_published(keys: usize) {
    ::metrics::counter!("query_params_store_published_total").increment(1);
    ::metrics::gauge!("query_params_store_state_keys").set(keys as f64);
}

/// `reason` is `no_query_params` or `invalid_params`.
pub fn record_redirect(reason: &'static str) {
    ::metrics::counter!("query_params_store_redirects_total", "reason" => reason).increment(1);
}

pub fn record_param_error(error: ParamError) {
    ::metrics::counter!("query_params_store_param_errors_total", "reason" => error.label()).increment(1);
}
