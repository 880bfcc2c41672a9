use std::sync::Arc;

use axum::Router;

use crate::{Config, SensorRegistry};

mod aqi;
mod forecast;
mod health;
mod hyperlocal;
mod sensors;

// ---

/// Shared application state handed to every route.
pub type AppState = (Arc<SensorRegistry>, Config);

pub fn router(registry: Arc<SensorRegistry>, config: Config) -> Router {
    // ---
    Router::new()
        .merge(aqi::router())
        .merge(hyperlocal::router())
        .merge(forecast::router())
        .merge(sensors::router())
        .merge(health::router())
        .with_state((registry, config))
}
