//! Common functions used across test cases.

use std::collections::HashMap;

use axum_test_helper::TestClient;

use datatables_sql::{routes, state};

pub const PEOPLE_DEPLOYMENT_PATH: &str = "static/people";

/// The adults in the people configuration.
pub const ADULT_COUNT: u64 = 5;

/// Creates a client over a router with a fresh state from the test deployment.
pub async fn create_client() -> TestClient {
    TestClient::new(routes::create_router(create_state().await))
}

/// A fresh state from the test deployment.
pub async fn create_state() -> state::ServerState {
    tests_common::logging::init();
    let test_deployment_dir =
        tests_common::deployment::helpers::get_path_from_project_root(PEOPLE_DEPLOYMENT_PATH);
    let configuration = state::load_configuration(test_deployment_dir, HashMap::<String, String>::new())
        .await
        .unwrap();
    let mut metrics_registry = prometheus::Registry::new();
    state::create_state(&configuration, &mut metrics_registry)
        .await
        .unwrap()
}
