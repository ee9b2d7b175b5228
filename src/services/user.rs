use serde_json::Value;

use crate::client::{ApiClient, ClientError};
use crate::models::BadgeQuery;

use super::log_failure;

#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// GET /user/dashboard
    pub async fn get_dashboard_data(&self) -> Result<Value, ClientError> {
        log_failure("getDashboardData", self.client.get(&["user", "dashboard"]).await)
    }

    /// POST /badges/names. The list is forwarded untouched, empty included.
    pub async fn get_badges(&self, badge_names: &[String]) -> Result<Value, ClientError> {
        let body = BadgeQuery {
            badge_names: badge_names.to_vec(),
        };
        log_failure("getBadges", self.client.post(&["badges", "names"], &body).await)
    }

    /// GET /modules
    pub async fn get_modules(&self) -> Result<Value, ClientError> {
        log_failure("getModules", self.client.get(&["modules"]).await)
    }
}
