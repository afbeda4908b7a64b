use tracing::debug;

use crate::controller::Controller;
use crate::error::Error;
use crate::models::ApiVersions;

/// Version information.
pub struct Api<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn api(&self) -> Api<'_> {
        Api { controller: self }
    }
}

impl Api<'_> {
    /// `GET apiVer`
    pub async fn versions(&self) -> Result<ApiVersions, Error> {
        debug!("fetching API versions");
        self.controller.get("apiVer").await
    }
}
