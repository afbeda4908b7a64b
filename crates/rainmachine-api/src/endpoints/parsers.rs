use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::controller::Controller;
use crate::error::Error;
use crate::models::{Ack, Parser};

#[derive(Deserialize)]
struct ParsersEnvelope {
    #[serde(default)]
    parsers: Vec<Parser>,
}

/// Weather data parsers.
pub struct Parsers<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn parsers(&self) -> Parsers<'_> {
        Parsers { controller: self }
    }
}

impl Parsers<'_> {
    /// `GET parser`
    pub async fn current(&self) -> Result<Vec<Parser>, Error> {
        debug!("listing weather parsers");
        let envelope: ParsersEnvelope = self.controller.get("parser").await?;
        Ok(envelope.parsers)
    }

    /// Push externally sourced weather data to the controller.
    ///
    /// `POST parser/data`
    pub async fn post_data(&self, payload: Value) -> Result<Ack, Error> {
        debug!("posting weather data");
        self.controller.post("parser/data", payload).await
    }
}
