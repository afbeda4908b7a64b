use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::controller::Controller;
use crate::error::Error;
use crate::models::{Ack, NextRun, Program};

#[derive(Deserialize)]
struct ProgramsEnvelope {
    #[serde(default)]
    programs: Vec<Program>,
}

#[derive(Deserialize)]
struct NextRunsEnvelope {
    #[serde(rename = "nextRuns", default)]
    next_runs: Vec<NextRun>,
}

/// Watering programs.
pub struct Programs<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn programs(&self) -> Programs<'_> {
        Programs { controller: self }
    }
}

/// Index programs by uid. A later entry with the same uid replaces an
/// earlier one.
fn index_programs(
    programs: Vec<Program>,
    include_inactive: bool,
) -> BTreeMap<u32, Program> {
    programs
        .into_iter()
        .filter(|p| include_inactive || p.active)
        .map(|p| (p.uid, p))
        .collect()
}

impl Programs<'_> {
    /// All programs keyed by uid.
    ///
    /// `GET program`
    pub async fn all(&self, include_inactive: bool) -> Result<BTreeMap<u32, Program>, Error> {
        debug!(include_inactive, "listing programs");
        let envelope: ProgramsEnvelope = self.controller.get("program").await?;
        Ok(index_programs(envelope.programs, include_inactive))
    }

    /// `GET program/{uid}`
    pub async fn get(&self, uid: u32) -> Result<Program, Error> {
        debug!(uid, "fetching program");
        self.controller.get(&format!("program/{uid}")).await
    }

    /// `POST program/{uid}` with `{"active": true}`
    pub async fn enable(&self, uid: u32) -> Result<Ack, Error> {
        debug!(uid, "enabling program");
        self.controller
            .post(&format!("program/{uid}"), json!({ "active": true }))
            .await
    }

    /// `POST program/{uid}` with `{"active": false}`
    pub async fn disable(&self, uid: u32) -> Result<Ack, Error> {
        debug!(uid, "disabling program");
        self.controller
            .post(&format!("program/{uid}"), json!({ "active": false }))
            .await
    }

    /// `POST program/{uid}/start`
    pub async fn start(&self, uid: u32) -> Result<Ack, Error> {
        debug!(uid, "starting program");
        self.controller
            .post(&format!("program/{uid}/start"), json!({}))
            .await
    }

    /// `POST program/{uid}/stop`
    pub async fn stop(&self, uid: u32) -> Result<Ack, Error> {
        debug!(uid, "stopping program");
        self.controller
            .post(&format!("program/{uid}/stop"), json!({}))
            .await
    }

    /// Upcoming start times per program.
    ///
    /// `GET program/nextrun`
    pub async fn next(&self) -> Result<Vec<NextRun>, Error> {
        debug!("fetching next program runs");
        let envelope: NextRunsEnvelope = self.controller.get("program/nextrun").await?;
        Ok(envelope.next_runs)
    }

    /// Programs currently watering.
    ///
    /// `GET watering/program`
    pub async fn running(&self) -> Result<Vec<Program>, Error> {
        debug!("fetching running programs");
        let envelope: ProgramsEnvelope = self.controller.get("watering/program").await?;
        Ok(envelope
            .programs
            .into_iter()
            .filter(Program::is_running)
            .collect())
    }
}
