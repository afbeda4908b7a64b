use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::controller::Controller;
use crate::error::Error;
use crate::models::{Ack, Zone, ZoneProperties};

#[derive(Deserialize)]
struct ZonesEnvelope {
    #[serde(default)]
    zones: Vec<Zone>,
}

#[derive(Deserialize)]
struct ZonePropertiesEnvelope {
    #[serde(default)]
    zones: Vec<ZoneProperties>,
}

/// Zones (valves).
pub struct Zones<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn zones(&self) -> Zones<'_> {
        Zones { controller: self }
    }
}

/// Pair each base zone with its properties by uid, then drop inactive
/// zones. Filtering runs after the merge so a properties-level `active`
/// flag is respected.
fn merge_zones(
    zones: Vec<Zone>,
    properties: Option<Vec<ZoneProperties>>,
    include_inactive: bool,
) -> BTreeMap<u32, Zone> {
    let mut properties: HashMap<u32, ZoneProperties> = properties
        .unwrap_or_default()
        .into_iter()
        .map(|p| (p.uid, p))
        .collect();

    zones
        .into_iter()
        .map(|mut zone| {
            if let Some(props) = properties.remove(&zone.uid) {
                zone.attach_properties(props);
            }
            zone
        })
        .filter(|zone| include_inactive || zone.active)
        .map(|zone| (zone.uid, zone))
        .collect()
}

impl Zones<'_> {
    /// All zones keyed by uid.
    ///
    /// With `details`, `GET zone` and `GET zone/properties` run concurrently
    /// and the first failure cancels the other.
    pub async fn all(
        &self,
        details: bool,
        include_inactive: bool,
    ) -> Result<BTreeMap<u32, Zone>, Error> {
        debug!(details, include_inactive, "listing zones");

        if !details {
            let base: ZonesEnvelope = self.controller.get("zone").await?;
            return Ok(merge_zones(base.zones, None, include_inactive));
        }

        let (base, props) = tokio::try_join!(
            self.controller.get::<ZonesEnvelope>("zone"),
            self.controller.get::<ZonePropertiesEnvelope>("zone/properties"),
        )?;
        Ok(merge_zones(base.zones, Some(props.zones), include_inactive))
    }

    /// `GET zone/{uid}`, plus `zone/{uid}/properties` with `details`.
    pub async fn get(&self, uid: u32, details: bool) -> Result<Zone, Error> {
        debug!(uid, details, "fetching zone");
        let base_path = format!("zone/{uid}");

        if !details {
            return self.controller.get(&base_path).await;
        }

        let props_path = format!("zone/{uid}/properties");
        let (mut zone, props) = tokio::try_join!(
            self.controller.get::<Zone>(&base_path),
            self.controller.get::<ZoneProperties>(&props_path),
        )?;
        zone.attach_properties(props);
        Ok(zone)
    }

    /// `POST zone/{uid}/properties` with `{"active": true}`
    pub async fn enable(&self, uid: u32) -> Result<Ack, Error> {
        debug!(uid, "enabling zone");
        self.controller
            .post(&format!("zone/{uid}/properties"), json!({ "active": true }))
            .await
    }

    /// `POST zone/{uid}/properties` with `{"active": false}`
    pub async fn disable(&self, uid: u32) -> Result<Ack, Error> {
        debug!(uid, "disabling zone");
        self.controller
            .post(&format!("zone/{uid}/properties"), json!({ "active": false }))
            .await
    }

    /// Water one zone for `seconds`.
    ///
    /// `POST zone/{uid}/start` with `{"time": seconds}`
    pub async fn start(&self, uid: u32, seconds: u32) -> Result<Ack, Error> {
        debug!(uid, seconds, "starting zone");
        self.controller
            .post(&format!("zone/{uid}/start"), json!({ "time": seconds }))
            .await
    }

    /// `POST zone/{uid}/stop`
    pub async fn stop(&self, uid: u32) -> Result<Ack, Error> {
        debug!(uid, "stopping zone");
        self.controller
            .post(&format!("zone/{uid}/stop"), json!({}))
            .await
    }

    /// Zones currently watering.
    ///
    /// `GET watering/zone`
    pub async fn running(&self) -> Result<Vec<Zone>, Error> {
        debug!("fetching running zones");
        let envelope: ZonesEnvelope = self.controller.get("watering/zone").await?;
        Ok(envelope
            .zones
            .into_iter()
            .filter(Zone::is_running)
            .collect())
    }
}
