// ── Controller registry ──
//
// Owns every logged-in controller, keyed by MAC address. Local and cloud
// logins both end here: authenticate, read identity and versions, then
// insert. Nothing is persisted; the registry lives as long as the `Client`.

use std::sync::Arc;

use dashmap::DashMap;
use rainmachine_api::models::Sprinkler;
use rainmachine_api::{Controller, Error, HttpSession, LocalTarget, Transport, cloud};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ConnectTarget};

/// Result of [`Client::load_local`].
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Registered(Arc<Controller>),
    /// The MAC was already registered and `skip_existing` was set.
    Skipped { mac: String },
}

/// Result of [`Client::load_remote`].
///
/// Devices are loaded independently: one device failing to log in does not
/// stop the rest.
#[derive(Debug, Default)]
pub struct RemoteLoadSummary {
    pub registered: Vec<Arc<Controller>>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

impl RemoteLoadSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registry of authenticated controllers.
///
/// Safe to read from several tasks once populated. Concurrent loads of the
/// same MAC are not coordinated; the later insert replaces the earlier.
pub struct Client {
    config: ClientConfig,
    transport: Transport,
    controllers: DashMap<String, Arc<Controller>>,
}

impl Client {
    /// Build a client; with `reuse_session` every controller shares one pool.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let transport = if config.reuse_session {
            let session = HttpSession::new(&config.transport)?;
            Transport::with_session(config.transport.clone(), session)
        } else {
            Transport::new(config.transport.clone())
        };
        Ok(Self::with_transport(config, transport))
    }

    /// Build a client around a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Transport) -> Self {
        Self {
            config,
            transport,
            controllers: DashMap::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Log in to a LAN controller and register it.
    ///
    /// The MAC address is read right after login so an already-registered
    /// controller can be skipped before the version and name probes run.
    pub async fn load_local(
        &self,
        target: &LocalTarget,
        password: &SecretString,
        skip_existing: bool,
    ) -> Result<LoadOutcome, Error> {
        let mut controller = Controller::local(self.transport.clone(), target.clone());
        controller.login_local(password).await?;

        let mac = controller.provisioning().wifi().await?.mac_address;
        if skip_existing && self.controllers.contains_key(&mac) {
            debug!(%mac, "controller already registered, skipping");
            return Ok(LoadOutcome::Skipped { mac });
        }

        let api = controller.api();
        let provisioning = controller.provisioning();
        let (versions, name) = tokio::try_join!(api.versions(), provisioning.device_name(),)?;
        controller.set_versions(versions);
        controller.set_identity(mac.clone(), name);

        info!(%mac, host = %target.host, "registered local controller");
        let controller = Arc::new(controller);
        self.controllers.insert(mac, Arc::clone(&controller));
        Ok(LoadOutcome::Registered(controller))
    }

    /// Log in to a cloud account and register every linked controller.
    ///
    /// A failed account login or device listing aborts the whole load.
    /// Per-device failures are logged and collected in
    /// [`RemoteLoadSummary::failed`].
    pub async fn load_remote(
        &self,
        email: &str,
        password: &SecretString,
        skip_existing: bool,
    ) -> Result<RemoteLoadSummary, Error> {
        let cloud_endpoints = &self.config.cloud;
        let account_token =
            cloud::account_login(&self.transport, cloud_endpoints, email, password).await?;
        let sprinklers = cloud::list_sprinklers(
            &self.transport,
            cloud_endpoints,
            &account_token,
            email,
            password,
        )
        .await?;

        let mut summary = RemoteLoadSummary::default();
        for sprinkler in sprinklers {
            if skip_existing && self.controllers.contains_key(&sprinkler.mac) {
                debug!(mac = %sprinkler.mac, "controller already registered, skipping");
                summary.skipped.push(sprinkler.mac);
                continue;
            }

            match self
                .register_remote(&sprinkler, &account_token, password)
                .await
            {
                Ok(controller) => summary.registered.push(controller),
                Err(e) => {
                    warn!(mac = %sprinkler.mac, error = %e, "failed to load remote controller");
                    summary.failed.push((sprinkler.mac, e));
                }
            }
        }

        info!(
            registered = summary.registered.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "remote load finished"
        );
        Ok(summary)
    }

    async fn register_remote(
        &self,
        sprinkler: &Sprinkler,
        account_token: &SecretString,
        password: &SecretString,
    ) -> Result<Arc<Controller>, Error> {
        let mut controller = Controller::remote(
            self.transport.clone(),
            self.config.cloud.clone(),
            sprinkler.sprinkler_id.clone(),
        );
        controller.login_remote(account_token, password).await?;

        let versions = controller.api().versions().await?;
        let name = if sprinkler.name.is_empty() {
            controller.provisioning().device_name().await?
        } else {
            sprinkler.name.clone()
        };
        controller.set_versions(versions);
        controller.set_identity(sprinkler.mac.clone(), name);

        info!(mac = %sprinkler.mac, sprinkler_id = %sprinkler.sprinkler_id, "registered remote controller");
        let controller = Arc::new(controller);
        self.controllers
            .insert(sprinkler.mac.clone(), Arc::clone(&controller));
        Ok(controller)
    }

    /// Load whatever `target` describes and return the controllers it
    /// resolved to, including ones that were already registered.
    ///
    /// A remote account where every device failed returns the first
    /// device error.
    pub async fn connect(
        &self,
        target: &ConnectTarget,
        skip_existing: bool,
    ) -> Result<Vec<Arc<Controller>>, Error> {
        debug!(kind = target.kind(), "connecting");
        match target {
            ConnectTarget::Local { target, password } => {
                match self.load_local(target, password, skip_existing).await? {
                    LoadOutcome::Registered(controller) => Ok(vec![controller]),
                    LoadOutcome::Skipped { mac } => Ok(self.get(&mac).into_iter().collect()),
                }
            }
            ConnectTarget::Remote { email, password } => {
                let summary = self.load_remote(email, password, skip_existing).await?;
                let mut resolved = summary.registered;
                resolved.extend(summary.skipped.iter().filter_map(|mac| self.get(mac)));

                if resolved.is_empty() {
                    if let Some((_, err)) = summary.failed.into_iter().next() {
                        return Err(err);
                    }
                }
                Ok(resolved)
            }
        }
    }

    // ── Registry ─────────────────────────────────────────────────────

    /// Snapshot of all registered controllers, sorted by MAC.
    pub fn controllers(&self) -> Vec<Arc<Controller>> {
        let mut all: Vec<_> = self
            .controllers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by(|a, b| a.mac().cmp(b.mac()));
        all
    }

    pub fn get(&self, mac: &str) -> Option<Arc<Controller>> {
        self.controllers.get(mac).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, mac: &str) -> Option<Arc<Controller>> {
        self.controllers.remove(mac).map(|(_, controller)| controller)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Close the shared connection pool, if any. Controllers keep working
    /// on per-call connections afterwards.
    pub fn close(&self) {
        if let Some(session) = self.transport.session() {
            session.close();
        }
    }
}
