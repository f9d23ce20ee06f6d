// ── Pipeline wiring ──
//
// Owns the hub client and the three reference-data caches, each with its own
// lock and freshness window. Devices read rooms through the rooms cache; the
// poller reads devices and the subscription token through theirs.

use std::sync::Arc;

use tracing::info;

use shc_api::{HubClient, Registration};

use crate::cache::TtlCache;
use crate::config::{HubConfig, RefreshConfig};
use crate::error::CoreError;
use crate::model::{Devices, Rooms};
use crate::poller::{EventPoller, EventSink};
use crate::resolver::{DeviceResolver, RoomResolver, SubscriptionManager};

/// The hub side of the exporter.
#[derive(Debug, Clone)]
pub struct Pipeline {
    client: HubClient,
    rooms: Arc<TtlCache<Rooms>>,
    devices: Arc<TtlCache<Devices>>,
    subscription: Arc<TtlCache<String>>,
}

impl Pipeline {
    /// Build the caches around an existing client. Nothing is fetched yet.
    pub fn new(client: HubClient, refresh: &RefreshConfig) -> Self {
        let room_resolver = RoomResolver::new(client.clone());
        let rooms = Arc::new(TtlCache::new("rooms", refresh.device_interval, move || {
            let resolver = room_resolver.clone();
            async move { resolver.fetch().await }
        }));

        let device_resolver = DeviceResolver::new(client.clone(), Arc::clone(&rooms));
        let devices = Arc::new(TtlCache::new(
            "devices",
            refresh.device_interval,
            move || {
                let resolver = device_resolver.clone();
                async move { resolver.fetch().await }
            },
        ));

        let subscriber = SubscriptionManager::new(client.clone());
        let subscription = Arc::new(TtlCache::new(
            "subscription",
            refresh.poll_id_interval,
            move || {
                let subscriber = subscriber.clone();
                async move { subscriber.fetch().await }
            },
        ));

        Self {
            client,
            rooms,
            devices,
            subscription,
        }
    }

    /// Build the client from `hub` (TLS, client certificate, timeout), then
    /// the caches.
    pub fn connect(hub: &HubConfig, refresh: &RefreshConfig) -> Result<Self, CoreError> {
        let client = HubClient::new(hub.base_url.clone(), &hub.transport())?;
        info!(url = %hub.base_url, "hub client ready");
        Ok(Self::new(client, refresh))
    }

    /// Make sure the hub trusts our client certificate.
    pub async fn register(&self, hub: &HubConfig) -> Result<Registration, CoreError> {
        let certificate = hub.identity().certificate_pem()?;
        let outcome = self
            .client
            .register(&hub.client_id, &hub.client_name, &certificate)
            .await?;
        Ok(outcome)
    }

    /// A long-poll loop reading from this pipeline's caches.
    pub fn poller(&self, sink: Arc<dyn EventSink>) -> EventPoller {
        EventPoller::new(
            self.client.clone(),
            Arc::clone(&self.devices),
            Arc::clone(&self.subscription),
            sink,
        )
    }

    pub fn client(&self) -> &HubClient {
        &self.client
    }

    pub fn rooms(&self) -> &Arc<TtlCache<Rooms>> {
        &self.rooms
    }

    pub fn devices(&self) -> &Arc<TtlCache<Devices>> {
        &self.devices
    }

    pub fn subscription(&self) -> &Arc<TtlCache<String>> {
        &self.subscription
    }
}
