// REST entity endpoints under `/smarthome`
//
// Rooms and devices are plain JSON arrays (no envelope). Client registration
// is the one-time handshake that makes the hub trust our certificate.

use tracing::{debug, info};

use crate::client::HubClient;
use crate::error::Error;
use crate::models::{ClientResponse, DeviceResponse, RegisterRequest, RoomResponse};

/// Role requested for the exporter's client certificate.
const RESTRICTED_CLIENT_ROLE: &str = "ROLE_RESTRICTED_CLIENT";

/// Outcome of [`HubClient::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A client with the same id was already known to the hub.
    AlreadyRegistered,
    /// The hub accepted a new registration.
    Registered,
}

impl HubClient {
    /// List all rooms.
    ///
    /// `GET /smarthome/rooms`
    pub async fn list_rooms(&self) -> Result<Vec<RoomResponse>, Error> {
        let url = self.endpoint("smarthome/rooms")?;
        debug!("listing rooms");
        self.get(url).await
    }

    /// List all devices.
    ///
    /// `GET /smarthome/devices`
    pub async fn list_devices(&self) -> Result<Vec<DeviceResponse>, Error> {
        let url = self.endpoint("smarthome/devices")?;
        debug!("listing devices");
        self.get(url).await
    }

    /// List registered API clients.
    ///
    /// `GET /smarthome/clients`
    pub async fn list_clients(&self) -> Result<Vec<ClientResponse>, Error> {
        let url = self.endpoint("smarthome/clients")?;
        debug!("listing registered clients");
        self.get(url).await
    }

    /// Register this process's client certificate, unless `client_id` is
    /// already known to the hub.
    ///
    /// `GET /smarthome/clients`, then `POST /smarthome/clients` with
    /// `{"@type": "client", "id", "name", "primaryRole", "certificate"}`.
    pub async fn register(
        &self,
        client_id: &str,
        client_name: &str,
        certificate_pem: &str,
    ) -> Result<Registration, Error> {
        let clients = self.list_clients().await?;
        for client in &clients {
            debug!(id = %client.id, name = %client.name, "checking registered client");
            if client.id == client_id {
                info!(client_id, "client already registered, skipping creation");
                return Ok(Registration::AlreadyRegistered);
            }
        }

        info!(client_id, client_name, "registering client");
        let url = self.endpoint("smarthome/clients")?;
        let request = RegisterRequest {
            kind: "client",
            id: client_id,
            name: client_name,
            primary_role: RESTRICTED_CLIENT_ROLE,
            certificate: certificate_pem,
        };
        let answer = self.post_raw(url, &request).await?;
        debug!(response = %answer, "register response");

        Ok(Registration::Registered)
    }
}
