use crate::domain::model::{RecordId, VehicleInput, VehiclePage, VehicleStatus, VehicleView};
use crate::domain::validation::validate_vehicle_input_now;
use crate::http::ACTOR_HEADER;
use crate::utils::error::{FleetError, Result};
use crate::utils::validation::validate_url;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

const FETCH_FAILED: &str = "Failed to load vehicles";
const CREATE_FAILED: &str = "Failed to create vehicle";
const UPDATE_FAILED: &str = "Failed to update status";

/// Result of a client action. Failures carry the message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientOutcome<T> {
    Success(T),
    Failure { message: String },
}

impl<T> ClientOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ClientOutcome::Success(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            ClientOutcome::Success(value) => Some(value),
            ClientOutcome::Failure { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub vehicles: Vec<VehicleView>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct VehicleEnvelope {
    vehicle: VehicleView,
}

/// Front-end side of the vehicle API. Mirrors the last listing and the last
/// error so a form can render them.
pub struct VehicleClient {
    client: Client,
    base_url: String,
    actor: RecordId,
    state: ClientState,
}

impl VehicleClient {
    /// `base_url` points at the API root, e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base_url: &str, actor: RecordId) -> Result<Self> {
        validate_url("client.base_url", base_url)?;
        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            actor,
            state: ClientState::default(),
        })
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `Err(None)` means no usable server message: the caller falls back to its default.
    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, Option<String>> {
        let response = request
            .header(ACTOR_HEADER, self.actor.to_string())
            .send()
            .await
            .map_err(|e| transport_failure(e.into()))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            tracing::debug!("Unreadable response body ({})", status);
            transport_failure(e.into())
        })?;

        if !status.is_success() {
            tracing::debug!("Fleet API answered {}: {}", status, body);
            return Err(body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string));
        }

        let data = body.get("data").cloned().ok_or(None)?;
        serde_json::from_value(data).map_err(|e| {
            tracing::warn!("Unexpected response shape: {}", e);
            None
        })
    }

    fn finish<T>(
        &mut self,
        result: std::result::Result<T, Option<String>>,
        default_message: &str,
    ) -> ClientOutcome<T> {
        self.state.loading = false;
        match result {
            Ok(value) => ClientOutcome::Success(value),
            Err(message) => {
                let message = message.unwrap_or_else(|| default_message.to_string());
                self.state.error = Some(message.clone());
                ClientOutcome::Failure { message }
            }
        }
    }

    fn begin(&mut self) {
        self.state.loading = true;
        self.state.error = None;
    }

    pub async fn fetch_vehicles(&mut self, page: u64, limit: u64) -> ClientOutcome<VehiclePage> {
        self.begin();
        let request = self
            .client
            .get(self.url("/vehicles"))
            .query(&[("page", page), ("limit", limit)]);
        let result = self.call::<VehiclePage>(request).await;

        if let Ok(listing) = &result {
            self.state.vehicles = listing.vehicles.clone();
            self.state.total = listing.pagination.total_items;
        }
        self.finish(result, FETCH_FAILED)
    }

    /// Checks the payload with the server's rules before sending it.
    pub async fn create_vehicle(&mut self, input: &VehicleInput) -> ClientOutcome<VehicleView> {
        self.begin();
        if let Err(e) = validate_vehicle_input_now(input) {
            return self.finish(Err(Some(e.to_string())), CREATE_FAILED);
        }

        let request = self.client.post(self.url("/vehicles")).json(input);
        let result = self
            .call::<VehicleEnvelope>(request)
            .await
            .map(|envelope| envelope.vehicle);
        self.finish(result, CREATE_FAILED)
    }

    pub async fn update_vehicle_status(
        &mut self,
        vehicle_id: &str,
        status: VehicleStatus,
    ) -> ClientOutcome<VehicleView> {
        self.begin();
        let request = self
            .client
            .patch(self.url(&format!("/vehicles/{}/status", vehicle_id)))
            .json(&serde_json::json!({ "status": status }));
        let result = self
            .call::<VehicleEnvelope>(request)
            .await
            .map(|envelope| envelope.vehicle);
        self.finish(result, UPDATE_FAILED)
    }
}

/// Logs a transport-level failure. There is no server message to show, so the
/// caller falls back to its default.
fn transport_failure(err: FleetError) -> Option<String> {
    tracing::warn!(
        kind = err.kind(),
        "{}: {}. {}",
        err.user_friendly_message(),
        err,
        err.recovery_suggestion()
    );
    None
}
