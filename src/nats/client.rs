use anyhow::{Context, Result};
use async_nats::Client;
use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use super::messages::{ControlAction, ControlMessage, SessionEventMessage};
use crate::profile::OutputFormat;
use crate::session::{SessionHandle, StartRequest};

pub struct NatsBridge {
    client: Client,
    service: String,
}

impl NatsBridge {
    /// Connect to NATS server
    pub async fn connect(url: &str, service: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client, service })
    }

    /// Spawn the event-publisher and control-subscriber tasks.
    pub async fn spawn(self, handle: SessionHandle) -> Result<()> {
        let events_subject = format!("{}.events", self.service);
        let control_subject = format!("{}.control", self.service);

        // Session events: broadcast bus -> NATS.
        let mut events = handle.subscribe();
        let client = self.client.clone();
        let service = self.service.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let message = SessionEventMessage {
                            service: service.clone(),
                            timestamp: chrono::Utc::now().to_rfc3339(),
                            event,
                        };
                        let payload = match serde_json::to_vec(&message) {
                            Ok(payload) => payload,
                            Err(e) => {
                                error!("Failed to encode session event: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = client.publish(events_subject.clone(), payload.into()).await
                        {
                            error!("Failed to publish session event: {}", e);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("event publisher lagged, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        // Control commands: NATS -> controller.
        let mut subscriber = self
            .client
            .subscribe(control_subject.clone())
            .await
            .context("Failed to subscribe to control subject")?;

        info!("Subscribed to {}", control_subject);

        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<ControlMessage>(&msg.payload) {
                    Ok(control) => {
                        if let Err(e) = dispatch(&handle, control).await {
                            error!("Failed to forward control message: {:#}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse control message: {}", e);
                    }
                }
            }
        });

        Ok(())
    }
}

async fn dispatch(handle: &SessionHandle, msg: ControlMessage) -> Result<()> {
    match msg.action {
        ControlAction::Start => {
            let Some(path) = msg.path else {
                warn!("start control message is missing a path, ignoring");
                return Ok(());
            };
            let format = msg
                .format
                .as_deref()
                .map(OutputFormat::parse_lossy)
                .unwrap_or(OutputFormat::Mp3);
            handle
                .start(StartRequest {
                    format,
                    path: path.into(),
                    high_quality: msg.high_quality.unwrap_or(false),
                    max_file_size: msg.max_file_size.unwrap_or(-1),
                })
                .await
        }
        ControlAction::Stop => handle.stop().await,
        ControlAction::EnableMonitoring => handle.enable_monitoring().await,
        ControlAction::DisableMonitoring => handle.disable_monitoring().await,
    }
}
