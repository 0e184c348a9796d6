//! MPRIS media backend: drives an external player over D-Bus.

use crate::media::{MediaCommand, MediaControl, MediaError, MediaSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use zbus::Proxy;
use zvariant::OwnedValue;

const PLAYER_IFACE: &str = "org.mpris.MediaPlayer2.Player";
const PLAYER_PATH: &str = "/org/mpris/MediaPlayer2";
const PROPS_IFACE: &str = "org.freedesktop.DBus.Properties";
const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Global D-Bus connection singleton
static DBUS_CONNECTION: OnceCell<Arc<zbus::Connection>> = OnceCell::const_new();

/// Get or create a shared D-Bus session connection
async fn get_dbus_conn() -> Result<Arc<zbus::Connection>, MediaError> {
    DBUS_CONNECTION
        .get_or_try_init(|| async {
            let conn = zbus::Connection::session()
                .await
                .map_err(|_| MediaError::NoConnection)?;
            Ok(Arc::new(conn))
        })
        .await
        .cloned()
}

/// List MPRIS-capable bus names, honoring a case-insensitive blocklist.
pub async fn discover_players(block: &[String]) -> Result<Vec<String>, MediaError> {
    let conn = get_dbus_conn().await?;
    let bus = Proxy::new(
        &conn,
        "org.freedesktop.DBus",
        "/org/freedesktop/DBus",
        "org.freedesktop.DBus",
    )
    .await?;
    let reply = bus.call_method("ListNames", &()).await?;
    let names: Vec<String> = reply.body().deserialize().unwrap_or_default();
    Ok(names
        .into_iter()
        .filter(|name| name.starts_with(MPRIS_PREFIX))
        .filter(|name| !is_blocked(name, block))
        .collect())
}

/// Returns true if the service name (case-insensitive) contains any blocked string.
pub fn is_blocked(service: &str, block: &[String]) -> bool {
    let service_lower = service.to_lowercase();
    block
        .iter()
        .any(|blocked| service_lower.contains(&blocked.to_lowercase()))
}

fn micros_from_owned(val: &OwnedValue) -> Option<f64> {
    // Players disagree on the numeric type; try the common shapes.
    if let Ok(i) = std::convert::TryInto::<i64>::try_into(val.clone()) {
        return Some(i as f64 / 1_000_000.0);
    }
    if let Ok(u) = std::convert::TryInto::<u64>::try_into(val.clone()) {
        return Some(u as f64 / 1_000_000.0);
    }
    if let Ok((i,)) = std::convert::TryInto::<(i64,)>::try_into(val.clone()) {
        return Some(i as f64 / 1_000_000.0);
    }
    None
}

/// Drives one MPRIS player service.
pub struct MprisMedia {
    service: String,
}

impl MprisMedia {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    async fn player_proxy(&self) -> Result<Proxy<'_>, MediaError> {
        let conn = get_dbus_conn().await?;
        Ok(Proxy::new(&conn, self.service.as_str(), PLAYER_PATH, PLAYER_IFACE).await?)
    }

    async fn props_proxy(&self) -> Result<Proxy<'_>, MediaError> {
        let conn = get_dbus_conn().await?;
        Ok(Proxy::new(&conn, self.service.as_str(), PLAYER_PATH, PROPS_IFACE).await?)
    }

    /// Targeted Properties.Get to avoid triggering GetAll on some players.
    async fn get_property(&self, name: &str) -> Result<Option<OwnedValue>, MediaError> {
        let props = self.props_proxy().await?;
        if let Ok(reply) = props.call_method("Get", &(PLAYER_IFACE, name)).await
            && let Ok(val) = reply.body().deserialize::<OwnedValue>()
        {
            return Ok(Some(val));
        }
        Ok(None)
    }

    async fn position(&self) -> Result<f64, MediaError> {
        Ok(self
            .get_property("Position")
            .await?
            .as_ref()
            .and_then(micros_from_owned)
            .unwrap_or(0.0))
    }

    /// Track duration from the Metadata dict (`mpris:length`), if known.
    async fn duration(&self) -> Result<Option<f64>, MediaError> {
        let Some(val) = self.get_property("Metadata").await? else {
            return Ok(None);
        };
        let Ok(map) =
            std::convert::TryInto::<HashMap<String, OwnedValue>>::try_into(val)
        else {
            return Ok(None);
        };
        Ok(map.get("mpris:length").and_then(micros_from_owned))
    }

    async fn playback_status(&self) -> Result<Option<bool>, MediaError> {
        let Some(val) = self.get_property("PlaybackStatus").await? else {
            return Ok(None);
        };
        let Ok(status) = std::convert::TryInto::<String>::try_into(val) else {
            return Ok(None);
        };
        match status.as_str() {
            "Playing" => Ok(Some(true)),
            "Paused" | "Stopped" => Ok(Some(false)),
            _ => Ok(None),
        }
    }
}

impl MediaControl for MprisMedia {
    async fn apply(&self, cmd: MediaCommand) -> Result<(), MediaError> {
        let player = self.player_proxy().await?;
        match cmd {
            MediaCommand::Load(url) => {
                player.call_method("OpenUri", &(url.as_str(),)).await?;
            }
            MediaCommand::Play => {
                player.call_method("Play", &()).await?;
            }
            MediaCommand::Pause => {
                player.call_method("Pause", &()).await?;
            }
            MediaCommand::SetPosition(target_secs) => {
                // MPRIS Seek is relative; convert the absolute target into an
                // offset from the current position.
                let current = self.position().await?;
                let mut offset_micros = ((target_secs - current) * 1_000_000.0).round();
                if !offset_micros.is_finite() {
                    offset_micros = 0.0;
                }
                player.call_method("Seek", &(offset_micros as i64,)).await?;
            }
            MediaCommand::SetMuted(muted) => {
                let volume = if muted { 0.0f64 } else { 1.0f64 };
                let props = self.props_proxy().await?;
                props
                    .call_method("Set", &(PLAYER_IFACE, "Volume", zvariant::Value::from(volume)))
                    .await?;
            }
        }
        Ok(())
    }

    async fn poll(&self) -> Result<MediaSnapshot, MediaError> {
        Ok(MediaSnapshot {
            position: self.position().await?,
            duration: self.duration().await?,
            playing: self.playback_status().await?,
        })
    }
}
