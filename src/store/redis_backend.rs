//! Redis Backend Module
//!
//! [`CacheBackend`] over a Redis server. Writes are issued as a single
//! native `SET` carrying every requested flag, so conditional and expiry
//! semantics are exactly Redis's own.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, info};

use crate::error::Result;
use crate::store::{CacheBackend, SetReply, WriteOptions};

/// Keys requested per `SCAN` round-trip.
const SCAN_BATCH: usize = 500;

// == Redis Backend ==
/// Redis store reached through an auto-reconnecting connection manager.
#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
}

impl RedisBackend {
    // == Constructor ==
    /// Connects to the server at `url` (`redis://host:port/db`).
    ///
    /// # Errors
    /// [`crate::error::CacheError::StoreUnavailable`] when the server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        info!("Connected to Redis at {}", url);
        Ok(Self { manager })
    }
}

// == SET Command ==
/// Builds `SET key value [EX|PX|EXAT|PXAT n | KEEPTTL] [NX|XX] [GET]`.
pub fn set_command(key: &str, value: &[u8], options: &WriteOptions) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);

    if let Some(seconds) = options.expire_after_seconds {
        cmd.arg("EX").arg(seconds);
    }
    if let Some(millis) = options.expire_after_millis {
        cmd.arg("PX").arg(millis);
    }
    if let Some(timestamp) = options.expire_at_unix_seconds {
        cmd.arg("EXAT").arg(timestamp);
    }
    if let Some(timestamp) = options.expire_at_unix_millis {
        cmd.arg("PXAT").arg(timestamp);
    }
    if options.retain_existing_ttl {
        cmd.arg("KEEPTTL");
    }
    if options.only_if_absent {
        cmd.arg("NX");
    }
    if options.only_if_present {
        cmd.arg("XX");
    }
    if options.return_previous_value {
        cmd.arg("GET");
    }

    cmd
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: &WriteOptions) -> Result<SetReply> {
        let mut conn = self.manager.clone();
        let cmd = set_command(key, &value, options);

        if options.return_previous_value {
            // With GET the reply is the old value, so success is inferred
            // from the condition and the old value's presence.
            let previous: Option<Vec<u8>> = cmd.query_async(&mut conn).await?;
            let written = options.permits(previous.is_some());
            debug!(address = key, written, "SET ... GET");
            return Ok(SetReply { written, previous });
        }

        let status: Option<String> = cmd.query_async(&mut conn).await?;
        let written = status.is_some();
        debug!(address = key, written, "SET");
        Ok(SetReply {
            written,
            previous: None,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn packed(cmd: &redis::Cmd) -> String {
        String::from_utf8_lossy(&cmd.get_packed_command()).into_owned()
    }

    fn has_arg(cmd: &redis::Cmd, arg: &str) -> bool {
        packed(cmd).contains(&format!("\r\n{}\r\n", arg))
    }

    #[test]
    fn test_plain_set_has_no_flags() {
        let cmd = set_command("addr", b"v", &WriteOptions::new());
        assert_eq!(packed(&cmd), "*3\r\n$3\r\nSET\r\n$4\r\naddr\r\n$1\r\nv\r\n");
    }

    #[test]
    fn test_expiry_flags() {
        let cmd = set_command("addr", b"v", &WriteOptions::new().with_expire_after_seconds(30));
        assert!(has_arg(&cmd, "EX"));
        assert!(has_arg(&cmd, "30"));

        let cmd = set_command("addr", b"v", &WriteOptions::new().with_expire_at_unix_millis(1700000000000));
        assert!(has_arg(&cmd, "PXAT"));
        assert!(has_arg(&cmd, "1700000000000"));
        assert!(!has_arg(&cmd, "EX"));
    }

    #[test]
    fn test_condition_flags() {
        let options = WriteOptions::new()
            .only_if_present()
            .retain_existing_ttl()
            .return_previous_value();
        let cmd = set_command("addr", b"v", &options);

        assert!(has_arg(&cmd, "XX"));
        assert!(has_arg(&cmd, "KEEPTTL"));
        assert!(has_arg(&cmd, "GET"));
        assert!(!has_arg(&cmd, "NX"));
    }
}
