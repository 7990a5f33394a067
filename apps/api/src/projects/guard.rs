//! Best-effort per-user lock around GitHub sync, kept in Redis.
//!
//! The guard only narrows the window for overlapping syncs. When Redis is
//! unreachable the sync proceeds unguarded and the `(user_id, external_url)`
//! unique constraint absorbs any duplicate insert.
//!
//! Each acquisition stores its own token as the value, and release deletes the
//! key only while that token is still there. A sync that outlives the TTL can
//! therefore never clear a guard taken by a later sync.

use std::time::Duration;

use redis::Client as RedisClient;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

const GUARD_TTL_SECS: u64 = 300;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Compare-and-delete: returns 1 when the key held `ARGV[1]` and was removed.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

pub fn guard_key(user_id: Uuid) -> String {
    format!("sync:github:{user_id}")
}

pub enum SyncGuard {
    Held {
        client: RedisClient,
        key: String,
        token: String,
    },
    Unguarded,
}

impl SyncGuard {
    /// `Conflict` when another sync for this user holds the guard.
    pub async fn acquire(client: &RedisClient, user_id: Uuid) -> Result<Self, AppError> {
        let key = guard_key(user_id);
        let token = Uuid::new_v4().to_string();
        match try_set(client, &key, &token).await {
            Ok(true) => Ok(SyncGuard::Held {
                client: client.clone(),
                key,
                token,
            }),
            Ok(false) => Err(AppError::Conflict(
                "A GitHub sync is already running for this user".to_string(),
            )),
            Err(e) => {
                warn!("sync guard unavailable, continuing without it: {e}");
                Ok(SyncGuard::Unguarded)
            }
        }
    }

    pub async fn release(self) {
        if let SyncGuard::Held { client, key, token } = self {
            let result = async {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let script = redis::Script::new(RELEASE_SCRIPT);
                script
                    .key(&key)
                    .arg(&token)
                    .invoke_async::<_, i64>(&mut conn)
                    .await
            };
            match tokio::time::timeout(CONNECT_TIMEOUT, result).await {
                Ok(Ok(1)) => {}
                Ok(Ok(_)) => warn!("sync guard {key} expired before release; left untouched"),
                Ok(Err(e)) => warn!("failed to release sync guard {key}: {e}"),
                Err(_) => warn!("timed out releasing sync guard {key}"),
            }
        }
    }
}

async fn try_set(client: &RedisClient, key: &str, token: &str) -> Result<bool, String> {
    let attempt = async {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(token)
            .arg("NX")
            .arg("EX")
            .arg(GUARD_TTL_SECS)
            .query_async(&mut conn)
            .await?;
        Ok::<_, redis::RedisError>(reply.is_some())
    };
    match tokio::time::timeout(CONNECT_TIMEOUT, attempt).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err("timed out connecting to redis".to_string()),
    }
}
