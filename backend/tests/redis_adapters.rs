//! Redis cache and bus adapters against a minimal RESP server.
//!
//! The server speaks just enough of the protocol for the commands the
//! adapters and the driver send: `PING`, `GET`, `SET`, `DEL`, `RPUSH` and a
//! `BLPOP` that really blocks until its timeout. Anything else is acknowledged
//! with `+OK`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use event_contracts::Topic;
use rstest::rstest;
use sportnews::domain::ObjectId;
use sportnews::domain::ports::{EventPublisher, EventSubscriber, NewsCache, NewsCacheKey};
use sportnews::outbound::bus::{BLPOP_TIMEOUT_SECS, RedisEventBus};
use sportnews::outbound::cache::RedisNewsCache;
use sportnews::outbound::redis_pool::RedisPool;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
struct Keyspace {
    lists: HashMap<String, VecDeque<String>>,
    strings: HashMap<String, String>,
}

type Store = Arc<Mutex<Keyspace>>;

struct FakeRedis {
    url: String,
    store: Store,
}

impl FakeRedis {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let store = Store::default();
        let shared = store.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, shared.clone()));
            }
        });
        Self {
            url: format!("redis://{addr}"),
            store,
        }
    }

    async fn pool(&self) -> RedisPool {
        RedisPool::connect(&self.url, 2).await.expect("pool")
    }

    fn list(&self, key: &str) -> Vec<String> {
        let keyspace = self.store.lock().expect("keyspace lock");
        keyspace
            .lists
            .get(key)
            .map(|items| items.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn string(&self, key: &str) -> Option<String> {
        let keyspace = self.store.lock().expect("keyspace lock");
        keyspace.strings.get(key).cloned()
    }
}

async fn serve(socket: TcpStream, store: Store) {
    let (read, mut write) = socket.into_split();
    let mut reader = BufReader::new(read);
    while let Some(args) = read_command(&mut reader).await {
        let reply = respond(&args, &store).await;
        if write.write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}

async fn read_command(reader: &mut BufReader<OwnedReadHalf>) -> Option<Vec<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    Some(args)
}

fn bulk(value: &str) -> String {
    format!("${}\r\n{value}\r\n", value.len())
}

async fn respond(args: &[String], store: &Store) -> String {
    let Some((name, rest)) = args.split_first() else {
        return "-ERR empty command\r\n".to_owned();
    };
    match (name.to_ascii_uppercase().as_str(), rest) {
        ("PING", _) => "+PONG\r\n".to_owned(),
        ("GET", [key]) => {
            let keyspace = store.lock().expect("keyspace lock");
            keyspace
                .strings
                .get(key)
                .map_or_else(|| "$-1\r\n".to_owned(), |value| bulk(value))
        }
        ("SET", [key, value, ..]) => {
            let mut keyspace = store.lock().expect("keyspace lock");
            keyspace.strings.insert(key.clone(), value.clone());
            "+OK\r\n".to_owned()
        }
        ("DEL", keys) => {
            let mut keyspace = store.lock().expect("keyspace lock");
            let removed = keys
                .iter()
                .filter(|key| keyspace.strings.remove(*key).is_some())
                .count();
            format!(":{removed}\r\n")
        }
        ("RPUSH", [key, values @ ..]) => {
            let mut keyspace = store.lock().expect("keyspace lock");
            let list = keyspace.lists.entry(key.clone()).or_default();
            list.extend(values.iter().cloned());
            format!(":{}\r\n", list.len())
        }
        ("BLPOP", [key, timeout]) => {
            let seconds: f64 = timeout.parse().unwrap_or(0.0);
            let deadline = Instant::now() + Duration::from_secs_f64(seconds);
            loop {
                let popped = {
                    let mut keyspace = store.lock().expect("keyspace lock");
                    keyspace.lists.get_mut(key).and_then(VecDeque::pop_front)
                };
                if let Some(value) = popped {
                    return format!("*2\r\n{}{}", bulk(key), bulk(&value));
                }
                if Instant::now() >= deadline {
                    return "*-1\r\n".to_owned();
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
        _ => "+OK\r\n".to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn empty_poll_waits_out_the_blocking_timeout_and_yields_nothing() {
    let redis = FakeRedis::start().await;
    let bus = RedisEventBus::new(redis.pool().await);

    let started = Instant::now();
    let result = bus.next_message(Topic::Confirmation).await;

    assert_eq!(result, Ok(None));
    assert!(started.elapsed() >= Duration::from_secs(BLPOP_TIMEOUT_SECS) - Duration::from_millis(100));
}

#[rstest]
#[tokio::test]
async fn payload_pushed_late_in_the_wait_is_delivered() {
    let redis = FakeRedis::start().await;
    let bus = RedisEventBus::new(redis.pool().await);
    let publisher = bus.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(700)).await;
        publisher
            .publish(Topic::Confirmation, "late".to_owned())
            .await
            .expect("publish");
    });

    let received = bus
        .next_message(Topic::Confirmation)
        .await
        .expect("bus reachable");

    assert_eq!(received.as_deref(), Some("late"));
    assert!(redis.list("confirmation_topic").is_empty());
}

#[rstest]
#[tokio::test]
async fn topics_map_to_prefixed_lists_in_publish_order() {
    let redis = FakeRedis::start().await;
    let bus = RedisEventBus::with_key_prefix(redis.pool().await, "dev:");

    for payload in ["first", "second"] {
        bus.publish(Topic::ObjectService, payload.to_owned())
            .await
            .expect("publish");
    }
    assert_eq!(redis.list("dev:object_service_topic"), ["first", "second"]);

    let first = bus.next_message(Topic::ObjectService).await.expect("bus");
    assert_eq!(first.as_deref(), Some("first"));
    assert_eq!(redis.list("dev:object_service_topic"), ["second"]);
}

#[rstest]
#[tokio::test]
async fn cache_entries_live_under_the_instance_prefix() {
    let redis = FakeRedis::start().await;
    let cache = RedisNewsCache::new(redis.pool().await, "RedisCacheInstance");
    let id = ObjectId::generate();
    let key = NewsCacheKey::for_news(&id);
    let stored_key = format!("RedisCacheInstancenews_{id}");

    assert_eq!(cache.get(&key).await.expect("get"), None);

    cache
        .set(&key, r#"{"title":"Derby day"}"#.to_owned())
        .await
        .expect("set");
    assert_eq!(
        redis.string(&stored_key).as_deref(),
        Some(r#"{"title":"Derby day"}"#)
    );
    assert_eq!(
        cache.get(&key).await.expect("get").as_deref(),
        Some(r#"{"title":"Derby day"}"#)
    );

    cache.remove(&key).await.expect("remove");
    assert!(redis.string(&stored_key).is_none());
    assert_eq!(cache.get(&key).await.expect("get"), None);
}
