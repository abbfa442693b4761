//! A [`libp2p`] Kademlia-backed [`DhtClient`] (§4.4).
//!
//! Shaped like the teacher's `Libp2pSync`: a swarm runs on its own task and
//! is driven entirely through a command channel; callers never touch the
//! `Swarm` directly. Where `Libp2pSync` composes `gossipsub` +
//! `request_response` behind a command/event channel, this composes a single
//! `kad::Behaviour` — the DHT adapter doesn't gossip or request/respond, it
//! only needs Kademlia's `put_record`/`get_record`.

use async_trait::async_trait;
use futures::StreamExt;
use libp2p::kad::{
    self, store::MemoryStore, Event as KadEvent, GetRecordError, GetRecordOk, PutRecordError,
    PutRecordOk, QueryId, QueryResult, Quorum, Record as KadRecord, RecordKey,
};
use libp2p::swarm::{NetworkBehaviour, SwarmEvent};
use libp2p::{identity, noise, tcp, yamux, Multiaddr, PeerId, Swarm, SwarmBuilder};
use libreseed_api::dht::{DhtClient, DhtKey};
use libreseed_types::error::TransportError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

#[derive(NetworkBehaviour)]
#[behaviour(to_swarm = "DhtBehaviourEvent")]
struct DhtBehaviour {
    kad: kad::Behaviour<MemoryStore>,
}

#[derive(Debug)]
enum DhtBehaviourEvent {
    Kad(KadEvent),
}

impl From<KadEvent> for DhtBehaviourEvent {
    fn from(event: KadEvent) -> Self {
        DhtBehaviourEvent::Kad(event)
    }
}

enum DhtCommand {
    Listen(Multiaddr),
    Dial(Multiaddr),
    PutRecord {
        key: RecordKey,
        value: Vec<u8>,
        resp: oneshot::Sender<Result<(), TransportError>>,
    },
    GetRecord {
        key: RecordKey,
        resp: oneshot::Sender<Result<Option<Vec<u8>>, TransportError>>,
    },
}

enum PendingQuery {
    Put(oneshot::Sender<Result<(), TransportError>>),
    Get(oneshot::Sender<Result<Option<Vec<u8>>, TransportError>>),
}

/// A real Kademlia DHT adapter, backed by a `libp2p` swarm running on its own
/// background task.
pub struct Libp2pDht {
    command_tx: mpsc::Sender<DhtCommand>,
    local_peer_id: PeerId,
    put_lock: Mutex<()>,
    swarm_task: Mutex<Option<JoinHandle<()>>>,
}

impl Libp2pDht {
    /// Builds and starts a new Kademlia swarm, listening on `listen_addr`
    /// and dialing each of `bootstrap_addrs`.
    pub fn new(
        local_key: identity::Keypair,
        listen_addr: Multiaddr,
        bootstrap_addrs: &[Multiaddr],
    ) -> anyhow::Result<Arc<Self>> {
        let local_peer_id = local_key.public().to_peer_id();
        let store = MemoryStore::new(local_peer_id);
        let kad = kad::Behaviour::new(local_peer_id, store);

        let mut swarm = SwarmBuilder::with_existing_identity(local_key)
            .with_tokio()
            .with_tcp(
                tcp::Config::default(),
                noise::Config::new,
                yamux::Config::default,
            )?
            .with_behaviour(|_| DhtBehaviour { kad })?
            .build();

        swarm.listen_on(listen_addr.clone())?;
        for addr in bootstrap_addrs {
            swarm.dial(addr.clone())?;
        }

        let (command_tx, command_rx) = mpsc::channel(256);
        let swarm_task = tokio::spawn(Self::run_swarm_loop(swarm, command_rx));

        Ok(Arc::new(Self {
            command_tx,
            local_peer_id,
            put_lock: Mutex::new(()),
            swarm_task: Mutex::new(Some(swarm_task)),
        }))
    }

    /// The local node's `PeerId`.
    pub fn local_peer_id(&self) -> PeerId {
        self.local_peer_id
    }

    /// Stops the background swarm task. Idempotent.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.swarm_task.lock().await.take() {
            handle.abort();
        }
    }

    async fn run_swarm_loop(mut swarm: Swarm<DhtBehaviour>, mut command_rx: mpsc::Receiver<DhtCommand>) {
        let mut pending: HashMap<QueryId, PendingQuery> = HashMap::new();

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else {
                        tracing::info!(target: "dht", event = "shutdown", reason = "command channel closed");
                        break;
                    };
                    match command {
                        DhtCommand::Listen(addr) => {
                            if let Err(e) = swarm.listen_on(addr) {
                                tracing::warn!(target: "dht", event = "listen_failed", error = %e);
                            }
                        }
                        DhtCommand::Dial(addr) => {
                            if let Err(e) = swarm.dial(addr) {
                                tracing::warn!(target: "dht", event = "dial_failed", error = %e);
                            }
                        }
                        DhtCommand::PutRecord { key, value, resp } => {
                            let record = KadRecord::new(key, value);
                            match swarm.behaviour_mut().kad.put_record(record, Quorum::One) {
                                Ok(id) => {
                                    pending.insert(id, PendingQuery::Put(resp));
                                }
                                Err(e) => {
                                    let _ = resp.send(Err(TransportError::DhtStoreFailed(e.to_string())));
                                }
                            }
                        }
                        DhtCommand::GetRecord { key, resp } => {
                            let id = swarm.behaviour_mut().kad.get_record(key);
                            pending.insert(id, PendingQuery::Get(resp));
                        }
                    }
                }
                event = swarm.select_next_some() => {
                    if let SwarmEvent::Behaviour(DhtBehaviourEvent::Kad(KadEvent::OutboundQueryProgressed { id, result, step, .. })) = event {
                        match result {
                            QueryResult::PutRecord(result) => {
                                if let Some(PendingQuery::Put(resp)) = pending.remove(&id) {
                                    let outcome = match result {
                                        Ok(PutRecordOk { .. }) => Ok(()),
                                        Err(PutRecordError::QuorumFailed { .. }) => Ok(()),
                                        Err(e) => Err(TransportError::DhtStoreFailed(e.to_string())),
                                    };
                                    let _ = resp.send(outcome);
                                }
                            }
                            QueryResult::GetRecord(result) => {
                                let is_final = step.last;
                                match result {
                                    Ok(GetRecordOk::FoundRecord(found)) => {
                                        if let Some(PendingQuery::Get(resp)) = pending.remove(&id) {
                                            let _ = resp.send(Ok(Some(found.record.value)));
                                        }
                                        swarm.behaviour_mut().kad.query_mut(&id).map(|mut q| q.finish());
                                    }
                                    Ok(GetRecordOk::FinishedWithNoAdditionalRecord { .. }) if is_final => {
                                        if let Some(PendingQuery::Get(resp)) = pending.remove(&id) {
                                            let _ = resp.send(Ok(None));
                                        }
                                    }
                                    Err(GetRecordError::NotFound { .. }) => {
                                        if let Some(PendingQuery::Get(resp)) = pending.remove(&id) {
                                            let _ = resp.send(Ok(None));
                                        }
                                    }
                                    Err(e) => {
                                        if let Some(PendingQuery::Get(resp)) = pending.remove(&id) {
                                            let _ = resp.send(Err(TransportError::DhtTimeout(Duration::from_secs(30))));
                                        }
                                        tracing::debug!(target: "dht", event = "get_record_error", error = %e);
                                    }
                                    _ => {}
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl DhtClient for Libp2pDht {
    async fn announce(&self, key: DhtKey, value: Vec<u8>) -> Result<(), TransportError> {
        // Serialize this process's own PUTs against this adapter (§5): only
        // one in-flight PUT from us at a time, regardless of key.
        let _guard = self.put_lock.lock().await;
        let (resp_tx, resp_rx) = oneshot::channel();
        self.command_tx
            .send(DhtCommand::PutRecord {
                key: RecordKey::new(&key.to_vec()),
                value,
                resp: resp_tx,
            })
            .await
            .map_err(|_| TransportError::DhtStoreFailed("swarm task not running".into()))?;

        tokio::time::timeout(Duration::from_secs(30), resp_rx)
            .await
            .map_err(|_| TransportError::DhtTimeout(Duration::from_secs(30)))?
            .map_err(|_| TransportError::DhtStoreFailed("swarm task dropped response".into()))?
    }

    async fn fetch(&self, key: DhtKey, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.command_tx
            .send(DhtCommand::GetRecord {
                key: RecordKey::new(&key.to_vec()),
                resp: resp_tx,
            })
            .await
            .map_err(|_| TransportError::DhtTimeout(timeout))?;

        tokio::time::timeout(timeout, resp_rx)
            .await
            .map_err(|_| TransportError::DhtTimeout(timeout))?
            .map_err(|_| TransportError::DhtTimeout(timeout))?
    }
}
