//! Recording tunnel provider
//!
//! Routes each chain to a local mock server instead of spawning a
//! port-forward, and records which local ports were requested, how many
//! tunnels were open at once and how often each tunnel was closed.

use async_trait::async_trait;
use checknode::errors::TunnelError;
use checknode::tunnel::{ForwardProcess, Tunnel, TunnelProvider};
use checknode::types::NodeTarget;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Ledger {
    requested_ports: Vec<u16>,
    open_ports: HashSet<u16>,
    closes: HashMap<String, usize>,
    max_open: usize,
    collisions: usize,
}

pub struct FakeTunnels {
    routes: HashMap<String, u16>,
    failing: HashSet<String>,
    open_delay: Duration,
    ledger: Arc<Mutex<Ledger>>,
    opens: AtomicUsize,
}

impl FakeTunnels {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            failing: HashSet::new(),
            open_delay: Duration::from_millis(50),
            ledger: Arc::new(Mutex::new(Ledger::default())),
            opens: AtomicUsize::new(0),
        }
    }

    /// Forward `chain` to the mock server listening on `port`
    pub fn route(mut self, chain: &str, port: u16) -> Self {
        self.routes.insert(chain.to_string(), port);
        self
    }

    /// Make opening the tunnel for `chain` fail
    pub fn fail(mut self, chain: &str) -> Self {
        self.failing.insert(chain.to_string());
        self
    }

    pub fn requested_ports(&self) -> Vec<u16> {
        self.ledger.lock().unwrap().requested_ports.clone()
    }

    pub fn closes(&self, chain: &str) -> usize {
        self.ledger.lock().unwrap().closes.get(chain).copied().unwrap_or(0)
    }

    pub fn open_now(&self) -> usize {
        self.ledger.lock().unwrap().open_ports.len()
    }

    pub fn max_open(&self) -> usize {
        self.ledger.lock().unwrap().max_open
    }

    pub fn collisions(&self) -> usize {
        self.ledger.lock().unwrap().collisions
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

struct FakeProcess {
    chain: String,
    local_port: u16,
    ledger: Arc<Mutex<Ledger>>,
}

impl ForwardProcess for FakeProcess {
    fn terminate(&mut self) {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.open_ports.remove(&self.local_port);
        *ledger.closes.entry(self.chain.clone()).or_insert(0) += 1;
    }
}

#[async_trait]
impl TunnelProvider for FakeTunnels {
    async fn open(&self, target: &NodeTarget, local_port: u16) -> Result<Tunnel, TunnelError> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(&target.chain) {
            return Err(TunnelError::ProcessExited {
                chain: target.chain.clone(),
                status: "exit status: 1".to_string(),
            });
        }

        {
            let mut ledger = self.ledger.lock().unwrap();
            ledger.requested_ports.push(local_port);
            if !ledger.open_ports.insert(local_port) {
                ledger.collisions += 1;
            }
            ledger.max_open = ledger.max_open.max(ledger.open_ports.len());
        }

        let process = FakeProcess {
            chain: target.chain.clone(),
            local_port,
            ledger: self.ledger.clone(),
        };
        let route = self.routes.get(&target.chain).copied().unwrap_or(local_port);
        let tunnel = Tunnel::new(&target.chain, route, Box::new(process));

        // Keep tunnels of concurrent checks overlapping
        tokio::time::sleep(self.open_delay).await;

        Ok(tunnel)
    }
}
