//! Ephemeral port-forward tunnels into cluster-internal services
//!
//! A [`Tunnel`] owns its forwarding process and terminates it exactly once:
//! on an explicit [`Tunnel::close`] or when dropped, whichever comes first.
//! Teardown always goes through the tunnel's own child handle, so closing
//! one node's tunnel never touches another node's.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::process::{Child, Command as AsyncCommand};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::constants::tunnel::{LOCAL_HOST, READY_POLL_INTERVAL};
use crate::errors::TunnelError;
use crate::types::NodeTarget;

/// Whatever keeps a tunnel's forwarding alive
pub trait ForwardProcess: Send + Sync {
    fn terminate(&mut self);

    /// OS process id, when the forwarder is a real process
    fn pid(&self) -> Option<u32> {
        None
    }
}

/// A live forwarding channel for one node
pub struct Tunnel {
    chain: String,
    local_port: u16,
    process: Option<Box<dyn ForwardProcess>>,
}

impl Tunnel {
    pub fn new(chain: &str, local_port: u16, process: Box<dyn ForwardProcess>) -> Self {
        Self {
            chain: chain.to_string(),
            local_port,
            process: Some(process),
        }
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    pub fn is_open(&self) -> bool {
        self.process.is_some()
    }

    /// Forwarder process id while the tunnel is open
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(|process| process.pid())
    }

    /// Local URL for `rpc_path` on the forwarded service
    pub fn endpoint(&self, rpc_path: &str) -> String {
        format!("http://{}:{}{}", LOCAL_HOST, self.local_port, rpc_path)
    }

    /// Terminate the forwarding process; later calls are no-ops
    pub fn close(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.terminate();
            debug!("Closed tunnel for {} on port {}", self.chain, self.local_port);
        }
    }
}

impl Drop for Tunnel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens tunnels for check targets
#[async_trait]
pub trait TunnelProvider: Send + Sync {
    async fn open(&self, target: &NodeTarget, local_port: u16) -> Result<Tunnel, TunnelError>;
}

/// `kubectl port-forward service/<service> <local>:<remote> --namespace <ns>`
pub struct PortForward {
    program: String,
    ready_timeout: Duration,
}

impl PortForward {
    pub fn new(program: &str, ready_timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            ready_timeout,
        }
    }

    fn command(&self, target: &NodeTarget, local_port: u16) -> AsyncCommand {
        let mut command = AsyncCommand::new(&self.program);
        command
            .arg("port-forward")
            .arg(format!("service/{}", target.service))
            .arg(format!("{}:{}", local_port, target.port))
            .arg("--namespace")
            .arg(&target.namespace)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Start the forwarder and its stderr drain without waiting for readiness
    fn spawn(&self, target: &NodeTarget, local_port: u16) -> Result<PortForwardProcess, TunnelError> {
        let mut child = self
            .command(target, local_port)
            .spawn()
            .map_err(|e| TunnelError::SpawnFailed {
                chain: target.chain.clone(),
                reason: e.to_string(),
            })?;

        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| spawn_stderr_drain(target.chain.clone(), stderr));

        Ok(PortForwardProcess {
            chain: target.chain.clone(),
            pid: child.id(),
            child: Mutex::new(child),
            stderr_task,
        })
    }
}

/// A listener already on the local port would answer the readiness probe
/// and every RPC call in place of the forwarder
async fn ensure_port_free(chain: &str, local_port: u16) -> Result<(), TunnelError> {
    TcpListener::bind((LOCAL_HOST, local_port))
        .await
        .map(drop)
        .map_err(|e| TunnelError::PortInUse {
            chain: chain.to_string(),
            local_port,
            reason: e.to_string(),
        })
}

#[async_trait]
impl TunnelProvider for PortForward {
    async fn open(&self, target: &NodeTarget, local_port: u16) -> Result<Tunnel, TunnelError> {
        info!(
            "Opening port forward for {}: service/{} {}:{} in namespace {}",
            target.chain, target.service, local_port, target.port, target.namespace
        );

        ensure_port_free(&target.chain, local_port).await?;
        let mut process = self.spawn(target, local_port)?;

        if let Err(e) = process.wait_ready(local_port, self.ready_timeout).await {
            process.terminate();
            return Err(e);
        }

        debug!(
            "Port forward for {} ready on port {} (pid {:?})",
            target.chain, local_port, process.pid
        );
        Ok(Tunnel::new(&target.chain, local_port, Box::new(process)))
    }
}

struct PortForwardProcess {
    chain: String,
    pid: Option<u32>,
    // Only ever accessed through `get_mut`; the mutex makes the tunnel Sync
    child: Mutex<Child>,
    stderr_task: Option<JoinHandle<()>>,
}

impl PortForwardProcess {
    /// Poll the local port until it accepts a connection, the process exits
    /// or the deadline passes
    async fn wait_ready(&mut self, local_port: u16, timeout: Duration) -> Result<(), TunnelError> {
        let started = Instant::now();
        let deadline = started + timeout;

        loop {
            match self.child.get_mut().try_wait() {
                Ok(Some(status)) => {
                    return Err(TunnelError::ProcessExited {
                        chain: self.chain.clone(),
                        status: status.to_string(),
                    })
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(TunnelError::ProcessExited {
                        chain: self.chain.clone(),
                        status: e.to_string(),
                    })
                }
            }

            if TcpStream::connect((LOCAL_HOST, local_port)).await.is_ok() {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(TunnelError::NotReady {
                    chain: self.chain.clone(),
                    local_port,
                    waited_ms: started.elapsed().as_millis(),
                });
            }

            sleep(READY_POLL_INTERVAL).await;
        }
    }
}

impl ForwardProcess for PortForwardProcess {
    fn terminate(&mut self) {
        if let Err(e) = self.child.get_mut().start_kill() {
            debug!("Port forward for {} already stopped: {}", self.chain, e);
        }
        if let Some(task) = &self.stderr_task {
            task.abort();
        }
    }

    fn pid(&self) -> Option<u32> {
        self.pid
    }
}

/// Surface the forwarder's stderr as warnings; never fails the check
fn spawn_stderr_drain(chain: String, stderr: tokio::process::ChildStderr) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut line = String::new();
        while let Ok(bytes_read) = reader.read_line(&mut line).await {
            if bytes_read == 0 {
                break;
            }
            warn!("Port forwarding error for {}: {}", chain, line.trim());
            line.clear();
        }
    })
}
