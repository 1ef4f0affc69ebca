use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use monitor_logging::{monitor_debug, monitor_warn};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::connector::{ChannelTransportSink, StreamConnector};
use crate::{EngineError, EngineEvent, Generation, TaskId};

enum EngineCommand {
    Open {
        generation: Generation,
        task_id: TaskId,
    },
    Close {
        generation: Generation,
    },
}

/// Owns the background runtime that carries every stream connection.
///
/// Dropping the handle stops the command loop, which cancels whatever
/// connections are still open.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(connector: Arc<dyn StreamConnector>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("monitor-stream")
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("monitor-engine".to_string())
            .spawn(move || run_command_loop(runtime, connector, cmd_rx, event_tx))?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn open(&self, generation: Generation, task_id: TaskId) {
        let _ = self.cmd_tx.send(EngineCommand::Open {
            generation,
            task_id,
        });
    }

    /// Cancels the connection for `generation`. Unknown generations are ignored.
    pub fn close(&self, generation: Generation) {
        let _ = self.cmd_tx.send(EngineCommand::Close { generation });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn run_command_loop(
    runtime: Runtime,
    connector: Arc<dyn StreamConnector>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut connections: HashMap<Generation, CancellationToken> = HashMap::new();

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Open {
                generation,
                task_id,
            } => {
                let token = CancellationToken::new();
                if let Some(previous) = connections.insert(generation, token.clone()) {
                    monitor_warn!("Generation {} opened twice; cancelling the first", generation);
                    previous.cancel();
                }
                let connector = connector.clone();
                let sink = ChannelTransportSink::new(generation, event_tx.clone());
                runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {
                            monitor_debug!(
                                "Connection {} for task {} cancelled",
                                generation,
                                task_id
                            );
                        }
                        _ = connector.connect(&task_id, &sink) => {
                            monitor_debug!(
                                "Connection {} for task {} finished",
                                generation,
                                task_id
                            );
                        }
                    }
                });
            }
            EngineCommand::Close { generation } => {
                if let Some(token) = connections.remove(&generation) {
                    token.cancel();
                }
            }
        }
    }

    for (_, token) in connections.drain() {
        token.cancel();
    }
    runtime.shutdown_background();
}
