use std::{collections::HashMap, time::Duration};
use tracing::{error, info, warn};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

use common::actors::{Actor, ActorType, ControlMessage};

pub type ActorFactory = Box<dyn Fn() -> anyhow::Result<Box<dyn Actor>> + Send + Sync>;

/// Restarts actors that crash. A rebuilt actor starts from scratch, so any
/// state it kept (scheduler stats included) is gone.
pub struct Supervisor {
    actor_factories: HashMap<ActorType, ActorFactory>,
    handles: HashMap<ActorType, JoinHandle<anyhow::Result<()>>>,
    restarts: HashMap<ActorType, Instant>,
    restart_delay: Duration,
}

impl Supervisor {
    pub fn new(restart_delay: Duration) -> Self {
        Self {
            actor_factories: HashMap::new(),
            handles: HashMap::new(),
            restarts: HashMap::new(),
            restart_delay,
        }
    }

    pub fn register_actor(&mut self, actor_type: ActorType, factory: ActorFactory) {
        self.actor_factories.insert(actor_type, factory);
    }

    /// Runs until every actor has shut down on its own.
    pub async fn start(&mut self) {
        let mut check_interval = time::interval(Duration::from_secs(1));

        let (supervisor_tx, mut supervisor_rx) = mpsc::channel::<ControlMessage>(512);

        let actors: Vec<ActorType> = self.actor_factories.keys().copied().collect();
        actors.into_iter().for_each(|actor| {
            self.spawn_actor(actor, supervisor_tx.clone());
        });

        loop {
            tokio::select! {
                Some(msg) = supervisor_rx.recv() => {
                    match msg {
                        ControlMessage::Started(actor_type) => {
                            info!("{:?} is running.", actor_type);
                        }
                        ControlMessage::Error(actor_type, error_msg) => {
                            error!("Actor {:?} reported error: {}", actor_type, error_msg);
                        }
                    }
                }

                _ = check_interval.tick() => {
                    self.collect_finished().await;

                    let now = Instant::now();
                    let due: Vec<ActorType> = self
                        .restarts
                        .iter()
                        .filter(|(_, at)| **at <= now)
                        .map(|(actor, _)| *actor)
                        .collect();

                    due.into_iter().for_each(|actor| {
                        self.restarts.remove(&actor);
                        info!("Restarting {:?}", actor);
                        self.spawn_actor(actor, supervisor_tx.clone());
                    });

                    if self.handles.is_empty() && self.restarts.is_empty() {
                        info!("All actors stopped.");
                        return;
                    }
                }
            }
        }
    }

    async fn collect_finished(&mut self) {
        let finished: Vec<ActorType> = self
            .handles
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(actor, _)| *actor)
            .collect();

        for actor in finished {
            let Some(handle) = self.handles.remove(&actor) else {
                continue;
            };
            match handle.await {
                Ok(Ok(())) => {
                    warn!("{:?} finished without error; not restarting.", actor);
                    continue;
                }
                Ok(Err(e)) => error!("Actor {:?} crashed: {:#}", actor, e),
                Err(e) => error!("Actor {:?} panicked: {}", actor, e),
            }
            warn!("{:?} will restart in {:?}", actor, self.restart_delay);
            self.restarts.insert(actor, Instant::now() + self.restart_delay);
        }
    }

    fn spawn_actor(&mut self, actor_type: ActorType, tx: mpsc::Sender<ControlMessage>) {
        match (self.actor_factories[&actor_type])() {
            Ok(mut new_actor) => {
                let new_actor_handle = tokio::spawn(async move { new_actor.run(tx).await });
                self.handles.insert(actor_type, new_actor_handle);
            }
            Err(e) => {
                error!(
                    "Failed to build {:?}: {:#}. Retrying in {:?}",
                    actor_type, e, self.restart_delay
                );
                self.restarts
                    .insert(actor_type, Instant::now() + self.restart_delay);
            }
        }
    }
}
