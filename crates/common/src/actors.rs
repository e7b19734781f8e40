use async_trait::async_trait;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorType {
    SchedulerActor,
}

/// Messages sent from Actors to the Supervisor
pub enum ControlMessage {
    Started(ActorType),
    Error(ActorType, String),
}

impl std::fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started(actor_type) => write!(f, "Started({:?})", actor_type),
            Self::Error(actor_type, err) => write!(f, "Error({:?}, {})", actor_type, err),
        }
    }
}

/// The trait that all restartable services must implement
#[async_trait]
pub trait Actor: Send {
    fn name(&self) -> ActorType;

    /// The main loop of the actor.
    /// Returning `Err` (or panicking) makes the supervisor rebuild it after the restart delay.
    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()>;
}
