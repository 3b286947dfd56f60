use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::{FlowRunnerError, Result, ShareLock, events::StatusEvent};

macro_rules! dispatch_event {
    ($handles:expr, $(&$item:ident), +) => {
        let handlers = $handles.read().unwrap_or_else(PoisonError::into_inner).clone();
        for handle in handlers.iter() {
            (handle)($(&$item),+);
        }
    };
}

const EVENT_QUEUE_SIZE: usize = 2048;

pub type StatusEventHandle = Arc<dyn Fn(&StatusEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// use the glob pattern to match the node id
    /// eg. api-*
    pub nid: String,

    /// use the glob pattern to match the edge id
    pub eid: String,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            nid: "*".to_string(),
            eid: "*".to_string(),
        }
    }
}

impl ChannelOptions {
    pub fn with_nid(nid: impl Into<String>) -> Self {
        Self {
            nid: nid.into(),
            ..Default::default()
        }
    }

    pub fn with_eid(eid: impl Into<String>) -> Self {
        Self {
            eid: eid.into(),
            ..Default::default()
        }
    }
}

/// Fan-out point for [`StatusEvent`]s.
///
/// Synchronous handlers run inline on the emitting task; async consumers
/// can [`subscribe`](Channel::subscribe) to a broadcast receiver instead.
#[derive(Clone)]
pub struct Channel {
    sender: broadcast::Sender<StatusEvent>,
    events: ShareLock<Vec<StatusEventHandle>>,
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_QUEUE_SIZE);
        Self {
            sender,
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn emit(
        &self,
        event: StatusEvent,
    ) {
        dispatch_event!(self.events, &event);
        // no subscribers is not an error
        let _ = self.sender.send(event);
    }
}

/// Filtered registration of event handlers on a [`Channel`].
#[derive(Clone)]
pub struct ChannelEvent {
    channel: Arc<Channel>,

    glob: (globset::GlobMatcher, globset::GlobMatcher),
}

impl ChannelEvent {
    pub fn channel(
        channel: Arc<Channel>,
        options: ChannelOptions,
    ) -> Result<Self> {
        let compile = |pattern: &str| globset::Glob::new(pattern).map(|g| g.compile_matcher()).map_err(|e| FlowRunnerError::Config(format!("invalid glob '{}': {}", pattern, e)));

        Ok(Self {
            channel,
            glob: (compile(&options.nid)?, compile(&options.eid)?),
        })
    }

    /// Node status changes whose node id matches.
    pub fn on_node(
        &self,
        f: impl Fn(&StatusEvent) + Send + Sync + 'static,
    ) {
        let (nid_glob, _) = self.glob.clone();
        self.push(move |e| {
            if let StatusEvent::Node {
                nid,
                ..
            } = e
            {
                if nid_glob.is_match(nid) {
                    f(e);
                }
            }
        });
    }

    /// Edge animation changes whose edge id matches.
    pub fn on_edge(
        &self,
        f: impl Fn(&StatusEvent) + Send + Sync + 'static,
    ) {
        let (_, eid_glob) = self.glob.clone();
        self.push(move |e| {
            if let StatusEvent::Edge {
                eid,
                ..
            } = e
            {
                if eid_glob.is_match(eid) {
                    f(e);
                }
            }
        });
    }

    /// Run lifecycle events; not filtered.
    pub fn on_run(
        &self,
        f: impl Fn(&StatusEvent) + Send + Sync + 'static,
    ) {
        self.push(move |e| {
            if let StatusEvent::Run(_) = e {
                f(e);
            }
        });
    }

    /// Node failures whose node id matches.
    pub fn on_error(
        &self,
        f: impl Fn(&StatusEvent) + Send + Sync + 'static,
    ) {
        self.on_node(move |e| {
            if e.is_error() {
                f(e);
            }
        });
    }

    fn push(
        &self,
        f: impl Fn(&StatusEvent) + Send + Sync + 'static,
    ) {
        self.channel.events.write().unwrap_or_else(PoisonError::into_inner).push(Arc::new(f));
    }
}
