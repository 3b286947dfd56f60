use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use crate::{clients::Collaborators, common::Vars, workflow::node::NodeId};

/// Everything a node action may read while it runs.
#[derive(Clone)]
pub struct ActionContext {
    nid: NodeId,
    inputs: Vars,
    team_id: Option<String>,
    outputs: HashMap<NodeId, Value>,
    clients: Collaborators,
    default_headers: BTreeMap<String, String>,
    simulated_delay: Duration,
    now: NaiveDateTime,
}

impl ActionContext {
    pub fn new(
        nid: impl Into<NodeId>,
        clients: Collaborators,
    ) -> Self {
        Self {
            nid: nid.into(),
            inputs: Vars::new(),
            team_id: None,
            outputs: HashMap::new(),
            clients,
            default_headers: BTreeMap::new(),
            simulated_delay: Duration::ZERO,
            now: Local::now().naive_local(),
        }
    }

    pub fn with_inputs(
        mut self,
        inputs: Vars,
    ) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_team_id(
        mut self,
        team_id: Option<String>,
    ) -> Self {
        self.team_id = team_id;
        self
    }

    pub fn with_outputs(
        mut self,
        outputs: HashMap<NodeId, Value>,
    ) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_default_headers(
        mut self,
        headers: BTreeMap<String, String>,
    ) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn with_simulated_delay(
        mut self,
        delay: Duration,
    ) -> Self {
        self.simulated_delay = delay;
        self
    }

    /// Pins the wall clock used by time-relative actions.
    pub fn with_now(
        mut self,
        now: NaiveDateTime,
    ) -> Self {
        self.now = now;
        self
    }

    pub fn nid(&self) -> &str {
        &self.nid
    }

    /// Input values resolved from incoming edges.
    pub fn inputs(&self) -> &Vars {
        &self.inputs
    }

    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    /// Output values of nodes already dispatched in this run.
    pub fn outputs(&self) -> &HashMap<NodeId, Value> {
        &self.outputs
    }

    pub fn clients(&self) -> &Collaborators {
        &self.clients
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }

    pub fn simulated_delay(&self) -> Duration {
        self.simulated_delay
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }
}
