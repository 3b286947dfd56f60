use std::sync::Arc;

use crate::{
    CalendarClient, Collaborators, Config, EmailClient, GraphStore, HttpClient, Result, Runner, StatusSink,
    runner::{FixedPacing, NoPacing, Pacing},
    runtime::Channel,
};

/// Assembles a [`Runner`] from a [`Config`] plus optional overrides.
///
/// Collaborators that are not supplied are built from the config's
/// endpoints with a shared reqwest client. Without a sink, statuses are only
/// published on the runner's channel.
#[derive(Default)]
pub struct RunnerBuilder {
    config: Config,
    sink: Option<Arc<dyn StatusSink>>,
    channel: Option<Arc<Channel>>,
    pacing: Option<Arc<dyn Pacing>>,
    http: Option<Arc<dyn HttpClient>>,
    email: Option<Arc<dyn EmailClient>>,
    calendar: Option<Arc<dyn CalendarClient>>,
}

impl RunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn sink(
        mut self,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn channel(
        mut self,
        channel: Arc<Channel>,
    ) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn pacing(
        mut self,
        pacing: Arc<dyn Pacing>,
    ) -> Self {
        self.pacing = Some(pacing);
        self
    }

    pub fn http_client(
        mut self,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        self.http = Some(http);
        self
    }

    pub fn email_client(
        mut self,
        email: Arc<dyn EmailClient>,
    ) -> Self {
        self.email = Some(email);
        self
    }

    pub fn calendar_client(
        mut self,
        calendar: Arc<dyn CalendarClient>,
    ) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Sets all three collaborators at once.
    pub fn collaborators(
        self,
        clients: Collaborators,
    ) -> Self {
        self.http_client(clients.http).email_client(clients.email).calendar_client(clients.calendar)
    }

    pub fn build(self) -> Result<Runner> {
        let clients = match (self.http, self.email, self.calendar) {
            (Some(http), Some(email), Some(calendar)) => Collaborators::new(http, email, calendar),
            (http, email, calendar) => {
                let defaults = Collaborators::from_config(&self.config)?;
                Collaborators::new(http.unwrap_or(defaults.http), email.unwrap_or(defaults.email), calendar.unwrap_or(defaults.calendar))
            }
        };

        let fixed = FixedPacing::from_config(&self.config.pacing);
        let pacing: Arc<dyn Pacing> = match self.pacing {
            Some(pacing) => pacing,
            None if fixed.is_zero() => Arc::new(NoPacing),
            None => Arc::new(fixed),
        };

        let sink: Arc<dyn StatusSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(GraphStore::default()),
        };
        let channel = self.channel.unwrap_or_else(|| Arc::new(Channel::new()));

        Ok(Runner::new(self.config, clients, sink, channel, pacing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Stubs;

    #[test]
    fn test_build_with_defaults() {
        let runner = RunnerBuilder::new().build().unwrap();
        assert!(!runner.is_running());
        assert_eq!(runner.config().simulated_action_delay_ms, 1000);
    }

    #[test]
    fn test_shared_channel() {
        let channel = Arc::new(Channel::new());
        let runner = RunnerBuilder::new().collaborators(Stubs::new().collaborators()).channel(channel.clone()).build().unwrap();
        assert!(Arc::ptr_eq(&runner.channel(), &channel));
    }
}
