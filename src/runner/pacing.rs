use std::time::Duration;

use async_trait::async_trait;

use crate::PacingConfig;

/// Where in the traversal a pause is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacePoint {
    /// before a popped node is dispatched
    BeforeNode,
    /// after a dispatched node completed, successfully or not
    AfterNode,
}

/// Delay strategy between traversal steps.
///
/// Pacing exists for interactive rendering only; it never affects which
/// nodes run or in what order.
#[async_trait]
pub trait Pacing: Send + Sync {
    async fn pause(
        &self,
        point: PacePoint,
    );
}

/// No delay at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacing for NoPacing {
    async fn pause(
        &self,
        _: PacePoint,
    ) {
    }
}

/// Sleeps a fixed duration at each pace point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedPacing {
    pub before_node: Duration,
    pub after_node: Duration,
}

impl FixedPacing {
    pub fn new(
        before_node: Duration,
        after_node: Duration,
    ) -> Self {
        Self {
            before_node,
            after_node,
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(Duration::from_millis(config.before_node_ms), Duration::from_millis(config.after_node_ms))
    }

    pub fn is_zero(&self) -> bool {
        self.before_node.is_zero() && self.after_node.is_zero()
    }
}

#[async_trait]
impl Pacing for FixedPacing {
    async fn pause(
        &self,
        point: PacePoint,
    ) {
        let delay = match point {
            PacePoint::BeforeNode => self.before_node,
            PacePoint::AfterNode => self.after_node,
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let pacing = FixedPacing::from_config(&PacingConfig {
            before_node_ms: 200,
            after_node_ms: 0,
        });
        assert_eq!(pacing.before_node, Duration::from_millis(200));
        assert!(!pacing.is_zero());
        assert!(FixedPacing::from_config(&PacingConfig::default()).is_zero());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_pacing_sleeps_per_point() {
        let pacing = FixedPacing::new(Duration::from_millis(300), Duration::from_millis(100));

        let started = tokio::time::Instant::now();
        pacing.pause(PacePoint::BeforeNode).await;
        assert!(started.elapsed() >= Duration::from_millis(300));

        let started = tokio::time::Instant::now();
        pacing.pause(PacePoint::AfterNode).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(300));
    }
}
