//! The TargetingEvaluator decides whether a whole targeting group holds.
//!
//! ## Algorithm
//! 1. An empty predicate list is vacuously `True`
//! 2. Spawn up to `max_concurrency` predicate evaluations on the blocking pool
//! 3. Consume results in completion order:
//!    - a result other than `True` returns `False` at once
//!    - otherwise start the next pending predicate
//! 4. When every predicate has reported `True`, return `True`
//!
//! Returning early drops the `JoinSet`, which aborts anything not yet
//! started. Blocking tasks already running finish on their own and their
//! results are thrown away.

use crate::context::RequestContext;
use crate::error::EvaluationError;
use crate::group::TargetingGroup;
use crate::traits::{TargetingPredicate, TargetingPredicateResult};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, instrument};

/// Default cap on predicate evaluations in flight for one group.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

type PredicateOutcome = (String, anyhow::Result<TargetingPredicateResult>);

/// Evaluates targeting groups for one request context.
///
/// An evaluator is bound to exactly one context and is meant to live for a
/// single selection call. Build a new one for every request.
#[derive(Debug, Clone)]
pub struct TargetingEvaluator {
    context: Arc<RequestContext>,
    max_concurrency: usize,
}

impl TargetingEvaluator {
    pub fn new(context: RequestContext) -> Self {
        Self {
            context: Arc::new(context),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Configure how many predicates may run at once (default: 8, minimum: 1)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Evaluate a group: `True` iff every predicate is `True` for the bound context.
    ///
    /// # Returns
    /// * `Ok(TargetingPredicateResult::True)` - All predicates hold (or there are none)
    /// * `Ok(TargetingPredicateResult::False)` - At least one predicate does not hold
    /// * `Err` - A predicate failed, or its task could not be joined
    #[instrument(
        skip(self, group),
        fields(
            targeting_group_id = %group.targeting_group_id,
            predicates = group.predicates.len()
        )
    )]
    pub async fn evaluate(
        &self,
        group: &TargetingGroup,
    ) -> Result<TargetingPredicateResult, EvaluationError> {
        if group.predicates.is_empty() {
            return Ok(TargetingPredicateResult::True);
        }

        let mut pending = group.predicates.iter().cloned();
        let mut in_flight: JoinSet<PredicateOutcome> = JoinSet::new();

        for predicate in pending.by_ref().take(self.max_concurrency) {
            self.spawn_predicate(&mut in_flight, predicate);
        }

        while let Some(joined) = in_flight.join_next().await {
            let (name, outcome) = joined?;
            let result = outcome.map_err(|source| EvaluationError::Predicate {
                predicate: name.clone(),
                source,
            })?;

            if !result.is_true() {
                debug!("Predicate {} returned {:?}, group is ineligible", name, result);
                return Ok(TargetingPredicateResult::False);
            }

            if let Some(next) = pending.next() {
                self.spawn_predicate(&mut in_flight, next);
            }
        }

        Ok(TargetingPredicateResult::True)
    }

    fn spawn_predicate(
        &self,
        in_flight: &mut JoinSet<PredicateOutcome>,
        predicate: Arc<dyn TargetingPredicate>,
    ) {
        let context = Arc::clone(&self.context);
        in_flight.spawn_blocking(move || {
            let outcome = predicate.evaluate(&context);
            (predicate.name().to_string(), outcome)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::ConstantPredicate;
    use anyhow::{Result, anyhow};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    /// Sleeps, then returns a fixed result. Tracks how many run at once.
    #[derive(Debug)]
    struct SlowPredicate {
        delay: Duration,
        result: TargetingPredicateResult,
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl SlowPredicate {
        fn new(delay: Duration, result: TargetingPredicateResult) -> Self {
            Self {
                delay,
                result,
                running: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn tracked(
            delay: Duration,
            running: &Arc<AtomicUsize>,
            peak: &Arc<AtomicUsize>,
        ) -> Self {
            Self {
                delay,
                result: TargetingPredicateResult::True,
                running: Arc::clone(running),
                peak: Arc::clone(peak),
            }
        }
    }

    impl TargetingPredicate for SlowPredicate {
        fn name(&self) -> &str {
            "SlowPredicate"
        }

        fn evaluate(&self, _context: &RequestContext) -> Result<TargetingPredicateResult> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(self.delay);
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(self.result)
        }
    }

    #[derive(Debug)]
    struct FailingPredicate;

    impl TargetingPredicate for FailingPredicate {
        fn name(&self) -> &str {
            "FailingPredicate"
        }

        fn evaluate(&self, _context: &RequestContext) -> Result<TargetingPredicateResult> {
            Err(anyhow!("profile service unavailable"))
        }
    }

    /// Fails, but only after a delay
    #[derive(Debug)]
    struct LateFailingPredicate {
        delay: Duration,
    }

    impl TargetingPredicate for LateFailingPredicate {
        fn name(&self) -> &str {
            "LateFailingPredicate"
        }

        fn evaluate(&self, _context: &RequestContext) -> Result<TargetingPredicateResult> {
            thread::sleep(self.delay);
            Err(anyhow!("late lookup failure"))
        }
    }

    #[derive(Debug)]
    struct PanickingPredicate;

    impl TargetingPredicate for PanickingPredicate {
        fn name(&self) -> &str {
            "PanickingPredicate"
        }

        fn evaluate(&self, _context: &RequestContext) -> Result<TargetingPredicateResult> {
            panic!("predicate bug");
        }
    }

    #[derive(Debug)]
    struct ContextEcho;

    impl TargetingPredicate for ContextEcho {
        fn name(&self) -> &str {
            "ContextEcho"
        }

        fn evaluate(&self, context: &RequestContext) -> Result<TargetingPredicateResult> {
            Ok((context.customer_id() == "customer-1" && context.marketplace_id() == "US").into())
        }
    }

    fn evaluator() -> TargetingEvaluator {
        TargetingEvaluator::new(RequestContext::new("customer-1", "US"))
    }

    #[tokio::test]
    async fn test_empty_group_is_true() {
        let group = TargetingGroup::new("tg-1", "content-1", 0.1);
        let result = evaluator().evaluate(&group).await.unwrap();
        assert_eq!(result, TargetingPredicateResult::True);
    }

    #[tokio::test]
    async fn test_all_true_is_true() {
        let group = TargetingGroup::new("tg-1", "content-1", 0.1)
            .with_predicate(ConstantPredicate::always())
            .with_predicate(ConstantPredicate::always())
            .with_predicate(ContextEcho);
        let result = evaluator().evaluate(&group).await.unwrap();
        assert_eq!(result, TargetingPredicateResult::True);
    }

    #[tokio::test]
    async fn test_single_false_is_false_in_any_position() {
        for position in 0..3 {
            let mut group = TargetingGroup::new("tg-1", "content-1", 0.1);
            for i in 0..3 {
                group = if i == position {
                    group.with_predicate(ConstantPredicate::never())
                } else {
                    group.with_predicate(ConstantPredicate::always())
                };
            }
            let result = evaluator().evaluate(&group).await.unwrap();
            assert_eq!(result, TargetingPredicateResult::False, "false at {}", position);
        }
    }

    #[tokio::test]
    async fn test_indeterminate_disqualifies() {
        let group = TargetingGroup::new("tg-1", "content-1", 0.1)
            .with_predicate(ConstantPredicate::always())
            .with_predicate(SlowPredicate::new(
                Duration::ZERO,
                TargetingPredicateResult::Indeterminate,
            ));
        let result = evaluator().evaluate(&group).await.unwrap();
        assert_eq!(result, TargetingPredicateResult::False);
    }

    #[tokio::test]
    async fn test_uses_bound_context() {
        let group = TargetingGroup::new("tg-1", "content-1", 0.1).with_predicate(ContextEcho);

        let other = TargetingEvaluator::new(RequestContext::new("customer-2", "US"));
        assert!(evaluator().evaluate(&group).await.unwrap().is_true());
        assert!(!other.evaluate(&group).await.unwrap().is_true());
    }

    #[tokio::test]
    async fn test_false_returns_without_waiting_for_slow_predicates() {
        let group = TargetingGroup::new("tg-1", "content-1", 0.1)
            .with_predicate(SlowPredicate::new(
                Duration::from_millis(500),
                TargetingPredicateResult::True,
            ))
            .with_predicate(ConstantPredicate::never());

        let start = Instant::now();
        let result = evaluator().evaluate(&group).await.unwrap();

        assert_eq!(result, TargetingPredicateResult::False);
        assert!(
            start.elapsed() < Duration::from_millis(350),
            "evaluation waited for the slow predicate: {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_predicates_run_concurrently() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut group = TargetingGroup::new("tg-1", "content-1", 0.1);
        for _ in 0..4 {
            group = group.with_predicate(SlowPredicate::tracked(
                Duration::from_millis(200),
                &running,
                &peak,
            ));
        }

        let result = evaluator().evaluate(&group).await.unwrap();

        assert!(result.is_true());
        assert!(peak.load(Ordering::SeqCst) > 1, "predicates ran one at a time");
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut group = TargetingGroup::new("tg-1", "content-1", 0.1);
        for _ in 0..6 {
            group = group.with_predicate(SlowPredicate::tracked(
                Duration::from_millis(50),
                &running,
                &peak,
            ));
        }

        let result = evaluator()
            .with_max_concurrency(2)
            .evaluate(&group)
            .await
            .unwrap();

        assert!(result.is_true());
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_predicate_error_propagates() {
        let group = TargetingGroup::new("tg-1", "content-1", 0.1).with_predicate(FailingPredicate);

        let err = evaluator().evaluate(&group).await.unwrap_err();
        match err {
            EvaluationError::Predicate { predicate, source } => {
                assert_eq!(predicate, "FailingPredicate");
                assert!(source.to_string().contains("unavailable"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_false_before_late_error_is_false() {
        let group = TargetingGroup::new("tg-1", "content-1", 0.1)
            .with_predicate(LateFailingPredicate {
                delay: Duration::from_millis(300),
            })
            .with_predicate(ConstantPredicate::never());

        let result = evaluator().evaluate(&group).await.unwrap();
        assert_eq!(result, TargetingPredicateResult::False);

        // The abandoned failure must not leak into the next group
        tokio::time::sleep(Duration::from_millis(400)).await;
        let next = TargetingGroup::new("tg-2", "content-2", 0.05)
            .with_predicate(ConstantPredicate::always());
        assert!(evaluator().evaluate(&next).await.unwrap().is_true());
    }

    #[tokio::test]
    async fn test_panicking_predicate_is_task_error() {
        let group = TargetingGroup::new("tg-1", "content-1", 0.1).with_predicate(PanickingPredicate);

        let err = evaluator().evaluate(&group).await.unwrap_err();
        assert!(matches!(err, EvaluationError::Task(ref e) if e.is_panic()));
    }

    #[test]
    fn test_max_concurrency_is_at_least_one() {
        assert_eq!(evaluator().with_max_concurrency(0).max_concurrency(), 1);
        assert_eq!(evaluator().max_concurrency(), DEFAULT_MAX_CONCURRENCY);
    }
}
