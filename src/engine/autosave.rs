//! Debounced autosave scheduling.
//!
//! A trailing-edge timer restarted by every structural mutation: a burst of
//! edits coalesces into one save, and the payload is always the graph state
//! at send time. Failures never roll back local state; the save is retried
//! after the next structural mutation.

use crate::constants::AUTOSAVE_DEBOUNCE;
use crate::error::PersistenceFailure;
use crate::types::{FlowDocument, FlowGraph};
use std::time::Instant;

/// External persistence collaborator that receives serialized snapshots.
pub trait PersistenceSink {
    /// Accepts a graph snapshot for storage.
    fn save(&mut self, document: &FlowDocument) -> Result<(), PersistenceFailure>;
}

/// Single-slot trailing-edge debounce timer for autosave.
///
/// All timing is driven by `Instant` values passed in by the caller, so the
/// scheduler is deterministic under test.
#[derive(Debug, Clone, Default)]
pub struct AutosaveScheduler {
    deadline: Option<Instant>,
}

impl AutosaveScheduler {
    /// Creates an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a structural mutation, (re)starting the debounce window.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.deadline = Some(now + AUTOSAVE_DEBOUNCE);
    }

    /// True if a save is scheduled but not yet sent.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Sends the current graph state to the sink if the debounce window has
    /// elapsed.
    ///
    /// The document is serialized at send time, so a save always carries
    /// the latest state even when mutations arrived after scheduling. On
    /// failure the scheduler goes idle; the next [`Self::mark_dirty`]
    /// reschedules, which retries the save.
    ///
    /// # Returns
    ///
    /// `None` if nothing was due; otherwise the result of the save attempt.
    pub fn poll(
        &mut self,
        now: Instant,
        graph: &FlowGraph,
        sink: &mut dyn PersistenceSink,
    ) -> Option<Result<(), PersistenceFailure>> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        let document = graph.to_document();
        let outcome = sink.save(&document);
        match &outcome {
            Ok(()) => log::debug!(
                "autosaved {} node(s), {} edge(s)",
                document.nodes.len(),
                document.edges.len()
            ),
            Err(e) => log::warn!("autosave failed: {e}"),
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlowNode, Position};
    use std::time::Duration;

    /// Records every save and can be flipped into a failing mode.
    #[derive(Default)]
    struct RecordingSink {
        saves: Vec<FlowDocument>,
        fail: bool,
    }

    impl PersistenceSink for RecordingSink {
        fn save(&mut self, document: &FlowDocument) -> Result<(), PersistenceFailure> {
            if self.fail {
                return Err(PersistenceFailure {
                    reason: "disk full".into(),
                });
            }
            self.saves.push(document.clone());
            Ok(())
        }
    }

    #[test]
    fn test_poll_before_deadline_does_nothing() {
        let mut scheduler = AutosaveScheduler::new();
        let mut sink = RecordingSink::default();
        let graph = FlowGraph::new();
        let t0 = Instant::now();

        scheduler.mark_dirty(t0);
        assert!(scheduler.poll(t0, &graph, &mut sink).is_none());
        assert!(scheduler
            .poll(t0 + Duration::from_millis(100), &graph, &mut sink)
            .is_none());
        assert!(sink.saves.is_empty());
        assert!(scheduler.is_pending());
    }

    #[test]
    fn test_burst_of_mutations_coalesces_into_one_save() {
        let mut scheduler = AutosaveScheduler::new();
        let mut sink = RecordingSink::default();
        let graph = FlowGraph::new();
        let t0 = Instant::now();

        for i in 0..5 {
            scheduler.mark_dirty(t0 + Duration::from_millis(i * 10));
        }
        let fire_at = t0 + Duration::from_millis(40) + AUTOSAVE_DEBOUNCE;
        assert!(matches!(scheduler.poll(fire_at, &graph, &mut sink), Some(Ok(()))));
        assert_eq!(sink.saves.len(), 1);
        assert!(!scheduler.is_pending());
        // Nothing further to send.
        assert!(scheduler.poll(fire_at + AUTOSAVE_DEBOUNCE, &graph, &mut sink).is_none());
    }

    #[test]
    fn test_save_carries_state_at_send_time() {
        let mut scheduler = AutosaveScheduler::new();
        let mut sink = RecordingSink::default();
        let mut graph = FlowGraph::new();
        let t0 = Instant::now();

        scheduler.mark_dirty(t0);
        // Mutation after scheduling but before the send.
        graph
            .add_node(FlowNode::new("prompt", Position::new(0.0, 0.0)))
            .unwrap();

        scheduler.poll(t0 + AUTOSAVE_DEBOUNCE, &graph, &mut sink);
        assert_eq!(sink.saves.len(), 1);
        assert_eq!(sink.saves[0].nodes.len(), 1);
    }

    #[test]
    fn test_failure_reported_and_retried_after_next_mutation() {
        let mut scheduler = AutosaveScheduler::new();
        let mut sink = RecordingSink {
            saves: Vec::new(),
            fail: true,
        };
        let graph = FlowGraph::new();
        let t0 = Instant::now();

        scheduler.mark_dirty(t0);
        let result = scheduler.poll(t0 + AUTOSAVE_DEBOUNCE, &graph, &mut sink);
        assert!(matches!(result, Some(Err(_))));
        assert!(!scheduler.is_pending());

        // Next structural mutation reschedules; a recovered sink succeeds.
        sink.fail = false;
        let t1 = t0 + Duration::from_secs(1);
        scheduler.mark_dirty(t1);
        let result = scheduler.poll(t1 + AUTOSAVE_DEBOUNCE, &graph, &mut sink);
        assert!(matches!(result, Some(Ok(()))));
        assert_eq!(sink.saves.len(), 1);
    }
}
