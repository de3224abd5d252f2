//! Serves a cassette's interactions back, one queue per port/method.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Recorded interactions grouped by `(port, method)`, consumed front to back.
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Group a cassette's interactions; order within each pair follows `seq`.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        let mut interactions = cassette.interactions;
        interactions.sort_by_key(|i| i.seq);
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction);
        }
        Self { queues }
    }

    /// Take the next interaction for `port`/`method`.
    ///
    /// # Errors
    ///
    /// Returns a description of what the cassette does hold when the pair was
    /// never recorded or has been used up.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<Interaction, String> {
        let key = (port.to_string(), method.to_string());
        if let Some(interaction) = self.queues.get_mut(&key).and_then(VecDeque::pop_front) {
            return Ok(interaction);
        }
        if self.queues.contains_key(&key) {
            return Err(format!("Cassette exhausted: no more {port}::{method} interactions"));
        }
        let mut recorded: Vec<String> =
            self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
        recorded.sort();
        Err(format!(
            "Cassette exhausted: {port}::{method} was never recorded (recorded: [{}])",
            recorded.join(", ")
        ))
    }
}
