//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Replays interactions from a loaded cassette.
///
/// Within a port/method pair, a call is served the first unconsumed
/// interaction whose recorded input equals the call's input; if none
/// matches, the first unconsumed interaction in recording order.
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    consumed: HashMap<PortMethodKey, Vec<bool>>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        let consumed = queues.iter().map(|(k, q)| (k.clone(), vec![false; q.len()])).collect();
        Self { queues, consumed }
    }

    /// Return the interaction that answers a call with the given input.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette has no (more) interactions for the
    /// given port/method combination.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
        input: &serde_json::Value,
    ) -> Result<&Interaction, String> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            ));
        };
        let consumed = self.consumed.entry(key).or_insert_with(|| vec![false; queue.len()]);

        let mut first_open = None;
        let mut matched = None;
        for (i, used) in consumed.iter().enumerate() {
            if *used {
                continue;
            }
            first_open.get_or_insert(i);
            if queue[i].input == *input {
                matched = Some(i);
                break;
            }
        }

        let index = matched.or(first_open).ok_or_else(|| {
            format!(
                "Cassette exhausted: all {count} interactions for port={port:?} \
                 method={method:?} have been consumed.",
                count = queue.len(),
            )
        })?;

        consumed[index] = true;
        Ok(&queue[index])
    }
}
