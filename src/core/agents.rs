//! Agent rollup
//!
//! Groups finalized clients by the agent that serves them. Runs after the
//! recency sort: agents appear in the order their first (most recent)
//! client appears, and each agent's clients keep the recency order.

use crate::types::{Agent, Client};
use std::collections::HashMap;

/// Group sorted clients by agent identifier
///
/// Clients without an agent are grouped under the empty identifier.
pub fn group_by_agent(clients: Vec<Client>) -> Vec<Agent> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut agents: Vec<Agent> = Vec::new();

    for client in clients {
        let position = match index.get(client.agent.as_str()) {
            Some(&position) => position,
            None => {
                let position = agents.len();
                index.insert(client.agent.clone(), position);
                agents.push(Agent::new(client.agent.clone()));
                position
            }
        };
        agents[position].clients.push(client);
    }

    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::aggregate;
    use crate::types::{RawRecord, ReferenceTable};

    fn row(client: &str, agent: &str, movement: &str, date: &str) -> RawRecord {
        RawRecord {
            client_id: client.to_string(),
            agent_id: agent.to_string(),
            movement_id: movement.to_string(),
            sold_value: Some("1".to_string()),
            document_date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_clients_keeping_recency_order() {
        let records = vec![
            row("C1", "11", "M1", "2024-01-01"),
            row("C2", "12", "M1", "2024-02-01"),
            row("C3", "11", "M1", "2024-03-01"),
            row("C4", "12", "M1", "2023-12-01"),
            row("C1", "11", "M2", "2024-01-05"),
        ];

        let agents = group_by_agent(aggregate(records, &ReferenceTable::new()));

        let ids: Vec<&str> = agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["11", "12"]);

        let clients_of = |agent: &Agent| -> Vec<String> {
            agent.clients.iter().map(|c| c.id.clone()).collect()
        };
        assert_eq!(clients_of(&agents[0]), vec!["C3", "C1"]);
        assert_eq!(clients_of(&agents[1]), vec!["C2", "C4"]);
        assert_eq!(agents[0].name, "Agent 11");
        assert_eq!(agents[0].total_orders(), 3);
    }

    #[test]
    fn test_every_client_lands_in_exactly_one_agent() {
        let records = vec![
            row("C1", "11", "M1", "2024-01-01"),
            row("C2", "", "M1", "2024-01-02"),
            row("C3", "12", "M1", "not-a-date"),
        ];

        let clients = aggregate(records, &ReferenceTable::new());
        let client_count = clients.len();
        let agents = group_by_agent(clients);

        assert_eq!(agents.iter().map(|a| a.clients.len()).sum::<usize>(), client_count);
        assert!(agents.iter().any(|a| a.id.is_empty() && a.clients[0].id == "C2"));
    }

    #[test]
    fn test_empty_input_yields_no_agents() {
        assert!(group_by_agent(Vec::new()).is_empty());
    }

    #[test]
    fn test_agent_serializes_camel_case() {
        let value = serde_json::to_value(Agent::new("11")).unwrap();
        assert_eq!(value, serde_json::json!({"id": "11", "name": "Agent 11", "clients": []}));
    }
}
