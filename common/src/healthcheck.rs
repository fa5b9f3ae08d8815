use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HealthCheck {
    pub name: String,
    pub version: String,
    pub status: String,
    /// Playbook directory the pipelines were configured with
    pub playbook_dir: String,
}

impl HealthCheck {
    pub fn new(name: &str, version: &str, status: &str, playbook_dir: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            status: status.to_string(),
            playbook_dir: playbook_dir.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_all_fields() {
        let health = HealthCheck::new("control-api", "0.1.0", "ok", "./ansiblePlaybook");

        let json = serde_json::to_value(&health).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "control-api",
                "version": "0.1.0",
                "status": "ok",
                "playbook_dir": "./ansiblePlaybook",
            })
        );
    }
}
