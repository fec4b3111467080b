use serde::{Deserialize, Serialize};

/// Engine configuration, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Items with confidence strictly above this are routed without human
    /// review; strictly below it they are flagged for review.
    pub auto_approve_threshold: u8,
    /// Items at or below this confidence sit in the low band surfaced for
    /// escalation.
    pub escalation_threshold: u8,
    /// Postal facilities users and mail items are associated with.
    pub centers: Vec<String>,
    /// Prefix for generated QR label identifiers.
    pub qr_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            auto_approve_threshold: 85,
            escalation_threshold: 70,
            centers: vec![
                "Delhi Central".to_string(),
                "Mumbai Central".to_string(),
                "Bangalore Central".to_string(),
                "Kolkata Central".to_string(),
                "Chennai Central".to_string(),
                "Hyderabad Central".to_string(),
            ],
            qr_prefix: "QR".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auto_approve_threshold > 100 {
            anyhow::bail!(
                "auto_approve_threshold must be 0-100, got {}",
                self.auto_approve_threshold
            );
        }
        if self.escalation_threshold > self.auto_approve_threshold {
            anyhow::bail!(
                "escalation_threshold ({}) must not exceed auto_approve_threshold ({})",
                self.escalation_threshold,
                self.auto_approve_threshold
            );
        }
        if self.centers.is_empty() {
            anyhow::bail!("at least one center must be configured");
        }
        Ok(())
    }
}
