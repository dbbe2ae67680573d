// config.rs - botconfig.txt loading
// KEY=VALUE lines, searched in the same locations whichever directory the bot is started from

use crate::error::ConfigError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const CONFIG_PATHS: [&str; 4] = [
    "botconfig.txt",
    "../botconfig.txt",
    "../../botconfig.txt",
    "src/botconfig.txt",
];

const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub prefix: String,
    pub owner_id: Option<u64>,
    pub bot_manager_role: Option<u64>,
    pub support_staff_role: Option<u64>,
    pub data_dir: PathBuf,
    pub update_script: PathBuf,
}

impl BotConfig {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let token = map
            .get("DISCORD_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        if token == TOKEN_PLACEHOLDER {
            return Err(ConfigError::Invalid {
                key: "DISCORD_TOKEN",
                value: token.clone(),
            });
        }

        Ok(Self {
            token: token.clone(),
            prefix: map
                .get("PREFIX")
                .filter(|p| !p.is_empty())
                .cloned()
                .unwrap_or_else(|| ".".to_string()),
            owner_id: parse_id(map, "BOT_OWNER_ID")?,
            bot_manager_role: parse_id(map, "BOT_MANAGER_ROLE_ID")?,
            support_staff_role: parse_id(map, "SUPPORT_STAFF_ROLE_ID")?,
            data_dir: map
                .get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            update_script: map
                .get("UPDATE_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("../update.bash")),
        })
    }

    /// Roles whose holders bypass the word filter and may use staff commands.
    pub fn staff_roles(&self) -> Vec<u64> {
        [self.bot_manager_role, self.support_staff_role]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_id == Some(user_id)
    }

    pub fn tags_path(&self) -> PathBuf {
        self.data_dir.join("tags.json")
    }

    pub fn bad_words_path(&self) -> PathBuf {
        self.data_dir.join("badWords.json")
    }

    pub fn sticky_roles_path(&self) -> PathBuf {
        self.data_dir.join("stickyRoles.json")
    }
}

fn parse_id(map: &HashMap<String, String>, key: &'static str) -> Result<Option<u64>, ConfigError> {
    match map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                key,
                value: value.to_string(),
            }),
    }
}

pub fn parse_config(content: &str) -> HashMap<String, String> {
    // Remove BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    config
}

/// Load the first botconfig.txt found. Returns the config and the path it came from.
pub fn load_bot_config() -> Result<(BotConfig, &'static str), ConfigError> {
    for config_path in CONFIG_PATHS {
        match fs::read_to_string(config_path) {
            Ok(content) => {
                let config = BotConfig::from_map(&parse_config(&content))?;
                return Ok((config, config_path));
            }
            Err(_) => continue,
        }
    }

    Err(ConfigError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_values_comments_and_bom() {
        let map = parse_config("\u{feff}# comment\nDISCORD_TOKEN = abc\n\nPREFIX=!\nJUNK\nURL=a=b\n");
        assert_eq!(map.get("DISCORD_TOKEN").unwrap(), "abc");
        assert_eq!(map.get("PREFIX").unwrap(), "!");
        assert_eq!(map.get("URL").unwrap(), "a=b");
        assert!(!map.contains_key("JUNK"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn defaults_apply() {
        let config = BotConfig::from_map(&parse_config("DISCORD_TOKEN=abc")).unwrap();
        assert_eq!(config.prefix, ".");
        assert_eq!(config.owner_id, None);
        assert!(config.staff_roles().is_empty());
        assert_eq!(config.tags_path(), PathBuf::from("data").join("tags.json"));
        assert_eq!(config.update_script, PathBuf::from("../update.bash"));
    }

    #[test]
    fn ids_are_parsed() {
        let config = BotConfig::from_map(&parse_config(
            "DISCORD_TOKEN=abc\nBOT_OWNER_ID=1\nBOT_MANAGER_ROLE_ID=2\nSUPPORT_STAFF_ROLE_ID=3\nDATA_DIR=/tmp/bot",
        ))
        .unwrap();
        assert!(config.is_owner(1));
        assert!(!config.is_owner(2));
        assert_eq!(config.staff_roles(), vec![2, 3]);
        assert_eq!(config.bad_words_path(), PathBuf::from("/tmp/bot/badWords.json"));
    }

    #[test]
    fn missing_or_placeholder_token_is_rejected() {
        assert!(matches!(
            BotConfig::from_map(&parse_config("PREFIX=!")),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        ));
        assert!(matches!(
            BotConfig::from_map(&parse_config("DISCORD_TOKEN=YOUR_BOT_TOKEN_HERE")),
            Err(ConfigError::Invalid { key: "DISCORD_TOKEN", .. })
        ));
    }

    #[test]
    fn bad_id_is_rejected() {
        let err = BotConfig::from_map(&parse_config("DISCORD_TOKEN=abc\nBOT_OWNER_ID=me")).unwrap_err();
        assert!(err.to_string().contains("BOT_OWNER_ID"));
    }
}
