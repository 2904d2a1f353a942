use crate::utils::error::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// 聊天平台上的使用者 ID，檔案中可寫成數字或字串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MentionId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MentionId::Numeric(id) => write!(f, "{}", id),
            MentionId::Text(id) => write!(f, "{}", id.trim()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlayersFile {
    players: HashMap<String, MentionId>,
}

/// 玩家顏色 → 提及 ID 的對照表，啟動時載入一次
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDirectory {
    players: HashMap<String, MentionId>,
}

impl PlayerDirectory {
    pub fn new(players: HashMap<String, MentionId>) -> Self {
        Self { players }
    }

    /// 依副檔名選擇格式：.toml 用 TOML，其餘視為 YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| BotError::PlayerDirectoryError {
                path: source.clone(),
                message: e.to_string(),
            })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let directory = if is_toml {
            Self::from_toml_str(&content, &source)?
        } else {
            Self::from_yaml_str(&content, &source)?
        };

        tracing::info!("👥 Loaded {} players from {}", directory.len(), source);
        Ok(directory)
    }

    pub fn from_yaml_str(content: &str, source: &str) -> Result<Self> {
        let file: PlayersFile =
            serde_yaml::from_str(content).map_err(|e| BotError::PlayerDirectoryError {
                path: source.to_string(),
                message: format!("YAML parsing error: {}", e),
            })?;
        Ok(Self::new(file.players))
    }

    pub fn from_toml_str(content: &str, source: &str) -> Result<Self> {
        let file: PlayersFile =
            toml::from_str(content).map_err(|e| BotError::PlayerDirectoryError {
                path: source.to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(Self::new(file.players))
    }

    /// 取得玩家的提及字串；查無此顏色時退回 `@顏色`
    pub fn mention(&self, color: &str) -> String {
        match self.players.get(color) {
            Some(id) => format!("<@{}>", id),
            None => format!("@{}", color),
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_yaml_players() {
        let yaml = r#"
players:
  Blue: 123456789012345678
  Red: "223456789012345678"
"#;
        let directory = PlayerDirectory::from_yaml_str(yaml, "players.yml").unwrap();

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.mention("Blue"), "<@123456789012345678>");
        assert_eq!(directory.mention("Red"), "<@223456789012345678>");
    }

    #[test]
    fn test_unknown_color_falls_back_to_raw_token() {
        let directory = PlayerDirectory::default();
        assert_eq!(directory.mention("Purple"), "@Purple");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut players = HashMap::new();
        players.insert("Blue".to_string(), MentionId::Numeric(7));
        let directory = PlayerDirectory::new(players);

        assert_eq!(directory.mention("Blue"), "<@7>");
        assert_eq!(directory.mention("blue"), "@blue");
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[players]\nWhite = 42\nYellow = \"43\"").unwrap();

        let directory = PlayerDirectory::from_file(file.path()).unwrap();

        assert_eq!(directory.mention("White"), "<@42>");
        assert_eq!(directory.mention("Yellow"), "<@43>");
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "players:\n  Blue: 1\n").unwrap();

        let directory = PlayerDirectory::from_file(file.path()).unwrap();

        assert_eq!(directory.mention("Blue"), "<@1>");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = PlayerDirectory::from_file("/definitely/not/here/players.yml");
        assert!(matches!(result, Err(BotError::PlayerDirectoryError { .. })));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let result = PlayerDirectory::from_yaml_str("colors:\n  - Blue\n", "players.yml");
        assert!(matches!(result, Err(BotError::PlayerDirectoryError { .. })));

        let result = PlayerDirectory::from_yaml_str("players: [Blue, Red]", "players.yml");
        assert!(result.is_err());
    }
}
