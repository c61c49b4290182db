//! Editable server form state shared by the CLI and GUI frontends.

use std::collections::BTreeMap;

use super::McpServer;

/// In-progress edit of a server entry.
///
/// `name` doubles as the server ID. The `new_*` fields hold text that has
/// been typed but not yet committed to `args`/`env`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDraft {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub new_arg: String,
    pub new_env_key: String,
    pub new_env_value: String,
}

impl ServerDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing an existing entry.
    pub fn from_server(id: &str, server: &McpServer) -> Self {
        Self {
            name: id.to_string(),
            command: server.command.clone(),
            args: server.args.clone(),
            env: server.env.clone(),
            ..Self::default()
        }
    }

    /// Commit the pending argument. Blank input is ignored.
    pub fn add_arg(&mut self) -> bool {
        let arg = self.new_arg.trim();
        if arg.is_empty() {
            return false;
        }
        self.args.push(arg.to_string());
        self.new_arg.clear();
        true
    }

    pub fn remove_arg(&mut self, index: usize) -> Option<String> {
        if index < self.args.len() {
            Some(self.args.remove(index))
        } else {
            None
        }
    }

    /// Commit the pending env pair. Both key and value are required.
    pub fn add_env(&mut self) -> bool {
        let key = self.new_env_key.trim();
        let value = self.new_env_value.trim();
        if key.is_empty() || value.is_empty() {
            return false;
        }
        self.env.insert(key.to_string(), value.to_string());
        self.new_env_key.clear();
        self.new_env_value.clear();
        true
    }

    pub fn remove_env(&mut self, key: &str) -> Option<String> {
        self.env.remove(key)
    }

    /// Server ID to save under; a fresh UUID when the name is blank.
    pub fn resolved_id(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            name.to_string()
        }
    }

    pub fn to_server(&self) -> McpServer {
        McpServer {
            command: self.command.trim().to_string(),
            args: self.args.clone(),
            env: self.env.clone(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.command.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_arg_trims_and_clears() {
        let mut draft = ServerDraft::new();
        draft.new_arg = "  --port=8080 ".to_string();

        assert!(draft.add_arg());
        assert_eq!(draft.args, vec!["--port=8080"]);
        assert!(draft.new_arg.is_empty());
    }

    #[test]
    fn add_arg_ignores_blank() {
        let mut draft = ServerDraft::new();
        draft.new_arg = "   ".to_string();

        assert!(!draft.add_arg());
        assert!(draft.args.is_empty());
        assert_eq!(draft.new_arg, "   ");
    }

    #[test]
    fn remove_arg_by_index() {
        let mut draft = ServerDraft::new();
        draft.args = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        assert_eq!(draft.remove_arg(1), Some("b".to_string()));
        assert_eq!(draft.args, vec!["a", "c"]);
        assert_eq!(draft.remove_arg(5), None);
    }

    #[test]
    fn add_env_requires_key_and_value() {
        let mut draft = ServerDraft::new();
        draft.new_env_key = "PORT".to_string();

        assert!(!draft.add_env());
        assert!(draft.env.is_empty());

        draft.new_env_value = " 3000 ".to_string();
        assert!(draft.add_env());
        assert_eq!(draft.env.get("PORT").map(String::as_str), Some("3000"));
        assert!(draft.new_env_key.is_empty());
        assert!(draft.new_env_value.is_empty());
    }

    #[test]
    fn remove_env_by_key() {
        let mut draft = ServerDraft::new();
        draft.env.insert("A".to_string(), "1".to_string());

        assert_eq!(draft.remove_env("A"), Some("1".to_string()));
        assert_eq!(draft.remove_env("A"), None);
    }

    #[test]
    fn resolved_id_falls_back_to_uuid() {
        let mut draft = ServerDraft::new();
        let generated = draft.resolved_id();
        assert_eq!(generated.len(), 36);
        assert!(uuid::Uuid::parse_str(&generated).is_ok());

        draft.name = " github ".to_string();
        assert_eq!(draft.resolved_id(), "github");
    }

    #[test]
    fn from_server_round_trips_fields() {
        let server = McpServer::new("node")
            .with_args(["server.js"])
            .with_env("API_KEY", "secret");
        let draft = ServerDraft::from_server("local", &server);

        assert_eq!(draft.name, "local");
        assert_eq!(draft.to_server(), server);
    }
}
