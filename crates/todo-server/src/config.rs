use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono_tz::Tz;
use clap::Parser;

use todo_db::DbConfig;
use todo_service::AttachmentPolicy;

use crate::auth::BasicAuth;

/// Server configuration. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", about = "Task persistence and attachment API")]
pub struct ServerConfig {
    #[arg(long, env = "TODO_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[arg(long, env = "TODO_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Read-only replica. `sqlite://` or `postgres://`.
    #[arg(long, env = "TODO_DB_READ_URL", default_value = "sqlite://todo.db")]
    pub db_read_url: String,

    /// Primary. Its scheme selects the backend.
    #[arg(long, env = "TODO_DB_WRITE_URL", default_value = "sqlite://todo.db")]
    pub db_write_url: String,

    #[arg(long, env = "TODO_DB_READ_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_read_max_connections: u32,

    #[arg(long, env = "TODO_DB_WRITE_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_write_max_connections: u32,

    /// Seconds before a pooled connection is recycled.
    #[arg(long, env = "TODO_DB_MAX_LIFETIME", default_value_t = 180)]
    pub db_max_lifetime: u64,

    #[arg(long, env = "TODO_TASK_TABLE", default_value = "task")]
    pub task_table: String,

    #[arg(long, env = "TODO_USER_TABLE", default_value = "user_encrypt")]
    pub user_table: String,

    /// IANA zone used when rendering timestamps.
    #[arg(long, env = "TODO_TIMEZONE", default_value = "Asia/Jakarta")]
    pub timezone: Tz,

    #[arg(long, env = "TODO_BASIC_AUTH_USERNAME")]
    pub basic_auth_username: Option<String>,

    #[arg(long, env = "TODO_BASIC_AUTH_PASSWORD", hide_env_values = true)]
    pub basic_auth_password: Option<String>,

    /// Comma-separated. Empty allows any origin.
    #[arg(long, env = "TODO_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    #[arg(long, env = "TODO_ATTACHMENT_BUCKET", default_value = "image-wreg")]
    pub attachment_bucket: String,

    #[arg(long, env = "TODO_ATTACHMENT_PREFIX", default_value = "wr")]
    pub attachment_prefix: String,

    #[arg(
        long,
        env = "TODO_ATTACHMENT_HOST",
        default_value = "https://storage.googleapis.com/"
    )]
    pub attachment_host: String,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            read_url: self.db_read_url.clone(),
            write_url: self.db_write_url.clone(),
            read_max_connections: self.db_read_max_connections,
            write_max_connections: self.db_write_max_connections,
            max_lifetime: Duration::from_secs(self.db_max_lifetime),
            task_table: self.task_table.clone(),
            user_table: self.user_table.clone(),
        }
    }

    pub fn attachment_policy(&self) -> AttachmentPolicy {
        let mut host = self.attachment_host.clone();
        if !host.ends_with('/') {
            host.push('/');
        }
        AttachmentPolicy {
            bucket: self.attachment_bucket.clone(),
            prefix: self.attachment_prefix.clone(),
            public_host: host,
            ..AttachmentPolicy::default()
        }
    }

    /// Basic auth is on only when both credentials are set and non-empty.
    pub fn basic_auth(&self) -> Option<BasicAuth> {
        match (&self.basic_auth_username, &self.basic_auth_password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some(BasicAuth::new(user, pass))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["todo-server"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let cfg = parse(&[
            "--port",
            "9000",
            "--db-read-url",
            "postgres://replica/todo",
            "--db-write-url",
            "postgres://primary/todo",
            "--db-read-max-connections",
            "20",
            "--db-max-lifetime",
            "60",
            "--timezone",
            "Europe/Berlin",
            "--allowed-origins",
            "https://a.example,https://b.example",
            "--attachment-host",
            "https://cdn.example",
        ]);
        assert_eq!(cfg.addr().port(), 9000);
        assert_eq!(cfg.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(cfg.allowed_origins.len(), 2);

        let db = cfg.db_config();
        assert_eq!(db.read_url, "postgres://replica/todo");
        assert_eq!(db.write_url, "postgres://primary/todo");
        assert_eq!(db.read_max_connections, 20);
        assert_eq!(db.max_lifetime, Duration::from_secs(60));

        let policy = cfg.attachment_policy();
        assert_eq!(policy.public_host, "https://cdn.example/");
        assert_eq!(policy.content_type, "image/png");
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert!(ServerConfig::try_parse_from(["todo-server", "--timezone", "Mars/Olympus"]).is_err());
    }

    #[test]
    fn basic_auth_needs_both_credentials() {
        let cfg = parse(&["--basic-auth-username", "admin", "--basic-auth-password", "s3cret"]);
        assert!(cfg.basic_auth().is_some());

        let cfg = parse(&["--basic-auth-username", "admin", "--basic-auth-password", ""]);
        assert!(cfg.basic_auth().is_none());
    }
}
