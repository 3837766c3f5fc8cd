use lazy_static::lazy_static;
use regex::Regex;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value '{value}' for {var}")]
    InvalidVar { var: &'static str, value: String },
    #[error("invalid IAM role arn '{0}'")]
    InvalidIamRole(String),
}

/// Connection parameters for the warehouse cluster.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub host: String,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl ClusterConfig {
    /// Keyword/value connection string, e.g.
    /// `host=example.com dbname=dwh user=alice password=secret port=5439`.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} dbname={} user={} password={} port={}",
            self.host, self.dbname, self.user, self.password, self.port
        )
    }
}

/// An IAM role ARN validated at construction.  The COPY dialect requires the
/// credential inline in the statement text, so only values matching the ARN
/// shape are ever allowed to reach it.
#[derive(Debug, Clone)]
pub struct IamRoleArn(String);

impl IamRoleArn {
    pub fn new(value: &str) -> Result<IamRoleArn, ConfigError> {
        lazy_static! {
            static ref ARN_RE: Regex =
                Regex::new(r"^arn:aws:iam::[0-9]{12}:role/[A-Za-z0-9+=,.@_/-]+$").unwrap();
        }
        // env files often quote the arn, accept that
        let value = value.trim().trim_matches('\'');
        if ARN_RE.is_match(value) {
            Ok(IamRoleArn(value.to_string()))
        } else {
            Err(ConfigError::InvalidIamRole(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything a run needs, read once from the environment and passed to each
/// component explicitly.
#[derive(Debug, Clone)]
pub struct DwhConfig {
    pub cluster: ClusterConfig,
    pub iam_role: IamRoleArn,
}

impl DwhConfig {
    pub fn from_env() -> Result<DwhConfig, ConfigError> {
        let port_text = var("CLUSTER_PORT")?;
        let port = port_text
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidVar {
                var: "CLUSTER_PORT",
                value: port_text,
            })?;
        let cluster = ClusterConfig {
            host: var("CLUSTER_HOST")?,
            dbname: var("CLUSTER_DBNAME")?,
            user: var("CLUSTER_USER")?,
            password: var("CLUSTER_PASSWORD")?,
            port,
        };
        let iam_role = IamRoleArn::new(&var("IAM_ROLE_ARN")?)?;
        Ok(DwhConfig { cluster, iam_role })
    }
}

fn var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
