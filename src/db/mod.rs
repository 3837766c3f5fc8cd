pub mod catalog;
pub mod load;
pub mod schema;

use postgres::{Client, NoTls};

use crate::config::ClusterConfig;

/// Open a session to the warehouse cluster.  The run owns the connection
/// exclusively and executes one statement at a time on it.
pub fn connect(cluster: &ClusterConfig) -> Result<Client, postgres::Error> {
    Client::connect(cluster.connection_string().as_str(), NoTls)
}
