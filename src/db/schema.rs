use log::info;
use postgres::Client;

use super::catalog::QueryCatalog;

/// Resets the warehouse schema: drop everything, then recreate it.
///
/// Each statement runs in its own implicit transaction, so a failure partway
/// through leaves the schema partially rebuilt.  The fix is a rerun from this
/// mode, not a rollback.
pub struct SchemaManager<'a> {
    pub catalog: &'a QueryCatalog,
}

impl SchemaManager<'_> {
    /// Drop all seven tables.  `IF EXISTS` makes this a no-op on tables that
    /// are already gone.
    pub fn drop_all(&self, client: &mut Client) -> Result<(), postgres::Error> {
        info!("dropping existing tables ...");
        for statement in self.catalog.drop_statements() {
            client.batch_execute(statement)?;
        }
        info!("done");
        Ok(())
    }

    /// Create the seven tables, staging first, then fact, then dimensions.
    pub fn create_all(&self, client: &mut Client) -> Result<(), postgres::Error> {
        info!("creating new tables ...");
        for statement in self.catalog.create_statements() {
            client.batch_execute(statement)?;
        }
        info!("done");
        Ok(())
    }
}
