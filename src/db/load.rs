use log::info;
use postgres::Client;

use super::catalog::QueryCatalog;

/// Populates the warehouse: bulk-load the staging tables from S3, then fill
/// the fact and dimension tables from them.
///
/// `insert_warehouse` reads staging content, so it must only run after
/// `load_staging` has committed both copies.  Same commit granularity as the
/// schema reset: one implicit transaction per statement, a failure after N
/// inserts leaves N tables populated.
pub struct LoadRunner<'a> {
    pub catalog: &'a QueryCatalog,
}

impl LoadRunner<'_> {
    /// Run the two COPY statements.  The cluster pulls the files straight
    /// from object storage; a hung load blocks here until the server gives up.
    pub fn load_staging(&self, client: &mut Client) -> Result<(), postgres::Error> {
        info!("copying data into the staging tables ...");
        for statement in self.catalog.copy_statements() {
            client.batch_execute(statement)?;
        }
        info!("done");
        Ok(())
    }

    /// Run the five insert transformations against the staging tables.
    pub fn insert_warehouse(&self, client: &mut Client) -> Result<(), postgres::Error> {
        info!("inserting staging data into the fact and dimension tables ...");
        for statement in self.catalog.insert_statements() {
            client.batch_execute(statement)?;
        }
        info!("done");
        Ok(())
    }

    /// Row counts of the fact and dimension tables, for the post-load report.
    pub fn table_counts(&self, client: &mut Client) -> Result<Vec<(&'static str, i64)>, postgres::Error> {
        let mut counts = Vec::new();
        for table in self.catalog.warehouse_tables() {
            let count: i64 = client
                .query_one(format!("SELECT COUNT(*) FROM {};", table).as_str(), &[])?
                .get(0);
            counts.push((*table, count));
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, path::Path};

    use log::info;
    use postgres::Client;

    use crate::config::DwhConfig;
    use crate::db::{catalog::QueryCatalog, connect, load::LoadRunner, schema::SchemaManager};

    /// A tiny staging data set covering the interesting load paths: a
    /// duplicated song row, two songs sharing a title, an event row with a
    /// null gender, and a non-NextSong page hit.
    fn seed_staging(client: &mut Client) -> Result<(), postgres::Error> {
        client.batch_execute(
            r#"
INSERT INTO staging_songs
    (num_songs, artist_id, artist_latitude, artist_longitude, artist_location, artist_name, song_id, title, duration, year)
VALUES
    (1, 'ARAAA111', 41.88, -87.63, NULL, 'Silver Pines', 'SOAAA111', 'Riverbed', 210.5, 2004),
    (1, 'ARAAA111', 41.88, -87.63, NULL, 'Silver Pines', 'SOAAA111', 'Riverbed', 210.5, 2004),
    (1, 'ARBBB222', NULL, NULL, 'Portland, OR', 'Cold Harbor', 'SOBBB222', 'Riverbed', 198.2, 2011);
"#,
        )?;
        client.batch_execute(
            r#"
INSERT INTO staging_events
    (artist, auth, firstName, lastName, song, gender, itemInSession, length, level,
     location, method, page, registration, sessionId, status, ts, userAgent, userId)
VALUES
    ('Silver Pines', 'Logged In', 'Maya', 'Reed', 'Riverbed', 'F', 0, 210.5, 'paid',
     'Chicago, IL', 'PUT', 'NextSong', 1540000000000.0, 101, 200, TIMESTAMP '2018-11-15 16:40:30', 'Mozilla/5.0', 11),
    ('Cold Harbor', 'Logged In', 'Omar', 'Hale', 'Driftwood', NULL, 1, 180.0, 'free',
     'Portland, OR', 'PUT', 'NextSong', 1540000001000.0, 102, 200, TIMESTAMP '2018-11-15 17:05:00', 'Mozilla/5.0', 22),
    ('Cold Harbor', 'Logged In', 'Jo', 'Cole', 'Driftwood', 'M', 2, 180.0, 'free',
     'Portland, OR', 'PUT', 'NextSong', 1540000002000.0, 103, 200, TIMESTAMP '2018-11-15 17:30:00', 'Mozilla/5.0', 33),
    ('Silver Pines', 'Logged In', 'Liam', 'Fox', NULL, 'M', 0, NULL, 'free',
     'Boston, MA', 'GET', 'Home', 1540000003000.0, 104, 200, TIMESTAMP '2018-11-15 18:00:00', 'Mozilla/5.0', 44);
"#,
        )?;
        Ok(())
    }

    #[ignore]
    #[test]
    fn seeded_end_to_end() -> Result<(), Box<dyn Error>> {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .is_test(true)
            .try_init();
        dotenvy::from_path(Path::new(".env/test.env")).unwrap();
        let config = DwhConfig::from_env()?;
        let catalog = QueryCatalog::new(&config.iam_role);
        let mut client = connect(&config.cluster)?;

        let manager = SchemaManager { catalog: &catalog };
        manager.drop_all(&mut client)?;
        manager.create_all(&mut client)?;
        seed_staging(&mut client)?;

        let runner = LoadRunner { catalog: &catalog };
        runner.insert_warehouse(&mut client)?;

        // one event joins two distinct songs sharing its title; the
        // duplicated staging row collapses under DISTINCT
        let songplays = client.query(
            "SELECT user_id, song_id FROM songplay ORDER BY song_id",
            &[],
        )?;
        assert_eq!(songplays.len(), 2);
        for row in &songplays {
            assert_eq!(row.get::<_, i32>(0), 11);
        }
        assert_eq!(songplays[0].get::<_, String>(1), "SOAAA111");
        assert_eq!(songplays[1].get::<_, String>(1), "SOBBB222");

        // null gender and non-NextSong rows are excluded
        let users = client.query("SELECT user_id FROM users ORDER BY user_id", &[])?;
        let user_ids: Vec<i32> = users.iter().map(|row| row.get(0)).collect();
        assert_eq!(user_ids, vec![11, 33]);

        // a null artist location lands as the sentinel, not as null
        let location: String = client
            .query_one(
                "SELECT location FROM artists WHERE artist_id = 'ARAAA111'",
                &[],
            )?
            .get(0);
        assert_eq!(location, "Unknown");
        let location: String = client
            .query_one(
                "SELECT location FROM artists WHERE artist_id = 'ARBBB222'",
                &[],
            )?
            .get(0);
        assert_eq!(location, "Portland, OR");

        // 2018-11-15 16:40:30 UTC is 1542300030 epoch seconds, a Thursday in
        // ISO week 46
        let time = client.query_one(
            "SELECT hour::varchar, day, week, btrim(month), year, btrim(weekday)
             FROM time WHERE start_time = 1542300030",
            &[],
        )?;
        assert_eq!(time.get::<_, String>(0), "16:40:30");
        assert_eq!(time.get::<_, i32>(1), 15);
        assert_eq!(time.get::<_, i32>(2), 46);
        assert_eq!(time.get::<_, String>(3), "November");
        assert_eq!(time.get::<_, i32>(4), 2018);
        assert_eq!(time.get::<_, String>(5), "Thursday");

        // DISTINCT projections leave no duplicate primary keys behind
        for (table, key) in [
            ("songplay", "songplay_id"),
            ("users", "user_id"),
            ("songs", "song_id"),
            ("artists", "artist_id"),
            ("time", "start_time"),
        ] {
            let row = client.query_one(
                format!("SELECT COUNT(*), COUNT(DISTINCT {}) FROM {}", key, table).as_str(),
                &[],
            )?;
            assert_eq!(row.get::<_, i64>(0), row.get::<_, i64>(1), "{}", table);
        }

        let counts = runner.table_counts(&mut client)?;
        assert_eq!(counts[4], ("time", 3));

        client.close()?;
        Ok(())
    }

    /// Full run against the real S3 sources.  Slow; needs the cluster role
    /// to have read access to the buckets.
    #[ignore]
    #[test]
    fn full_load() -> Result<(), Box<dyn Error>> {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .is_test(true)
            .try_init();
        dotenvy::from_path(Path::new(".env/test.env")).unwrap();
        let config = DwhConfig::from_env()?;
        let catalog = QueryCatalog::new(&config.iam_role);
        let mut client = connect(&config.cluster)?;

        let manager = SchemaManager { catalog: &catalog };
        manager.drop_all(&mut client)?;
        manager.create_all(&mut client)?;

        let runner = LoadRunner { catalog: &catalog };
        runner.load_staging(&mut client)?;
        runner.insert_warehouse(&mut client)?;
        for (table, count) in runner.table_counts(&mut client)? {
            info!("{}: {} rows", table, count);
        }

        client.close()?;
        Ok(())
    }
}
