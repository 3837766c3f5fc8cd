use crate::config::IamRoleArn;

/// All tables, in drop/create order: staging first, then the fact table,
/// then the dimensions.
const TABLES: [&str; 7] = [
    "staging_events",
    "staging_songs",
    "songplay",
    "users",
    "songs",
    "artists",
    "time",
];

/// Fact and dimension tables, the ones a load is expected to fill.
const WAREHOUSE_TABLES: [&str; 5] = ["songplay", "users", "songs", "artists", "time"];

const LOG_DATA: &str = "s3://udacity-dend/log_data";
const LOG_JSONPATHS: &str = "s3://udacity-dend/log_json_path.json";
const SONG_DATA: &str = "s3://udacity-dend/song_data";
const REGION: &str = "us-west-2";

const STAGING_EVENTS_CREATE: &str = r#"
CREATE TABLE staging_events (
    staging_event_id BIGINT IDENTITY(0,1),
    artist VARCHAR(100),
    auth VARCHAR(30),
    firstName VARCHAR(50),
    lastName VARCHAR(50),
    song VARCHAR(150),
    gender VARCHAR(2),
    itemInSession INTEGER,
    length DOUBLE PRECISION,
    level VARCHAR(4),
    location VARCHAR(150),
    method VARCHAR(5),
    page VARCHAR(20),
    registration DOUBLE PRECISION,
    sessionId INTEGER,
    status INTEGER,
    ts TIMESTAMP,
    userAgent VARCHAR(150),
    userId INTEGER
);
"#;

const STAGING_SONGS_CREATE: &str = r#"
CREATE TABLE staging_songs (
    staging_song_id BIGINT IDENTITY(0,1),
    num_songs INTEGER,
    artist_id VARCHAR(150),
    artist_latitude DOUBLE PRECISION,
    artist_longitude DOUBLE PRECISION,
    artist_location VARCHAR(150),
    artist_name VARCHAR(100),
    song_id VARCHAR(150),
    title VARCHAR(50),
    duration DOUBLE PRECISION,
    year INTEGER
);
"#;

const SONGPLAY_CREATE: &str = r#"
CREATE TABLE songplay (
    songplay_id BIGINT IDENTITY(0,1) NOT NULL PRIMARY KEY,
    start_time INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    level VARCHAR(4) NOT NULL,
    song_id VARCHAR(150) NOT NULL,
    artist_id VARCHAR(150) NOT NULL,
    session_id INTEGER NOT NULL,
    location VARCHAR(150) NOT NULL,
    user_agent VARCHAR(150) NOT NULL
);
"#;

const USERS_CREATE: &str = r#"
CREATE TABLE users (
    user_id INTEGER NOT NULL PRIMARY KEY,
    first_name VARCHAR(50) NOT NULL,
    last_name VARCHAR(50) NOT NULL,
    gender CHARACTER(1) NOT NULL,
    level VARCHAR(4) NOT NULL
);
"#;

const SONGS_CREATE: &str = r#"
CREATE TABLE songs (
    song_id VARCHAR(150) NOT NULL PRIMARY KEY,
    title VARCHAR(50) NOT NULL,
    artist_id VARCHAR(150) NOT NULL,
    year INTEGER NOT NULL,
    duration DOUBLE PRECISION NOT NULL
);
"#;

const ARTISTS_CREATE: &str = r#"
CREATE TABLE artists (
    artist_id VARCHAR(150) NOT NULL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    location VARCHAR(150) NOT NULL,
    lattitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION
);
"#;

const TIME_CREATE: &str = r#"
CREATE TABLE time (
    start_time INTEGER NOT NULL PRIMARY KEY,
    hour TIME NOT NULL,
    day INTEGER NOT NULL,
    week INTEGER NOT NULL,
    month VARCHAR(10) NOT NULL,
    year INTEGER NOT NULL,
    weekday VARCHAR(12) NOT NULL
);
"#;

const SONGPLAY_INSERT: &str = r#"
INSERT INTO songplay (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT DISTINCT
    CAST(EXTRACT(EPOCH FROM se.ts) AS INTEGER) AS start_time,
    se.userId AS user_id,
    se.level,
    so.song_id,
    so.artist_id,
    se.sessionId AS session_id,
    se.location,
    se.userAgent AS user_agent
FROM staging_events se
JOIN staging_songs so ON se.song = so.title;
"#;

const USERS_INSERT: &str = r#"
INSERT INTO users
SELECT DISTINCT
    userId AS user_id,
    firstName AS first_name,
    lastName AS last_name,
    gender,
    level
FROM staging_events
WHERE page = 'NextSong'
AND userId IS NOT NULL
AND firstName IS NOT NULL
AND lastName IS NOT NULL
AND gender IS NOT NULL
AND level IS NOT NULL;
"#;

const SONGS_INSERT: &str = r#"
INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT DISTINCT song_id, title, artist_id, year, duration
FROM staging_songs;
"#;

const ARTISTS_INSERT: &str = r#"
INSERT INTO artists (artist_id, name, location, lattitude, longitude)
SELECT DISTINCT
    artist_id,
    artist_name,
    COALESCE(artist_location, 'Unknown') AS location,
    artist_latitude AS lattitude,
    artist_longitude AS longitude
FROM staging_songs;
"#;

const TIME_INSERT: &str = r#"
INSERT INTO time
SELECT DISTINCT
    CAST(EXTRACT(EPOCH FROM ts) AS INTEGER) AS start_time,
    ts::timestamp::time AS hour,
    EXTRACT(DAY FROM ts) AS day,
    EXTRACT(WEEK FROM ts) AS week,
    to_char(ts, 'Month') AS month,
    CAST(EXTRACT(YEAR FROM ts) AS INTEGER) AS year,
    to_char(ts, 'Day') AS weekday
FROM staging_events
WHERE page = 'NextSong';
"#;

/// The full set of statements a run needs, rendered once at construction.
/// Each sequence runs in listed order, one statement at a time.
#[derive(Clone)]
pub struct QueryCatalog {
    drop_statements: Vec<String>,
    create_statements: Vec<String>,
    copy_statements: Vec<String>,
    insert_statements: Vec<String>,
}

impl QueryCatalog {
    pub fn new(iam_role: &IamRoleArn) -> QueryCatalog {
        let drop_statements = TABLES
            .iter()
            .map(|table| format!("DROP TABLE IF EXISTS {};", table))
            .collect();
        let create_statements = vec![
            STAGING_EVENTS_CREATE.to_string(),
            STAGING_SONGS_CREATE.to_string(),
            SONGPLAY_CREATE.to_string(),
            USERS_CREATE.to_string(),
            SONGS_CREATE.to_string(),
            ARTISTS_CREATE.to_string(),
            TIME_CREATE.to_string(),
        ];
        let copy_statements = vec![staging_events_copy(iam_role), staging_songs_copy(iam_role)];
        let insert_statements = vec![
            SONGPLAY_INSERT.to_string(),
            USERS_INSERT.to_string(),
            SONGS_INSERT.to_string(),
            ARTISTS_INSERT.to_string(),
            TIME_INSERT.to_string(),
        ];
        QueryCatalog {
            drop_statements,
            create_statements,
            copy_statements,
            insert_statements,
        }
    }

    pub fn drop_statements(&self) -> &[String] {
        &self.drop_statements
    }

    pub fn create_statements(&self) -> &[String] {
        &self.create_statements
    }

    pub fn copy_statements(&self) -> &[String] {
        &self.copy_statements
    }

    pub fn insert_statements(&self) -> &[String] {
        &self.insert_statements
    }

    pub fn warehouse_tables(&self) -> &'static [&'static str] {
        &WAREHOUSE_TABLES
    }
}

/// The event log lands through a jsonpaths manifest; timestamps arrive as
/// epoch milliseconds.
fn staging_events_copy(iam_role: &IamRoleArn) -> String {
    format!(
        r#"
COPY staging_events (
    artist, auth, firstName, gender,
    itemInSession, lastName, length,
    level, location, method, page,
    registration, sessionId, song,
    status, ts, userAgent, userId
)
FROM '{}'
CREDENTIALS 'aws_iam_role={}'
REGION '{}'
TIMEFORMAT AS 'epochmillisecs'
JSON '{}'
TRIMBLANKS TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL;
"#,
        LOG_DATA,
        iam_role.as_str(),
        REGION,
        LOG_JSONPATHS,
    )
}

fn staging_songs_copy(iam_role: &IamRoleArn) -> String {
    format!(
        r#"
COPY staging_songs (
    num_songs, artist_id, artist_latitude,
    artist_longitude, artist_location, artist_name,
    song_id, title, duration, year
)
FROM '{}'
CREDENTIALS 'aws_iam_role={}'
REGION '{}'
FORMAT AS JSON 'auto'
TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL;
"#,
        SONG_DATA,
        iam_role.as_str(),
        REGION,
    )
}
