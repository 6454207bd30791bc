//! Manages the connection to the DBMS
//!

use std::time::Duration;

use log::info;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Statement,
};

use crate::configuration::config::Config;

/// Upper bound for establishing or acquiring a pooled connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the connection url out of the [Config] values. SQLite urls only use the
/// [url][Config#structfield.db_url] field, e.g. `scan_frontend.db?mode=rwc` or `:memory:`.
pub(crate) fn connection_url(config: &Config, with_database: bool) -> String {
    if config.db_context == "sqlite" {
        return format!("sqlite:{}", config.db_url);
    }
    let base = format!(
        "{}://{}:{}@{}",
        config.db_context, config.db_username, config.db_password, config.db_url
    );
    if with_database {
        format!("{}/{}", base, config.db_database_name)
    } else {
        base
    }
}

fn connect_options(url: String) -> ConnectOptions {
    let mut options = ConnectOptions::new(url);
    options
        .connect_timeout(CONNECT_TIMEOUT)
        .acquire_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);
    options
}

/// Uses config values found in [Config] to set up a connection
///
/// # Config values in use
///  - [URL][crate::configuration::config::Config#structfield.db_url]
///
///  - [Username][crate::configuration::config::Config#structfield.db_username]
///
///  - [Password][crate::configuration::config::Config#structfield.db_password]
///
///  - [Database context][crate::configuration::config::Config#structfield.db_context]
///
///  - [Database name][crate::configuration::config::Config#structfield.db_database_name]
pub(crate) async fn set_up_db(config: &Config) -> Result<DatabaseConnection, DbErr> {
    info!("Setting up Database Connection ... ");

    let db = Database::connect(connect_options(connection_url(config, false))).await?;

    let db = match db.get_database_backend() {
        DbBackend::MySql => {
            db.execute(Statement::from_string(
                db.get_database_backend(),
                format!(
                    "CREATE DATABASE IF NOT EXISTS `{}`;",
                    config.db_database_name
                ),
            ))
            .await?;
            Database::connect(connect_options(connection_url(config, true))).await?
        }
        _ => db,
    };

    Ok(db)
}
