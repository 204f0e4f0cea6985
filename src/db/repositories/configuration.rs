use anyhow::{Context, Result};

use crate::{
    db::{
        helpers::{read_item, write_item},
        models::{
            configuration::validation::{parse_flag, parse_working_hours},
            keys, Configuration, DEFAULT_WORKING_HOURS,
        },
        Database,
    },
    log_info, log_warn,
};

const ENABLE_LOGS: bool = true;

/// Build a configuration from raw stored values, falling back to defaults key by key.
fn decode_configuration(working_hours: Option<&str>, notify: Option<&str>) -> Configuration {
    let working_hours_threshold = match working_hours.map(parse_working_hours) {
        None => DEFAULT_WORKING_HOURS,
        Some(Ok(hours)) => hours,
        Some(Err(err)) => {
            log_warn!("Using default working hours: {err}");
            DEFAULT_WORKING_HOURS
        }
    };

    let notify_on_completion = match notify.map(parse_flag) {
        None => false,
        Some(Ok(flag)) => flag,
        Some(Err(err)) => {
            log_warn!("Disabling end-of-day notification: {err}");
            false
        }
    };

    Configuration {
        working_hours_threshold,
        notify_on_completion,
    }
}

impl Database {
    /// Current configuration. Missing or malformed keys read as their defaults.
    pub async fn load_configuration(&self) -> Result<Configuration> {
        self.execute(|conn| {
            let working_hours = read_item(conn, keys::WORKING_HOURS)?;
            let notify = read_item(conn, keys::SEND_END_OF_DAY_NOTIFICATION)?;
            Ok(decode_configuration(
                working_hours.as_deref(),
                notify.as_deref(),
            ))
        })
        .await
    }

    /// Validate and persist user-supplied settings.
    ///
    /// An invalid threshold is rejected with [`ConfigError::InvalidThreshold`] before anything
    /// is written.
    ///
    /// [`ConfigError::InvalidThreshold`]: crate::db::models::ConfigError::InvalidThreshold
    pub async fn save_configuration(
        &self,
        working_hours: &str,
        notify_on_completion: bool,
    ) -> Result<Configuration> {
        let working_hours_threshold = parse_working_hours(working_hours)?;
        let config = Configuration {
            working_hours_threshold,
            notify_on_completion,
        };

        self.execute(move |conn| {
            let tx = conn.transaction()?;
            write_item(
                &tx,
                keys::WORKING_HOURS,
                &config.working_hours_threshold.to_string(),
            )?;
            write_item(
                &tx,
                keys::SEND_END_OF_DAY_NOTIFICATION,
                if config.notify_on_completion { "true" } else { "false" },
            )?;
            tx.commit().context("failed to commit configuration")?;
            Ok(())
        })
        .await?;

        log_info!(
            "Saved configuration: {}h threshold, end-of-day notification {}",
            config.working_hours_threshold,
            if config.notify_on_completion { "on" } else { "off" }
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{models::ConfigError, test_support::temp_database};

    #[test]
    fn decode_falls_back_per_key() {
        assert_eq!(decode_configuration(None, None), Configuration::default());
        assert_eq!(
            decode_configuration(Some("6"), Some("true")),
            Configuration {
                working_hours_threshold: 6,
                notify_on_completion: true
            }
        );
        assert_eq!(
            decode_configuration(Some("0"), Some("true")),
            Configuration {
                working_hours_threshold: 8,
                notify_on_completion: true
            }
        );
        assert_eq!(
            decode_configuration(Some("6"), Some("TRUE!")),
            Configuration {
                working_hours_threshold: 6,
                notify_on_completion: false
            }
        );
    }

    #[tokio::test]
    async fn save_then_load() {
        let (_dir, db) = temp_database();
        assert_eq!(
            db.load_configuration().await.unwrap(),
            Configuration::default()
        );

        let saved = db.save_configuration("7", true).await.unwrap();
        assert_eq!(db.load_configuration().await.unwrap(), saved);
        assert_eq!(
            db.get_item(keys::WORKING_HOURS).await.unwrap().as_deref(),
            Some("7")
        );
        assert_eq!(
            db.get_item(keys::SEND_END_OF_DAY_NOTIFICATION)
                .await
                .unwrap()
                .as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn invalid_threshold_leaves_storage_untouched() {
        let (_dir, db) = temp_database();
        db.save_configuration("6", false).await.unwrap();

        let err = db.save_configuration("-2", true).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::InvalidThreshold("-2".into()))
        );

        assert_eq!(
            db.load_configuration().await.unwrap(),
            Configuration {
                working_hours_threshold: 6,
                notify_on_completion: false
            }
        );
    }

    #[tokio::test]
    async fn malformed_stored_threshold_reads_as_default() {
        let (_dir, db) = temp_database();
        db.set_item(keys::WORKING_HOURS, "lots").await.unwrap();
        assert_eq!(
            db.load_configuration().await.unwrap().working_hours_threshold,
            DEFAULT_WORKING_HOURS
        );
    }
}
