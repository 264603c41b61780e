//! End-to-end lifecycle tests over a real on-disk configuration tree.
//!
//! Every test here runs the actual pipeline (files, schemas, secrets,
//! merge, typed deserialization), so they are serialized: the pipeline
//! reads process environment variables on every run.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;
use serial_test::serial;

use config::{
    ConfigError, ConfigManager, ConfigOptions, Environment, LogFormat, LogLevel, ReadPreference,
};
use testing::{ConfigFixture, clear_config_env, sample_app_document};

fn manager_for(fixture: &ConfigFixture, environment: Environment, hot_reload: bool) -> ConfigManager {
    ConfigManager::new(ConfigOptions {
        environment: Some(environment),
        config_path: Some(fixture.root().to_path_buf()),
        enable_hot_reload: Some(hot_reload),
    })
}

fn wait_until(deadline: Duration, predicate: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if predicate() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    predicate()
}

#[test]
#[serial]
fn test_load_returns_typed_config_from_files() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);

    let config = manager.load().unwrap();

    // File-sourced probe values.
    assert_eq!(config.app.api.base_url, "http://localhost:4000");
    assert_eq!(config.app.api.timeout_ms, 15_000);
    assert_eq!(config.app.logging.level, LogLevel::Debug);
    assert_eq!(config.app.logging.format, LogFormat::Text);
    assert_eq!(config.app.pagination.default_page_size, 25);
    assert_eq!(
        config.database.connection_string.as_deref(),
        Some("mongodb://localhost:27017/meridian-test")
    );
    assert_eq!(config.database.pool.max_size, 5);
    assert_eq!(config.database.read_preference, ReadPreference::PrimaryPreferred);
    assert_eq!(config.redis.connection.port, 6380);
    assert_eq!(config.redis.retry_strategy.max_attempts, 4);

    assert!(manager.is_loaded());
}

#[test]
#[serial]
fn test_load_applies_defaults_for_absent_sections() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);

    let config = manager.load().unwrap();

    // Sections the sample documents never mention.
    assert_eq!(config.app.uploads.max_file_size_bytes, 10_485_760);
    assert_eq!(config.app.api.rate_limit_max_requests, 100);
    assert!(!config.database.migrations.auto_run);
    assert_eq!(config.redis.queues.webhook.concurrency, 10);
    assert_eq!(config.redis.queues.export.job_timeout_ms, 300_000);
}

#[test]
#[serial]
fn test_second_load_returns_cached_arc_without_reading_files() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);

    let first = manager.load().unwrap();
    let second = manager.load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // With the tree gone, only the cache can satisfy this.
    fs::remove_dir_all(fixture.root().join("environments")).unwrap();
    let third = manager.load().unwrap();
    assert!(Arc::ptr_eq(&first, &third));
}

#[test]
#[serial]
fn test_get_config_loads_lazily() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);

    assert!(!manager.is_loaded());
    let app = manager.get_app_config().unwrap();
    assert_eq!(app.api.base_url, "http://localhost:4000");
    assert!(manager.is_loaded());
}

#[test]
#[serial]
fn test_missing_file_names_exact_path_and_leaves_cache_unloaded() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    fixture.remove_document("development", "app.config.json");
    let manager = manager_for(&fixture, Environment::Development, false);

    let err = manager.load().unwrap_err();
    match err {
        ConfigError::FileNotFound { path } => {
            assert_eq!(path, fixture.config_file("development", "app.config.json"));
        }
        other => panic!("Expected FileNotFound, got {other:?}"),
    }
    assert!(!manager.is_loaded());
}

#[test]
#[serial]
fn test_invalid_json_names_file() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    fixture.write_raw("development", "database.config.json", "{ \"pool\": ");
    let manager = manager_for(&fixture, Environment::Development, false);

    let err = manager.load().unwrap_err();
    match err {
        ConfigError::Parse { path, .. } => {
            assert_eq!(
                path,
                fixture.config_file("development", "database.config.json")
            );
        }
        other => panic!("Expected Parse, got {other:?}"),
    }
    assert!(!manager.is_loaded());
}

#[test]
#[serial]
fn test_mongodb_uri_overrides_file_value() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);

    unsafe { std::env::set_var("MONGODB_URI", "mongodb://vault-host:27017/meridian") };
    let config = manager.load().unwrap();
    clear_config_env();

    assert_eq!(
        config.database.connection_string.as_deref(),
        Some("mongodb://vault-host:27017/meridian")
    );
    // Everything else still comes from the file.
    assert_eq!(config.database.pool.max_size, 5);
}

#[test]
#[serial]
fn test_reload_delivers_new_content_to_subscribers_and_get_config() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);
    let initial = manager.load().unwrap();

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    manager.on_reload(move |config| {
        seen_cb.lock().unwrap().push(config.app.api.base_url.clone());
        Ok(())
    });

    let mut document = sample_app_document();
    document["api"]["baseUrl"] = json!("https://reloaded.example");
    fixture.write_document("development", "app.config.json", &document);

    let reloaded = manager.reload().unwrap();
    assert!(!Arc::ptr_eq(&initial, &reloaded));
    assert_eq!(reloaded.app.api.base_url, "https://reloaded.example");
    assert_eq!(*seen.lock().unwrap(), vec!["https://reloaded.example"]);
    assert_eq!(
        manager.get_config().unwrap().app.api.base_url,
        "https://reloaded.example"
    );
}

#[test]
#[serial]
fn test_subscriber_error_does_not_stop_later_subscribers() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);
    manager.load().unwrap();

    let second_ran = Arc::new(AtomicUsize::new(0));
    manager.on_reload(|_config| anyhow::bail!("subscriber exploded"));
    let second_cb = Arc::clone(&second_ran);
    manager.on_reload(move |_config| {
        second_cb.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    manager.reload().unwrap();
    assert_eq!(second_ran.load(Ordering::SeqCst), 1);
}

#[test]
#[serial]
fn test_reload_failure_retains_previous_config() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);
    manager.load().unwrap();

    fixture.write_raw("development", "app.config.json", "not json at all");
    let err = manager.reload().unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));

    assert!(manager.is_loaded());
    assert_eq!(
        manager.get_config().unwrap().app.api.base_url,
        "http://localhost:4000"
    );
}

#[test]
#[serial]
fn test_environment_subtrees_are_distinct() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    fixture.write_environment("staging");
    let mut staging_app = sample_app_document();
    staging_app["api"]["baseUrl"] = json!("https://staging.example");
    fixture.write_document("staging", "app.config.json", &staging_app);

    let development = ConfigManager::new(ConfigOptions {
        environment: Some(Environment::Development),
        config_path: Some(fixture.root().to_path_buf()),
        enable_hot_reload: None,
    });
    let staging = ConfigManager::new(ConfigOptions {
        environment: Some(Environment::Staging),
        config_path: Some(fixture.root().to_path_buf()),
        enable_hot_reload: None,
    });

    assert_eq!(
        development.load().unwrap().app.api.base_url,
        "http://localhost:4000"
    );
    assert_eq!(
        staging.load().unwrap().app.api.base_url,
        "https://staging.example"
    );

    // Hot reload defaults track the environment.
    assert!(development.hot_reload_enabled());
    assert!(!staging.hot_reload_enabled());

    development.cleanup();
}

#[test]
#[serial]
fn test_hot_reload_applies_file_change() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, true);
    manager.load().unwrap();

    let mut document = sample_app_document();
    document["api"]["baseUrl"] = json!("https://hot.example");
    fixture.write_document("development", "app.config.json", &document);

    assert!(
        wait_until(Duration::from_secs(5), || {
            manager.get_config().unwrap().app.api.base_url == "https://hot.example"
        }),
        "hot reload never applied the on-disk change"
    );

    manager.cleanup();
}

#[test]
#[serial]
fn test_reload_as_first_pipeline_run_arms_hot_reload() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, true);

    // No load() first: reload() is the call that fills the cache.
    manager.reload().unwrap();

    let mut document = sample_app_document();
    document["api"]["baseUrl"] = json!("https://reload-first.example");
    fixture.write_document("development", "app.config.json", &document);

    assert!(
        wait_until(Duration::from_secs(5), || {
            manager.get_config().unwrap().app.api.base_url == "https://reload-first.example"
        }),
        "file change ignored when reload() ran the first pipeline"
    );

    manager.cleanup();
}

#[test]
#[serial]
fn test_reload_after_cleanup_rearms_hot_reload() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, true);
    manager.load().unwrap();
    manager.cleanup();

    manager.reload().unwrap();

    let mut document = sample_app_document();
    document["api"]["baseUrl"] = json!("https://rearmed.example");
    fixture.write_document("development", "app.config.json", &document);

    assert!(
        wait_until(Duration::from_secs(5), || {
            manager.get_config().unwrap().app.api.base_url == "https://rearmed.example"
        }),
        "file change ignored after cleanup() and reload()"
    );

    manager.cleanup();
}

#[test]
#[serial]
fn test_cleanup_releases_watches_and_cache() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, true);
    manager.load().unwrap();

    manager.cleanup();
    assert!(!manager.is_loaded());

    // Subscribers registered after cleanup would still fire if any watch
    // survived; give a generous window.
    let fired = Arc::new(AtomicUsize::new(0));
    let fired_cb = Arc::clone(&fired);
    manager.on_reload(move |_config| {
        fired_cb.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let mut document = sample_app_document();
    document["api"]["baseUrl"] = json!("https://after-cleanup.example");
    fixture.write_document("development", "app.config.json", &document);

    thread::sleep(Duration::from_millis(1_200));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(!manager.is_loaded());
}

#[test]
#[serial]
fn test_manager_stays_usable_after_cleanup() {
    clear_config_env();
    let fixture = ConfigFixture::new();
    let manager = manager_for(&fixture, Environment::Development, false);
    manager.load().unwrap();

    manager.cleanup();
    let config = manager.load().unwrap();
    assert_eq!(config.app.api.base_url, "http://localhost:4000");
    assert!(manager.is_loaded());
}

#[test]
#[serial]
fn test_global_holder_round_trip() {
    clear_config_env();
    config::global::reset();
    let fixture = ConfigFixture::new();

    config::global::init(ConfigOptions {
        environment: Some(Environment::Development),
        config_path: Some(fixture.root().to_path_buf()),
        enable_hot_reload: Some(false),
    })
    .unwrap();

    let config = config::get_config().unwrap();
    assert_eq!(config.app.api.base_url, "http://localhost:4000");
    assert_eq!(config::get_redis_config().unwrap().connection.port, 6380);

    config::global::reset();
}
