//! Integration tests for resolving connections end to end.

use std::path::PathBuf;
use std::sync::{Arc, Once};

use connwrap_config::{
    ChainedConnectionStore, ClientConfig, ConnectionConfigResolver, EndpointLookup,
    EnvConnectionStore, Overrides, ResolvedConfig, ServiceEndpoint, SignatureVersion, Verify,
    load_connections_with_options, resolve,
};
use connwrap_types::{SharedConnectionStore, StoredConnection};
use serde_json::json;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("connwrap_config=debug")
            .try_init();
    });
}

fn full_connection() -> StoredConnection {
    StoredConnection::new("orig", "aws")
        .with_login("AKIAORIG")
        .with_password("orig-secret")
        .with_extra(json!({
            "aws_session_token": "orig-token",
            "region_name": "ap-southeast-2",
            "profile_name": "orig-profile",
            "role_arn": "arn:aws:iam::123456789012:role/orig",
            "assume_role_method": "assume_role_with_web_identity",
            "assume_role_kwargs": {"DurationSeconds": 900},
            "endpoint_url": "https://orig.local",
            "verify": "/etc/ssl/orig.pem",
            "service_config": {"s3": {"endpoint_url": "https://s3.orig.local"}},
            "config_kwargs": {"user_agent": "orig-agent", "retries": {"max_attempts": 3}}
        }))
        .unwrap()
}

/// Every override combination keeps the non-overridable fields of the prior
/// config and applies override-wins to the rest.
#[test]
fn test_wrap_keeps_derived_fields() {
    init_tracing();
    let original = resolve(&full_connection(), Overrides::new()).unwrap();

    let region_choices = [None, Some("eu-north-1")];
    let client_choices = [None, Some(ClientConfig::new().with_user_agent("override-agent"))];
    let verify_choices = [None, Some(Verify::Enabled(false))];

    for region in region_choices {
        for client in &client_choices {
            for verify in &verify_choices {
                let mut overrides = Overrides::new();
                if let Some(region) = region {
                    overrides = overrides.with_region_name(region);
                }
                if let Some(client) = client {
                    overrides = overrides.with_client_config(client.clone());
                }
                if let Some(verify) = verify {
                    overrides = overrides.with_verify(verify.clone());
                }

                let wrapped = resolve(&original, overrides).unwrap();

                assert!(wrapped.is_present());
                assert_eq!(wrapped.conn_id(), original.conn_id());
                assert_eq!(wrapped.conn_type(), original.conn_type());
                assert_eq!(wrapped.login(), Some("AKIAORIG"));
                assert_eq!(wrapped.password(), Some("orig-secret"));
                assert_eq!(wrapped.schema(), original.schema());
                assert_eq!(wrapped.credentials(), original.credentials());
                assert_eq!(wrapped.profile_name(), original.profile_name());
                assert_eq!(wrapped.role_arn(), original.role_arn());
                assert_eq!(wrapped.assume_role_method(), original.assume_role_method());
                assert_eq!(wrapped.assume_role_kwargs(), original.assume_role_kwargs());
                assert_eq!(wrapped.endpoint_url(), original.endpoint_url());
                assert_eq!(wrapped.service_config(), original.service_config());
                assert_eq!(wrapped.extra_config(), original.extra_config());

                assert_eq!(
                    wrapped.region_name(),
                    region.or(original.region_name())
                );
                assert_eq!(
                    wrapped.verify(),
                    verify.as_ref().or(original.verify())
                );
                let expected_client = match client {
                    Some(client) => Some(Arc::new(client.clone())),
                    None => original.client_config(),
                };
                assert_eq!(wrapped.client_config(), expected_client);
            }
        }
    }
}

#[test]
fn test_wrap_empty_config_with_overrides() {
    init_tracing();
    let empty = resolve(None::<&StoredConnection>, Overrides::new()).unwrap();
    assert!(!empty.is_present());

    let wrapped = resolve(&empty, Overrides::new().with_region_name("us-west-2")).unwrap();
    assert!(wrapped.is_present());
    assert_eq!(wrapped.region_name(), Some("us-west-2"));
    assert!(wrapped.conn_id().is_none());

    let still_empty = resolve(&empty, Overrides::new()).unwrap();
    assert!(!still_empty.is_present());
}

#[test]
fn test_client_config_from_kwargs() {
    init_tracing();
    let conn = StoredConnection::new("unsigned", "aws")
        .with_extra(json!({
            "config_kwargs": {
                "signature_version": "unsigned",
                "connect_timeout": 1.5,
                "retries": {"max_attempts": 5, "mode": "adaptive"}
            }
        }))
        .unwrap();
    let config = ResolvedConfig::from_connection(&conn, Overrides::new()).unwrap();

    let client = config.client_config().unwrap();
    assert!(client.is_unsigned());
    assert_eq!(client.signature_version, Some(SignatureVersion::Unsigned));
    assert_eq!(client.connect_timeout.unwrap().as_millis(), 1500);
    assert_eq!(client.retries.as_ref().unwrap().max_attempts, Some(5));

    // Built once and shared.
    assert!(Arc::ptr_eq(&client, &config.client_config().unwrap()));
}

#[test]
fn test_env_store_through_resolver() {
    init_tracing();
    let env = EnvConnectionStore::from_vars([
        (
            "CONNWRAP_CONN_AWS_DEFAULT",
            r#"{"conn_type": "aws", "extra": {"region_name": "eu-west-1", "service_config": {"sts": {"endpoint_url": "https://sts.eu.local"}}}}"#,
        ),
        (
            "CONNWRAP_CONN_URI_CONN",
            "aws://AKIAURI:uri%2Fsecret@/?region_name=us-east-2&endpoint_url=https%3A%2F%2Flocalstack%3A4566",
        ),
    ]);
    let resolver = ConnectionConfigResolver::new(Arc::new(env) as SharedConnectionStore);

    let config = resolver.resolve(Some("aws_default"), Overrides::new()).unwrap();
    assert_eq!(config.region_name(), Some("eu-west-1"));
    assert_eq!(
        config
            .get_service_endpoint_url("sts", EndpointLookup::sts_assume())
            .unwrap(),
        ServiceEndpoint::Url("https://sts.eu.local".to_string())
    );

    let config = resolver.resolve(Some("uri_conn"), Overrides::new()).unwrap();
    assert_eq!(config.access_key_id(), Some("AKIAURI"));
    assert_eq!(config.secret_access_key(), Some("uri/secret"));
    assert_eq!(config.endpoint_url(), Some("https://localstack:4566"));
    assert_eq!(
        config
            .get_service_endpoint_url("s3", EndpointLookup::default())
            .unwrap()
            .as_url(),
        Some("https://localstack:4566")
    );

    let missing = resolver
        .resolve(Some("missing"), Overrides::new().with_region_name("us-west-1"))
        .unwrap();
    assert!(missing.is_present());
    assert!(missing.conn_id().is_none());
    assert_eq!(missing.region_name(), Some("us-west-1"));
    assert_eq!(missing.warnings().len(), 1);
}

#[test]
fn test_files_and_env_chained() {
    init_tracing();
    let user_dir = tempfile::tempdir().unwrap();
    let project_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        project_dir.path().join("connections.toml"),
        r#"
[connections.etl]
conn_type = "aws"

[connections.etl.extra]
role_arn = "arn:aws:iam::123456789012:role/etl"
external_id = "etl-external"
verify = false
"#,
    )
    .unwrap();

    let loaded =
        load_connections_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();
    assert_eq!(
        loaded.loaded_from(),
        vec![project_dir.path().join("connections.toml").as_path()]
    );

    let env = EnvConnectionStore::from_vars([(
        "CONNWRAP_CONN_ETL",
        r#"{"conn_type": "aws", "extra": {"profile_name": "env-profile"}}"#,
    )]);
    let chained = ChainedConnectionStore::new()
        .with_store(Arc::new(loaded.store.clone()))
        .with_store(Arc::new(env));
    let resolver = ConnectionConfigResolver::new(chained);

    let config = resolver
        .resolve(Some("etl"), Overrides::new().with_verify(Verify::CaBundle(PathBuf::from("/ca.pem"))))
        .unwrap();

    assert_eq!(config.role_arn(), Some("arn:aws:iam::123456789012:role/etl"));
    assert_eq!(config.assume_role_kwargs()["ExternalId"], "etl-external");
    assert!(config.profile_name().is_none());
    assert_eq!(config.verify(), Some(&Verify::CaBundle(PathBuf::from("/ca.pem"))));
}

#[test]
fn test_session_kwargs_from_resolved() {
    init_tracing();
    let config = resolve(&full_connection(), Overrides::new()).unwrap();
    let kwargs = config.session_kwargs();

    assert_eq!(kwargs["region_name"], "ap-southeast-2");
    assert_eq!(kwargs["profile_name"], "orig-profile");
    assert_eq!(kwargs["aws_access_key_id"], "AKIAORIG");
    assert_eq!(kwargs["aws_session_token"], "orig-token");

    let bare = resolve(&StoredConnection::new("bare", "aws"), Overrides::new()).unwrap();
    assert!(bare.session_kwargs().is_empty());
}
