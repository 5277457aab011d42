#![allow(clippy::disallowed_methods)]

use datafactory::DataFactoryProvider;
use futures::future::join_all;
use mockito::{Matcher, Server};
use serde_json::json;
use std::collections::HashMap;
use tfplug::data_source::{DataSource, ReadDataSourceRequest};
use tfplug::provider::{new_data_source, new_resource, ConfigureProviderRequest, Provider};
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceWithConfigure, ValidateResourceConfigRequest,
};
use tfplug::{Context, Dynamic, DynamicValue, ProviderData};

const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";
const FACTORY_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/acctestRG-df-1/providers/Microsoft.DataFactory/factories/acctestdf1";

fn api_version() -> Matcher {
    Matcher::UrlEncoded("api-version".into(), "2018-06-01".into())
}

async fn configure(provider: &mut DataFactoryProvider, endpoint: &str) -> ProviderData {
    let mut config = DynamicValue::object();
    config.insert("subscription_id", SUBSCRIPTION);
    config.insert("access_token", "secret");
    config.insert("endpoint", endpoint);

    let response = provider
        .configure(Context::new(), ConfigureProviderRequest { config })
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    response.provider_data.expect("provider data")
}

async fn resource(endpoint: &str, type_name: &str) -> Box<dyn ResourceWithConfigure> {
    let mut provider = DataFactoryProvider::new();
    let data = configure(&mut provider, endpoint).await;
    new_resource(&provider, Context::new(), type_name, Some(data))
        .await
        .expect("resource")
}

fn factory_config(name: &str) -> DynamicValue {
    let mut config = DynamicValue::object();
    config.insert("name", name);
    config.insert("resource_group_name", "acctestRG-df-1");
    config.insert("location", "West US");
    config
}

fn factory_body(name: &str) -> String {
    json!({
        "name": name,
        "location": "westus",
        "properties": {
            "provisioningState": "Succeeded",
            "publicNetworkAccess": "Enabled"
        }
    })
    .to_string()
}

async fn create(
    resource: &dyn ResourceWithConfigure,
    config: DynamicValue,
) -> CreateResourceResponse {
    resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: resource.type_name().to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await
}

async fn read(
    resource: &dyn ResourceWithConfigure,
    state: DynamicValue,
) -> ReadResourceResponse {
    resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: resource.type_name().to_string(),
                current_state: state,
            },
        )
        .await
}

fn state_with_id(id: &str) -> DynamicValue {
    let mut state = DynamicValue::object();
    state.insert("id", id);
    state
}

#[tokio::test(flavor = "multi_thread")]
async fn factory_lifecycle_with_mock_server() {
    let mut server = Server::new_async().await;

    let absent = server
        .mock("GET", FACTORY_PATH)
        .match_query(api_version())
        .with_status(404)
        .with_body(r#"{"error":{"code":"ResourceNotFound","message":"not found"}}"#)
        .expect(1)
        .create_async()
        .await;
    let put = server
        .mock("PUT", FACTORY_PATH)
        .match_query(api_version())
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::PartialJson(json!({
            "location": "westus",
            "properties": { "publicNetworkAccess": "Enabled" }
        })))
        .with_body(factory_body("acctestdf1"))
        .expect(1)
        .create_async()
        .await;
    let present = server
        .mock("GET", FACTORY_PATH)
        .match_query(api_version())
        .with_body(factory_body("acctestdf1"))
        .expect(2)
        .create_async()
        .await;

    let factory = resource(&server.url(), "azurerm_data_factory").await;
    let created = create(factory.as_ref(), factory_config("acctestdf1")).await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

    let state = created.new_state;
    assert_eq!(state.string("id").as_deref(), Some(FACTORY_PATH));
    assert_eq!(state.string("location").as_deref(), Some("westus"));
    assert_eq!(
        state.attr("github_configuration"),
        Some(&Dynamic::empty_list())
    );
    assert_eq!(state.boolean("public_network_enabled"), Some(true));

    let refreshed = read(factory.as_ref(), state.clone()).await;
    assert!(refreshed.diagnostics.is_empty());
    assert_eq!(
        refreshed.new_state.and_then(|s| s.string("id")).as_deref(),
        Some(FACTORY_PATH)
    );

    absent.assert_async().await;
    put.assert_async().await;
    present.assert_async().await;
}

#[tokio::test]
async fn create_requires_import_of_existing_factory() {
    let mut server = Server::new_async().await;

    let _existing = server
        .mock("GET", FACTORY_PATH)
        .match_query(api_version())
        .with_body(factory_body("acctestdf1"))
        .create_async()
        .await;
    let put = server
        .mock("PUT", FACTORY_PATH)
        .match_query(api_version())
        .expect(0)
        .create_async()
        .await;

    let factory = resource(&server.url(), "azurerm_data_factory").await;
    let created = create(factory.as_ref(), factory_config("acctestdf1")).await;

    assert_eq!(created.diagnostics.len(), 1);
    assert_eq!(created.diagnostics[0].summary, "Resource already exists");
    assert!(created.diagnostics[0].detail.contains(FACTORY_PATH));
    put.assert_async().await;
}

#[tokio::test]
async fn deleted_factory_reads_as_absent() {
    let mut server = Server::new_async().await;

    let delete = server
        .mock("DELETE", FACTORY_PATH)
        .match_query(api_version())
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let _gone = server
        .mock("GET", FACTORY_PATH)
        .match_query(api_version())
        .with_status(404)
        .with_body(r#"{"error":{"code":"ResourceNotFound","message":"not found"}}"#)
        .create_async()
        .await;

    let factory = resource(&server.url(), "azurerm_data_factory").await;
    let deleted = factory
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "azurerm_data_factory".to_string(),
                prior_state: state_with_id(FACTORY_PATH),
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);

    let refreshed = read(factory.as_ref(), state_with_id(FACTORY_PATH)).await;
    assert!(refreshed.diagnostics.is_empty());
    assert!(refreshed.new_state.is_none());
    delete.assert_async().await;
}

#[tokio::test]
async fn conflicting_repositories_fail_before_any_request() {
    let mut server = Server::new_async().await;
    let get = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let put = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let repo = |extra: &[(&str, &str)]| {
        let mut fields = HashMap::from([
            ("account_name".to_string(), Dynamic::from("acctest")),
            ("branch_name".to_string(), Dynamic::from("main")),
            ("repository_name".to_string(), Dynamic::from("repo")),
            ("root_folder".to_string(), Dynamic::from("/")),
        ]);
        for (key, value) in extra {
            fields.insert(key.to_string(), Dynamic::from(*value));
        }
        Dynamic::block(fields)
    };

    let mut config = factory_config("acctestdf1");
    config.insert(
        "github_configuration",
        repo(&[("git_url", "https://github.com")]),
    );
    config.insert(
        "vsts_configuration",
        repo(&[("project_name", "project"), ("tenant_id", SUBSCRIPTION)]),
    );

    let factory = resource(&server.url(), "azurerm_data_factory").await;
    let validated = factory
        .validate(
            Context::new(),
            ValidateResourceConfigRequest {
                type_name: "azurerm_data_factory".to_string(),
                config,
            },
        )
        .await;

    assert_eq!(validated.diagnostics.len(), 1, "{:?}", validated.diagnostics);
    assert_eq!(
        validated.diagnostics[0].summary,
        "Conflicting configuration arguments"
    );
    get.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn linked_service_token_survives_refresh() {
    let mut server = Server::new_async().await;
    let path = format!("{}/linkedservices/acctestlsdbs", FACTORY_PATH);

    let _linked = server
        .mock("GET", path.as_str())
        .match_query(api_version())
        .with_body(
            json!({
                "name": "acctestlsdbs",
                "properties": {
                    "type": "AzureDatabricks",
                    "typeProperties": {
                        "domain": "https://adb-111111111.11.azuredatabricks.net",
                        "existingClusterId": "0308-201146-sly615"
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let linked = resource(
        &server.url(),
        "azurerm_data_factory_linked_service_azure_databricks",
    )
    .await;
    let mut prior = state_with_id(&path);
    prior.insert("access_token", "dapi-secret");

    let refreshed = read(linked.as_ref(), prior).await;
    assert!(refreshed.diagnostics.is_empty(), "{:?}", refreshed.diagnostics);
    let state = refreshed.new_state.expect("state");
    assert_eq!(state.string("access_token").as_deref(), Some("dapi-secret"));
    assert_eq!(
        state.string("existing_cluster_id").as_deref(),
        Some("0308-201146-sly615")
    );
    assert_eq!(state.string("data_factory_id").as_deref(), Some(FACTORY_PATH));
}

#[tokio::test(flavor = "multi_thread")]
async fn schedule_trigger_is_started_after_create() {
    let mut server = Server::new_async().await;
    let path = format!("{}/triggers/acctestdf-trigger", FACTORY_PATH);
    let body = json!({
        "name": "acctestdf-trigger",
        "properties": {
            "type": "ScheduleTrigger",
            "runtimeState": "Started",
            "pipelines": [{
                "pipelineReference": {
                    "type": "PipelineReference",
                    "referenceName": "acctest-pipeline"
                }
            }],
            "typeProperties": {
                "recurrence": { "frequency": "Minute", "interval": 1 }
            }
        }
    })
    .to_string();

    let _absent = server
        .mock("GET", path.as_str())
        .match_query(api_version())
        .with_status(404)
        .expect(1)
        .create_async()
        .await;
    let put = server
        .mock("PUT", path.as_str())
        .match_query(api_version())
        .match_body(Matcher::PartialJson(json!({
            "properties": { "type": "ScheduleTrigger" }
        })))
        .with_body(body.clone())
        .create_async()
        .await;
    let start = server
        .mock("POST", format!("{}/start", path).as_str())
        .match_query(api_version())
        .expect(1)
        .create_async()
        .await;
    let _present = server
        .mock("GET", path.as_str())
        .match_query(api_version())
        .with_body(body)
        .create_async()
        .await;

    let trigger = resource(&server.url(), "azurerm_data_factory_trigger_schedule").await;
    let mut config = DynamicValue::object();
    config.insert("name", "acctestdf-trigger");
    config.insert("data_factory_id", FACTORY_PATH);
    config.insert("pipeline_name", "acctest-pipeline");

    let created = create(trigger.as_ref(), config).await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    assert_eq!(created.new_state.boolean("activated"), Some(true));
    assert_eq!(created.new_state.string("frequency").as_deref(), Some("Minute"));

    put.assert_async().await;
    start.assert_async().await;
}

#[tokio::test]
async fn read_past_its_deadline_fails() {
    // Accepts connections and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let endpoint = format!("http://{}", listener.local_addr().expect("addr"));
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let factory = resource(&endpoint, "azurerm_data_factory").await;
    let mut state = state_with_id(FACTORY_PATH);
    state.insert(
        "timeouts",
        Dynamic::block(HashMap::from([("read".to_string(), Dynamic::from("1s"))])),
    );

    let refreshed = read(factory.as_ref(), state).await;
    assert_eq!(refreshed.diagnostics.len(), 1);
    assert_eq!(refreshed.diagnostics[0].summary, "Failed to read resource");
    assert!(
        refreshed.diagnostics[0].detail.contains("Deadline exceeded"),
        "{}",
        refreshed.diagnostics[0].detail
    );
    assert!(refreshed.new_state.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reads_share_one_client() {
    let mut server = Server::new_async().await;
    let names = ["acctestdf1", "acctestdf2", "acctestdf3"];

    let mut mocks = Vec::new();
    for name in names {
        let path = FACTORY_PATH.replace("acctestdf1", name);
        mocks.push(
            server
                .mock("GET", path.as_str())
                .match_query(api_version())
                .with_body(factory_body(name))
                .expect(1)
                .create_async()
                .await,
        );
    }

    let factory = resource(&server.url(), "azurerm_data_factory").await;
    let responses = join_all(names.iter().map(|name| {
        read(
            factory.as_ref(),
            state_with_id(&FACTORY_PATH.replace("acctestdf1", name)),
        )
    }))
    .await;

    for (name, response) in names.iter().zip(responses) {
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state.expect("state");
        assert_eq!(state.string("name").as_deref(), Some(*name));
        assert_eq!(state.string("location").as_deref(), Some("westus"));
    }
    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn data_source_reads_factory() {
    let mut server = Server::new_async().await;
    let _factory = server
        .mock("GET", FACTORY_PATH)
        .match_query(api_version())
        .with_body(factory_body("acctestdf1"))
        .create_async()
        .await;

    let mut provider = DataFactoryProvider::new();
    let data = configure(&mut provider, &server.url()).await;
    let source = new_data_source(&provider, Context::new(), "azurerm_data_factory", Some(data))
        .await
        .expect("data source");

    let mut config = DynamicValue::object();
    config.insert("name", "acctestdf1");
    config.insert("resource_group_name", "acctestRG-df-1");
    let response = source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "azurerm_data_factory".to_string(),
                config,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(response.state.string("id").as_deref(), Some(FACTORY_PATH));
    assert_eq!(response.state.string("location").as_deref(), Some("westus"));
}
