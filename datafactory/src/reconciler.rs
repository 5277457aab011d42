//! Generic resource reconciler
//!
//! Every managed entity follows the same lifecycle: derive the id from
//! configuration, refuse to adopt an entity created outside Terraform, PUT
//! the expanded body, then read the entity back and flatten it into state.
//! `ResourceKind` supplies the per-entity pieces and `Reconciler<K>` drives
//! them through the tfplug resource traits.

use crate::api::{ApiError, Clients, EntityApi};
use crate::ids::{IdParseError, ResourceId};
use crate::provider_data::DataFactoryProviderData;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::Schema;
use tfplug::timeouts::{Operation, Timeouts, TIMEOUTS_BLOCK};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::TfplugError;
use thiserror::Error;

/// Failure of a single remote step
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Context(#[from] TfplugError),

    #[error(transparent)]
    Id(#[from] IdParseError),
}

/// Runs a remote call under the context's deadline and cancellation
pub async fn call<F, T>(ctx: &Context, future: F) -> Result<T, ReconcileError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    Ok(ctx.run(future).await??)
}

/// Per-entity half of the reconciliation contract
#[async_trait]
pub trait ResourceKind: Send + Sync + 'static {
    type Id: ResourceId;
    type Model: Send + Sync + 'static;

    /// Terraform type name, e.g. `azurerm_data_factory`
    const TYPE_NAME: &'static str;

    fn schema(&self) -> Schema;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    fn parse_id(&self, raw: &str) -> Result<Self::Id, IdParseError>;

    fn id_from_config(
        &self,
        config: &DynamicValue,
        subscription_id: &str,
    ) -> Result<Self::Id, Diagnostic>;

    fn api(&self, clients: &Clients) -> Arc<dyn EntityApi<Self::Id, Self::Model>>;

    /// Configuration to remote body
    fn expand(&self, config: &DynamicValue) -> Result<Self::Model, Diagnostic>;

    /// Remote body to state. `prior` supplies values the service never
    /// returns, such as secrets.
    fn flatten(
        &self,
        id: &Self::Id,
        model: &Self::Model,
        prior: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic>;

    /// Checks the schema cannot express
    fn validate(&self, _config: &DynamicValue) -> Vec<Diagnostic> {
        Vec::new()
    }

    /// Runs after a successful PUT, before the entity is read back
    async fn after_apply(
        &self,
        _ctx: &Context,
        _clients: &Clients,
        _id: &Self::Id,
        _config: &DynamicValue,
    ) -> Result<(), ReconcileError> {
        Ok(())
    }
}

/// Error returned when create finds an entity nobody imported
pub fn import_as_exists_error(type_name: &str, id: &str) -> Diagnostic {
    Diagnostic::error(
        "Resource already exists",
        format!(
            "A resource with the ID \"{}\" already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for \"{}\" for more information.",
            id, type_name
        ),
    )
}

pub struct Reconciler<K: ResourceKind> {
    kind: K,
    clients: Option<Arc<Clients>>,
}

impl<K: ResourceKind> Reconciler<K> {
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            clients: None,
        }
    }

    /// A reconciler wired to `clients` without going through configure
    pub fn with_clients(kind: K, clients: Arc<Clients>) -> Self {
        Self {
            kind,
            clients: Some(clients),
        }
    }

    fn clients(&self) -> Result<&Clients, Diagnostic> {
        self.clients.as_deref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
    }

    fn timeouts(&self, config: &DynamicValue) -> Result<Timeouts, Diagnostic> {
        self.kind
            .timeouts()
            .with_overrides(config)
            .map_err(|e| {
                Diagnostic::error("Invalid timeouts", e.to_string())
                    .with_attribute(AttributePath::new(TIMEOUTS_BLOCK))
            })
    }

    fn state_id(&self, state: &DynamicValue) -> Result<K::Id, Diagnostic> {
        let raw = state.string("id").ok_or_else(|| {
            Diagnostic::error(
                "Missing resource id",
                format!("{} state has no id", K::TYPE_NAME),
            )
        })?;
        self.kind.parse_id(&raw).map_err(|e| {
            Diagnostic::error("Invalid resource id", e.to_string())
                .with_attribute(AttributePath::new("id"))
        })
    }

    /// Shared body of create and update
    async fn apply(
        &self,
        ctx: Context,
        planned: &DynamicValue,
        operation: Operation,
    ) -> Result<DynamicValue, Diagnostic> {
        let clients = self.clients()?;
        let timeouts = self.timeouts(planned)?;
        let ctx = ctx.with_timeout(timeouts.get(operation));

        let id = self.kind.id_from_config(planned, &clients.subscription_id)?;
        let api = self.kind.api(clients);

        if operation == Operation::Create {
            match call(&ctx, api.get(&id)).await {
                Ok(None) => {}
                Ok(Some(_)) => return Err(import_as_exists_error(K::TYPE_NAME, &id.to_string())),
                Err(e) => {
                    return Err(Diagnostic::error(
                        "Failed to check for existing resource",
                        format!("checking for presence of existing {}: {}", id, e),
                    ))
                }
            }
        }

        let model = self.kind.expand(planned)?;

        tracing::debug!(type_name = K::TYPE_NAME, id = %id, "submitting {}", operation.as_str());
        call(&ctx, api.create_or_update(&id, &model))
            .await
            .map_err(|e| {
                Diagnostic::error(
                    format!("Failed to {} resource", operation.as_str()),
                    format!("creating/updating {}: {}", id, e),
                )
            })?;

        self.kind
            .after_apply(&ctx, clients, &id, planned)
            .await
            .map_err(|e| {
                Diagnostic::error(
                    format!("Failed to {} resource", operation.as_str()),
                    format!("finalizing {}: {}", id, e),
                )
            })?;

        let stored = call(&ctx, api.get(&id))
            .await
            .map_err(|e| {
                Diagnostic::error(
                    "Failed to read resource",
                    format!("retrieving {}: {}", id, e),
                )
            })?
            .ok_or_else(|| {
                Diagnostic::error(
                    "Failed to read resource",
                    format!("{} was not found after being written", id),
                )
            })?;

        self.state_from(&id, &stored, planned)
    }

    fn state_from(
        &self,
        id: &K::Id,
        model: &K::Model,
        prior: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let mut state = self.kind.flatten(id, model, prior)?;
        state.insert("id", id.to_string());
        if let Some(timeouts) = prior.attr(TIMEOUTS_BLOCK) {
            state.insert(TIMEOUTS_BLOCK, timeouts.clone());
        }
        Ok(state)
    }
}

#[async_trait]
impl<K: ResourceKind> Resource for Reconciler<K> {
    fn type_name(&self) -> &str {
        K::TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: self.kind.schema(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = self.kind.schema().validate(&request.config);
        diagnostics.extend(self.kind.validate(&request.config));
        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut planned = request.planned_state;
        self.kind.schema().apply_defaults(&mut planned);

        match self.apply(ctx, &planned, Operation::Create).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diagnostic) => CreateResourceResponse {
                new_state: planned,
                diagnostics: vec![diagnostic],
            },
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let current = request.current_state;
        let fail = |diagnostic: Diagnostic, current: DynamicValue| ReadResourceResponse {
            new_state: Some(current),
            diagnostics: vec![diagnostic],
        };

        let clients = match self.clients() {
            Ok(clients) => clients,
            Err(d) => return fail(d, current),
        };
        let id = match self.state_id(&current) {
            Ok(id) => id,
            Err(d) => return fail(d, current),
        };
        let timeouts = match self.timeouts(&current) {
            Ok(timeouts) => timeouts,
            Err(d) => return fail(d, current),
        };
        let ctx = ctx.with_timeout(timeouts.read);

        match call(&ctx, self.kind.api(clients).get(&id)).await {
            Ok(None) => {
                tracing::warn!(
                    type_name = K::TYPE_NAME,
                    id = %id,
                    "{} was not found - removing from state",
                    id
                );
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Ok(Some(model)) => match self.state_from(&id, &model, &current) {
                Ok(state) => ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics: vec![],
                },
                Err(d) => fail(d, current),
            },
            Err(e) => fail(
                Diagnostic::error(
                    "Failed to read resource",
                    format!("retrieving {}: {}", id, e),
                ),
                current,
            ),
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut planned = request.planned_state;
        self.kind.schema().apply_defaults(&mut planned);

        match self.apply(ctx, &planned, Operation::Update).await {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diagnostic) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diagnostic],
            },
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let result = async {
            let clients = self.clients()?;
            let id = self.state_id(&request.prior_state)?;
            let timeouts = self.timeouts(&request.prior_state)?;
            let ctx = ctx.with_timeout(timeouts.delete);

            let deleted = call(&ctx, self.kind.api(clients).delete(&id))
                .await
                .map_err(|e| {
                    Diagnostic::error(
                        "Failed to delete resource",
                        format!("deleting {}: {}", id, e),
                    )
                })?;
            if !deleted {
                tracing::debug!(type_name = K::TYPE_NAME, id = %id, "already deleted");
            }
            Ok::<(), Diagnostic>(())
        }
        .await;

        DeleteResourceResponse {
            diagnostics: result.err().into_iter().collect(),
        }
    }
}

#[async_trait]
impl<K: ResourceKind> ResourceWithConfigure for Reconciler<K> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<DataFactoryProviderData>() {
                self.clients = Some(provider_data.clients.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract DataFactoryProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<K: ResourceKind> ResourceWithImportState for Reconciler<K> {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        if let Err(e) = self.kind.parse_id(&request.id) {
            response.diagnostics.push(Diagnostic::error(
                "Invalid import id",
                format!("{} cannot be imported: {}", K::TYPE_NAME, e),
            ));
            return response;
        }

        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}
