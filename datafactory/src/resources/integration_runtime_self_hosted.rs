//! `azurerm_data_factory_integration_runtime_self_hosted`

use super::common::{
    child_id, child_state, data_factory_id_attribute, description_attribute, id_attribute,
    integration_runtime_name_attribute, unsupported_variant,
};
use crate::api::models::integration_runtime::{
    IntegrationRuntime, IntegrationRuntimeResource, LinkedIntegrationRuntime,
    SelfHostedIntegrationRuntime, SelfHostedProperties,
};
use crate::api::{Clients, EntityApi};
use crate::ids::{ChildKind, FactoryChildId, IdParseError};
use crate::reconciler::ResourceKind;
use std::sync::Arc;
use tfplug::schema::{AttributeBuilder, AttributeType, NestedBlockBuilder, Schema, SchemaBuilder};
use tfplug::timeouts::timeouts_block;
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::StringNotEmpty;

pub struct SelfHostedIntegrationRuntimeKind;

impl ResourceKind for SelfHostedIntegrationRuntimeKind {
    type Id = FactoryChildId;
    type Model = IntegrationRuntimeResource;

    const TYPE_NAME: &'static str = "azurerm_data_factory_integration_runtime_self_hosted";

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Data Factory Self-hosted Integration Runtime")
            .attribute(id_attribute())
            .attribute(integration_runtime_name_attribute())
            .attribute(data_factory_id_attribute())
            .attribute(description_attribute())
            .block(
                NestedBlockBuilder::new("rbac_authorization")
                    .description("Shares a runtime owned by another factory")
                    .max_items(1)
                    .attribute(
                        AttributeBuilder::new("resource_id", AttributeType::String)
                            .required()
                            .validator(StringNotEmpty::create())
                            .build(),
                    )
                    .build(),
            )
            .block(timeouts_block())
            .build()
    }

    fn parse_id(&self, raw: &str) -> Result<FactoryChildId, IdParseError> {
        FactoryChildId::parse(raw, ChildKind::IntegrationRuntime)
    }

    fn id_from_config(
        &self,
        config: &DynamicValue,
        _subscription_id: &str,
    ) -> Result<FactoryChildId, Diagnostic> {
        child_id(config, ChildKind::IntegrationRuntime)
    }

    fn api(
        &self,
        clients: &Clients,
    ) -> Arc<dyn EntityApi<FactoryChildId, IntegrationRuntimeResource>> {
        clients.integration_runtimes.clone()
    }

    fn expand(&self, config: &DynamicValue) -> Result<IntegrationRuntimeResource, Diagnostic> {
        let linked_info = config
            .block("rbac_authorization")
            .and_then(|rbac| rbac.string("resource_id"))
            .map(|resource_id| LinkedIntegrationRuntime::Rbac { resource_id });

        Ok(IntegrationRuntimeResource {
            id: None,
            name: None,
            properties: IntegrationRuntime::SelfHosted(SelfHostedIntegrationRuntime {
                description: config.string("description"),
                type_properties: SelfHostedProperties { linked_info },
            }),
        })
    }

    fn flatten(
        &self,
        id: &FactoryChildId,
        model: &IntegrationRuntimeResource,
        _prior: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let IntegrationRuntime::SelfHosted(runtime) = &model.properties else {
            return Err(unsupported_variant(
                id,
                "a SelfHosted integration runtime",
                model.properties.kind(),
            ));
        };

        let mut state = child_state(id);
        state.insert("description", runtime.description.clone());

        let rbac = match &runtime.type_properties.linked_info {
            Some(LinkedIntegrationRuntime::Rbac { resource_id }) => {
                let mut block = DynamicValue::object();
                block.insert("resource_id", resource_id.as_str());
                vec![block].into()
            }
            Some(LinkedIntegrationRuntime::Unsupported) => {
                return Err(unsupported_variant(
                    id,
                    "an RBAC shared runtime link",
                    "another authorization type",
                ))
            }
            None => Dynamic::empty_list(),
        };
        state.insert("rbac_authorization", rbac);
        Ok(state)
    }
}
