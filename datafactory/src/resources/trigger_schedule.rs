//! `azurerm_data_factory_trigger_schedule`

use super::common::{
    annotations_attribute, child_id, child_name_attribute, child_state, data_factory_id_attribute,
    description_attribute, expand_annotations, id_attribute, unsupported_variant,
};
use crate::api::models::common::{flatten_annotations, flatten_string_values, string_values};
use crate::api::models::trigger::{
    PipelineReference, RecurrenceSchedule, ScheduleRecurrence, ScheduleTrigger,
    ScheduleTriggerProperties, Trigger, TriggerPipelineReference, TriggerResource,
    RUNTIME_STATE_STARTED,
};
use crate::api::{Clients, EntityApi};
use crate::ids::{ChildKind, FactoryChildId, IdParseError};
use crate::reconciler::{call, ReconcileError, ResourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder, Schema,
    SchemaBuilder,
};
use tfplug::timeouts::timeouts_block;
use tfplug::types::{Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{
    EachElement, IntAtLeast, IntBetween, StringInSlice, StringMatch, StringNotEmpty,
};

const FREQUENCIES: &[&str] = &["Minute", "Hour", "Day", "Week", "Month"];

const WEEK_DAYS: &[&str] = &[
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const RFC3339: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$";

pub struct ScheduleTriggerKind;

fn timestamp(name: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .optional()
        .validator(StringMatch::create(RFC3339, "expected an RFC 3339 timestamp"))
        .build()
}

fn number_list(name: &str, min: i64, max: i64) -> Attribute {
    AttributeBuilder::new(name, AttributeType::List(Box::new(AttributeType::Number)))
        .optional()
        .validator(EachElement::create(IntBetween::create(min, max)))
        .build()
}

fn schedule_block() -> NestedBlock {
    NestedBlockBuilder::new("schedule")
        .description("Advanced recurrence: run at the listed minutes, hours and days")
        .max_items(1)
        .attribute(number_list("minutes", 0, 59))
        .attribute(number_list("hours", 0, 23))
        .attribute(
            AttributeBuilder::new("days_of_week", AttributeType::string_list())
                .optional()
                .validator(EachElement::create(StringInSlice::create(WEEK_DAYS)))
                .build(),
        )
        .attribute(number_list("days_of_month", 1, 31))
        .build()
}

fn int_list(block: &DynamicValue, name: &str) -> Vec<i64> {
    block
        .attr(name)
        .and_then(Dynamic::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(Dynamic::as_f64)
                .map(|v| v as i64)
                .collect()
        })
        .unwrap_or_default()
}

fn number_values(values: &[i64]) -> Dynamic {
    Dynamic::List(values.iter().map(|v| Dynamic::from(*v)).collect())
}

fn expand_recurrence(config: &DynamicValue) -> ScheduleRecurrence {
    ScheduleRecurrence {
        frequency: config
            .string("frequency")
            .unwrap_or_else(|| FREQUENCIES[0].to_string()),
        interval: config.int("interval").unwrap_or(1),
        start_time: config.string("start_time"),
        end_time: config.string("end_time"),
        time_zone: config.string("time_zone"),
        schedule: config.block("schedule").map(|schedule| RecurrenceSchedule {
            minutes: int_list(&schedule, "minutes"),
            hours: int_list(&schedule, "hours"),
            week_days: schedule.string_list("days_of_week"),
            month_days: int_list(&schedule, "days_of_month"),
        }),
    }
}

fn flatten_schedule(schedule: Option<&RecurrenceSchedule>) -> Dynamic {
    let Some(schedule) = schedule else {
        return Dynamic::empty_list();
    };
    let mut block = DynamicValue::object();
    block.insert("minutes", number_values(&schedule.minutes));
    block.insert("hours", number_values(&schedule.hours));
    block.insert("days_of_week", Dynamic::string_list(schedule.week_days.clone()));
    block.insert("days_of_month", number_values(&schedule.month_days));
    vec![block].into()
}

#[async_trait]
impl ResourceKind for ScheduleTriggerKind {
    type Id = FactoryChildId;
    type Model = TriggerResource;

    const TYPE_NAME: &'static str = "azurerm_data_factory_trigger_schedule";

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Trigger Schedule inside an Azure Data Factory")
            .attribute(id_attribute())
            .attribute(child_name_attribute("trigger"))
            .attribute(data_factory_id_attribute())
            .attribute(description_attribute())
            .attribute(
                AttributeBuilder::new("pipeline_name", AttributeType::String)
                    .description("The pipeline the trigger runs")
                    .required()
                    .validator(StringNotEmpty::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("pipeline_parameters", AttributeType::string_map())
                    .optional()
                    .build(),
            )
            .attribute(annotations_attribute())
            .attribute(
                AttributeBuilder::new("frequency", AttributeType::String)
                    .optional()
                    .default(StaticDefault::string("Minute"))
                    .validator(StringInSlice::create(FREQUENCIES))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("interval", AttributeType::Number)
                    .optional()
                    .default(StaticDefault::number(1.0))
                    .validator(IntAtLeast::create(1))
                    .build(),
            )
            .attribute(timestamp("start_time"))
            .attribute(timestamp("end_time"))
            .attribute(
                AttributeBuilder::new("time_zone", AttributeType::String)
                    .optional()
                    .validator(StringNotEmpty::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("activated", AttributeType::Bool)
                    .description("Whether the trigger is started after apply")
                    .optional()
                    .default(StaticDefault::bool(true))
                    .build(),
            )
            .block(schedule_block())
            .block(timeouts_block())
            .build()
    }

    fn parse_id(&self, raw: &str) -> Result<FactoryChildId, IdParseError> {
        FactoryChildId::parse(raw, ChildKind::Trigger)
    }

    fn id_from_config(
        &self,
        config: &DynamicValue,
        _subscription_id: &str,
    ) -> Result<FactoryChildId, Diagnostic> {
        child_id(config, ChildKind::Trigger)
    }

    fn api(&self, clients: &Clients) -> Arc<dyn EntityApi<FactoryChildId, TriggerResource>> {
        clients.triggers.clone()
    }

    fn expand(&self, config: &DynamicValue) -> Result<TriggerResource, Diagnostic> {
        let pipelines = config
            .string("pipeline_name")
            .map(|name| TriggerPipelineReference {
                pipeline_reference: PipelineReference::new(name),
                parameters: string_values(&config.string_map("pipeline_parameters")),
            })
            .into_iter()
            .collect();

        Ok(TriggerResource {
            id: None,
            name: None,
            properties: Trigger::ScheduleTrigger(ScheduleTrigger {
                description: config.string("description"),
                annotations: expand_annotations(config),
                pipelines,
                runtime_state: None,
                type_properties: ScheduleTriggerProperties {
                    recurrence: expand_recurrence(config),
                },
            }),
        })
    }

    fn flatten(
        &self,
        id: &FactoryChildId,
        model: &TriggerResource,
        _prior: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let Trigger::ScheduleTrigger(trigger) = &model.properties else {
            return Err(unsupported_variant(
                id,
                "a ScheduleTrigger",
                "another trigger type",
            ));
        };
        let recurrence = &trigger.type_properties.recurrence;

        let mut state = child_state(id);
        state.insert("description", trigger.description.clone());
        state.insert(
            "annotations",
            Dynamic::string_list(flatten_annotations(&trigger.annotations)),
        );

        let pipeline = trigger.pipelines.first();
        state.insert(
            "pipeline_name",
            pipeline.map(|p| p.pipeline_reference.reference_name.clone()),
        );
        state.insert(
            "pipeline_parameters",
            Dynamic::string_map(
                pipeline
                    .map(|p| flatten_string_values(&p.parameters))
                    .unwrap_or_default(),
            ),
        );

        state.insert("frequency", recurrence.frequency.as_str());
        state.insert("interval", recurrence.interval);
        state.insert("start_time", recurrence.start_time.clone());
        state.insert("end_time", recurrence.end_time.clone());
        state.insert("time_zone", recurrence.time_zone.clone());
        state.insert("schedule", flatten_schedule(recurrence.schedule.as_ref()));
        state.insert(
            "activated",
            trigger.runtime_state.as_deref() == Some(RUNTIME_STATE_STARTED),
        );
        Ok(state)
    }

    async fn after_apply(
        &self,
        ctx: &Context,
        clients: &Clients,
        id: &FactoryChildId,
        config: &DynamicValue,
    ) -> Result<(), ReconcileError> {
        if config.boolean("activated").unwrap_or(true) {
            tracing::debug!(id = %id, "starting trigger");
            call(ctx, clients.trigger_runtime.start(id)).await
        } else {
            tracing::debug!(id = %id, "stopping trigger");
            call(ctx, clients.trigger_runtime.stop(id)).await
        }
    }
}
