//! Kibana alerting rules
//!
//! Only the index-threshold parameter bag is modelled.

use super::{put, Identified, Operation, ResourceKind, WirePayload};
use crate::api::response::KibanaError;
use crate::error::ReconcileError;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};

/// Rule API base path
pub const RULE_PATH: &str = "/api/alerting/rule";

/// An alerting rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Assigned by Kibana on create
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    /// Application that owns the rule, e.g. `alerts`
    pub consumer: String,
    /// Throttling condition, e.g. `onActionGroupChange`
    pub notify_when: String,
    /// e.g. `.index-threshold`
    pub rule_type_id: String,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub params: RuleParams,
    /// Passed through to Kibana untouched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Value>,
}

/// How often the rule conditions are checked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// e.g. `1m`
    pub interval: String,
}

/// Index-threshold rule parameters.
///
/// Accepts both snake_case and the backend's camelCase names in documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParams {
    #[serde(alias = "aggType", skip_serializing_if = "Option::is_none")]
    pub agg_type: Option<String>,
    #[serde(alias = "termSize", skip_serializing_if = "Option::is_none")]
    pub term_size: Option<u32>,
    #[serde(alias = "thresholdComparator", skip_serializing_if = "Option::is_none")]
    pub threshold_comparator: Option<String>,
    #[serde(alias = "timeWindowSize", skip_serializing_if = "Option::is_none")]
    pub time_window_size: Option<u32>,
    #[serde(alias = "timeWindowUnit", skip_serializing_if = "Option::is_none")]
    pub time_window_unit: Option<String>,
    #[serde(alias = "groupBy", skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<String>>,
    #[serde(alias = "timeField", skip_serializing_if = "Option::is_none")]
    pub time_field: Option<String>,
    #[serde(alias = "aggField", skip_serializing_if = "Option::is_none")]
    pub agg_field: Option<String>,
    #[serde(alias = "termField", skip_serializing_if = "Option::is_none")]
    pub term_field: Option<String>,
}

/// Every key [`RuleParams::to_wire`] can produce
pub const RULE_PARAM_KEYS: &[&str] = &[
    "aggType",
    "termSize",
    "thresholdComparator",
    "timeWindowSize",
    "timeWindowUnit",
    "groupBy",
    "threshold",
    "index",
    "timeField",
    "aggField",
    "termField",
];

impl RuleParams {
    /// Translate to Kibana's parameter names. Unset fields are omitted.
    pub fn to_wire(&self) -> Result<WirePayload, ReconcileError> {
        let RuleParams {
            agg_type,
            term_size,
            threshold_comparator,
            time_window_size,
            time_window_unit,
            group_by,
            threshold,
            index,
            time_field,
            agg_field,
            term_field,
        } = self;

        let threshold = threshold
            .as_ref()
            .map(|values| {
                values
                    .iter()
                    .map(|v| {
                        Number::from_f64(*v).map(Value::Number).ok_or_else(|| {
                            ReconcileError::encode(Rule::KIND, format!("threshold {} is not a finite number", v))
                        })
                    })
                    .collect::<Result<Vec<Value>, _>>()
            })
            .transpose()?;

        let mut params = WirePayload::new();
        put(&mut params, "aggType", agg_type.clone());
        put(&mut params, "termSize", *term_size);
        put(&mut params, "thresholdComparator", threshold_comparator.clone());
        put(&mut params, "timeWindowSize", *time_window_size);
        put(&mut params, "timeWindowUnit", time_window_unit.clone());
        put(&mut params, "groupBy", group_by.clone());
        put(&mut params, "threshold", threshold);
        put(&mut params, "index", index.clone());
        put(&mut params, "timeField", time_field.clone());
        put(&mut params, "aggField", agg_field.clone());
        put(&mut params, "termField", term_field.clone());

        Ok(params)
    }
}

impl ResourceKind for Rule {
    const KIND: &'static str = "rule";

    type Created = Identified;
    type Remote = IgnoredAny;
    type Envelope = KibanaError;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn encode(&self, operation: Operation) -> Result<WirePayload, ReconcileError> {
        let mut body = WirePayload::new();

        // consumer, rule_type_id and actions are fixed at creation
        if operation == Operation::Create {
            body.insert("consumer".into(), Value::from(self.consumer.clone()));
            body.insert("rule_type_id".into(), Value::from(self.rule_type_id.clone()));
            body.insert("actions".into(), Value::Array(self.actions.clone()));
        }

        body.insert("name".into(), Value::from(self.name.clone()));
        body.insert("notify_when".into(), Value::from(self.notify_when.clone()));
        body.insert("schedule".into(), json!({ "interval": self.schedule.interval }));
        body.insert("params".into(), Value::Object(self.params.to_wire()?));

        Ok(body)
    }

    fn create_path(&self) -> String {
        RULE_PATH.to_string()
    }

    fn identifier_from(&self, created: Identified) -> Result<String, ReconcileError> {
        created.into_identifier()
    }
}
